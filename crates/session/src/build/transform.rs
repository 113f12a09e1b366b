use shared::{Object3D, TransformCommand, TransformRequest, TransformationMatrix};

use super::BuildError;

/// Transform payload: the delta, the whole object and the last known matrix
pub fn transform_request(
    object: Option<&Object3D>,
    command: TransformCommand,
    matrix: Option<TransformationMatrix>,
) -> Result<TransformRequest<'_>, BuildError> {
    let object = object.ok_or(BuildError::NoObjectLoaded)?;
    Ok(TransformRequest::new(command, object, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec4;

    #[test]
    fn test_requires_object() {
        let err = transform_request(None, TransformCommand::None, None).unwrap_err();
        assert_eq!(err, BuildError::NoObjectLoaded);
    }

    #[test]
    fn test_carries_full_object() {
        let obj = Object3D {
            vertices: vec![DVec4::new(0.0, 0.0, 0.0, 1.0), DVec4::new(1.0, 0.0, 0.0, 1.0)],
            edges: vec![[0, 1], [1, 0]],
        };
        let req = transform_request(
            Some(&obj),
            TransformCommand::RotationY { angle: 5.0 },
            Some(TransformationMatrix::identity()),
        )
        .unwrap();
        assert_eq!(req.vertices.as_ref(), obj.vertices.as_slice());
        assert_eq!(req.edges.as_ref(), obj.edges.as_slice());
        assert_eq!(req.matrix, Some(TransformationMatrix::identity()));
    }
}
