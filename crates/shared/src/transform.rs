//! 3D transform protocol: object model, transform commands, and the
//! request/response pair exchanged on `transform3D` / `drawings3d`.

use std::borrow::Cow;

use glam::DVec4;
use serde::{Deserialize, Serialize};

use crate::RenderResult;

/// Ребро: пара индексов вершин (0-based)
pub type Edge = [usize; 2];

/// Каркасный 3D-объект в однородных координатах (x, y, z, 1)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Object3D {
    pub vertices: Vec<DVec4>,
    pub edges: Vec<Edge>,
}

impl Object3D {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Incremental transform delta. Angles are in degrees.
///
/// On the wire the variant name goes into `transformationType` and the
/// parameters are flattened next to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transformationType", rename_all = "camelCase")]
pub enum TransformCommand {
    Scaling { sx: f64, sy: f64, sz: f64 },
    RotationX { angle: f64 },
    RotationY { angle: f64 },
    Translation { x: f64, y: f64, z: f64 },
    Perspective { d: f64 },
    /// Render the object with the current matrix unchanged
    None,
}

impl TransformCommand {
    pub fn uniform_scale(factor: f64) -> Self {
        Self::Scaling {
            sx: factor,
            sy: factor,
            sz: factor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Scaling { .. } => "scaling",
            Self::RotationX { .. } => "rotationX",
            Self::RotationY { .. } => "rotationY",
            Self::Translation { .. } => "translation",
            Self::Perspective { .. } => "perspective",
            Self::None => "none",
        }
    }
}

/// Матрица преобразования 4×4 (по строкам). Authoritative copy lives in the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformationMatrix(pub [[f64; 4]; 4]);

impl TransformationMatrix {
    pub fn identity() -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self(m)
    }
}

/// Payload of the `transform3D` destination.
///
/// Vertices and edges are borrowed from the session's object when sending,
/// owned when decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest<'a> {
    #[serde(flatten)]
    pub command: TransformCommand,
    pub vertices: Cow<'a, [DVec4]>,
    pub edges: Cow<'a, [Edge]>,
    /// Last matrix the client was told; absent before the first round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<TransformationMatrix>,
}

impl<'a> TransformRequest<'a> {
    pub fn new(
        command: TransformCommand,
        object: &'a Object3D,
        matrix: Option<TransformationMatrix>,
    ) -> Self {
        Self {
            command,
            vertices: Cow::Borrowed(&object.vertices),
            edges: Cow::Borrowed(&object.edges),
            matrix,
        }
    }
}

/// Payload of the `drawings3d` topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub pixels: RenderResult,
    pub matrix: TransformationMatrix,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn triangle() -> Object3D {
        Object3D {
            vertices: vec![
                DVec4::new(0.0, 0.0, 0.0, 1.0),
                DVec4::new(1.0, 0.0, 0.0, 1.0),
                DVec4::new(0.0, 1.0, 0.0, 1.0),
            ],
            edges: vec![[0, 1], [1, 2], [2, 0]],
        }
    }

    #[test]
    fn test_identity_matrix() {
        let m = TransformationMatrix::identity();
        assert_eq!(m.0[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.0[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_command_tags() {
        let cases = [
            (TransformCommand::uniform_scale(1.1), "scaling"),
            (TransformCommand::RotationX { angle: 5.0 }, "rotationX"),
            (TransformCommand::RotationY { angle: -5.0 }, "rotationY"),
            (TransformCommand::Translation { x: 0.0, y: 0.1, z: 0.0 }, "translation"),
            (TransformCommand::Perspective { d: 10.0 }, "perspective"),
            (TransformCommand::None, "none"),
        ];
        for (cmd, tag) in cases {
            let value = serde_json::to_value(cmd).unwrap();
            assert_eq!(value["transformationType"], tag);
            assert_eq!(cmd.label(), tag);
        }
    }

    #[test]
    fn test_request_flattens_command() {
        let obj = triangle();
        let req = TransformRequest::new(
            TransformCommand::RotationX { angle: 5.0 },
            &obj,
            Some(TransformationMatrix::identity()),
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["transformationType"], "rotationX");
        assert_eq!(value["angle"], 5.0);
        assert_eq!(value["vertices"][1], json!([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(value["edges"][2], json!([2, 0]));
        assert_eq!(value["matrix"][0], json!([1.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_request_omits_unknown_matrix() {
        let obj = triangle();
        let req = TransformRequest::new(TransformCommand::None, &obj, None);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["transformationType"], "none");
        assert!(value.get("matrix").is_none());
    }

    #[test]
    fn test_request_decodes_owned() {
        let obj = triangle();
        let req = TransformRequest::new(TransformCommand::Perspective { d: 10.0 }, &obj, None);
        let json = serde_json::to_string(&req).unwrap();
        let back: TransformRequest<'static> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.command, TransformCommand::Perspective { d: 10.0 });
        assert_eq!(back.vertices.as_ref(), obj.vertices.as_slice());
        assert_eq!(back.edges.as_ref(), obj.edges.as_slice());
        assert!(back.matrix.is_none());
    }

    #[test]
    fn test_transform_result_decode() {
        let json = r#"{
            "pixels": [{"x": 400, "y": 300, "color": null}],
            "matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,-0.1,1]]
        }"#;
        let result: TransformResult = serde_json::from_str(json).unwrap();
        assert!(matches!(result.pixels, RenderResult::Pixels(ref px) if px.len() == 1));
        assert_eq!(result.matrix.0[3][2], -0.1);
    }
}
