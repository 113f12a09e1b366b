use shared::{CurveForm, CurveRequest, CurveType, DrawCommand, LineSegment, Point2D};

use super::{BuildError, CurveParams};

/// Draw-line payload. Only built once both endpoints exist.
pub fn line(start: Point2D, end: Point2D, algorithm: &str) -> DrawCommand {
    DrawCommand::Line(LineSegment::new(start, end, algorithm))
}

/// Draw-curve payload for the selected curve type
pub fn curve(
    curve_type: CurveType,
    center: Option<Point2D>,
    points: &[Point2D],
    params: &CurveParams,
) -> Result<DrawCommand, BuildError> {
    let request = match curve_type.form() {
        CurveForm::Center => {
            let center = center.ok_or(BuildError::NoReferencePoint)?;
            let param1 = required_param("param1", params.param1)?;
            let param2 = if curve_type.parameter_count() > 1 {
                Some(required_param("param2", params.param2)?)
            } else {
                None
            };
            CurveRequest::CenterForm {
                curve_type,
                center,
                param1,
                param2,
            }
        }
        CurveForm::Points => {
            if points.is_empty() {
                return Err(BuildError::NoPoints);
            }
            CurveRequest::PointForm {
                curve_type,
                points: points.to_vec(),
            }
        }
    };
    Ok(DrawCommand::Curve(request))
}

fn required_param(name: &'static str, value: Option<f64>) -> Result<f64, BuildError> {
    match value {
        None => Err(BuildError::MissingParameter(name)),
        Some(v) if !v.is_finite() => Err(BuildError::InvalidParameter { name, value: v }),
        Some(v) => Ok(v),
    }
}
