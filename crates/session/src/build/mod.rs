//! Request building: accumulated input + UI parameters -> wire payload.
//!
//! Every function here is pure. Side effects that follow a successful send
//! (popping the point-inside candidate, replacing the polygon with a hull,
//! clearing curve points) belong to the session.

mod draw;
mod polygon;
mod transform;

pub use draw::{curve, line};
pub use polygon::{
    check_convex, convex_hull, fill_polygon, point_inside, segment_intersects, voronoi_sites,
    MIN_POLYGON_POINTS,
};
pub use transform::transform_request;

use serde::{Deserialize, Serialize};
use shared::FillAlgorithm;

use crate::i18n::{t, Lang};
use crate::state::settings::DrawingDefaults;

/// Validation failure detected before anything is sent
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("no reference point captured")]
    NoReferencePoint,
    #[error("no points added")]
    NoPoints,
    #[error("insufficient points: need at least {required}, have {actual}")]
    InsufficientPoints { required: usize, actual: usize },
    #[error("no candidate point")]
    NoCandidatePoint,
    #[error("no completed segment")]
    NoSegment,
    #[error("no 3D object loaded")]
    NoObjectLoaded,
    #[error("invalid value {value} for {name}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("missing parameter {0}")]
    MissingParameter(&'static str),
}

impl BuildError {
    /// Notice text shown to the user
    pub fn user_message(&self, lang: Lang) -> String {
        match self {
            Self::NoReferencePoint => t(lang, "err.no_reference_point").to_string(),
            Self::NoPoints => t(lang, "err.no_points").to_string(),
            Self::InsufficientPoints { required, .. } => {
                format!("{} {required}", t(lang, "err.insufficient_points"))
            }
            Self::NoCandidatePoint => t(lang, "err.no_candidate").to_string(),
            Self::NoSegment => t(lang, "err.no_segment").to_string(),
            Self::NoObjectLoaded => t(lang, "err.no_object").to_string(),
            Self::InvalidParameter { name, value } => {
                format!("{} {name}: {value}", t(lang, "err.invalid_parameter"))
            }
            Self::MissingParameter(name) => format!("{} {name}", t(lang, "err.missing_parameter")),
        }
    }
}

/// Numeric inputs of a center-form curve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    #[serde(default)]
    pub param1: Option<f64>,
    #[serde(default)]
    pub param2: Option<f64>,
}

impl CurveParams {
    pub fn new(param1: f64, param2: Option<f64>) -> Self {
        Self {
            param1: Some(param1),
            param2,
        }
    }
}

/// Current values of the UI controls that feed 2D commands
#[derive(Debug, Clone, PartialEq)]
pub struct UiParams {
    pub line_algorithm: String,
    pub curve: CurveParams,
    pub fill_algorithm: FillAlgorithm,
    pub fill_color: String,
    pub boundary_color: String,
}

impl UiParams {
    pub fn from_defaults(defaults: &DrawingDefaults) -> Self {
        Self {
            line_algorithm: defaults.line_algorithm.clone(),
            curve: CurveParams::default(),
            fill_algorithm: defaults.fill_algorithm,
            fill_color: defaults.fill_color.clone(),
            boundary_color: defaults.boundary_color.clone(),
        }
    }
}

impl Default for UiParams {
    fn default() -> Self {
        Self::from_defaults(&DrawingDefaults::default())
    }
}
