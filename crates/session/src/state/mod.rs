pub mod input;
pub mod settings;
pub mod transform;

pub use input::{ClickOutcome, DrawingMode, Hint, InputState, LinePhase, Marker};
pub use settings::{DrawingDefaults, ServiceSettings, SessionSettings, TransformSteps};
pub use transform::{MatrixCache, TransformIntent, TransformPipeline};
