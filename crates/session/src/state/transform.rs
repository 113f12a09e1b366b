//! Client view of the 3D object and its last-known transformation matrix.
//!
//! The client never transforms vertices itself. Every intent becomes a
//! round trip carrying the whole object plus the matrix the service last
//! reported.

use std::rc::Rc;

use shared::{Object3D, TransformCommand, TransformRequest, TransformationMatrix};

use crate::build::{self, BuildError};
use crate::state::settings::TransformSteps;

/// Last matrix observed from the service, unconfirmed while requests are in flight
#[derive(Debug, Default, Clone)]
pub struct MatrixCache {
    last: Option<TransformationMatrix>,
    awaiting: usize,
}

impl MatrixCache {
    pub fn current(&self) -> Option<TransformationMatrix> {
        self.last
    }

    /// Requests sent whose result has not come back yet
    pub fn awaiting(&self) -> usize {
        self.awaiting
    }

    pub fn is_confirmed(&self) -> bool {
        self.awaiting == 0
    }

    fn sent(&mut self) {
        self.awaiting += 1;
    }

    fn received(&mut self, matrix: TransformationMatrix) {
        self.last = Some(matrix);
        // Broadcasts caused by other clients arrive too
        self.awaiting = self.awaiting.saturating_sub(1);
    }
}

/// Current object + matrix cache
#[derive(Debug, Default)]
pub struct TransformPipeline {
    object: Option<Rc<Object3D>>,
    matrix: MatrixCache,
}

impl TransformPipeline {
    /// Replace the object. The cached matrix belongs to the old object and is dropped.
    pub fn load(&mut self, object: Object3D) -> Rc<Object3D> {
        let object = Rc::new(object);
        self.object = Some(Rc::clone(&object));
        self.matrix = MatrixCache::default();
        object
    }

    pub fn object(&self) -> Option<&Rc<Object3D>> {
        self.object.as_ref()
    }

    pub fn has_object(&self) -> bool {
        self.object.is_some()
    }

    pub fn matrix(&self) -> &MatrixCache {
        &self.matrix
    }

    /// Build the request for a transform delta
    pub fn request(&self, command: TransformCommand) -> Result<TransformRequest<'_>, BuildError> {
        build::transform_request(self.object.as_deref(), command, self.matrix.current())
    }

    /// Record that a request went out
    pub fn mark_sent(&mut self) {
        self.matrix.sent();
    }

    /// Overwrite the cached matrix with the one from a 3D result
    pub fn apply_result(&mut self, matrix: TransformationMatrix) {
        self.matrix.received(matrix);
    }
}

// ============================================================================
// Keyboard intents
// ============================================================================

/// Discrete transform intent bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformIntent {
    ScaleUp,
    ScaleDown,
    RotateXPositive,
    RotateXNegative,
    RotateYPositive,
    RotateYNegative,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveNear,
    MoveFar,
    PerspectiveIncrease,
    PerspectiveDecrease,
}

impl TransformIntent {
    /// Map a key code (`KeyW`, `ArrowUp`, `Equal`) or a plain key (`w`, `+`)
    pub fn from_key(key: &str) -> Option<Self> {
        let intent = match key {
            "+" | "=" | "Equal" | "NumpadAdd" => Self::ScaleUp,
            "-" | "Minus" | "NumpadSubtract" => Self::ScaleDown,
            "ArrowUp" => Self::RotateXPositive,
            "ArrowDown" => Self::RotateXNegative,
            "ArrowLeft" => Self::RotateYPositive,
            "ArrowRight" => Self::RotateYNegative,
            "w" | "W" | "KeyW" => Self::MoveUp,
            "s" | "S" | "KeyS" => Self::MoveDown,
            "a" | "A" | "KeyA" => Self::MoveLeft,
            "d" | "D" | "KeyD" => Self::MoveRight,
            "q" | "Q" | "KeyQ" => Self::MoveNear,
            "e" | "E" | "KeyE" => Self::MoveFar,
            "p" | "P" | "KeyP" => Self::PerspectiveIncrease,
            "o" | "O" | "KeyO" => Self::PerspectiveDecrease,
            _ => return None,
        };
        Some(intent)
    }

    pub fn command(&self, steps: &TransformSteps) -> TransformCommand {
        let m = steps.move_step;
        match self {
            Self::ScaleUp => TransformCommand::uniform_scale(steps.scale_factor),
            Self::ScaleDown => TransformCommand::uniform_scale(1.0 / steps.scale_factor),
            Self::RotateXPositive => TransformCommand::RotationX { angle: steps.angle },
            Self::RotateXNegative => TransformCommand::RotationX { angle: -steps.angle },
            Self::RotateYPositive => TransformCommand::RotationY { angle: steps.angle },
            Self::RotateYNegative => TransformCommand::RotationY { angle: -steps.angle },
            Self::MoveUp => TransformCommand::Translation { x: 0.0, y: m, z: 0.0 },
            Self::MoveDown => TransformCommand::Translation { x: 0.0, y: -m, z: 0.0 },
            Self::MoveLeft => TransformCommand::Translation { x: -m, y: 0.0, z: 0.0 },
            Self::MoveRight => TransformCommand::Translation { x: m, y: 0.0, z: 0.0 },
            Self::MoveNear => TransformCommand::Translation { x: 0.0, y: 0.0, z: m },
            Self::MoveFar => TransformCommand::Translation { x: 0.0, y: 0.0, z: -m },
            Self::PerspectiveIncrease => TransformCommand::Perspective {
                d: steps.perspective_step,
            },
            Self::PerspectiveDecrease => TransformCommand::Perspective {
                d: -steps.perspective_step,
            },
        }
    }
}
