use serde::{Deserialize, Serialize};
use shared::{CurveForm, CurveType, LineSegment, Point2D};

use crate::i18n::{t, Lang};

// ============================================================================
// Маркеры (визуальная обратная связь)
// ============================================================================

pub const MARKER_RADIUS: f64 = 3.0;
pub const CURVE_MARKER_COLOR: &str = "rgba(0, 0, 255, 0.2)";
pub const POLYGON_MARKER_COLOR: &str = "rgba(255, 0, 0, 0.2)";
pub const VORONOI_MARKER_COLOR: &str = "rgba(0, 255, 0, 0.2)";

/// Lightweight marker drawn for an accumulated point
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub point: Point2D,
    pub color: &'static str,
    pub radius: f64,
}

impl Marker {
    fn new(point: Point2D, color: &'static str) -> Self {
        Self {
            point,
            color,
            radius: MARKER_RADIUS,
        }
    }
}

// ============================================================================
// Drawing mode
// ============================================================================

/// Currently active drawing mode (tab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    #[default]
    Lines,
    Curves,
    Polygon,
    Voronoi,
    ThreeD,
}

impl DrawingMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lines => "Lines",
            Self::Curves => "Curves",
            Self::Polygon => "Polygon",
            Self::Voronoi => "Voronoi",
            Self::ThreeD => "3D",
        }
    }
}

/// Two-phase line construction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LinePhase {
    #[default]
    AwaitingStart,
    AwaitingEnd { start: Point2D },
}

/// What a single click did
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Start point recorded, waiting for the end point
    LineStarted(Point2D),
    /// Both endpoints known. The caller sends the segment right away.
    LineCompleted { start: Point2D, end: Point2D },
    /// Reference point of a center-form curve (replaces the previous one)
    CenterCaptured(Point2D),
    /// Point appended to a curve, polygon or Voronoi sequence
    PointAdded {
        mode: DrawingMode,
        count: usize,
        marker: Marker,
    },
    /// Mode does not accumulate clicks
    Ignored,
}

/// Подсказка пользователю
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hint {
    PickPoint,
    PickStart,
    PickEnd,
    PointsAdded(usize),
    CenterCaptured(Point2D),
    CurvePoints,
    TransformKeys,
}

impl Hint {
    pub fn text(&self, lang: Lang) -> String {
        match self {
            Self::PickPoint => t(lang, "hint.pick_point").to_string(),
            Self::PickStart => t(lang, "hint.pick_start").to_string(),
            Self::PickEnd => t(lang, "hint.pick_end").to_string(),
            Self::PointsAdded(n) => format!("{}: {n}", t(lang, "hint.points_added")),
            Self::CenterCaptured(p) => format!(
                "{}: ({}, {}). {}",
                t(lang, "hint.center"),
                p.x,
                p.y,
                t(lang, "hint.enter_params")
            ),
            Self::CurvePoints => t(lang, "hint.curve_points").to_string(),
            Self::TransformKeys => t(lang, "hint.transform_keys").to_string(),
        }
    }
}

// ============================================================================
// Input state
// ============================================================================

/// Per-mode input accumulation.
///
/// Every mode keeps its own sequence; switching modes never touches another
/// mode's points. Entering a mode only drops that mode's in-progress gesture.
#[derive(Debug, Default)]
pub struct InputState {
    mode: DrawingMode,
    line_phase: LinePhase,
    /// Segments that were completed and sent, oldest first
    segments: Vec<LineSegment>,
    curve_type: CurveType,
    center: Option<Point2D>,
    curve_points: Vec<Point2D>,
    polygon: Vec<Point2D>,
    voronoi: Vec<Point2D>,
    hint: Option<Hint>,
}

impl InputState {
    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    /// Enter a mode
    pub fn set_mode(&mut self, mode: DrawingMode) {
        self.mode = mode;
        if mode == DrawingMode::Lines {
            self.line_phase = LinePhase::AwaitingStart;
        }
        self.hint = Some(match mode {
            DrawingMode::ThreeD => Hint::TransformKeys,
            _ => Hint::PickPoint,
        });
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Change the selected curve type. A real change discards the captured
    /// center and the curve point list.
    pub fn set_curve_type(&mut self, curve_type: CurveType) {
        if curve_type == self.curve_type {
            return;
        }
        self.curve_type = curve_type;
        self.center = None;
        self.curve_points.clear();
        if curve_type.form() == CurveForm::Points {
            self.hint = Some(Hint::CurvePoints);
        }
    }

    pub fn line_phase(&self) -> LinePhase {
        self.line_phase
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&LineSegment> {
        self.segments.last()
    }

    pub fn center(&self) -> Option<Point2D> {
        self.center
    }

    pub fn curve_points(&self) -> &[Point2D] {
        &self.curve_points
    }

    pub fn polygon(&self) -> &[Point2D] {
        &self.polygon
    }

    pub fn voronoi_sites(&self) -> &[Point2D] {
        &self.voronoi
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }

    /// Handle a canvas click in the active mode
    pub fn click(&mut self, point: Point2D) -> ClickOutcome {
        match self.mode {
            DrawingMode::Lines => match self.line_phase {
                LinePhase::AwaitingStart => {
                    self.line_phase = LinePhase::AwaitingEnd { start: point };
                    self.hint = Some(Hint::PickEnd);
                    ClickOutcome::LineStarted(point)
                }
                LinePhase::AwaitingEnd { start } => {
                    self.line_phase = LinePhase::AwaitingStart;
                    self.hint = Some(Hint::PickStart);
                    ClickOutcome::LineCompleted { start, end: point }
                }
            },
            DrawingMode::Curves => match self.curve_type.form() {
                CurveForm::Center => {
                    self.center = Some(point);
                    self.hint = Some(Hint::CenterCaptured(point));
                    ClickOutcome::CenterCaptured(point)
                }
                CurveForm::Points => {
                    self.curve_points.push(point);
                    self.point_added(DrawingMode::Curves, point, CURVE_MARKER_COLOR)
                }
            },
            DrawingMode::Polygon => {
                self.polygon.push(point);
                self.point_added(DrawingMode::Polygon, point, POLYGON_MARKER_COLOR)
            }
            DrawingMode::Voronoi => {
                self.voronoi.push(point);
                self.point_added(DrawingMode::Voronoi, point, VORONOI_MARKER_COLOR)
            }
            DrawingMode::ThreeD => ClickOutcome::Ignored,
        }
    }

    fn point_added(
        &mut self,
        mode: DrawingMode,
        point: Point2D,
        color: &'static str,
    ) -> ClickOutcome {
        let count = match mode {
            DrawingMode::Curves => self.curve_points.len(),
            DrawingMode::Polygon => self.polygon.len(),
            DrawingMode::Voronoi => self.voronoi.len(),
            DrawingMode::Lines | DrawingMode::ThreeD => 0,
        };
        self.hint = Some(Hint::PointsAdded(count));
        ClickOutcome::PointAdded {
            mode,
            count,
            marker: Marker::new(point, color),
        }
    }

    /// Remember a segment after it was sent
    pub(crate) fn record_segment(&mut self, segment: LineSegment) {
        self.segments.push(segment);
    }

    /// Remove and return the last polygon point (point-inside candidate)
    pub(crate) fn take_candidate(&mut self) -> Option<Point2D> {
        self.polygon.pop()
    }

    /// Replace the polygon with a hull boundary returned by the service
    pub(crate) fn replace_polygon(&mut self, points: Vec<Point2D>) {
        self.polygon = points;
    }

    pub(crate) fn clear_curve_points(&mut self) {
        self.curve_points.clear();
    }

    /// Drop every accumulated sequence and the pending line start
    pub fn clear_all(&mut self) {
        self.line_phase = LinePhase::AwaitingStart;
        self.segments.clear();
        self.center = None;
        self.curve_points.clear();
        self.polygon.clear();
        self.voronoi.clear();
        self.hint = Some(Hint::PickPoint);
    }
}
