use serde::{Deserialize, Serialize};

mod transform;

pub use transform::{
    Edge, Object3D, TransformCommand, TransformRequest, TransformResult, TransformationMatrix,
};

// ============================================================================
// Адреса протокола (destinations, topics, endpoints)
// ============================================================================

/// Outbound destination on the persistent channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Линия или кривая
    Draw,
    /// Объект + матрица + команда преобразования
    Transform3D,
    /// Заливка полигона
    FillPolygon,
    /// Диаграмма Вороного
    VoronoiDiagram,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Draw => "/app/draw",
            Self::Transform3D => "/app/transform3D",
            Self::FillPolygon => "/app/fillPolygon",
            Self::VoronoiDiagram => "/app/voronoiDiagram",
        }
    }
}

/// Broadcast result topic. Shared by every connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// 2D results: pixel list or wireframe
    Drawings,
    /// 3D results: render result plus updated matrix
    Drawings3D,
}

impl Topic {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Drawings => "/topic/drawings",
            Self::Drawings3D => "/topic/drawings3d",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.path() == path)
    }

    pub fn all() -> &'static [Topic] {
        &[Topic::Drawings, Topic::Drawings3D]
    }
}

/// Synchronous query endpoint (one per predicate/algorithm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryEndpoint {
    CheckConvex,
    ConvexHullGraham,
    ConvexHullJarvis,
    PointInsidePolygon,
    SegmentIntersectsPolygon,
}

impl QueryEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::CheckConvex => "/draw/checkConvex",
            Self::ConvexHullGraham => "/draw/convexHullGraham",
            Self::ConvexHullJarvis => "/draw/convexHullJarvis",
            Self::PointInsidePolygon => "/draw/isPointInsidePolygon",
            Self::SegmentIntersectsPolygon => "/draw/segmentIntersectsPolygon",
        }
    }
}

// ============================================================================
// Геометрия ввода
// ============================================================================

/// Экранная 2D-точка
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Отрезок для растеризации на сервере
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Free-form tag (`dda`, `bresenham`, `wu`, ...), validated by the service
    pub algorithm: String,
}

impl LineSegment {
    pub fn new(start: Point2D, end: Point2D, algorithm: impl Into<String>) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            algorithm: algorithm.into(),
        }
    }

    pub fn start(&self) -> Point2D {
        Point2D::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point2D {
        Point2D::new(self.x2, self.y2)
    }
}

/// Способ задания кривой
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveForm {
    /// Опорная точка + числовые параметры
    Center,
    /// Упорядоченный набор контрольных точек
    Points,
}

/// Тип кривой
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    #[default]
    Circle,
    Ellipse,
    Parabola,
    Hyperbola,
    Hermite,
    Bezier,
    Bspline,
}

impl CurveType {
    pub fn form(&self) -> CurveForm {
        match self {
            Self::Circle | Self::Ellipse | Self::Parabola | Self::Hyperbola => CurveForm::Center,
            Self::Hermite | Self::Bezier | Self::Bspline => CurveForm::Points,
        }
    }

    /// How many numeric parameters a center-form curve needs (0 for point-form)
    pub fn parameter_count(&self) -> usize {
        match self {
            Self::Circle | Self::Parabola => 1,
            Self::Ellipse | Self::Hyperbola => 2,
            Self::Hermite | Self::Bezier | Self::Bspline => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Parabola => "parabola",
            Self::Hyperbola => "hyperbola",
            Self::Hermite => "hermite",
            Self::Bezier => "bezier",
            Self::Bspline => "bspline",
        }
    }

}

/// Запрос на построение кривой. Ровно один вариант активен.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurveRequest {
    CenterForm {
        #[serde(rename = "curveType")]
        curve_type: CurveType,
        center: Point2D,
        param1: f64,
        #[serde(default)]
        param2: Option<f64>,
    },
    PointForm {
        #[serde(rename = "curveType")]
        curve_type: CurveType,
        points: Vec<Point2D>,
    },
}

impl CurveRequest {
    pub fn curve_type(&self) -> CurveType {
        match self {
            Self::CenterForm { curve_type, .. } | Self::PointForm { curve_type, .. } => *curve_type,
        }
    }
}

/// Payload of the `draw` destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrawCommand {
    Line(LineSegment),
    Curve(CurveRequest),
}

// ============================================================================
// Полигоны
// ============================================================================

/// Алгоритм заливки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillAlgorithm {
    #[default]
    Scanline,
    Aet,
    FloodFill,
    ScanlineFloodFill,
}


/// Payload of the `fillPolygon` destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonFillRequest {
    pub polygon: Vec<Point2D>,
    pub algorithm: FillAlgorithm,
    pub seed: Point2D,
    pub fill_color: String,
    pub boundary_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInsideRequest {
    pub point: Point2D,
    pub polygon: Vec<Point2D>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentIntersectsRequest {
    pub a: Point2D,
    pub b: Point2D,
    pub polygon: Vec<Point2D>,
}

/// Алгоритм выпуклой оболочки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HullAlgorithm {
    Graham,
    Jarvis,
}

impl HullAlgorithm {
    pub fn endpoint(&self) -> QueryEndpoint {
        match self {
            Self::Graham => QueryEndpoint::ConvexHullGraham,
            Self::Jarvis => QueryEndpoint::ConvexHullJarvis,
        }
    }
}

/// A synchronous polygon query: one request, one typed reply
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonQuery {
    CheckConvex(Vec<Point2D>),
    ConvexHull {
        algorithm: HullAlgorithm,
        points: Vec<Point2D>,
    },
    PointInside(PointInsideRequest),
    SegmentIntersects(SegmentIntersectsRequest),
}

/// Typed reply of a [`PolygonQuery`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryReply {
    Bool(bool),
    Points(Vec<Point2D>),
}

impl PolygonQuery {
    pub fn endpoint(&self) -> QueryEndpoint {
        match self {
            Self::CheckConvex(_) => QueryEndpoint::CheckConvex,
            Self::ConvexHull { algorithm, .. } => algorithm.endpoint(),
            Self::PointInside(_) => QueryEndpoint::PointInsidePolygon,
            Self::SegmentIntersects(_) => QueryEndpoint::SegmentIntersectsPolygon,
        }
    }

    /// JSON request body
    pub fn body(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::CheckConvex(points) | Self::ConvexHull { points, .. } => {
                serde_json::to_value(points)
            }
            Self::PointInside(req) => serde_json::to_value(req),
            Self::SegmentIntersects(req) => serde_json::to_value(req),
        }
    }

    /// Decode the service's reply into the shape this query expects
    pub fn decode_reply(&self, reply: serde_json::Value) -> serde_json::Result<QueryReply> {
        match self {
            Self::ConvexHull { .. } => serde_json::from_value(reply).map(QueryReply::Points),
            Self::CheckConvex(_) | Self::PointInside(_) | Self::SegmentIntersects(_) => {
                serde_json::from_value(reply).map(QueryReply::Bool)
            }
        }
    }
}

// ============================================================================
// Результаты рендеринга
// ============================================================================

/// Цвет пикселя по умолчанию
pub const DEFAULT_PIXEL_COLOR: &str = "black";

/// Один растеризованный пиксель
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelResult {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub color: Option<String>,
}

impl PixelResult {
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_PIXEL_COLOR)
    }
}

/// Ребро каркаса (индексы в `WireframeResult::vertices`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEdge {
    pub start: usize,
    pub end: usize,
}

/// Каркасный результат: вершины + рёбра
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireframeResult {
    pub vertices: Vec<Point2D>,
    pub edges: Vec<WireEdge>,
}

impl WireframeResult {
    /// All edge indices point at existing vertices
    pub fn is_consistent(&self) -> bool {
        let n = self.vertices.len();
        self.edges.iter().all(|e| e.start < n && e.end < n)
    }
}

/// Render payload, discriminated by JSON shape (object with vertices+edges vs. array)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderResult {
    Wireframe(WireframeResult),
    Pixels(Vec<PixelResult>),
}
