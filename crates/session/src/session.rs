//! The session: one explicit value owning input state, the transform
//! pipeline, the channel and the render sink. Every user action is a method.

use serde::Serialize;
use shared::{
    CurveForm, CurveType, Destination, DrawCommand, FillAlgorithm, HullAlgorithm, Point2D,
    PolygonQuery, QueryReply, RenderResult, Topic, TransformCommand, TransformResult,
};
use uuid::Uuid;

use crate::build::{self, BuildError, CurveParams, UiParams};
use crate::channel::{ChannelError, ConnectionState, InboundMessage, SessionChannel};
use crate::i18n::{t, Lang};
use crate::import::{parse_object, ImportError};
use crate::render::RenderSink;
use crate::state::input::{ClickOutcome, DrawingMode, InputState};
use crate::state::settings::SessionSettings;
use crate::state::transform::{TransformIntent, TransformPipeline};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("malformed reply: {0}")]
    BadReply(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message surfaced to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

pub struct Session<C: SessionChannel, R: RenderSink> {
    id: Uuid,
    channel: C,
    sink: R,
    input: InputState,
    pipeline: TransformPipeline,
    settings: SessionSettings,
    params: UiParams,
    notices: Vec<Notice>,
    /// Inbound payloads dropped as malformed
    ignored_payloads: usize,
    /// Transport failure already surfaced to the user
    transport_reported: bool,
}

impl<C: SessionChannel, R: RenderSink> Session<C, R> {
    pub fn new(channel: C, sink: R, settings: SessionSettings) -> Self {
        let id = Uuid::new_v4();
        tracing::info!("Session {id} started");
        Self {
            id,
            channel,
            sink,
            input: InputState::default(),
            pipeline: TransformPipeline::default(),
            params: UiParams::from_defaults(&settings.drawing),
            settings,
            notices: Vec::new(),
            ignored_payloads: 0,
            transport_reported: false,
        }
    }

    // ── Accessors ─────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lang(&self) -> Lang {
        self.settings.language
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn params(&self) -> &UiParams {
        &self.params
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn ignored_payloads(&self) -> usize {
        self.ignored_payloads
    }

    /// Current instruction text
    pub fn instruction(&self) -> Option<String> {
        self.input.hint().map(|h| h.text(self.lang()))
    }

    // ── UI parameters ─────────────────────────────────────

    pub fn set_line_algorithm(&mut self, algorithm: impl Into<String>) {
        self.params.line_algorithm = algorithm.into();
    }

    pub fn set_curve_params(&mut self, params: CurveParams) {
        self.params.curve = params;
    }

    pub fn set_fill_algorithm(&mut self, algorithm: FillAlgorithm) {
        self.params.fill_algorithm = algorithm;
    }

    // ── Input ─────────────────────────────────────────────

    pub fn select_mode(&mut self, mode: DrawingMode) {
        tracing::debug!("Mode: {}", mode.label());
        self.input.set_mode(mode);
    }

    pub fn select_curve_type(&mut self, curve_type: CurveType) {
        self.input.set_curve_type(curve_type);
    }

    /// Canvas click. A completed line is sent before this returns.
    pub fn click(&mut self, point: Point2D) -> Result<ClickOutcome, SessionError> {
        let outcome = self.input.click(point);
        tracing::debug!(
            "Click ({}, {}) in {}: {outcome:?}",
            point.x,
            point.y,
            self.input.mode().label()
        );
        match &outcome {
            ClickOutcome::LineCompleted { start, end } => {
                let result = self.send_line(*start, *end);
                self.report(result)?;
            }
            ClickOutcome::PointAdded { marker, .. } => self.sink.draw_marker(marker),
            ClickOutcome::LineStarted(_)
            | ClickOutcome::CenterCaptured(_)
            | ClickOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    fn send_line(&mut self, start: Point2D, end: Point2D) -> Result<(), SessionError> {
        let command = build::line(start, end, &self.params.line_algorithm);
        self.publish(Destination::Draw, &command)?;
        if let DrawCommand::Line(segment) = command {
            self.input.record_segment(segment);
        }
        Ok(())
    }

    // ── 2D commands ───────────────────────────────────────

    pub fn draw_curve(&mut self) -> Result<(), SessionError> {
        let result = self.try_draw_curve();
        self.report(result)
    }

    fn try_draw_curve(&mut self) -> Result<(), SessionError> {
        let command = build::curve(
            self.input.curve_type(),
            self.input.center(),
            self.input.curve_points(),
            &self.params.curve,
        )?;
        self.publish(Destination::Draw, &command)?;
        tracing::debug!("Curve sent: {}", self.input.curve_type().label());
        if self.input.curve_type().form() == CurveForm::Points {
            self.input.clear_curve_points();
        }
        Ok(())
    }

    pub fn check_convex(&mut self) -> Result<bool, SessionError> {
        let result = build::check_convex(self.input.polygon())
            .map_err(SessionError::from)
            .and_then(|query| self.run_bool_query(&query));
        let convex = self.report(result)?;
        self.info(if convex { "result.convex" } else { "result.not_convex" });
        Ok(convex)
    }

    /// Replace the polygon with its hull and redraw the hull boundary
    pub fn convex_hull(&mut self, algorithm: HullAlgorithm) -> Result<Vec<Point2D>, SessionError> {
        let result = self.try_convex_hull(algorithm);
        self.report(result)
    }

    fn try_convex_hull(&mut self, algorithm: HullAlgorithm) -> Result<Vec<Point2D>, SessionError> {
        let query = build::convex_hull(algorithm, self.input.polygon())?;
        let hull = match self.run_query(&query)? {
            QueryReply::Points(points) => points,
            QueryReply::Bool(_) => {
                return Err(SessionError::BadReply("expected a point list".into()))
            }
        };
        self.input.replace_polygon(hull.clone());
        self.sink.clear();
        // Closing edge first: last -> first, then consecutive pairs
        if let Some(&last) = hull.last() {
            let mut prev = last;
            for &point in &hull {
                let command = build::line(prev, point, &self.params.line_algorithm);
                self.publish(Destination::Draw, &command)?;
                prev = point;
            }
        }
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            text: format!("{}: {}", t(self.lang(), "result.hull"), hull.len()),
        });
        Ok(hull)
    }

    /// Pops the last polygon point and asks whether it lies inside the rest
    pub fn check_point_inside(&mut self) -> Result<bool, SessionError> {
        let candidate = self.input.take_candidate();
        let result = build::point_inside(candidate, self.input.polygon())
            .map_err(SessionError::from)
            .and_then(|query| self.run_bool_query(&query));
        let inside = self.report(result)?;
        self.info(if inside { "result.point_inside" } else { "result.point_outside" });
        Ok(inside)
    }

    /// Tests the last completed segment against the polygon
    pub fn check_segment_intersects(&mut self) -> Result<bool, SessionError> {
        let result = build::segment_intersects(self.input.polygon(), self.input.last_segment())
            .map_err(SessionError::from)
            .and_then(|query| self.run_bool_query(&query));
        let hit = self.report(result)?;
        self.info(if hit { "result.intersects" } else { "result.no_intersection" });
        Ok(hit)
    }

    pub fn fill_polygon(&mut self) -> Result<(), SessionError> {
        let result = build::fill_polygon(self.input.polygon(), &self.params)
            .map_err(SessionError::from)
            .and_then(|request| self.publish(Destination::FillPolygon, &request));
        self.report(result)
    }

    pub fn generate_voronoi(&mut self) -> Result<(), SessionError> {
        let result = build::voronoi_sites(self.input.voronoi_sites())
            .map_err(SessionError::from)
            .and_then(|sites| self.publish(Destination::VoronoiDiagram, &sites));
        self.report(result)
    }

    // ── 3D ────────────────────────────────────────────────

    /// Parse and load a mesh, then ask the service to render it untransformed.
    /// On a parse error the previous object stays loaded. Once parsed the
    /// import succeeds even if that first render request cannot be sent; the
    /// send failure is reported as a notice and the object stays loaded.
    pub fn import_object(&mut self, text: &str) -> Result<usize, SessionError> {
        let object = match parse_object(text) {
            Ok(object) => object,
            Err(e) => return self.report(Err(e.into())),
        };
        let vertices = object.vertex_count();
        tracing::info!("Imported object: {vertices} vertices, {} edges", object.edge_count());
        self.pipeline.load(object);
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            text: format!("{}: {vertices}", t(self.lang(), "result.object_loaded")),
        });
        if let Err(e) = self.transform(TransformCommand::None) {
            tracing::warn!("Object loaded but not sent: {e}");
        }
        Ok(vertices)
    }

    pub fn transform(&mut self, command: TransformCommand) -> Result<(), SessionError> {
        let result = self.try_transform(command);
        self.report(result)
    }

    fn try_transform(&mut self, command: TransformCommand) -> Result<(), SessionError> {
        let payload = {
            let request = self.pipeline.request(command)?;
            serde_json::to_value(&request).map_err(ChannelError::from)?
        };
        self.channel.publish(Destination::Transform3D, payload)?;
        self.pipeline.mark_sent();
        tracing::debug!(
            "Sent {} ({} awaiting)",
            command.label(),
            self.pipeline.matrix().awaiting()
        );
        Ok(())
    }

    /// Keyboard transform. `Ok(false)` when the key is not bound.
    pub fn transform_key(&mut self, key: &str) -> Result<bool, SessionError> {
        let Some(intent) = TransformIntent::from_key(key) else {
            return Ok(false);
        };
        self.transform(intent.command(&self.settings.transform))?;
        Ok(true)
    }

    // ── Canvas ────────────────────────────────────────────

    /// Empty every accumulated sequence and the canvas
    pub fn clear(&mut self) {
        self.input.clear_all();
        self.sink.clear();
    }

    pub fn clear_canvas(&mut self) {
        self.sink.clear();
    }

    // ── Inbound ───────────────────────────────────────────

    /// Drain and render broadcasts received so far. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let messages = self.channel.poll_inbound();
        let applied = self.apply_inbound(messages);
        self.check_connection();
        applied
    }

    /// Render a batch of broadcasts. Returns how many were applied.
    pub fn apply_inbound(&mut self, messages: Vec<InboundMessage>) -> usize {
        messages
            .into_iter()
            .filter(|message| self.handle_inbound(message))
            .count()
    }

    /// Apply one broadcast. Malformed payloads are counted and ignored.
    pub fn handle_inbound(&mut self, message: &InboundMessage) -> bool {
        match message.topic {
            Topic::Drawings => match serde_json::from_str::<RenderResult>(&message.body) {
                Ok(result) if renderable(&result) => {
                    self.sink.render(&result);
                    true
                }
                Ok(_) => self.ignore(message, "wireframe edge out of range"),
                Err(e) => self.ignore(message, &e.to_string()),
            },
            Topic::Drawings3D => match serde_json::from_str::<TransformResult>(&message.body) {
                Ok(result) if renderable(&result.pixels) => {
                    self.sink.clear();
                    self.sink.render(&result.pixels);
                    self.pipeline.apply_result(result.matrix);
                    true
                }
                Ok(_) => self.ignore(message, "wireframe edge out of range"),
                Err(e) => self.ignore(message, &e.to_string()),
            },
        }
    }

    fn ignore(&mut self, message: &InboundMessage, reason: &str) -> bool {
        self.ignored_payloads += 1;
        tracing::warn!("Ignoring payload on {}: {reason}", message.topic.path());
        false
    }

    fn check_connection(&mut self) {
        if let ConnectionState::Failed(reason) = self.channel.state() {
            self.report_transport(&reason);
        }
    }

    // ── Helpers ───────────────────────────────────────────

    fn publish<T: Serialize>(
        &mut self,
        destination: Destination,
        payload: &T,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_value(payload).map_err(ChannelError::from)?;
        self.channel.publish(destination, value)?;
        tracing::debug!("Sent to {}", destination.path());
        Ok(())
    }

    fn run_query(&mut self, query: &PolygonQuery) -> Result<QueryReply, SessionError> {
        let body = query.body().map_err(ChannelError::from)?;
        let reply = self.channel.query(query.endpoint(), body)?;
        query
            .decode_reply(reply)
            .map_err(|e| SessionError::BadReply(e.to_string()))
    }

    fn run_bool_query(&mut self, query: &PolygonQuery) -> Result<bool, SessionError> {
        match self.run_query(query)? {
            QueryReply::Bool(value) => Ok(value),
            QueryReply::Points(_) => Err(SessionError::BadReply("expected a boolean".into())),
        }
    }

    fn info(&mut self, key: &str) {
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            text: t(self.lang(), key).to_string(),
        });
    }

    fn report<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(e) = &result {
            self.notify_error(e);
        }
        result
    }

    fn notify_error(&mut self, err: &SessionError) {
        let lang = self.lang();
        match err {
            SessionError::Build(e) => {
                tracing::warn!("Validation failed: {e}");
                self.notices.push(Notice {
                    level: NoticeLevel::Warning,
                    text: e.user_message(lang),
                });
            }
            SessionError::Import(e) => {
                tracing::warn!("Import failed: {e}");
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    text: format!("{}: {e}", t(lang, "err.import")),
                });
            }
            SessionError::BadReply(reason) => {
                tracing::warn!("Malformed reply: {reason}");
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    text: t(lang, "err.bad_reply").to_string(),
                });
            }
            SessionError::Channel(ChannelError::NotConnected) => {
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    text: t(lang, "err.not_connected").to_string(),
                });
            }
            SessionError::Channel(e) if !e.is_transport() => {
                tracing::warn!("Malformed reply: {e}");
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    text: t(lang, "err.bad_reply").to_string(),
                });
            }
            SessionError::Channel(e) => self.report_transport(&e.to_string()),
        }
    }

    /// Surface a transport failure once; later failures stay in the log
    fn report_transport(&mut self, reason: &str) {
        if self.transport_reported {
            tracing::debug!("Transport still down: {reason}");
            return;
        }
        self.transport_reported = true;
        tracing::error!("Transport failure: {reason}");
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            text: t(self.lang(), "err.connection").to_string(),
        });
    }
}

/// Wireframe edges must reference existing vertices
fn renderable(result: &RenderResult) -> bool {
    match result {
        RenderResult::Wireframe(w) => w.is_consistent(),
        RenderResult::Pixels(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::RecordingChannel;
    use crate::render::{RecordingSink, RenderEvent};
    use serde_json::json;
    use shared::QueryEndpoint;

    fn session() -> Session<RecordingChannel, RecordingSink> {
        let settings = SessionSettings {
            language: Lang::En,
            ..SessionSettings::default()
        };
        Session::new(RecordingChannel::connected(), RecordingSink::default(), settings)
    }

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    // --- Lines ---

    #[test]
    fn test_line_sent_on_second_click() {
        let mut s = session();
        s.click(p(10.0, 10.0)).unwrap();
        assert!(s.channel().published().is_empty());
        s.click(p(50.0, 50.0)).unwrap();
        let sent = s.channel().published_to(Destination::Draw);
        assert_eq!(
            sent,
            vec![&json!({"x1": 10.0, "y1": 10.0, "x2": 50.0, "y2": 50.0, "algorithm": "bresenham"})]
        );
        assert_eq!(s.input().segments().len(), 1);
    }

    #[test]
    fn test_line_not_recorded_when_send_fails() {
        let mut s = session();
        s.channel_mut().set_state(ConnectionState::Connecting);
        s.click(p(0.0, 0.0)).unwrap();
        assert!(s.click(p(1.0, 1.0)).is_err());
        assert!(s.input().segments().is_empty());
        assert_eq!(s.notices()[0].text, "Not connected to the server");
    }

    // --- Validation ---

    #[test]
    fn test_validation_failure_sends_nothing() {
        let mut s = session();
        s.select_mode(DrawingMode::Polygon);
        s.click(p(0.0, 0.0)).unwrap();
        let err = s.check_convex().unwrap_err();
        assert!(matches!(err, SessionError::Build(BuildError::InsufficientPoints { .. })));
        assert!(s.channel().queries().is_empty());
        assert_eq!(s.notices().last().unwrap().level, NoticeLevel::Warning);
    }

    // --- Queries ---

    #[test]
    fn test_bad_reply_reported() {
        let mut s = session();
        s.select_mode(DrawingMode::Polygon);
        for pt in [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)] {
            s.click(pt).unwrap();
        }
        s.channel_mut().reply(QueryEndpoint::CheckConvex, json!("yes"));
        assert!(matches!(s.check_convex(), Err(SessionError::BadReply(_))));
        assert_eq!(s.notices().last().unwrap().text, "Malformed server reply");
    }

    #[test]
    fn test_transport_failure_reported_once() {
        let mut s = session();
        s.select_mode(DrawingMode::Polygon);
        for pt in [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)] {
            s.click(pt).unwrap();
        }
        s.channel_mut().reply_failure(QueryEndpoint::CheckConvex, "reset");
        assert!(s.check_convex().is_err());
        assert!(s.fill_polygon().is_err());
        s.pump();
        let errors = s
            .notices()
            .iter()
            .filter(|n| n.text == "Connection to the server lost")
            .count();
        assert_eq!(errors, 1);
    }

    // --- Inbound ---

    #[test]
    fn test_pump_renders_pixels() {
        let mut s = session();
        s.channel_mut()
            .push_inbound(Topic::Drawings, r#"[{"x": 1, "y": 2, "color": null}]"#);
        assert_eq!(s.pump(), 1);
        assert_eq!(s.sink().pixel_count(), 1);
    }

    #[test]
    fn test_inconsistent_wireframe_ignored() {
        let mut s = session();
        s.channel_mut().push_inbound(
            Topic::Drawings,
            r#"{"vertices": [{"x": 0, "y": 0}], "edges": [{"start": 0, "end": 4}]}"#,
        );
        assert_eq!(s.pump(), 0);
        assert_eq!(s.ignored_payloads(), 1);
        assert!(s.sink().events().is_empty());
    }

    #[test]
    fn test_3d_result_clears_then_draws() {
        let mut s = session();
        s.channel_mut().push_inbound(
            Topic::Drawings3D,
            r#"{"pixels": [{"x": 5, "y": 5}], "matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]]}"#,
        );
        s.pump();
        assert_eq!(s.sink().events()[0], RenderEvent::Clear);
        assert!(matches!(s.sink().events()[1], RenderEvent::Pixels(_)));
        assert!(s.pipeline().matrix().current().is_some());
    }

    // --- Clear ---

    #[test]
    fn test_clear_canvas_keeps_points() {
        let mut s = session();
        s.select_mode(DrawingMode::Voronoi);
        s.click(p(1.0, 1.0)).unwrap();
        s.clear_canvas();
        assert_eq!(s.input().voronoi_sites().len(), 1);
        s.clear();
        assert!(s.input().voronoi_sites().is_empty());
        assert_eq!(s.sink().clear_count(), 2);
    }
}
