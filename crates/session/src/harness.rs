//! Headless test harness for programmatic session driving.
//!
//! Wires a session to an in-memory channel and a recording sink, with
//! shortcuts for the gestures tests repeat.

use serde_json::Value;
use shared::{Destination, Point2D, QueryEndpoint, Topic};

use crate::channel::RecordingChannel;
use crate::render::RecordingSink;
use crate::session::Session;
use crate::state::input::DrawingMode;
use crate::state::settings::SessionSettings;
use crate::validation::ObjectValidator;

/// Headless session: recording channel + recording sink
pub struct TestHarness {
    pub session: Session<RecordingChannel, RecordingSink>,
}

impl TestHarness {
    /// Create a connected harness with default settings (Russian notices).
    pub fn new() -> Self {
        Self::with_settings(SessionSettings::default())
    }

    pub fn with_settings(settings: SessionSettings) -> Self {
        Self {
            session: Session::new(
                RecordingChannel::connected(),
                RecordingSink::default(),
                settings,
            ),
        }
    }

    // ── Gestures ──────────────────────────────────────────────

    /// Click at (x, y) in the active mode, ignoring errors
    pub fn click(&mut self, x: f64, y: f64) {
        if let Err(e) = self.session.click(Point2D::new(x, y)) {
            tracing::debug!("Harness click failed: {e}");
        }
    }

    /// Draw a line with two clicks in Lines mode
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.session.select_mode(DrawingMode::Lines);
        self.click(from.0, from.1);
        self.click(to.0, to.1);
    }

    /// Enter Polygon mode and click every point
    pub fn polygon(&mut self, points: &[(f64, f64)]) {
        self.session.select_mode(DrawingMode::Polygon);
        for &(x, y) in points {
            self.click(x, y);
        }
    }

    /// Enter Voronoi mode and click every site
    pub fn voronoi(&mut self, sites: &[(f64, f64)]) {
        self.session.select_mode(DrawingMode::Voronoi);
        for &(x, y) in sites {
            self.click(x, y);
        }
    }

    // ── Service simulation ────────────────────────────────────

    /// Script the reply to the next query on `endpoint`
    pub fn reply(&mut self, endpoint: QueryEndpoint, value: Value) {
        self.session.channel_mut().reply(endpoint, value);
    }

    /// Deliver a broadcast and pump it
    pub fn broadcast(&mut self, topic: Topic, body: &str) -> usize {
        self.session.channel_mut().push_inbound(topic, body);
        self.session.pump()
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn channel(&self) -> &RecordingChannel {
        self.session.channel()
    }

    pub fn sink(&self) -> &RecordingSink {
        self.session.sink()
    }

    /// Number of commands published so far
    pub fn published_count(&self) -> usize {
        self.channel().published().len()
    }

    /// Payloads published to `/app/draw`
    pub fn draw_commands(&self) -> Vec<&Value> {
        self.channel().published_to(Destination::Draw)
    }

    /// Payloads published to `/app/transform3D`
    pub fn transform_requests(&self) -> Vec<&Value> {
        self.channel().published_to(Destination::Transform3D)
    }

    /// Texts of the notices raised so far
    pub fn notice_texts(&self) -> Vec<&str> {
        self.session.notices().iter().map(|n| n.text.as_str()).collect()
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.session.notices().last().map(|n| n.text.as_str())
    }

    /// Validator for the loaded object
    pub fn validate_object(&self) -> Option<ObjectValidator<'_>> {
        self.session
            .pipeline()
            .object()
            .map(|o| ObjectValidator::new(o.as_ref()))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
