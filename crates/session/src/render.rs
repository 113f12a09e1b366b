//! Boundary to the renderer that actually puts pixels on a canvas.

use shared::{PixelResult, RenderResult, WireframeResult};

use crate::state::input::Marker;

/// Drawing surface
pub trait RenderSink {
    fn clear(&mut self);
    fn draw_pixels(&mut self, pixels: &[PixelResult]);
    /// Straight lines between wireframe vertices
    fn draw_wireframe(&mut self, wireframe: &WireframeResult);
    fn draw_marker(&mut self, marker: &Marker);

    fn render(&mut self, result: &RenderResult) {
        match result {
            RenderResult::Pixels(pixels) => self.draw_pixels(pixels),
            RenderResult::Wireframe(wireframe) => self.draw_wireframe(wireframe),
        }
    }
}

// ============================================================================
// Recording sink
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Clear,
    Pixels(Vec<PixelResult>),
    Wireframe(WireframeResult),
    Marker(Marker),
}

/// Remembers every draw call, for tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<RenderEvent>,
}

impl RecordingSink {
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn pixel_count(&self) -> usize {
        self.events
            .iter()
            .map(|e| match e {
                RenderEvent::Pixels(px) => px.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn markers(&self) -> Vec<&Marker> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Marker(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RenderEvent::Clear))
            .count()
    }
}

impl RenderSink for RecordingSink {
    fn clear(&mut self) {
        self.events.push(RenderEvent::Clear);
    }

    fn draw_pixels(&mut self, pixels: &[PixelResult]) {
        self.events.push(RenderEvent::Pixels(pixels.to_vec()));
    }

    fn draw_wireframe(&mut self, wireframe: &WireframeResult) {
        self.events.push(RenderEvent::Wireframe(wireframe.clone()));
    }

    fn draw_marker(&mut self, marker: &Marker) {
        self.events.push(RenderEvent::Marker(marker.clone()));
    }
}

// ============================================================================
// Log sink (headless binary)
// ============================================================================

/// Logs a summary of each draw call
#[derive(Debug, Default)]
pub struct LogSink {
    pub pixels_drawn: usize,
    pub edges_drawn: usize,
}

impl RenderSink for LogSink {
    fn clear(&mut self) {
        tracing::info!("Canvas cleared");
    }

    fn draw_pixels(&mut self, pixels: &[PixelResult]) {
        self.pixels_drawn += pixels.len();
        match pixels.first() {
            Some(first) => tracing::info!(
                "Drew {} pixels (first at {},{} {})",
                pixels.len(),
                first.x,
                first.y,
                first.color_or_default()
            ),
            None => tracing::info!("Drew 0 pixels"),
        }
    }

    fn draw_wireframe(&mut self, wireframe: &WireframeResult) {
        self.edges_drawn += wireframe.edges.len();
        tracing::info!(
            "Drew wireframe: {} vertices, {} edges",
            wireframe.vertices.len(),
            wireframe.edges.len()
        );
    }

    fn draw_marker(&mut self, marker: &Marker) {
        tracing::debug!(
            "Marker at ({}, {}) {}",
            marker.point.x,
            marker.point.y,
            marker.color
        );
    }
}
