//! Channel to the geometry service.
//!
//! Two delivery modes: fire-and-forget publishes to named destinations with
//! results broadcast on shared topics, and synchronous JSON queries for
//! polygon predicates and hulls.

mod recording;
mod remote;
pub mod stomp;

pub use recording::{PublishedMessage, RecordingChannel};
pub use remote::RemoteChannel;

use serde_json::Value;
use shared::{Destination, QueryEndpoint, Topic};

/// Connection lifecycle. `Failed` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Failed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Message received on a result topic. The body is left undecoded.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: Topic,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("not connected")]
    NotConnected,
    #[error("connection failed: {0}")]
    Failed(String),
    #[error("connection closed")]
    Closed,
    #[error("invalid service URL '{0}'")]
    InvalidUrl(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {status} for {path}")]
    Status { status: u16, path: &'static str },
    #[error("frame error: {0}")]
    Frame(#[from] stomp::FrameError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timed out")]
    Timeout,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChannelError {
    /// Transport-level failure that leaves the channel unusable
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Json(_) | Self::Status { .. } => false,
            Self::Http(e) => !e.is_decode(),
            _ => true,
        }
    }
}

/// Bidirectional channel to the geometry service
pub trait SessionChannel {
    fn state(&self) -> ConnectionState;

    /// Send a command. Rejected with `NotConnected` until the handshake completes.
    fn publish(&mut self, destination: Destination, payload: Value) -> Result<(), ChannelError>;

    /// Synchronous call/response
    fn query(&mut self, endpoint: QueryEndpoint, body: Value) -> Result<Value, ChannelError>;

    /// Drain broadcasts received so far without blocking
    fn poll_inbound(&mut self) -> Vec<InboundMessage>;
}
