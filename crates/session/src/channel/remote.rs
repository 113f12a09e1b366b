//! Network channel: STOMP over WebSocket for commands and broadcasts, HTTP
//! for synchronous queries. Both run on a single-threaded runtime owned by
//! the channel, so callers stay synchronous.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::Value;
use shared::{Destination, QueryEndpoint, Topic};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::stomp::Frame;
use super::{ChannelError, ConnectionState, InboundMessage, SessionChannel};
use crate::state::settings::ServiceSettings;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Read slice used by non-blocking polls; gives the IO driver one turn
const POLL_SLICE: Duration = Duration::from_millis(5);

pub struct RemoteChannel {
    runtime: Runtime,
    socket: Option<WsStream>,
    http: reqwest::Client,
    base_url: String,
    state: ConnectionState,
    /// Subscription id -> topic
    subscriptions: HashMap<String, Topic>,
}

impl RemoteChannel {
    /// Open the WebSocket, complete the STOMP handshake and subscribe to
    /// every result topic. A failed handshake is terminal.
    pub fn connect(settings: &ServiceSettings) -> Result<Self, ChannelError> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let base = Url::parse(&settings.base_url)
            .map_err(|_| ChannelError::InvalidUrl(settings.base_url.clone()))?;
        let ws_url = websocket_url(&base, &settings.websocket_path)?;
        let host = base.host_str().unwrap_or("localhost").to_string();
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        tracing::info!("Connecting to {ws_url}");
        let (socket, subscriptions) =
            runtime.block_on(handshake(ws_url.as_str(), &host, timeout))?;
        tracing::info!("Connected, {} topics subscribed", subscriptions.len());

        Ok(Self {
            runtime,
            socket: Some(socket),
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            state: ConnectionState::Connected,
            subscriptions,
        })
    }

    /// Collect broadcasts arriving within `timeout`
    pub fn wait_inbound(&mut self, timeout: Duration) -> Vec<InboundMessage> {
        let Some(socket) = self.socket.as_mut() else {
            return Vec::new();
        };
        let mut frames = Vec::new();
        let outcome = self.runtime.block_on(async {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                match tokio::time::timeout_at(deadline, socket.next()).await {
                    Err(_) => return Ok(()),
                    Ok(None) => return Err(ChannelError::Closed),
                    Ok(Some(Err(e))) => return Err(ChannelError::from(e)),
                    Ok(Some(Ok(Message::Text(text)))) => match Frame::parse(text.as_str()) {
                        Ok(Some(frame)) => frames.push(frame),
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Ignoring malformed frame: {e}"),
                    },
                    Ok(Some(Ok(Message::Close(_)))) => return Err(ChannelError::Closed),
                    Ok(Some(Ok(_))) => {}
                }
            }
        });

        let mut inbound = Vec::new();
        for frame in frames {
            match frame.command.as_str() {
                "MESSAGE" => {
                    let topic = frame
                        .get("subscription")
                        .and_then(|id| self.subscriptions.get(id).copied())
                        .or_else(|| frame.get("destination").and_then(Topic::from_path));
                    match topic {
                        Some(topic) => inbound.push(InboundMessage {
                            topic,
                            body: frame.body,
                        }),
                        None => tracing::warn!("Message for unknown subscription dropped"),
                    }
                }
                "ERROR" => {
                    let reason = frame.get("message").unwrap_or(frame.body.as_str()).to_string();
                    self.fail(reason);
                }
                "RECEIPT" => {}
                other => tracing::debug!("Ignoring {other} frame"),
            }
        }
        if let Err(e) = outcome {
            self.fail(e.to_string());
        }
        inbound
    }

    /// Send DISCONNECT and close the socket
    pub fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            let disconnect = Message::text(Frame::disconnect().encode());
            let result: Result<(), ChannelError> = self.runtime.block_on(async {
                socket.send(disconnect).await?;
                socket.close(None).await?;
                Ok(())
            });
            if let Err(e) = result {
                tracing::debug!("Close failed: {e}");
            }
        }
        if self.state.is_connected() {
            self.state = ConnectionState::Failed("closed".to_string());
        }
    }

    fn fail(&mut self, reason: String) {
        if !matches!(self.state, ConnectionState::Failed(_)) {
            tracing::error!("Connection lost: {reason}");
            self.state = ConnectionState::Failed(reason);
        }
        self.socket = None;
    }

    fn ensure_usable(&self) -> Result<(), ChannelError> {
        match &self.state {
            ConnectionState::Connected => Ok(()),
            ConnectionState::Connecting => Err(ChannelError::NotConnected),
            ConnectionState::Failed(reason) => Err(ChannelError::Failed(reason.clone())),
        }
    }
}

impl SessionChannel for RemoteChannel {
    fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn publish(&mut self, destination: Destination, payload: Value) -> Result<(), ChannelError> {
        self.ensure_usable()?;
        let json = serde_json::to_string(&payload)?;
        let frame = Frame::send(destination.path(), json).encode();
        let Some(socket) = self.socket.as_mut() else {
            return Err(ChannelError::NotConnected);
        };
        if let Err(e) = self.runtime.block_on(socket.send(Message::text(frame))) {
            let err = ChannelError::from(e);
            self.fail(err.to_string());
            return Err(err);
        }
        tracing::debug!("Published to {}", destination.path());
        Ok(())
    }

    fn query(&mut self, endpoint: QueryEndpoint, body: Value) -> Result<Value, ChannelError> {
        self.ensure_usable()?;
        let url = format!("{}{}", self.base_url, endpoint.path());
        let client = &self.http;
        let result: Result<Value, ChannelError> = self.runtime.block_on(async {
            let response = client.post(&url).json(&body).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ChannelError::Status {
                    status: status.as_u16(),
                    path: endpoint.path(),
                });
            }
            Ok(response.json::<Value>().await?)
        });
        match result {
            Err(e) if e.is_transport() => {
                self.fail(e.to_string());
                Err(e)
            }
            other => other,
        }
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.wait_inbound(POLL_SLICE)
    }
}

impl Drop for RemoteChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// `http://host:port` + `/ws/websocket` -> `ws://host:port/ws/websocket`
fn websocket_url(base: &Url, path: &str) -> Result<Url, ChannelError> {
    let mut url = base.clone();
    let scheme = match base.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| ChannelError::InvalidUrl(base.to_string()))?;
    url.set_path(path);
    Ok(url)
}

async fn handshake(
    url: &str,
    host: &str,
    timeout: Duration,
) -> Result<(WsStream, HashMap<String, Topic>), ChannelError> {
    let (mut socket, _response) =
        tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
            .await
            .map_err(|_| ChannelError::Timeout)??;

    socket
        .send(Message::text(Frame::connect(host).encode()))
        .await?;

    loop {
        let message = tokio::time::timeout(timeout, socket.next())
            .await
            .map_err(|_| ChannelError::Timeout)?
            .ok_or(ChannelError::Closed)??;
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => return Err(ChannelError::Closed),
            _ => continue,
        };
        let Some(frame) = Frame::parse(text.as_str())? else {
            continue;
        };
        match frame.command.as_str() {
            "CONNECTED" => break,
            "ERROR" => {
                let reason = frame.get("message").unwrap_or(frame.body.as_str()).to_string();
                return Err(ChannelError::Failed(reason));
            }
            other => tracing::debug!("Unexpected {other} frame during handshake"),
        }
    }

    let mut subscriptions = HashMap::new();
    for topic in Topic::all() {
        let id = format!("sub-{}", uuid::Uuid::new_v4());
        socket
            .send(Message::text(Frame::subscribe(&id, topic.path()).encode()))
            .await?;
        tracing::debug!("Subscribed {id} to {}", topic.path());
        subscriptions.insert(id, *topic);
    }

    Ok((socket, subscriptions))
}
