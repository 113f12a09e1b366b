//! In-memory channel: records what the session sends and replays scripted
//! replies and broadcasts. Used by the test harness.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use shared::{Destination, QueryEndpoint, Topic};

use super::{ChannelError, ConnectionState, InboundMessage, SessionChannel};

/// One recorded publish
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub destination: Destination,
    pub payload: Value,
}

#[derive(Debug)]
pub struct RecordingChannel {
    state: ConnectionState,
    published: Vec<PublishedMessage>,
    queries: Vec<(QueryEndpoint, Value)>,
    replies: HashMap<QueryEndpoint, VecDeque<Result<Value, String>>>,
    inbound: VecDeque<InboundMessage>,
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self::connected()
    }
}

impl RecordingChannel {
    pub fn connected() -> Self {
        Self::with_state(ConnectionState::Connected)
    }

    pub fn with_state(state: ConnectionState) -> Self {
        Self {
            state,
            published: Vec::new(),
            queries: Vec::new(),
            replies: HashMap::new(),
            inbound: VecDeque::new(),
        }
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Queue the reply to the next query on `endpoint`
    pub fn reply(&mut self, endpoint: QueryEndpoint, value: Value) {
        self.replies.entry(endpoint).or_default().push_back(Ok(value));
    }

    /// Queue a transport failure for the next query on `endpoint`
    pub fn reply_failure(&mut self, endpoint: QueryEndpoint, reason: impl Into<String>) {
        self.replies
            .entry(endpoint)
            .or_default()
            .push_back(Err(reason.into()));
    }

    /// Queue a broadcast as if the service had sent it
    pub fn push_inbound(&mut self, topic: Topic, body: impl Into<String>) {
        self.inbound.push_back(InboundMessage {
            topic,
            body: body.into(),
        });
    }

    pub fn published(&self) -> &[PublishedMessage] {
        &self.published
    }

    pub fn published_to(&self, destination: Destination) -> Vec<&Value> {
        self.published
            .iter()
            .filter(|m| m.destination == destination)
            .map(|m| &m.payload)
            .collect()
    }

    pub fn last_published(&self) -> Option<&PublishedMessage> {
        self.published.last()
    }

    pub fn queries(&self) -> &[(QueryEndpoint, Value)] {
        &self.queries
    }

    fn check_state(&self) -> Result<(), ChannelError> {
        match &self.state {
            ConnectionState::Connected => Ok(()),
            ConnectionState::Connecting => Err(ChannelError::NotConnected),
            ConnectionState::Failed(reason) => Err(ChannelError::Failed(reason.clone())),
        }
    }
}

impl SessionChannel for RecordingChannel {
    fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn publish(&mut self, destination: Destination, payload: Value) -> Result<(), ChannelError> {
        self.check_state()?;
        self.published.push(PublishedMessage {
            destination,
            payload,
        });
        Ok(())
    }

    fn query(&mut self, endpoint: QueryEndpoint, body: Value) -> Result<Value, ChannelError> {
        self.check_state()?;
        self.queries.push((endpoint, body));
        match self.replies.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(Ok(value)) => Ok(value),
            Some(Err(reason)) => {
                self.state = ConnectionState::Failed(reason.clone());
                Err(ChannelError::Failed(reason))
            }
            None => Err(ChannelError::Timeout),
        }
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.inbound.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_publishes() {
        let mut ch = RecordingChannel::connected();
        ch.publish(Destination::Draw, json!({"x1": 1})).unwrap();
        ch.publish(Destination::VoronoiDiagram, json!([])).unwrap();
        assert_eq!(ch.published().len(), 2);
        assert_eq!(ch.published_to(Destination::Draw), vec![&json!({"x1": 1})]);
        assert_eq!(
            ch.last_published().unwrap().destination,
            Destination::VoronoiDiagram
        );
    }

    #[test]
    fn test_rejects_before_handshake() {
        let mut ch = RecordingChannel::with_state(ConnectionState::Connecting);
        let err = ch.publish(Destination::Draw, json!({})).unwrap_err();
        assert!(matches!(err, ChannelError::NotConnected));
        assert!(ch.published().is_empty());
    }

    #[test]
    fn test_scripted_replies_in_order() {
        let mut ch = RecordingChannel::connected();
        ch.reply(QueryEndpoint::CheckConvex, json!(true));
        ch.reply(QueryEndpoint::CheckConvex, json!(false));
        assert_eq!(ch.query(QueryEndpoint::CheckConvex, json!([])).unwrap(), json!(true));
        assert_eq!(ch.query(QueryEndpoint::CheckConvex, json!([])).unwrap(), json!(false));
        assert!(matches!(
            ch.query(QueryEndpoint::CheckConvex, json!([])),
            Err(ChannelError::Timeout)
        ));
        assert_eq!(ch.queries().len(), 3);
    }

    #[test]
    fn test_reply_failure_is_terminal() {
        let mut ch = RecordingChannel::connected();
        ch.reply_failure(QueryEndpoint::PointInsidePolygon, "reset by peer");
        assert!(ch.query(QueryEndpoint::PointInsidePolygon, json!({})).is_err());
        assert_eq!(ch.state(), ConnectionState::Failed("reset by peer".to_string()));
        assert!(ch.publish(Destination::Draw, json!({})).is_err());
    }

    #[test]
    fn test_poll_drains_inbound() {
        let mut ch = RecordingChannel::connected();
        ch.push_inbound(Topic::Drawings, "[]");
        ch.push_inbound(Topic::Drawings3D, "{}");
        let msgs = ch.poll_inbound();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].topic, Topic::Drawings);
        assert!(ch.poll_inbound().is_empty());
    }
}
