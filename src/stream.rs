//! Inbound stream listener.
//!
//! A reader task owns the WebSocket and turns it into [`StreamEvent`]s on an
//! mpsc channel; a single consumer drives a [`StreamState`] machine and
//! decides what reaches the terminal. Nothing here reconnects: once the
//! stream has failed or closed it stays that way for the rest of the session.

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

use crate::activity::{Activity, StreamFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl StreamState {
    /// Next state after `event`. `Disconnected` and `Failed` are terminal.
    pub fn on_event(self, event: &StreamEvent) -> Self {
        match (self, event) {
            (Self::Connecting, StreamEvent::Connected) => Self::Connected,
            (Self::Connecting, StreamEvent::ConnectFailed(_)) => Self::Failed,
            (Self::Connected, StreamEvent::Disconnected(_)) => Self::Disconnected,
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Connected,
    Frame(StreamFrame),
    Disconnected(String),
    ConnectFailed(String),
}

/// Decode one WebSocket message into a frame.
///
/// Only non-empty text messages carry frames; empty text (the service's
/// keep-alive), binary and control messages yield `None`, as does text that
/// is not a valid frame.
pub fn parse_message(message: &Message) -> Option<StreamFrame> {
    let Message::Text(text) = message else {
        return None;
    };
    let text = text.as_str();
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamFrame>(text) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed stream frame");
            None
        }
    }
}

/// Drop the activities `user_id` sent itself, preserving order.
pub fn without_echoes(frame: StreamFrame, user_id: &str) -> Vec<Activity> {
    frame
        .activities
        .into_iter()
        .filter(|activity| !activity.is_from(user_id))
        .collect()
}

/// Forward frames from an open connection until it closes or errors.
pub async fn read_frames<S>(mut stream: S, tx: mpsc::UnboundedSender<StreamEvent>)
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(close)) => {
                let reason = close
                    .map(|c| format!("{} {}", u16::from(c.code), c.reason.as_str()))
                    .unwrap_or_else(|| "server sent close frame".to_string());
                let _ = tx.send(StreamEvent::Disconnected(reason));
                return;
            }
            Ok(message) => {
                if let Some(frame) = parse_message(&message) {
                    if tx.send(StreamEvent::Frame(frame)).is_err() {
                        debug!("Stream consumer gone; stopping reader");
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(StreamEvent::Disconnected(e.to_string()));
                return;
            }
        }
    }
    let _ = tx.send(StreamEvent::Disconnected("stream ended".to_string()));
}

/// Connects to the streaming endpoint and feeds events to one consumer.
#[derive(Debug, Clone)]
pub struct StreamListener {
    url: String,
}

impl StreamListener {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Spawn the reader task and return the event channel.
    pub fn spawn(self) -> mpsc::UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move { self.run(tx).await });
        rx
    }

    async fn run(self, tx: mpsc::UnboundedSender<StreamEvent>) {
        match tokio_tungstenite::connect_async(self.url.as_str()).await {
            Ok((ws_stream, _)) => {
                let _ = tx.send(StreamEvent::Connected);
                let (_sink, stream) = ws_stream.split();
                read_frames(stream, tx).await;
            }
            Err(e) => {
                let _ = tx.send(StreamEvent::ConnectFailed(e.to_string()));
            }
        }
    }
}

/// Consumer side: tracks the connection state and filters frames.
#[derive(Debug)]
pub struct InboundStream {
    user_id: String,
    state: StreamState,
}

impl InboundStream {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: StreamState::Connecting,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Apply `event`, returning the activities that should be rendered.
    pub fn handle(&mut self, event: StreamEvent) -> Vec<Activity> {
        let previous = self.state;
        self.state = previous.on_event(&event);

        match event {
            StreamEvent::Connected => {
                info!("WebSocket client connected");
                Vec::new()
            }
            StreamEvent::ConnectFailed(reason) => {
                error!(%reason, "WebSocket connect error");
                Vec::new()
            }
            StreamEvent::Disconnected(reason) => {
                warn!(%reason, "WebSocket client disconnected");
                Vec::new()
            }
            StreamEvent::Frame(frame) if previous == StreamState::Connected => {
                without_echoes(frame, &self.user_id)
            }
            StreamEvent::Frame(_) => {
                debug!(state = ?previous, "Dropping frame received outside Connected");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ChannelAccount;
    use futures_util::stream;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    const SELF_ID: &str = "DirectLineClient";

    fn activity(from: &str, text: &str) -> Activity {
        Activity {
            text: Some(text.into()),
            from: Some(ChannelAccount {
                id: from.into(),
                name: None,
            }),
            ..Default::default()
        }
    }

    fn frame(activities: Vec<Activity>) -> StreamFrame {
        StreamFrame {
            activities,
            watermark: None,
        }
    }

    #[test]
    fn test_state_transitions() {
        use StreamState::*;
        let frame_event = StreamEvent::Frame(StreamFrame::default());

        assert_eq!(Connecting.on_event(&StreamEvent::Connected), Connected);
        assert_eq!(Connecting.on_event(&StreamEvent::ConnectFailed("x".into())), Failed);
        assert_eq!(Connected.on_event(&frame_event), Connected);
        assert_eq!(Connected.on_event(&StreamEvent::Disconnected("x".into())), Disconnected);
        assert_eq!(Disconnected.on_event(&StreamEvent::Connected), Disconnected);
        assert_eq!(Failed.on_event(&StreamEvent::Connected), Failed);
        assert!(Failed.is_terminal());
        assert!(!Connected.is_terminal());
    }

    #[test]
    fn test_parse_message_filters_frame_kinds() {
        assert!(parse_message(&Message::text("")).is_none());
        assert!(parse_message(&Message::text("   ")).is_none());
        assert!(parse_message(&Message::binary(b"{\"activities\":[]}".to_vec())).is_none());
        assert!(parse_message(&Message::text("not json")).is_none());

        let parsed = parse_message(&Message::text(
            r#"{"activities":[{"type":"message","from":{"id":"bot"},"text":"hi"}],"watermark":"1"}"#,
        ))
        .unwrap();
        assert_eq!(parsed.activities.len(), 1);
        assert_eq!(parsed.watermark.as_deref(), Some("1"));
    }

    #[test]
    fn test_echo_suppression_keeps_order() {
        let kept = without_echoes(
            frame(vec![
                activity(SELF_ID, "echo 1"),
                activity("bot", "first"),
                activity(SELF_ID, "echo 2"),
                activity("bot", "second"),
            ]),
            SELF_ID,
        );
        let texts: Vec<_> = kept.iter().map(|a| a.text.as_deref().unwrap()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_self_echo_only_frame_yields_nothing() {
        let mut inbound = InboundStream::new(SELF_ID);
        inbound.handle(StreamEvent::Connected);
        let out = inbound.handle(StreamEvent::Frame(frame(vec![activity(SELF_ID, "echo")])));
        assert!(out.is_empty());
        assert_eq!(inbound.state(), StreamState::Connected);
    }

    #[test]
    fn test_frames_after_disconnect_are_dropped() {
        let mut inbound = InboundStream::new(SELF_ID);
        inbound.handle(StreamEvent::Connected);
        inbound.handle(StreamEvent::Disconnected("bye".into()));
        let out = inbound.handle(StreamEvent::Frame(frame(vec![activity("bot", "late")])));
        assert!(out.is_empty());
        assert_eq!(inbound.state(), StreamState::Disconnected);
    }

    #[tokio::test]
    async fn test_read_frames_until_close() {
        let messages = vec![
            Ok(Message::text("")),
            Ok(Message::Ping(Default::default())),
            Ok(Message::text(r#"{"activities":[{"from":{"id":"bot"},"text":"hi"}]}"#)),
            Ok(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "done".into(),
            }))),
            Ok(Message::text(r#"{"activities":[{"from":{"id":"bot"},"text":"never"}]}"#)),
        ];
        let (tx, mut rx) = mpsc::unbounded_channel();
        read_frames(stream::iter(messages), tx).await;

        match rx.recv().await {
            Some(StreamEvent::Frame(f)) => assert_eq!(f.activities[0].text.as_deref(), Some("hi")),
            other => panic!("expected frame, got {other:?}"),
        }
        match rx.recv().await {
            Some(StreamEvent::Disconnected(reason)) => assert!(reason.contains("done")),
            other => panic!("expected disconnect, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        // Port 1 on loopback refuses connections.
        let mut rx = StreamListener::new("ws://127.0.0.1:1/stream").spawn();
        match rx.recv().await {
            Some(StreamEvent::ConnectFailed(_)) => {}
            other => panic!("expected connect failure, got {other:?}"),
        }
    }
}
