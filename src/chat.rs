//! The interactive loop.
//!
//! Terminal lines and stream events are consumed by one task, one at a time,
//! so the prompt, typed input and incoming messages never interleave
//! mid-write. Sends run on their own tasks and are never awaited here.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::console::Console;
use crate::outbound::{LineOutcome, OutboundChannel};
use crate::render::ActivityRenderer;
use crate::stream::{InboundStream, StreamEvent, StreamState};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed `exit`.
    Exit,
    /// Standard input reached end of file.
    InputClosed,
}

pub struct ChatSession<W: Write> {
    outbound: OutboundChannel,
    inbound: InboundStream,
    renderer: ActivityRenderer,
    console: Console<W>,
}

impl<W: Write> ChatSession<W> {
    pub fn new(
        outbound: OutboundChannel,
        inbound: InboundStream,
        renderer: ActivityRenderer,
        console: Console<W>,
    ) -> Self {
        Self {
            outbound,
            inbound,
            renderer,
            console,
        }
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }

    pub fn stream_state(&self) -> StreamState {
        self.inbound.state()
    }

    /// Run until `exit` or end of input.
    ///
    /// Pending stream events are handled before the next input line.
    pub async fn run<R>(&mut self, input: R, mut events: mpsc::UnboundedReceiver<StreamEvent>) -> io::Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.split(b'\n');
        let mut stream_open = true;
        self.console.prompt()?;

        loop {
            tokio::select! {
                biased;

                event = events.recv(), if stream_open && !self.inbound.state().is_terminal() => match event {
                    Some(event) => {
                        let activities = self.inbound.handle(event);
                        self.console.show_activities(&self.renderer, &activities)?;
                    }
                    None => {
                        debug!(state = ?self.inbound.state(), "Stream listener finished");
                        stream_open = false;
                    }
                },

                line = lines.next_segment() => match line? {
                    None => return Ok(SessionEnd::InputClosed),
                    Some(raw) => match self.outbound.handle_line(&decode_line(&raw)) {
                        LineOutcome::Exit => return Ok(SessionEnd::Exit),
                        LineOutcome::Dispatched(_) => self.console.prompt()?,
                        LineOutcome::Ignored => {}
                    },
                },
            }
        }
    }
}

/// Terminal bytes to text. Invalid UTF-8 is replaced rather than rejected,
/// and a trailing `\r` is dropped.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Activity, ChannelAccount, StreamFrame};
    use crate::client::ResourceResponse;
    use crate::error::Result;
    use crate::outbound::ActivitySink;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink {
        posted: Mutex<Vec<Activity>>,
    }

    #[async_trait]
    impl ActivitySink for RecordingSink {
        async fn post_activity(&self, _conversation_id: &str, activity: &Activity) -> Result<ResourceResponse> {
            self.posted.lock().unwrap().push(activity.clone());
            Ok(ResourceResponse::default())
        }
    }

    fn session(sink: Arc<RecordingSink>) -> ChatSession<Vec<u8>> {
        ChatSession::new(
            OutboundChannel::new(sink, Arc::from("c1"), Arc::from("DirectLineClient")),
            InboundStream::new("DirectLineClient"),
            ActivityRenderer::new(),
            Console::new(Vec::new(), "Command> "),
        )
    }

    fn from(id: &str, text: &str) -> Activity {
        Activity {
            text: Some(text.into()),
            from: Some(ChannelAccount {
                id: id.into(),
                name: None,
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_exit_stops_without_sending() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = session(sink.clone());
        let (_tx, rx) = mpsc::unbounded_channel();

        let end = chat.run(&b" ExIt \nhello\n"[..], rx).await.unwrap();
        assert_eq!(end, SessionEnd::Exit);
        tokio::task::yield_now().await;
        assert!(sink.posted.lock().unwrap().is_empty());
        assert_eq!(chat.console().get_ref(), b"Command> ");
    }

    #[tokio::test]
    async fn test_self_echo_frame_prints_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = session(sink);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Connected).unwrap();
        tx.send(StreamEvent::Frame(StreamFrame {
            activities: vec![from("DirectLineClient", "echo")],
            watermark: None,
        }))
        .unwrap();
        drop(tx);

        let end = chat.run(&b""[..], rx).await.unwrap();
        assert_eq!(end, SessionEnd::InputClosed);
        assert_eq!(chat.console().get_ref(), b"Command> ");
        assert_eq!(chat.stream_state(), StreamState::Connected);
    }

    #[tokio::test]
    async fn test_bot_reply_is_rendered_between_prompts() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = session(sink);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Connected).unwrap();
        tx.send(StreamEvent::Frame(StreamFrame {
            activities: vec![from("DirectLineClient", "hello"), from("bot", "You said hello")],
            watermark: Some("1".into()),
        }))
        .unwrap();
        tx.send(StreamEvent::Disconnected("closed".into())).unwrap();
        drop(tx);

        chat.run(&b""[..], rx).await.unwrap();
        let out = String::from_utf8(chat.console().get_ref().clone()).unwrap();
        assert!(out.starts_with("Command> "));
        assert!(out.ends_with("You said hello\nCommand> "));
        assert!(!out.contains("hello\nYou"));
        assert_eq!(chat.stream_state(), StreamState::Disconnected);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_session() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = session(sink.clone());
        let (_tx, rx) = mpsc::unbounded_channel();

        let end = chat.run(&b"caf\xe9\r\nhello\nexit\n"[..], rx).await.unwrap();
        assert_eq!(end, SessionEnd::Exit);

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let posted = sink.posted.lock().unwrap();
        let texts: Vec<_> = posted.iter().map(|a| a.text.as_deref().unwrap()).collect();
        assert_eq!(texts, vec!["caf\u{FFFD}", "hello"]);
    }

    #[tokio::test]
    async fn test_events_after_disconnect_are_not_read() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = session(sink);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Connected).unwrap();
        tx.send(StreamEvent::Disconnected("closed".into())).unwrap();
        tx.send(StreamEvent::Frame(StreamFrame {
            activities: vec![from("bot", "late")],
            watermark: None,
        }))
        .unwrap();

        // Sender kept alive: the loop must still reach end of input.
        let end = chat.run(&b""[..], rx).await.unwrap();
        assert_eq!(end, SessionEnd::InputClosed);
        assert_eq!(chat.stream_state(), StreamState::Disconnected);
        assert_eq!(chat.console().get_ref(), b"Command> ");
        drop(tx);
    }

    #[tokio::test]
    async fn test_each_line_is_sent_and_reprompted() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = session(sink.clone());
        let (_tx, rx) = mpsc::unbounded_channel();

        let end = chat.run(&b"hello\n\n  world  \n"[..], rx).await.unwrap();
        assert_eq!(end, SessionEnd::InputClosed);
        assert_eq!(chat.console().get_ref(), b"Command> Command> Command> ");

        // Sends are fire-and-forget; let the spawned tasks finish.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let posted = sink.posted.lock().unwrap();
        let texts: Vec<_> = posted.iter().map(|a| a.text.as_deref().unwrap()).collect();
        assert_eq!(texts, vec!["hello", "world"]);
    }
}
