//! Outbound channel: terminal lines to posted activities.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::activity::Activity;
use crate::client::{DirectLineClient, ResourceResponse};
use crate::error::Result;

/// Destination for outbound activities.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn post_activity(&self, conversation_id: &str, activity: &Activity) -> Result<ResourceResponse>;
}

#[async_trait]
impl ActivitySink for DirectLineClient {
    async fn post_activity(&self, conversation_id: &str, activity: &Activity) -> Result<ResourceResponse> {
        DirectLineClient::post_activity(self, conversation_id, activity).await
    }
}

/// What a line of terminal input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// `exit`, any case, surrounding whitespace ignored.
    Exit,
    /// Send the trimmed text as a message.
    Send(String),
    /// Nothing but whitespace.
    Blank,
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            Self::Blank
        } else if input.eq_ignore_ascii_case("exit") {
            Self::Exit
        } else {
            Self::Send(input.to_string())
        }
    }
}

/// Result of handling one line.
#[derive(Debug)]
pub enum LineOutcome {
    Exit,
    /// A send was started; the handle resolves once it succeeded or was logged.
    Dispatched(JoinHandle<()>),
    Ignored,
}

/// Posts each submitted line to the conversation without waiting for the reply.
#[derive(Clone)]
pub struct OutboundChannel {
    sink: Arc<dyn ActivitySink>,
    conversation_id: Arc<str>,
    user_id: Arc<str>,
}

impl OutboundChannel {
    pub fn new(sink: Arc<dyn ActivitySink>, conversation_id: Arc<str>, user_id: Arc<str>) -> Self {
        Self {
            sink,
            conversation_id,
            user_id,
        }
    }

    /// Handle one line of input. Must be called from within a Tokio runtime.
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        match InputCommand::parse(line) {
            InputCommand::Exit => LineOutcome::Exit,
            InputCommand::Blank => LineOutcome::Ignored,
            InputCommand::Send(text) => {
                let activity = Activity::message(text, &self.user_id);
                LineOutcome::Dispatched(self.dispatch(activity))
            }
        }
    }

    fn dispatch(&self, activity: Activity) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        let conversation_id = Arc::clone(&self.conversation_id);
        tokio::spawn(async move {
            match sink.post_activity(&conversation_id, &activity).await {
                Ok(resp) => debug!(id = ?resp.id, "Message sent"),
                Err(e) => error!(conversation_id = %conversation_id, error = %e, "Error sending message"),
            }
        })
    }
}
