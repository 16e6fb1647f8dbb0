//! Session bootstrap: schema, token, conversation.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::client::DirectLineClient;
use crate::config::ClientConfig;
use crate::error::{DirectLineError, Result};

/// The conversation this process talks to. Fixed once bootstrap returns.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub conversation_id: Arc<str>,
    pub stream_url: String,
    pub access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("conversation_id", &self.conversation_id)
            .field("stream_url", &self.stream_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Run the startup sequence.
///
/// Fetches the interface description, exchanges the secret for a token,
/// installs it on the client and starts a new conversation. Any failure is
/// returned as-is; nothing is retried.
#[instrument(skip_all, fields(schema_url = %config.schema_url))]
pub async fn bootstrap(
    http: reqwest::Client,
    config: &ClientConfig,
) -> Result<(DirectLineClient, Session)> {
    let secret = config.secret()?;

    let mut client =
        DirectLineClient::from_schema_url(http, &config.schema_url, config.endpoint.as_deref()).await?;
    info!(base_url = client.base_url(), "Direct Line client ready");

    let issued = client.generate_token(secret).await?;
    client.set_token(issued.token.clone());

    let conversation = client.start_conversation().await?;
    let stream_url = conversation
        .stream_url
        .ok_or_else(|| DirectLineError::MissingStreamUrl(conversation.conversation_id.clone()))?;
    info!(conversation_id = %conversation.conversation_id, "Conversation started");

    let session = Session {
        conversation_id: Arc::from(conversation.conversation_id),
        stream_url,
        access_token: issued.token,
    };
    Ok((client, session))
}
