//! Error taxonomy for the Direct Line client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DirectLineError>;

#[derive(Debug, Error)]
pub enum DirectLineError {
    /// No Direct Line secret was supplied.
    #[error("a Direct Line secret is required")]
    MissingSecret,

    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("HTTP request for {operation} failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The interface description is unusable (missing operation, no host, ...).
    #[error("invalid interface description: {0}")]
    Schema(String),

    /// An authenticated call was attempted before a token was installed.
    #[error("no access token installed; generate a token first")]
    MissingToken,

    /// The conversation started but no streaming endpoint came back.
    #[error("conversation {0} was started without a streamUrl")]
    MissingStreamUrl(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DirectLineError {
    pub(crate) fn http(operation: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { operation, source }
    }

    pub(crate) fn json(context: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Json { context, source }
    }
}
