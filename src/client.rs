//! Typed Direct Line client built from the interface description.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activity::Activity;
use crate::error::{DirectLineError, Result};
use crate::schema::{ApiSchema, OP_GENERATE_TOKEN, OP_POST_ACTIVITY, OP_START_CONVERSATION};

/// Short-lived token returned by the token-issuance call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, rename = "expires_in")]
    pub expires_in: Option<u64>,
}

/// Response of the conversation-start call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "expires_in")]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub stream_url: Option<String>,
}

/// Response of the post-activity call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ResourceResponse {
    #[serde(default)]
    pub id: Option<String>,
}

pub struct DirectLineClient {
    http: reqwest::Client,
    schema: ApiSchema,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for DirectLineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectLineClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl DirectLineClient {
    /// Build a client for `schema`.
    ///
    /// `endpoint` overrides the base URL the schema advertises.
    pub fn new(http: reqwest::Client, schema: ApiSchema, endpoint: Option<&str>) -> Result<Self> {
        let base_url = endpoint
            .or(schema.base_url())
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                DirectLineError::Schema("no host in interface description and no endpoint configured".into())
            })?;
        Ok(Self {
            http,
            schema,
            base_url,
            token: None,
        })
    }

    /// Fetch the interface description at `schema_url` and build a client from it.
    pub async fn from_schema_url(
        http: reqwest::Client,
        schema_url: &str,
        endpoint: Option<&str>,
    ) -> Result<Self> {
        let schema = ApiSchema::fetch(&http, schema_url).await?;
        Self::new(http, schema, endpoint)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install the bearer token used for every subsequent call.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Exchange the long-lived secret for a short-lived token.
    pub async fn generate_token(&self, secret: &str) -> Result<IssuedToken> {
        if secret.trim().is_empty() {
            return Err(DirectLineError::MissingSecret);
        }
        self.call::<(), _>(OP_GENERATE_TOKEN, &[], secret, None).await
    }

    pub async fn start_conversation(&self) -> Result<Conversation> {
        let token = self.token.as_deref().ok_or(DirectLineError::MissingToken)?;
        self.call::<(), _>(OP_START_CONVERSATION, &[], token, None).await
    }

    pub async fn post_activity(&self, conversation_id: &str, activity: &Activity) -> Result<ResourceResponse> {
        let token = self.token.as_deref().ok_or(DirectLineError::MissingToken)?;
        self.call(
            OP_POST_ACTIVITY,
            &[("conversationId", conversation_id)],
            token,
            Some(activity),
        )
        .await
    }

    async fn call<B, T>(
        &self,
        operation: &'static str,
        params: &[(&str, &str)],
        bearer: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let op = self.schema.operation(operation)?;
        let url = format!("{}{}", self.base_url, op.expand(params));
        debug!(operation, method = %op.method, %url, "Calling Direct Line");

        let mut req = self.http.request(op.method.clone(), &url).bearer_auth(bearer);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(DirectLineError::http(operation))?;
        let status = resp.status();
        let text = resp.text().await.map_err(DirectLineError::http(operation))?;
        if !status.is_success() {
            return Err(DirectLineError::Status {
                operation,
                status,
                body: text,
            });
        }

        // Some operations answer 204 or an empty body; treat that as `{}`.
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(DirectLineError::json(operation))
    }
}
