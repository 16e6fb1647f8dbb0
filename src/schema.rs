//! The Direct Line interface description.
//!
//! The service publishes a Swagger 2.0 document. The client is built from it:
//! the base URL comes from `schemes`/`host`/`basePath` and every call is
//! resolved by `operationId` to a method and a path template.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{DirectLineError, Result};

pub const DEFAULT_SCHEMA_URL: &str =
    "https://docs.botframework.com/en-us/restapi/directline3/swagger.json";

pub const OP_GENERATE_TOKEN: &str = "Tokens_GenerateTokenForNewConversation";
pub const OP_START_CONVERSATION: &str = "Conversations_StartConversation";
pub const OP_POST_ACTIVITY: &str = "Conversations_PostActivity";

const REQUIRED_OPERATIONS: [&str; 3] = [OP_GENERATE_TOKEN, OP_START_CONVERSATION, OP_POST_ACTIVITY];
const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwaggerDocument {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    base_path: Option<String>,
    #[serde(default)]
    schemes: Vec<String>,
    #[serde(default)]
    paths: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// One callable operation: HTTP method plus path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub method: reqwest::Method,
    pub path: String,
}

impl Operation {
    /// Substitute `{name}` placeholders with percent-encoded values.
    pub fn expand(&self, params: &[(&str, &str)]) -> String {
        params.iter().fold(self.path.clone(), |path, (name, value)| {
            path.replace(&format!("{{{name}}}"), &urlencoding::encode(value))
        })
    }
}

/// Parsed interface description, reduced to what the client needs.
#[derive(Debug, Clone)]
pub struct ApiSchema {
    base_url: Option<String>,
    operations: BTreeMap<String, Operation>,
}

impl ApiSchema {
    /// Parse a schema document. Surrounding whitespace is tolerated.
    pub fn parse(document: &str) -> Result<Self> {
        let doc: SwaggerDocument =
            serde_json::from_str(document.trim()).map_err(DirectLineError::json("interface description"))?;

        let mut operations = BTreeMap::new();
        for (path, item) in &doc.paths {
            for (method, op) in item {
                if !HTTP_METHODS.contains(&method.as_str()) {
                    continue;
                }
                let Some(id) = op.get("operationId").and_then(|v| v.as_str()) else {
                    continue;
                };
                let method = method
                    .to_uppercase()
                    .parse::<reqwest::Method>()
                    .map_err(|e| DirectLineError::Schema(format!("{id}: {e}")))?;
                operations.insert(
                    id.to_string(),
                    Operation {
                        method,
                        path: path.clone(),
                    },
                );
            }
        }

        let missing: Vec<&str> = REQUIRED_OPERATIONS
            .into_iter()
            .filter(|id| !operations.contains_key(*id))
            .collect();
        if !missing.is_empty() {
            return Err(DirectLineError::Schema(format!(
                "missing operations: {}",
                missing.join(", ")
            )));
        }

        let base_url = doc.host.as_deref().map(|host| {
            let scheme = if doc.schemes.is_empty() || doc.schemes.iter().any(|s| s == "https") {
                "https"
            } else {
                doc.schemes[0].as_str()
            };
            let base_path = doc.base_path.as_deref().unwrap_or("").trim_end_matches('/');
            format!("{scheme}://{host}{base_path}")
        });

        debug!(operations = operations.len(), base_url = ?base_url, "Parsed interface description");
        Ok(Self {
            base_url,
            operations,
        })
    }

    /// Download and parse the schema at `url`.
    pub async fn fetch(http: &reqwest::Client, url: &str) -> Result<Self> {
        const OPERATION: &str = "fetch interface description";

        let resp = http
            .get(url)
            .send()
            .await
            .map_err(DirectLineError::http(OPERATION))?;
        let status = resp.status();
        let body = resp.text().await.map_err(DirectLineError::http(OPERATION))?;
        if !status.is_success() {
            return Err(DirectLineError::Status {
                operation: OPERATION,
                status,
                body,
            });
        }
        Self::parse(&body)
    }

    /// Base URL derived from the document, if it names a host.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn operation(&self, id: &str) -> Result<&Operation> {
        self.operations
            .get(id)
            .ok_or_else(|| DirectLineError::Schema(format!("unknown operation {id}")))
    }
}
