use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DirectLineError, Result};
use crate::schema::DEFAULT_SCHEMA_URL;

/// Sender id stamped on every outbound activity and used for echo suppression.
pub const DEFAULT_USER_ID: &str = "DirectLineClient";
pub const DEFAULT_PROMPT: &str = "Command> ";

/// Client configuration.
///
/// Loaded from `~/.directline-console/config.toml` (or an explicit path) and
/// then overridden by command-line flags and environment variables.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Long-lived Direct Line secret, exchanged for a token at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub user_id: String,
    pub schema_url: String,
    /// Base URL override; when unset the schema's host is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub prompt: String,
    pub open_images: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            secret: None,
            user_id: DEFAULT_USER_ID.to_string(),
            schema_url: DEFAULT_SCHEMA_URL.to_string(),
            endpoint: None,
            prompt: DEFAULT_PROMPT.to_string(),
            open_images: true,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .field("schema_url", &self.schema_url)
            .field("endpoint", &self.endpoint)
            .field("prompt", &self.prompt)
            .field("open_images", &self.open_images)
            .finish()
    }
}

impl ClientConfig {
    pub fn default_path() -> PathBuf {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home_dir.join(".directline-console").join("config.toml")
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !config_path.exists() {
            if required {
                return Err(DirectLineError::Config(format!(
                    "config file {} does not exist",
                    config_path.display()
                )));
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
            .map_err(|e| DirectLineError::Config(format!("{}: {e}", config_path.display())))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The secret, if one was supplied and is not blank.
    pub fn secret(&self) -> Result<&str> {
        self.secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(DirectLineError::MissingSecret)
    }
}
