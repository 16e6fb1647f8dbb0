use std::path::PathBuf;

use clap::{ArgAction, Args};

use crate::config::ClientConfig;

// Every flag is optional: the bare invocation reads the secret from `DLSecret`
// and uses defaults for everything else.
#[derive(Debug, Clone, Default, Args)]
pub struct ClientArgs {
    /// Path to a config.toml file
    #[arg(short = 'c', long, value_name = "PATH", env = "DIRECTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Direct Line secret of the bot
    #[arg(long, value_name = "SECRET", env = "DLSecret", hide_env_values = true)]
    pub secret: Option<String>,

    /// Sender id used for outgoing messages
    #[arg(long, value_name = "ID", env = "DIRECTLINE_USER_ID")]
    pub user_id: Option<String>,

    /// URL of the Direct Line interface description
    #[arg(long, value_name = "URL", env = "DIRECTLINE_SCHEMA_URL")]
    pub schema_url: Option<String>,

    /// Base URL of the Direct Line service (default: from the schema)
    #[arg(long, value_name = "URL", env = "DIRECTLINE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Input prompt
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Announce image attachments without opening a viewer
    #[arg(long = "no-open-images", action = ArgAction::SetTrue)]
    pub no_open_images: bool,
}

impl ClientArgs {
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(secret) = &self.secret {
            config.secret = Some(secret.clone());
        }

        if let Some(user_id) = &self.user_id {
            config.user_id = user_id.clone();
        }

        if let Some(schema_url) = &self.schema_url {
            config.schema_url = schema_url.clone();
        }

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }

        if let Some(prompt) = &self.prompt {
            config.prompt = prompt.clone();
        }

        if self.no_open_images {
            config.open_images = false;
        }
    }
}
