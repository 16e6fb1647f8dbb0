//! Direct Line v3 activity model.
//!
//! Only the fields the console client reads or writes are modelled; unknown
//! fields on inbound JSON are ignored.

use serde::{Deserialize, Serialize};

pub const HERO_CARD: &str = "application/vnd.microsoft.card.hero";
pub const THUMBNAIL_CARD: &str = "application/vnd.microsoft.card.thumbnail";

/// Button action type that carries a URL worth showing next to the title.
pub const OPEN_URL: &str = "openUrl";

// ── Activity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    #[default]
    Message,
    Typing,
    ConversationUpdate,
    EndOfConversation,
    Event,
    #[serde(other)]
    Other,
}

/// Sender or recipient of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One chat message or event exchanged over the conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub kind: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Activity {
    /// Build an outbound plain-text message sent as `user_id`.
    pub fn message(text: impl Into<String>, user_id: &str) -> Self {
        Self {
            kind: ActivityType::Message,
            text_format: Some("plain".to_string()),
            text: Some(text.into()),
            from: Some(ChannelAccount {
                id: user_id.to_string(),
                name: Some(user_id.to_string()),
            }),
            ..Default::default()
        }
    }

    /// True when the activity was sent by `user_id` (i.e. a self-echo).
    pub fn is_from(&self, user_id: &str) -> bool {
        self.from.as_ref().is_some_and(|from| from.id == user_id)
    }
}

// ── Attachments ─────────────────────────────────────────────────────────────

/// How the renderer should treat an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    HeroCard,
    ThumbnailCard,
    Image,
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    pub fn kind(&self) -> AttachmentKind {
        match self.content_type.as_str() {
            HERO_CARD => AttachmentKind::HeroCard,
            THUMBNAIL_CARD => AttachmentKind::ThumbnailCard,
            ct if ct.starts_with("image/") => AttachmentKind::Image,
            _ => AttachmentKind::Other,
        }
    }

    /// Decode the payload as a hero/thumbnail card.
    ///
    /// Returns `None` when there is no payload or it does not look like a card.
    pub fn card(&self) -> Option<CardContent> {
        let content = self.content.as_ref()?;
        serde_json::from_value(content.clone()).ok()
    }
}

/// Payload shared by hero and thumbnail cards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub buttons: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardAction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl CardAction {
    /// The URL to show after the title, for `openUrl` buttons only.
    pub fn url(&self) -> Option<String> {
        if self.kind != OPEN_URL {
            return None;
        }
        match self.value.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ── Stream frames ───────────────────────────────────────────────────────────

/// One push message from the streaming endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamFrame {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
}
