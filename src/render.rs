//! Plain-text rendering of inbound activities.
//!
//! Text is printed as-is, hero and thumbnail cards become a bordered block
//! [`CARD_WIDTH`] columns wide, and image attachments are handed to an
//! [`ImageViewer`]. Every other attachment type is skipped.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::activity::{Activity, AttachmentKind, CardContent};
use crate::viewer::ImageViewer;

/// Interior width of a rendered card, borders excluded.
pub const CARD_WIDTH: usize = 70;

/// Center `content` inside `width` columns.
///
/// The same padding, `(width - len) / 2` rounded down, goes on both sides, so
/// an odd difference yields a line one column short of `width`. `len` counts
/// characters. Content wider than `width` is returned unpadded.
pub fn content_line(content: &str, width: usize) -> String {
    let pad = " ".repeat(width.saturating_sub(content.chars().count()) / 2);
    format!("{pad}{content}{pad}")
}

/// Write `card` as a bordered block.
///
/// Cards with buttons use a left-aligned list layout; cards without buttons
/// get a centered title and body.
pub fn render_card(card: &CardContent, out: &mut dyn Write) -> io::Result<()> {
    let title = card.title.as_deref().unwrap_or_default();

    writeln!(out, "/{}", "*".repeat(CARD_WIDTH + 1))?;
    if card.buttons.is_empty() {
        let text = card.text.as_deref().unwrap_or_default();
        writeln!(out, "*{}*", content_line(title, CARD_WIDTH))?;
        writeln!(out, "*{}*", " ".repeat(CARD_WIDTH))?;
        writeln!(out, "*{}*", content_line(text, CARD_WIDTH))?;
    } else {
        writeln!(out, "* {title}")?;
        for button in &card.buttons {
            let label = button.title.as_deref().unwrap_or_default();
            match button.url() {
                Some(url) => writeln!(out, "* {label} ({url})")?,
                None => writeln!(out, "* {label}")?,
            }
        }
    }
    writeln!(out, "{}/", "*".repeat(CARD_WIDTH + 1))
}

/// Renders whole activities to a writer.
#[derive(Clone, Default)]
pub struct ActivityRenderer {
    viewer: Option<Arc<dyn ImageViewer>>,
}

impl ActivityRenderer {
    /// A renderer that only announces images and never opens them.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewer(viewer: Arc<dyn ImageViewer>) -> Self {
        Self {
            viewer: Some(viewer),
        }
    }

    pub fn render(&self, activity: &Activity, out: &mut dyn Write) -> io::Result<()> {
        if let Some(text) = activity.text.as_deref().filter(|t| !t.is_empty()) {
            writeln!(out, "{text}")?;
        }

        for attachment in &activity.attachments {
            match attachment.kind() {
                AttachmentKind::HeroCard | AttachmentKind::ThumbnailCard => {
                    match attachment.card() {
                        Some(card) => render_card(&card, out)?,
                        None => debug!(content_type = %attachment.content_type, "card without content"),
                    }
                }
                AttachmentKind::Image => {
                    let Some(url) = attachment.content_url.as_deref() else {
                        debug!(content_type = %attachment.content_type, "image without contentUrl");
                        continue;
                    };
                    writeln!(out, "Opening the requested image {url}")?;
                    if let Some(viewer) = &self.viewer {
                        if let Err(e) = viewer.open(url) {
                            warn!(url, error = %e, "Failed to open image viewer");
                        }
                    }
                }
                AttachmentKind::Other => {}
            }
        }
        Ok(())
    }
}
