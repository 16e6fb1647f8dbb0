//! Console chat client for bots on the Bot Framework Direct Line v3 channel.
//!
//! [`session::bootstrap`] turns a Direct Line secret into a conversation;
//! [`chat::ChatSession`] then posts terminal lines through an
//! [`outbound::OutboundChannel`] and renders what arrives on the
//! [`stream::StreamListener`].

pub mod activity;
pub mod args;
pub mod chat;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod outbound;
pub mod render;
pub mod schema;
pub mod session;
pub mod stream;
pub mod viewer;

pub use activity::{Activity, Attachment, StreamFrame};
pub use client::DirectLineClient;
pub use config::ClientConfig;
pub use error::{DirectLineError, Result};
pub use session::Session;
