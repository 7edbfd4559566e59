//! Wire format spoken with the debate server.
//!
//! Every frame is a JSON text message. The server streams snapshots addressed
//! to a `(target_panel, message_type)` pair; the client only ever sends the
//! user's query.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Roles the server can address a frame to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, EnumString, EnumIter, AsRefStr, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PanelId {
    /// The judge that summarises the debate
    Intermediary,
    /// The logical analyst
    BotAlpha,
    /// The creative thinker
    BotBravo,
    /// Echo of the submitted query. Known on the wire, never displayed.
    User,
}

impl PanelId {
    pub fn display_name(&self) -> &'static str {
        match self {
            PanelId::Intermediary => "Judge",
            PanelId::BotAlpha => "Bot Alpha",
            PanelId::BotBravo => "Bot Bravo",
            PanelId::User => "You",
        }
    }
}

/// Category of text a panel emits
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, EnumString, EnumIter, AsRefStr, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    /// Internal reasoning
    Thought,
    /// User-visible output
    Speech,
}

impl ContentKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentKind::Thought => "Thought",
            ContentKind::Speech => "Speech",
        }
    }
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown target panel: {0}")]
    UnknownPanel(String),

    #[error("unknown message type: {0}")]
    UnknownKind(String),
}

/// A server-to-client snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub target_panel: PanelId,
    pub message_type: ContentKind,
    pub content: String,
}

/// Loose shape used for decoding so unknown identifiers surface as typed errors
#[derive(Deserialize)]
struct RawInbound {
    target_panel: String,
    message_type: String,
    content: String,
}

impl InboundMessage {
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let frame: RawInbound = serde_json::from_str(raw)?;

        let target_panel = PanelId::from_str(&frame.target_panel)
            .map_err(|_| ProtocolError::UnknownPanel(frame.target_panel.clone()))?;
        let message_type = ContentKind::from_str(&frame.message_type)
            .map_err(|_| ProtocolError::UnknownKind(frame.message_type.clone()))?;

        Ok(Self {
            target_panel,
            message_type,
            content: frame.content,
        })
    }
}

/// A client-to-server submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub content: String,
}

impl OutboundMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
