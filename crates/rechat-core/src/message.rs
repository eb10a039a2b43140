//! Message model — role-tagged turns and the conversation record that
//! crosses the context boundary by value.

use serde::{Deserialize, Serialize};

/// Who authored a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single extracted message.
///
/// `index` increases strictly in container-enumeration order within one
/// extraction, assigned after filtering so kept messages are contiguous
/// from 0. `content` is never empty after trimming; containers that trim
/// to nothing are dropped before a `Message` is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// ISO-8601 capture timestamp.
    pub timestamp: String,
    pub index: usize,
}

/// One extracted conversation, handed by value across contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub messages: Vec<Message>,
    pub source: String,
    pub url: String,
    pub title: String,
    #[serde(rename = "extractedAt")]
    pub extracted_at: String,
}
