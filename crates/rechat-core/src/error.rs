//! Error types for reChat.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No active browsing context found")]
    NoActiveContext,

    #[error("Unknown target platform: {0}")]
    UnknownTarget(String),

    #[error("Tab load timeout")]
    TabLoadTimeout,

    #[error("No conversation found on this page")]
    EmptyConversation,

    #[error("Could not find {0} input field")]
    InputFieldNotFound(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Insertion failed: {0}")]
    Insertion(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
