//! reChat core — error taxonomy, platform registry, message model.

pub mod error;
pub mod message;
pub mod platform;
pub mod wait;

pub use error::{Error, Result};
pub use message::{ConversationRecord, Message, Role};
pub use platform::Platform;
pub use wait::{await_condition, TimedOut};
