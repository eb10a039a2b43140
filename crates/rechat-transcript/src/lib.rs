//! Transcript formatter — pure assembly of the portable transfer text.

mod formatter;

pub use formatter::{format_conversation, FormattedTranscript, TransferInfo};
