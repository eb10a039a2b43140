//! Page driver — the seam between adapters and a live browsing context.
//!
//! Adapters read the page through `html()` snapshots and mutate the input
//! surface through the write/dispatch operations. Insertion is considered
//! successful once the value is written and the change notifications are
//! dispatched; whether the destination application visibly reacts is
//! outside this contract.

use async_trait::async_trait;
use rechat_core::Result;

/// How a located input surface accepts text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Rich editor rebuilt from paragraph nodes.
    ProseMirror,
    /// Plain `contenteditable` element.
    ContentEditable,
    /// Value-based field (textarea or input).
    Textarea,
}

/// A located input field: the selector that matched it and its mechanics.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    pub selector: String,
    pub kind: FieldKind,
}

/// Operations a host runtime must provide against one browsing context.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// URL of the page this driver is attached to.
    fn url(&self) -> String;

    /// Current DOM snapshot as serialized HTML.
    async fn html(&self) -> Result<String>;

    async fn focus(&self, selector: &str) -> Result<()>;

    /// Overwrite a value-based field.
    async fn set_value(&self, selector: &str, value: &str) -> Result<()>;

    /// Overwrite a contenteditable element's text content.
    async fn set_text_content(&self, selector: &str, text: &str) -> Result<()>;

    /// Rebuild a rich editor's content as paragraph nodes; newlines within
    /// a paragraph become explicit break nodes.
    async fn set_paragraphs(&self, selector: &str, paragraphs: &[String]) -> Result<()>;

    /// Write text to the clipboard and replay a paste event into the field.
    async fn paste_from_clipboard(&self, selector: &str, text: &str) -> Result<()>;

    /// Dispatch a bubbling DOM event on the field.
    async fn dispatch_event(&self, selector: &str, event: &str) -> Result<()>;
}
