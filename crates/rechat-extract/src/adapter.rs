//! Site adapter capability set and the shared extraction flow.
//!
//! Each platform is one implementation of [`SiteAdapter`] over the same
//! rule table (walker, classifier, locator); only the selector tables and
//! input-insertion mechanics differ.

use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info};

use async_trait::async_trait;
use rechat_core::{await_condition, ConversationRecord, Error, Message, Platform, Result};

use crate::classify::{classify, RoleRules};
use crate::page::{FieldHandle, FieldKind, PageDriver};
use crate::sites::{ChatGptAdapter, ClaudeAdapter, GeminiAdapter};
use crate::walk::preserve_formatting;

/// Containers whose trimmed text is shorter than this are decorative,
/// not conversational.
pub(crate) const MIN_CONTENT_LEN: usize = 5;

/// Bounds for the per-adapter suspension points.
#[derive(Debug, Clone)]
pub struct ExtractTiming {
    /// Content-readiness poll interval.
    pub content_poll_interval: Duration,
    /// Ceiling after which extraction proceeds with whatever is present.
    pub content_deadline: Duration,
    /// Pause before the single input-field discovery retry.
    pub input_retry_delay: Duration,
}

impl Default for ExtractTiming {
    fn default() -> Self {
        Self {
            content_poll_interval: Duration::from_millis(500),
            content_deadline: Duration::from_secs(10),
            input_retry_delay: Duration::from_secs(1),
        }
    }
}

/// Why a container was excluded from the message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Trimmed text below the minimum conversational length.
    TooShort,
    /// Formatting walk produced nothing.
    NoContent,
    /// No authorship marker found (Claude container enumeration).
    Unclassified,
}

/// One excluded container, by its enumeration position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedContainer {
    pub container_index: usize,
    pub reason: SkipReason,
}

/// Result of one extraction: the record plus what was dropped on the way.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub record: ConversationRecord,
    pub skipped: Vec<SkippedContainer>,
}

/// Capability set every supported platform provides.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Poll until message containers appear, bounded. A timeout is not an
    /// error; extraction proceeds with whatever is present.
    async fn wait_for_content(&self, page: &dyn PageDriver) -> Result<()>;

    /// Extract the conversation currently rendered in `page`.
    ///
    /// Fails with [`Error::EmptyConversation`] when no message survives
    /// location and filtering.
    async fn extract(&self, page: &dyn PageDriver) -> Result<ExtractionOutcome>;

    /// Conversation title from the document, with a platform default.
    fn title(&self, doc: &Html) -> String;

    /// Locate the destination input surface; one delayed retry on a total
    /// miss, then [`Error::InputFieldNotFound`].
    async fn locate_input(&self, page: &dyn PageDriver) -> Result<FieldHandle>;

    /// Overwrite the input surface with `text` and dispatch the change
    /// notifications the host application listens for. All-or-nothing.
    async fn insert_text(
        &self,
        page: &dyn PageDriver,
        field: &FieldHandle,
        text: &str,
    ) -> Result<()>;
}

static CHATGPT: Lazy<ChatGptAdapter> = Lazy::new(ChatGptAdapter::new);
static CLAUDE: Lazy<ClaudeAdapter> = Lazy::new(ClaudeAdapter::new);
static GEMINI: Lazy<GeminiAdapter> = Lazy::new(GeminiAdapter::new);

/// The adapter instance registered for a platform.
pub fn adapter_for(platform: Platform) -> &'static dyn SiteAdapter {
    match platform {
        Platform::ChatGPT => &*CHATGPT,
        Platform::Claude => &*CLAUDE,
        Platform::Gemini => &*GEMINI,
    }
}

// -------------------------------------------------------------------
// Shared flow used by the site implementations
// -------------------------------------------------------------------

/// Poll `page` until `ready_selector` matches anything.
pub(crate) async fn wait_for_ready(
    page: &dyn PageDriver,
    ready_selector: &str,
    timing: &ExtractTiming,
) -> Result<()> {
    let outcome = await_condition(
        || async move {
            match page.html().await {
                Ok(html) => selector_matches(&html, ready_selector),
                Err(_) => false,
            }
        },
        timing.content_poll_interval,
        timing.content_deadline,
    )
    .await;

    if outcome.is_err() {
        debug!(ready_selector, "content readiness timed out, proceeding");
    }
    Ok(())
}

pub(crate) fn selector_matches(html: &str, raw: &str) -> bool {
    let doc = Html::parse_document(html);
    match Selector::parse(raw) {
        Ok(selector) => doc.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// Classify and walk each container into a message.
///
/// Parity classification sees the container enumeration index; kept
/// messages get contiguous post-filter indices from 0.
pub(crate) fn collect_messages(
    containers: &[ElementRef<'_>],
    rules: &RoleRules,
    content_selectors: &[&str],
) -> (Vec<Message>, Vec<SkippedContainer>) {
    let mut messages = Vec::new();
    let mut skipped = Vec::new();

    for (container_index, container) in containers.iter().enumerate() {
        let raw_text: String = container.text().collect();
        if raw_text.trim().len() < MIN_CONTENT_LEN {
            skipped.push(SkippedContainer {
                container_index,
                reason: SkipReason::TooShort,
            });
            continue;
        }

        let role = classify(*container, container_index, rules);
        let content = extract_content(*container, content_selectors);
        if content.is_empty() {
            skipped.push(SkippedContainer {
                container_index,
                reason: SkipReason::NoContent,
            });
            continue;
        }

        messages.push(Message {
            role,
            content,
            timestamp: Utc::now().to_rfc3339(),
            index: messages.len(),
        });
    }

    (messages, skipped)
}

/// Walk the first matching content element inside the container, falling
/// back to the container itself.
pub(crate) fn extract_content(container: ElementRef, selectors: &[&str]) -> String {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            if let Some(el) = container.select(&selector).next() {
                return preserve_formatting(el);
            }
        }
    }
    preserve_formatting(container)
}

/// First non-empty title text among `selectors`, else the default.
pub(crate) fn find_title(doc: &Html, selectors: &[&str], default: &str) -> String {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            if let Some(el) = doc.select(&selector).next() {
                let text: String = el.text().collect();
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    default.to_string()
}

/// Assemble the record, failing when nothing conversational survived.
pub(crate) fn build_record(
    platform: Platform,
    page: &dyn PageDriver,
    title: String,
    messages: Vec<Message>,
    skipped: Vec<SkippedContainer>,
) -> Result<ExtractionOutcome> {
    if messages.is_empty() {
        return Err(Error::EmptyConversation);
    }

    info!(
        platform = %platform,
        messages = messages.len(),
        skipped = skipped.len(),
        "extraction complete"
    );

    Ok(ExtractionOutcome {
        record: ConversationRecord {
            messages,
            source: platform.name().to_string(),
            url: page.url(),
            title,
            extracted_at: Utc::now().to_rfc3339(),
        },
        skipped,
    })
}

/// Try the input selectors against the current snapshot; on a total miss,
/// one delayed retry against a fresh snapshot.
pub(crate) async fn locate_input_field(
    page: &dyn PageDriver,
    platform: Platform,
    selectors: &[&str],
    retry_delay: Duration,
) -> Result<FieldHandle> {
    if let Some(handle) = find_field(&page.html().await?, selectors) {
        return Ok(handle);
    }

    debug!(platform = %platform, "input field not found, retrying once");
    sleep(retry_delay).await;

    if let Some(handle) = find_field(&page.html().await?, selectors) {
        return Ok(handle);
    }
    Err(Error::InputFieldNotFound(platform.name().to_string()))
}

fn find_field(html: &str, selectors: &[&str]) -> Option<FieldHandle> {
    let doc = Html::parse_document(html);
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            if let Some(el) = doc.select(&selector).next() {
                return Some(FieldHandle {
                    selector: (*raw).to_string(),
                    kind: sniff_field_kind(el),
                });
            }
        }
    }
    None
}

/// Decide insertion mechanics from the matched element.
fn sniff_field_kind(el: ElementRef) -> FieldKind {
    if el.value().classes().any(|c| c == "ProseMirror") {
        FieldKind::ProseMirror
    } else if el.value().attr("contenteditable") == Some("true") {
        FieldKind::ContentEditable
    } else {
        FieldKind::Textarea
    }
}
