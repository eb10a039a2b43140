//! Claude adapter — render-count containers with nested authorship
//! markers, clipboard-paste input.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tokio::time::sleep;

use rechat_core::{Message, Platform, Result, Role};

use crate::adapter::{
    build_record, find_title, locate_input_field, wait_for_ready, ExtractTiming,
    ExtractionOutcome, SiteAdapter, SkipReason, SkippedContainer, MIN_CONTENT_LEN,
};
use crate::page::{FieldHandle, PageDriver};
use crate::walk::preserve_formatting;

const CONTAINER_SELECTOR: &str = "div[data-test-render-count]";
const USER_MARKER: &str = "[data-testid=\"user-message\"]";
const ASSISTANT_MARKER: &str = ".font-claude-message";
const PARAGRAPH_SELECTOR: &str = "p.whitespace-normal.break-words";

const READY_SELECTOR: &str =
    "[data-testid=\"user-message\"], .font-claude-message, [data-test-render-count] > div";

const INPUT_SELECTORS: &[&str] = &[
    "div[contenteditable=\"true\"][role=\"textbox\"][aria-label=\"Write your prompt to Claude\"]",
    ".ProseMirror[contenteditable=\"true\"]",
    "div[contenteditable=\"true\"][role=\"textbox\"]",
    "div[contenteditable=\"true\"]",
];

const TITLE_SELECTORS: &[&str] = &["h1", ".conversation-title"];

pub struct ClaudeAdapter {
    timing: ExtractTiming,
    /// Pause after focusing, before the paste is replayed.
    focus_delay: Duration,
    /// Pause giving the editor time to process the paste.
    settle_delay: Duration,
}

impl ClaudeAdapter {
    pub fn new() -> Self {
        Self::with_timing(ExtractTiming {
            input_retry_delay: Duration::from_secs(2),
            ..ExtractTiming::default()
        })
    }

    pub fn with_timing(timing: ExtractTiming) -> Self {
        Self {
            timing,
            focus_delay: Duration::from_millis(200),
            settle_delay: Duration::from_millis(500),
        }
    }

    #[cfg(test)]
    fn with_fast_paste(mut self) -> Self {
        self.focus_delay = Duration::from_millis(1);
        self.settle_delay = Duration::from_millis(1);
        self
    }

    /// Assistant turns render as a run of normal-whitespace paragraphs;
    /// walk each and rejoin, falling back to walking the whole element.
    fn message_content(content: ElementRef) -> String {
        if let Ok(selector) = Selector::parse(PARAGRAPH_SELECTOR) {
            let paragraphs: Vec<String> =
                content.select(&selector).map(preserve_formatting).collect();
            if !paragraphs.is_empty() {
                return paragraphs.join("\n\n").trim().to_string();
            }
        }
        preserve_formatting(content)
    }
}

impl Default for ClaudeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for ClaudeAdapter {
    fn platform(&self) -> Platform {
        Platform::Claude
    }

    async fn wait_for_content(&self, page: &dyn PageDriver) -> Result<()> {
        wait_for_ready(page, READY_SELECTOR, &self.timing).await
    }

    async fn extract(&self, page: &dyn PageDriver) -> Result<ExtractionOutcome> {
        self.wait_for_content(page).await?;
        let html = page.html().await?;
        let doc = Html::parse_document(&html);

        let mut messages = Vec::new();
        let mut skipped = Vec::new();

        if let (Ok(container_sel), Ok(user_sel), Ok(assistant_sel)) = (
            Selector::parse(CONTAINER_SELECTOR),
            Selector::parse(USER_MARKER),
            Selector::parse(ASSISTANT_MARKER),
        ) {
            for (container_index, container) in doc.select(&container_sel).enumerate() {
                let (role, content_el) =
                    if let Some(el) = container.select(&user_sel).next() {
                        (Role::User, el)
                    } else if let Some(el) = container.select(&assistant_sel).next() {
                        (Role::Assistant, el)
                    } else {
                        skipped.push(SkippedContainer {
                            container_index,
                            reason: SkipReason::Unclassified,
                        });
                        continue;
                    };

                let raw_text: String = content_el.text().collect();
                if raw_text.trim().len() < MIN_CONTENT_LEN {
                    skipped.push(SkippedContainer {
                        container_index,
                        reason: SkipReason::TooShort,
                    });
                    continue;
                }

                let content = Self::message_content(content_el);
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
        }

        build_record(self.platform(), page, self.title(&doc), messages, skipped)
    }

    fn title(&self, doc: &Html) -> String {
        find_title(doc, TITLE_SELECTORS, "Claude Conversation")
    }

    async fn locate_input(&self, page: &dyn PageDriver) -> Result<FieldHandle> {
        locate_input_field(
            page,
            self.platform(),
            INPUT_SELECTORS,
            self.timing.input_retry_delay,
        )
        .await
    }

    async fn insert_text(
        &self,
        page: &dyn PageDriver,
        field: &FieldHandle,
        text: &str,
    ) -> Result<()> {
        page.focus(&field.selector).await?;
        sleep(self.focus_delay).await;
        page.paste_from_clipboard(&field.selector, text).await?;
        sleep(self.settle_delay).await;
        Ok(())
    }
}
