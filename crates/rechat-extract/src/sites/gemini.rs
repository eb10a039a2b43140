//! Gemini adapter — custom-element containers, Quill-style editor input.

use async_trait::async_trait;
use scraper::Html;

use rechat_core::{Platform, Result};

use crate::adapter::{
    build_record, collect_messages, find_title, locate_input_field, wait_for_ready, ExtractTiming,
    ExtractionOutcome, SiteAdapter,
};
use crate::classify::{RoleRules, Signal};
use crate::locate::locate_containers;
use crate::page::{FieldHandle, FieldKind, PageDriver};

const CONTAINER_STRATEGIES: &[&str] = &[
    "user-query, model-response",
    "[data-test-render-count] > div",
    ".conversation-container > div",
];

const CONTENT_SELECTORS: &[&str] = &[
    "[data-testid=\"user-message\"]",
    "message-content .markdown",
    ".markdown p",
    ".whitespace-pre-wrap",
    ".whitespace-normal",
];

const READY_SELECTOR: &str = "user-query, model-response, [data-test-render-count] > div";

const INPUT_SELECTORS: &[&str] = &[
    ".ql-editor",
    "textarea[aria-label*=\"message\"]",
    ".input-area textarea",
];

const TITLE_SELECTORS: &[&str] = &["h1", ".conversation-title"];

const RULES: RoleRules = RoleRules {
    user_markers: &[Signal::Tag("user-query")],
    assistant_markers: &[Signal::Tag("model-response")],
    user_nested: &["[data-testid=\"user-message\"]"],
    assistant_nested: &["message-content", ".markdown"],
    user_tokens: &["user-message", "user"],
    assistant_tokens: &["model-message", "assistant", "gemini"],
};

pub struct GeminiAdapter {
    timing: ExtractTiming,
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self::with_timing(ExtractTiming::default())
    }

    pub fn with_timing(timing: ExtractTiming) -> Self {
        Self { timing }
    }
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for GeminiAdapter {
    fn platform(&self) -> Platform {
        Platform::Gemini
    }

    async fn wait_for_content(&self, page: &dyn PageDriver) -> Result<()> {
        wait_for_ready(page, READY_SELECTOR, &self.timing).await
    }

    async fn extract(&self, page: &dyn PageDriver) -> Result<ExtractionOutcome> {
        self.wait_for_content(page).await?;
        let html = page.html().await?;
        let doc = Html::parse_document(&html);

        let containers = locate_containers(&doc, CONTAINER_STRATEGIES);
        let (messages, skipped) = collect_messages(&containers, &RULES, CONTENT_SELECTORS);
        build_record(self.platform(), page, self.title(&doc), messages, skipped)
    }

    fn title(&self, doc: &Html) -> String {
        find_title(doc, TITLE_SELECTORS, "Gemini Conversation")
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

        match field.kind {
            FieldKind::ProseMirror | FieldKind::ContentEditable => {
                page.set_text_content(&field.selector, text).await?;
                page.dispatch_event(&field.selector, "input").await?;
            }
            FieldKind::Textarea => {
                page.set_value(&field.selector, text).await?;
                page.dispatch_event(&field.selector, "input").await?;
                page.dispatch_event(&field.selector, "change").await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::{PageOp, StaticPage};
    use rechat_core::Role;
    use std::time::Duration;

    fn fast_adapter() -> GeminiAdapter {
        GeminiAdapter::with_timing(ExtractTiming {
            content_poll_interval: Duration::from_millis(1),
            content_deadline: Duration::from_millis(5),
            input_retry_delay: Duration::from_millis(1),
        })
    }

    const PAGE: &str = r#"
        <h1>Trait objects</h1>
        <user-query>
            <span data-testid="user-message">When should I use dyn Trait?</span>
        </user-query>
        <model-response>
            <message-content>
                <div class="markdown"><p>Use dyn when you need runtime polymorphism.</p></div>
            </message-content>
        </model-response>
    "#;

    #[tokio::test]
    async fn test_extract_custom_element_containers() {
        let page = StaticPage::new("https://gemini.google.com/app", PAGE);
        let outcome = fast_adapter().extract(&page).await.unwrap();

        let record = outcome.record;
        assert_eq!(record.source, "Gemini");
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[0].role, Role::User);
        assert_eq!(record.messages[0].content, "When should I use dyn Trait?");
        assert_eq!(record.messages[1].role, Role::Assistant);
        assert_eq!(
            record.messages[1].content,
            "Use dyn when you need runtime polymorphism."
        );
    }

    #[tokio::test]
    async fn test_insert_into_quill_editor() {
        let page = StaticPage::new("https://gemini.google.com/app", "");
        let field = FieldHandle {
            selector: ".ql-editor".into(),
            kind: FieldKind::ContentEditable,
        };
        fast_adapter()
            .insert_text(&page, &field, "carried over")
            .await
            .unwrap();

        assert_eq!(
            page.ops(),
            vec![
                PageOp::Focus(".ql-editor".into()),
                PageOp::SetTextContent(".ql-editor".into(), "carried over".into()),
                PageOp::Dispatch(".ql-editor".into(), "input".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_into_textarea_dispatches_change() {
        let page = StaticPage::new("https://gemini.google.com/app", "");
        let field = FieldHandle {
            selector: ".input-area textarea".into(),
            kind: FieldKind::Textarea,
        };
        fast_adapter()
            .insert_text(&page, &field, "carried over")
            .await
            .unwrap();

        let ops = page.ops();
        assert_eq!(ops.len(), 4);
        assert_eq!(
            ops[3],
            PageOp::Dispatch(".input-area textarea".into(), "change".into())
        );
    }
}
