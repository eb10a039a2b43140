//! ChatGPT adapter — authorship attribute model, ProseMirror input.

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
    "[data-message-author-role]",
    ".group.w-full",
    ".conversation-turn",
];

const CONTENT_SELECTORS: &[&str] = &[".prose", ".markdown", ".whitespace-pre-wrap", ".text-message"];

const READY_SELECTOR: &str = "[data-message-author-role], .group.w-full";

const INPUT_SELECTORS: &[&str] = &[
    "#prompt-textarea.ProseMirror",
    ".ProseMirror[contenteditable=\"true\"]",
    "div[contenteditable=\"true\"]#prompt-textarea",
    "#prompt-textarea",
    "textarea[data-id=\"root\"]",
    "textarea[placeholder*=\"message\"]",
];

const TITLE_SELECTORS: &[&str] = &["h1", ".conversation-header"];

const RULES: RoleRules = RoleRules {
    user_markers: &[Signal::Attr("data-message-author-role", "user")],
    assistant_markers: &[Signal::Attr("data-message-author-role", "assistant")],
    user_nested: &[],
    assistant_nested: &[],
    user_tokens: &["user"],
    assistant_tokens: &["assistant", "gpt"],
};

pub struct ChatGptAdapter {
    timing: ExtractTiming,
}

impl ChatGptAdapter {
    pub fn new() -> Self {
        Self::with_timing(ExtractTiming::default())
    }

    pub fn with_timing(timing: ExtractTiming) -> Self {
        Self { timing }
    }
}

impl Default for ChatGptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for ChatGptAdapter {
    fn platform(&self) -> Platform {
        Platform::ChatGPT
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
        find_title(doc, TITLE_SELECTORS, "ChatGPT Conversation")
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
            FieldKind::ProseMirror => {
                let paragraphs: Vec<String> =
                    text.split("\n\n").map(str::to_string).collect();
                page.set_paragraphs(&field.selector, &paragraphs).await?;
            }
            FieldKind::ContentEditable => {
                page.set_text_content(&field.selector, text).await?;
            }
            FieldKind::Textarea => {
                page.set_value(&field.selector, text).await?;
            }
        }

        for event in ["input", "change", "keyup"] {
            page.dispatch_event(&field.selector, event).await?;
        }
        if field.kind == FieldKind::ProseMirror {
            for event in ["focus", "blur", "focus"] {
                page.dispatch_event(&field.selector, event).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::{PageOp, StaticPage};
    use rechat_core::{Error, Role};
    use std::time::Duration;

    fn fast_adapter() -> ChatGptAdapter {
        ChatGptAdapter::with_timing(ExtractTiming {
            content_poll_interval: Duration::from_millis(1),
            content_deadline: Duration::from_millis(5),
            input_retry_delay: Duration::from_millis(1),
        })
    }

    const PAGE: &str = r#"
        <h1>Borrowing questions</h1>
        <div data-message-author-role="user">
            <div class="whitespace-pre-wrap">Explain the borrow checker</div>
        </div>
        <div data-message-author-role="assistant">
            <div class="markdown">
                <p>The borrow checker enforces aliasing rules.</p>
                <pre><code class="language-rust">let x = &amp;y;</code></pre>
            </div>
        </div>
    "#;

    #[tokio::test]
    async fn test_extract_alternating_conversation() {
        let page = StaticPage::new("https://chatgpt.com/c/1", PAGE);
        let outcome = fast_adapter().extract(&page).await.unwrap();

        let record = outcome.record;
        assert_eq!(record.source, "ChatGPT");
        assert_eq!(record.title, "Borrowing questions");
        assert_eq!(record.url, "https://chatgpt.com/c/1");
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[0].role, Role::User);
        assert_eq!(record.messages[0].content, "Explain the borrow checker");
        assert_eq!(record.messages[1].role, Role::Assistant);
        assert!(record.messages[1]
            .content
            .contains("The borrow checker enforces aliasing rules."));
        assert!(record.messages[1].content.contains("```\nlet x = &y;\n```"));
        assert!(outcome.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_extract_empty_page_is_empty_conversation() {
        let page = StaticPage::new("https://chatgpt.com", "<main><h1>ChatGPT</h1></main>");
        let err = fast_adapter().extract(&page).await.unwrap_err();
        assert!(matches!(err, Error::EmptyConversation));
    }

    #[tokio::test]
    async fn test_insert_into_prosemirror() {
        let page = StaticPage::new("https://chatgpt.com", "");
        let field = FieldHandle {
            selector: "#prompt-textarea.ProseMirror".into(),
            kind: FieldKind::ProseMirror,
        };
        fast_adapter()
            .insert_text(&page, &field, "first para\nline two\n\nsecond para")
            .await
            .unwrap();

        let sel = field.selector.clone();
        assert_eq!(
            page.ops(),
            vec![
                PageOp::Focus(sel.clone()),
                PageOp::SetParagraphs(
                    sel.clone(),
                    vec!["first para\nline two".into(), "second para".into()]
                ),
                PageOp::Dispatch(sel.clone(), "input".into()),
                PageOp::Dispatch(sel.clone(), "change".into()),
                PageOp::Dispatch(sel.clone(), "keyup".into()),
                PageOp::Dispatch(sel.clone(), "focus".into()),
                PageOp::Dispatch(sel.clone(), "blur".into()),
                PageOp::Dispatch(sel, "focus".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_into_textarea_overwrites_value() {
        let page = StaticPage::new("https://chatgpt.com", "");
        let field = FieldHandle {
            selector: "textarea[data-id=\"root\"]".into(),
            kind: FieldKind::Textarea,
        };
        fast_adapter()
            .insert_text(&page, &field, "hello")
            .await
            .unwrap();

        let ops = page.ops();
        assert_eq!(ops[1], PageOp::SetValue(field.selector.clone(), "hello".into()));
        // No ProseMirror-specific focus cycling for plain fields.
        assert_eq!(ops.len(), 5);
    }

    #[tokio::test]
    async fn test_locate_input_prefers_prosemirror_selector() {
        let page = StaticPage::new(
            "https://chatgpt.com",
            r#"<div id="prompt-textarea" class="ProseMirror" contenteditable="true"></div>"#,
        );
        let handle = fast_adapter().locate_input(&page).await.unwrap();
        assert_eq!(handle.selector, "#prompt-textarea.ProseMirror");
        assert_eq!(handle.kind, FieldKind::ProseMirror);
    }
}
