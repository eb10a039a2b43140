//! Formatting walker — converts a rendered content subtree into
//! markdown-ish text.
//!
//! Single-level recursion over immediate children: nested formatting
//! beyond one level collapses to the inner node's plain text. Unrecognized
//! tags degrade to their text, never fail.

use scraper::node::Node;
use scraper::ElementRef;

/// Walk `element`'s immediate children and concatenate their markdown-ish
/// rendering. The result is trimmed at both ends.
pub fn preserve_formatting(element: ElementRef) -> String {
    let mut content = String::new();
    let within_pre = element.value().name().eq_ignore_ascii_case("pre");

    for child in element.children() {
        match child.value() {
            Node::Text(text) => content.push_str(text),
            Node::Element(_) => {
                let el = match ElementRef::wrap(child) {
                    Some(el) => el,
                    None => continue,
                };
                let text: String = el.text().collect();
                match el.value().name() {
                    "code" => {
                        if within_pre {
                            let lang = fence_language(el).unwrap_or_default();
                            content.push_str(&format!("```{}\n{}\n```", lang, text));
                        } else {
                            content.push_str(&format!("`{}`", text));
                        }
                    }
                    "pre" => content.push_str(&format!("```\n{}\n```", text)),
                    "strong" | "b" => content.push_str(&format!("**{}**", text)),
                    "em" | "i" => content.push_str(&format!("*{}*", text)),
                    "br" => content.push('\n'),
                    "p" => {
                        content.push_str(&text);
                        content.push_str("\n\n");
                    }
                    _ => content.push_str(&text),
                }
            }
            _ => {}
        }
    }

    content.trim().to_string()
}

/// Language tag from a `language-<id>` class, if present.
fn fence_language(el: ElementRef) -> Option<String> {
    el.value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn walk(html: &str) -> String {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("#root").unwrap();
        let root = doc.select(&sel).next().unwrap();
        preserve_formatting(root)
    }

    #[test]
    fn test_plain_text_is_trimmed_and_idempotent() {
        let out = walk("<div id=\"root\">  hello world  </div>");
        assert_eq!(out, "hello world");
        // Re-walking pure text yields the same trimmed text.
        let again = walk(&format!("<div id=\"root\">{}</div>", out));
        assert_eq!(again, out);
    }

    #[test]
    fn test_inline_code_span() {
        let out = walk("<div id=\"root\">run <code>cargo build</code> now</div>");
        assert_eq!(out, "run `cargo build` now");
    }

    #[test]
    fn test_fenced_code_with_language() {
        let out = walk(
            "<pre id=\"root\"><code class=\"language-rust\">fn main() {}</code></pre>",
        );
        assert_eq!(out, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_pre_child_fences_without_language() {
        let out = walk(
            "<div id=\"root\"><pre><code class=\"language-py\">x = 1</code></pre></div>",
        );
        assert_eq!(out, "```\nx = 1\n```");
    }

    #[test]
    fn test_bold_and_italic() {
        let out = walk("<div id=\"root\"><strong>bold</strong> and <em>italic</em></div>");
        assert_eq!(out, "**bold** and *italic*");
        let out = walk("<div id=\"root\"><b>bold</b> and <i>italic</i></div>");
        assert_eq!(out, "**bold** and *italic*");
    }

    #[test]
    fn test_breaks_and_paragraphs() {
        let out = walk("<div id=\"root\">one<br>two</div>");
        assert_eq!(out, "one\ntwo");
        let out = walk("<div id=\"root\"><p>first</p><p>second</p></div>");
        assert_eq!(out, "first\n\nsecond");
    }

    #[test]
    fn test_unrecognized_tag_degrades_to_text() {
        let out = walk("<div id=\"root\"><span>just</span> <table><tr><td>text</td></tr></table></div>");
        assert_eq!(out, "just text");
    }

    #[test]
    fn test_nested_formatting_collapses_to_inner_text() {
        // Single-level recursion: formatting inside a paragraph is lost.
        let out = walk("<div id=\"root\"><p>has <strong>bold</strong> inside</p></div>");
        assert_eq!(out, "has bold inside");
    }
}
