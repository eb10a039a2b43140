//! Builds the portable transcript: a header framing the hand-off, one
//! block per exchange, and a footer instructing the destination assistant.
//!
//! Pure function of its inputs. The caller supplies the transfer instant
//! so formatting stays deterministic under test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rechat_core::{Message, Role};

/// Metadata about one formatting pass, surfaced in notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferInfo {
    pub source: String,
    pub target: String,
    /// ISO-8601 transfer timestamp.
    pub timestamp: String,
}

/// The assembled transcript plus its transfer metadata.
#[derive(Debug, Clone)]
pub struct FormattedTranscript {
    pub formatted: String,
    pub message_count: usize,
    pub transfer: TransferInfo,
}

/// Format a message list for hand-off from `source` to `target`.
pub fn format_conversation(
    messages: &[Message],
    source: &str,
    target: &str,
    now: DateTime<Utc>,
) -> FormattedTranscript {
    let date = now.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let mut formatted = header(source, target, &date);
    formatted.push_str(&body(messages));
    formatted.push_str(&footer(target));

    FormattedTranscript {
        formatted,
        message_count: messages.len(),
        transfer: TransferInfo {
            source: source.to_string(),
            target: target.to_string(),
            timestamp: now.to_rfc3339(),
        },
    }
}

fn header(source: &str, target: &str, date: &str) -> String {
    format!(
        "# 🔄 Conversation Transfer from {source}\n\
         \n\
         **📅 Transfer Date:** {date}  \n\
         **🔀 Source:** {source} → {target}\n\
         \n\
         ---\n\
         \n\
         ## 🎯 System Context\n\
         \n\
         This conversation was initiated on **{source}**. Please conduct an objective \
         analysis of the preceding conversation. While maintaining awareness of the \
         established context, you are expected to provide independent evaluation and \
         reasoning.\n\
         \n\
         **Key Instructions:**\n\
         - When your analysis aligns with previous responses, acknowledge this alignment\n\
         - When your assessment differs from or corrects previous information, clearly \
         indicate the discrepancy and provide your reasoning\n\
         - Your primary obligation is to accuracy and helpfulness, not consistency with \
         prior responses\n\
         \n\
         ---\n\
         \n\
         ## 💬 Conversation History\n\
         \n"
    )
}

/// One "Exchange N" block per user turn; the paired assistant turn closes
/// the block with a separator. A trailing user turn stays open: no
/// synthetic assistant placeholder is ever inserted.
fn body(messages: &[Message]) -> String {
    let mut out = String::new();
    let mut exchange = 1;

    for message in messages {
        let stamp = time_of_day(&message.timestamp)
            .map(|t| format!("*({t})*"))
            .unwrap_or_default();

        match message.role {
            Role::User => {
                out.push_str(&format!("### 🔸 Exchange {exchange}\n\n"));
                out.push_str(&format!("**👤 User** {stamp}\n"));
                out.push_str(&format!("> {}\n\n", normalize_content(&message.content)));
            }
            Role::Assistant => {
                out.push_str(&format!("**🤖 Assistant** {stamp}\n"));
                out.push_str(&format!("{}\n\n", normalize_content(&message.content)));
                out.push_str("---\n\n");
                exchange += 1;
            }
        }
    }

    out
}

fn footer(target: &str) -> String {
    format!(
        "## 🚀 Transition Point\n\
         **{target} Assistant Taking Over**\n\
         \n\
         Please analyze the user's most recent message in the conversation above and \
         respond appropriately:\n\
         \n\
         - **If it's a question or request:** Provide a comprehensive answer\n\
         - **If it's a statement or comment:** Acknowledge it and provide relevant \
         follow-up or insights as needed\n\
         \n\
         Base your response on the full conversation context while applying your \
         independent judgment and analysis.\n\
         \n\
         ---\n\
         \n\
         *Ready to continue the conversation...*"
    )
}

/// Trim each line, drop blanks, rejoin with blank lines between.
fn normalize_content(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Time-of-day rendering of an RFC 3339 timestamp, if it parses.
fn time_of_day(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msg(role: Role, content: &str, index: usize) -> Message {
        Message {
            role,
            content: content.to_string(),
            timestamp: "2025-03-01T10:15:30Z".to_string(),
            index,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 16, 0).unwrap()
    }

    #[test]
    fn test_single_exchange_chatgpt_to_claude() {
        let messages = vec![
            msg(Role::User, "Explain recursion", 0),
            msg(Role::Assistant, "Recursion is...", 1),
        ];
        let result = format_conversation(&messages, "ChatGPT", "Claude", fixed_now());

        assert_eq!(result.message_count, 2);
        assert_eq!(result.transfer.source, "ChatGPT");
        assert_eq!(result.transfer.target, "Claude");

        let text = &result.formatted;
        assert_eq!(text.matches("### 🔸 Exchange").count(), 1);
        assert!(text.contains("### 🔸 Exchange 1"));
        let user_pos = text.find("**👤 User**").unwrap();
        let assistant_pos = text.find("**🤖 Assistant**").unwrap();
        assert!(user_pos < assistant_pos);
        assert!(text.contains("**Claude Assistant Taking Over**"));
        assert!(text.ends_with("*Ready to continue the conversation...*"));
    }

    #[test]
    fn test_exchange_count_matches_user_turns() {
        let messages = vec![
            msg(Role::User, "first question", 0),
            msg(Role::Assistant, "first answer", 1),
            msg(Role::User, "second question", 2),
            msg(Role::Assistant, "second answer", 3),
            msg(Role::User, "third question", 4),
        ];
        let result = format_conversation(&messages, "Claude", "Gemini", fixed_now());

        let user_turns = messages.iter().filter(|m| m.role == Role::User).count();
        assert_eq!(
            result.formatted.matches("### 🔸 Exchange").count(),
            user_turns
        );
        assert!(result.formatted.contains("### 🔸 Exchange 3"));
    }

    #[test]
    fn test_trailing_user_turn_leaves_exchange_open() {
        let messages = vec![msg(Role::User, "anyone there?", 0)];
        let result = format_conversation(&messages, "Gemini", "ChatGPT", fixed_now());

        assert!(result.formatted.contains("### 🔸 Exchange 1"));
        assert!(!result.formatted.contains("**🤖 Assistant**"));
        // The exchange separator only follows assistant turns.
        let body_start = result.formatted.find("### 🔸 Exchange 1").unwrap();
        let footer_start = result.formatted.find("## 🚀 Transition Point").unwrap();
        assert!(!result.formatted[body_start..footer_start].contains("---"));
    }

    #[test]
    fn test_content_lines_trimmed_and_blanks_collapsed() {
        let messages = vec![
            msg(Role::User, "  line one  \n\n   \n  line two  ", 0),
            msg(Role::Assistant, "answer", 1),
        ];
        let result = format_conversation(&messages, "ChatGPT", "Claude", fixed_now());
        assert!(result.formatted.contains("> line one\n\nline two"));
    }

    #[test]
    fn test_message_timestamp_rendered_or_omitted() {
        let mut with_time = msg(Role::User, "question", 0);
        with_time.timestamp = "2025-03-01T10:15:30Z".to_string();
        let result = format_conversation(&[with_time], "ChatGPT", "Claude", fixed_now());
        assert!(result.formatted.contains("**👤 User** *(10:15:30)*"));

        let mut without = msg(Role::User, "question", 0);
        without.timestamp = "not-a-timestamp".to_string();
        let result = format_conversation(&[without], "ChatGPT", "Claude", fixed_now());
        assert!(result.formatted.contains("**👤 User** \n"));
    }

    #[test]
    fn test_header_names_both_platforms_and_date() {
        let result = format_conversation(
            &[msg(Role::User, "question", 0)],
            "Gemini",
            "Claude",
            fixed_now(),
        );
        assert!(result
            .formatted
            .starts_with("# 🔄 Conversation Transfer from Gemini"));
        assert!(result.formatted.contains("**🔀 Source:** Gemini → Claude"));
        assert!(result.formatted.contains("2025-03-01 10:16:00 UTC"));
        assert_eq!(result.transfer.timestamp, fixed_now().to_rfc3339());
    }
}
