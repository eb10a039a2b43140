//! Static platform registry — names, URL patterns, entry URLs.

use serde::{Deserialize, Serialize};

/// Supported chat platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "ChatGPT")]
    ChatGPT,
    Claude,
    Gemini,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Self::ChatGPT, Self::Claude, Self::Gemini]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatGPT => "ChatGPT",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
        }
    }

    /// Fixed URL a new destination context is opened at.
    pub fn entry_url(&self) -> &'static str {
        match self {
            Self::ChatGPT => "https://chatgpt.com",
            Self::Claude => "https://claude.ai/chat",
            Self::Gemini => "https://gemini.google.com/app",
        }
    }

    /// Substrings that identify this platform in a page URL.
    pub fn url_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::ChatGPT => &["chatgpt.com", "chat.openai.com"],
            Self::Claude => &["claude.ai"],
            Self::Gemini => &["gemini.google.com", "bard.google.com"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "chatgpt" => Some(Self::ChatGPT),
            "claude" => Some(Self::Claude),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Detect the platform a URL belongs to by substring match.
    pub fn detect(url: &str) -> Option<Self> {
        let url = url.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.url_patterns().iter().any(|pat| url.contains(pat)))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
