//! Per-platform adapter implementations.

mod chatgpt;
mod claude;
mod gemini;

pub use chatgpt::ChatGptAdapter;
pub use claude::ClaudeAdapter;
pub use gemini::GeminiAdapter;
