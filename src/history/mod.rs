//! Conversation history kept between turns of a session.
//!
//! Entries are plain strings carrying a role tag so the history can be joined
//! verbatim into a summarization prompt and replayed as chat messages.

mod summarizer;

pub use summarizer::HistorySummarizer;

use crate::llm::ChatMessage;

pub const USER_PREFIX: &str = "User: ";
pub const MODEL_PREFIX: &str = "Model: ";
pub const SUMMARY_PREFIX: &str = "Previous conversation summary: ";
/// Older summary marker still recognized on replay.
const LEGACY_SUMMARY_PREFIX: &str = "Here is the summary";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    entries: Vec<String>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Records one question/answer exchange.
    pub fn push_turn(&mut self, question: &str, answer: &str) {
        self.entries.push(format!("{USER_PREFIX}{question}"));
        self.entries.push(format!("{MODEL_PREFIX}{answer}"));
    }

    /// Replaces every entry with a single summary entry.
    pub fn replace_with_summary(&mut self, summary: &str) {
        self.entries.clear();
        self.entries.push(format!("{SUMMARY_PREFIX}{summary}"));
    }

    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }

    /// Replays the history as chat messages. Summary entries become system
    /// messages; untagged entries are dropped.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .filter_map(|entry| {
                if let Some(content) = entry.strip_prefix(USER_PREFIX) {
                    Some(ChatMessage::user(content))
                } else if let Some(content) = entry.strip_prefix(MODEL_PREFIX) {
                    Some(ChatMessage::assistant(content))
                } else if entry.starts_with(SUMMARY_PREFIX)
                    || entry.starts_with(LEGACY_SUMMARY_PREFIX)
                {
                    Some(ChatMessage::system(entry.clone()))
                } else {
                    None
                }
            })
            .collect()
    }
}
