//! Word statistics for a session.

use crate::core::message::{Message, Role};

/// Words produced by one generated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    /// Display label, `Mục <n>`.
    pub label: String,
    pub words: usize,
    /// Running total including this entry.
    pub cumulative: usize,
}

/// Per-session output statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub entries: Vec<StatEntry>,
    pub total_words: usize,
    /// Rounded mean words per entry; zero when there are no entries.
    pub average_words: usize,
}

impl SessionStats {
    /// Summarize generated messages that carry a positive word count.
    ///
    /// Messages without a stored count (such as the welcome message) are skipped.
    #[must_use]
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut entries = Vec::new();
        let mut total = 0;
        for words in messages
            .iter()
            .filter(|m| m.role == Role::Model)
            .filter_map(|m| m.word_count)
            .filter(|&w| w > 0)
        {
            total += words;
            entries.push(StatEntry {
                label: format!("Mục {}", entries.len() + 1),
                words,
                cumulative: total,
            });
        }

        let average_words = if entries.is_empty() {
            0
        } else {
            // Round half up in integer arithmetic.
            (2 * total + entries.len()) / (2 * entries.len())
        };

        Self {
            entries,
            total_words: total,
            average_words,
        }
    }

    /// Largest single entry, if any.
    #[must_use]
    pub fn longest(&self) -> Option<&StatEntry> {
        self.entries.iter().max_by_key(|e| e.words)
    }
}
