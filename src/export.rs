//! Manuscript export.
//!
//! An export draft lists the generated messages of a session, pre-selecting
//! the ones long enough to be story text rather than conversation, and
//! renders the selection as a Markdown document.

use crate::core::message::Message;
use crate::core::session::Session;
use crate::error::{Error, Result};
use regex::Regex;

/// Messages with more words than this are included by default.
pub const AUTO_INCLUDE_MIN_WORDS: usize = 50;

/// Genre shown until the writer sets one.
pub const DEFAULT_GENRE: &str = "Chưa phân loại";

/// Notice for a session without generated content.
pub const NOTHING_TO_EXPORT_NOTICE: &str = "Chưa có nội dung để xuất bản.";

/// Notice for a draft with every item excluded.
pub const NOTHING_SELECTED_NOTICE: &str = "Chưa chọn nội dung nào để xuất bản.";

/// One candidate passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
    pub id: String,
    pub text: String,
    pub word_count: usize,
    pub included: bool,
}

impl ExportItem {
    fn from_message(message: &Message) -> Self {
        let word_count = message.effective_word_count();
        Self {
            id: message.id.clone(),
            text: message.text.clone(),
            word_count,
            included: word_count > AUTO_INCLUDE_MIN_WORDS,
        }
    }
}

/// Selection and metadata for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDraft {
    pub title: String,
    pub genre: String,
    pub introduction: String,
    pub items: Vec<ExportItem>,
}

impl ExportDraft {
    /// Build a draft from a session's generated messages.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the session has no generated messages.
    pub fn from_session(session: &Session) -> Result<Self> {
        let items: Vec<ExportItem> = session
            .model_messages()
            .map(ExportItem::from_message)
            .collect();
        if items.is_empty() {
            return Err(Error::Validation(NOTHING_TO_EXPORT_NOTICE.to_string()));
        }

        Ok(Self {
            title: session.title.clone(),
            genre: DEFAULT_GENRE.to_string(),
            introduction: String::new(),
            items,
        })
    }

    /// Flip the inclusion of an item. Returns the new state, or `None` for an unknown ID.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.included = !item.included;
        Some(item.included)
    }

    /// Set the inclusion of an item. Returns `false` for an unknown ID.
    pub fn set_included(&mut self, id: &str, included: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.included = included;
                true
            }
            None => false,
        }
    }

    /// Items currently selected, in conversation order.
    pub fn included(&self) -> impl Iterator<Item = &ExportItem> {
        self.items.iter().filter(|i| i.included)
    }

    /// Total words across the selected items.
    #[must_use]
    pub fn included_words(&self) -> usize {
        self.included().map(|i| i.word_count).sum()
    }

    /// Render the selection as Markdown.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if no item is selected.
    pub fn render(&self) -> Result<String> {
        let passages: Vec<&str> = self.included().map(|i| i.text.trim()).collect();
        if passages.is_empty() {
            return Err(Error::Validation(NOTHING_SELECTED_NOTICE.to_string()));
        }

        let mut out = format!("# {}\n\n*{}*\n", self.title, self.genre);
        if !self.introduction.trim().is_empty() {
            out.push_str("\n> ");
            out.push_str(&self.introduction.trim().replace('\n', "\n> "));
            out.push('\n');
        }
        out.push_str("\n---\n\n");
        out.push_str(&passages.join("\n\n---\n\n"));
        out.push('\n');
        Ok(out)
    }

    /// File name derived from the title: every character outside ASCII
    /// letters and digits becomes `_`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let stem = sanitize(&self.title).unwrap_or_else(|| "export".to_string());
        format!("{stem}.md")
    }
}

fn sanitize(title: &str) -> Option<String> {
    let re = Regex::new(r"[^a-zA-Z0-9]").ok()?;
    Some(re.replace_all(title, "_").into_owned())
}
