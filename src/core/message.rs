//! Message and mode types.

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text of the message seeded into every new session.
pub const WELCOME_TEXT: &str = "Xin chào! Tôi là **Ink & Mind**. Hãy dùng lệnh `settings` để tùy chỉnh giọng văn, ngôi kể nếu cần, sau đó bắt đầu viết nhé!";

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a time-ordered unique identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Count whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The writer.
    User,
    /// The language model.
    Model,
}

/// Behavior profile selected for an outgoing message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Write stories, chapters, dialogue, scenes.
    #[default]
    Creative,
    /// Polish style, grammar and story logic.
    Editor,
    /// Plot outlines, chapter order, pacing.
    Structure,
    /// Summaries, analysis and notes.
    Reader,
    /// Titles, cover prompts, spell checks.
    Utility,
}

/// Display data for a mode.
#[derive(Debug)]
pub struct ModeProfile {
    /// Tag sent to the model, e.g. `CREATIVE`.
    pub tag: &'static str,
    /// Short label.
    pub label: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Terminal glyph.
    pub icon: &'static str,
}

/// Indexed by `Mode as usize`; order must match the enum.
const MODE_PROFILES: [ModeProfile; 5] = [
    ModeProfile {
        tag: "CREATIVE",
        label: "Chế độ Sáng tác",
        description: "Viết truyện, chương mới, hội thoại hoặc mô tả cảnh.",
        icon: "✎",
    },
    ModeProfile {
        tag: "EDITOR",
        label: "Chế độ Biên tập",
        description: "Chỉnh sửa văn phong, ngữ pháp và logic câu chuyện.",
        icon: "✂",
    },
    ModeProfile {
        tag: "STRUCTURE",
        label: "Chế độ Dàn ý",
        description: "Xây dựng cốt truyện, sắp xếp chương và nhịp độ.",
        icon: "☰",
    },
    ModeProfile {
        tag: "READER",
        label: "Chế độ Đọc hiểu",
        description: "Tóm tắt, phân tích và ghi chú nội dung.",
        icon: "❧",
    },
    ModeProfile {
        tag: "UTILITY",
        label: "Công cụ Tiện ích",
        description: "Tạo tiêu đề, prompt ảnh bìa, kiểm tra chính tả.",
        icon: "⚙",
    },
];

impl Mode {
    /// All modes in menu order.
    pub const ALL: [Mode; 5] = [
        Mode::Creative,
        Mode::Editor,
        Mode::Structure,
        Mode::Reader,
        Mode::Utility,
    ];

    /// Display data for this mode.
    #[must_use]
    pub fn profile(self) -> &'static ModeProfile {
        &MODE_PROFILES[self as usize]
    }

    /// Tag sent to the model.
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.profile().tag
    }
}

/// One turn in a session. Never edited once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier.
    pub id: String,

    /// Author.
    pub role: Role,

    /// Message body (Markdown).
    pub text: String,

    /// Creation time, epoch milliseconds.
    pub timestamp: i64,

    /// Word count, set on generated messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,

    /// Mode the reply was generated in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_used: Option<Mode>,
}

impl Message {
    /// Create a message authored by the writer.
    #[must_use]
    pub fn user(text: &str) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            text: text.to_string(),
            timestamp: now_millis(),
            word_count: None,
            mode_used: None,
        }
    }

    /// Create a generated message, recording its word count and mode.
    #[must_use]
    pub fn model(text: &str, mode: Mode) -> Self {
        Self {
            id: new_id(),
            role: Role::Model,
            text: text.to_string(),
            timestamp: now_millis(),
            word_count: Some(word_count(text)),
            mode_used: Some(mode),
        }
    }

    /// Create the greeting seeded into a new session.
    #[must_use]
    pub fn welcome() -> Self {
        Self {
            id: format!("welcome-{}", new_id()),
            role: Role::Model,
            text: WELCOME_TEXT.to_string(),
            timestamp: now_millis(),
            word_count: None,
            mode_used: Some(Mode::Creative),
        }
    }

    /// Stored word count, or a fresh count for messages that predate it.
    #[must_use]
    pub fn effective_word_count(&self) -> usize {
        self.word_count.unwrap_or_else(|| word_count(&self.text))
    }
}
