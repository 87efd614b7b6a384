//! Writing sessions and the session store.
//!
//! The store keeps every session in memory and writes the whole collection
//! back to the key-value backend after each mutation.

use crate::core::message::{Message, Role, new_id, now_millis};
use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, SESSIONS_KEY};
use serde::{Deserialize, Serialize};

/// Title given to new sessions until the first prompt renames them.
pub const DEFAULT_TITLE: &str = "Tác phẩm mới";

/// Notice shown when deleting the last remaining session.
pub const LAST_SESSION_NOTICE: &str = "Bạn cần giữ lại ít nhất một tác phẩm.";

/// Notice shown when renaming to an empty title.
pub const EMPTY_TITLE_NOTICE: &str = "Tên tác phẩm không được để trống.";

/// Number of prompt words used for an automatic title.
const AUTO_TITLE_WORDS: usize = 6;

/// Auto-titling only happens while a session is this short.
const AUTO_TITLE_MAX_MESSAGES: usize = 2;

/// One writing conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Chronological, append-only message log.
    pub messages: Vec<Message>,

    /// Last mutation time, epoch milliseconds.
    pub last_updated: i64,
}

impl Session {
    /// Create a session seeded with the welcome message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: new_id(),
            title: DEFAULT_TITLE.to_string(),
            messages: vec![Message::welcome()],
            last_updated: now_millis(),
        }
    }

    /// Whether the title is still the placeholder.
    #[must_use]
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Messages generated by the model.
    pub fn model_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role == Role::Model)
    }

    /// Refresh `last_updated` without ever moving it backwards.
    fn touch(&mut self) {
        self.last_updated = self.last_updated.max(now_millis());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a title from the first words of a prompt.
///
/// Returns `None` when the prompt has no words.
#[must_use]
pub fn derive_title(prompt: &str) -> Option<String> {
    let words: Vec<&str> = prompt.split_whitespace().take(AUTO_TITLE_WORDS).collect();
    if words.is_empty() {
        return None;
    }
    Some(format!("{}...", words.join(" ")))
}

/// In-memory session collection with write-through persistence.
pub struct SessionStore<'a> {
    store: &'a dyn KeyValueStore,
    /// Storage order; new sessions go to the front.
    sessions: Vec<Session>,
    active_id: String,
}

impl std::fmt::Debug for SessionStore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.len())
            .field("active_id", &self.active_id)
            .finish_non_exhaustive()
    }
}

impl<'a> SessionStore<'a> {
    /// Load the persisted collection.
    ///
    /// Missing, unreadable or empty data is replaced by one fresh session,
    /// which is persisted immediately. The most recently updated session
    /// becomes active.
    pub fn load_all(store: &'a dyn KeyValueStore) -> Self {
        let mut sessions = match read_sessions(store) {
            Ok(Some(sessions)) => sessions,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load sessions, starting fresh");
                Vec::new()
            }
        };

        let seeded = sessions.is_empty();
        if seeded {
            sessions.push(Session::new());
        }

        let mut this = Self {
            store,
            sessions,
            active_id: String::new(),
        };
        this.active_id = this.first_id().unwrap_or_default();

        if seeded {
            this.persist();
        }
        this
    }

    /// Sessions in display order (most recently updated first).
    #[must_use]
    pub fn sessions(&self) -> Vec<&Session> {
        let mut ordered: Vec<&Session> = self.sessions.iter().collect();
        ordered.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        ordered
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the collection is empty. Only possible for a store that failed
    /// to uphold its invariant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look up a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// ID of the active session.
    #[must_use]
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active session.
    #[must_use]
    pub fn active(&self) -> &Session {
        self.get(&self.active_id).unwrap_or(&self.sessions[0])
    }

    /// Create a new session and make it active.
    pub fn create(&mut self) -> &Session {
        let session = Session::new();
        self.active_id.clone_from(&session.id);
        self.sessions.insert(0, session);
        self.persist();
        &self.sessions[0]
    }

    /// Make a session active.
    ///
    /// Unknown IDs fall back to the first session in display order.
    /// Returns the ID that is active afterwards.
    pub fn select(&mut self, id: &str) -> &str {
        if self.get(id).is_some() {
            self.active_id = id.to_string();
        } else if let Some(first) = self.first_id() {
            tracing::debug!(requested = id, fallback = %first, "unknown session, selecting first");
            self.active_id = first;
        }
        &self.active_id
    }

    /// Rename a session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for an empty or whitespace-only title and
    /// `Error::SessionNotFound` for an unknown ID. Nothing changes on error.
    pub fn rename(&mut self, id: &str, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation(EMPTY_TITLE_NOTICE.to_string()));
        }

        let session = self.get_mut(id)?;
        session.title = title.to_string();
        session.touch();
        self.persist();
        Ok(())
    }

    /// Delete a session.
    ///
    /// If the deleted session was active, the session before it in display
    /// order becomes active, or the first remaining one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when only one session exists and
    /// `Error::SessionNotFound` for an unknown ID. Nothing changes on error.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        if self.sessions.len() <= 1 {
            return Err(Error::Validation(LAST_SESSION_NOTICE.to_string()));
        }

        let order: Vec<String> = self.sessions().iter().map(|s| s.id.clone()).collect();
        let position = order
            .iter()
            .position(|s| s == id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;

        self.sessions.retain(|s| s.id != id);

        if self.active_id == id {
            let remaining: Vec<&String> = order.iter().filter(|s| *s != id).collect();
            let next = remaining
                .get(position.saturating_sub(1))
                .or_else(|| remaining.first());
            if let Some(next) = next {
                self.active_id.clone_from(next);
            }
        }

        self.persist();
        Ok(())
    }

    /// Append a message to a session.
    ///
    /// A session still carrying the placeholder title with at most two
    /// messages is renamed after the first words of the triggering user
    /// message: the appended one if it is from the user, otherwise the latest
    /// user message already in the log.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` for an unknown ID.
    pub fn append_message(&mut self, session_id: &str, message: Message) -> Result<()> {
        let session = self.get_mut(session_id)?;

        let auto_title = if session.messages.len() <= AUTO_TITLE_MAX_MESSAGES
            && session.has_default_title()
        {
            let trigger = if message.role == Role::User {
                Some(message.text.as_str())
            } else {
                session
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.text.as_str())
            };
            trigger.and_then(derive_title)
        } else {
            None
        };

        session.messages.push(message);
        if let Some(title) = auto_title {
            session.title = title;
        }
        session.touch();

        self.persist();
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    fn first_id(&self) -> Option<String> {
        self.sessions().first().map(|s| s.id.clone())
    }

    /// Write the whole collection back. Failures are logged, not surfaced.
    fn persist(&self) {
        let result = serde_json::to_string(&self.sessions)
            .map_err(Error::from)
            .and_then(|json| self.store.put(SESSIONS_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to save sessions");
        }
    }
}

/// Read and parse the persisted collection.
fn read_sessions(store: &dyn KeyValueStore) -> Result<Option<Vec<Session>>> {
    match store.get(SESSIONS_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Mode;
    use crate::storage::MemoryBackend;

    fn stored_sessions(store: &MemoryBackend) -> Vec<Session> {
        let json = store.get(SESSIONS_KEY).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn fresh_store_seeds_one_session() {
        let store = MemoryBackend::new();
        let sessions = SessionStore::load_all(&store);

        assert_eq!(sessions.len(), 1);
        let session = sessions.active();
        assert_eq!(session.title, DEFAULT_TITLE);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Model);

        // Seed is persisted right away
        assert_eq!(stored_sessions(&store).len(), 1);
    }

    #[test]
    fn corrupted_data_falls_back_to_seed() {
        let store = MemoryBackend::with_entry(SESSIONS_KEY, "{ not json");
        let sessions = SessionStore::load_all(&store);
        assert_eq!(sessions.len(), 1);
        assert!(sessions.active().has_default_title());
    }

    #[test]
    fn empty_array_falls_back_to_seed() {
        let store = MemoryBackend::with_entry(SESSIONS_KEY, "[]");
        let sessions = SessionStore::load_all(&store);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn loads_original_wire_format() {
        let json = r#"[{
            "id": "1700000000000",
            "title": "Rồng lửa",
            "messages": [
                {"id": "welcome-1700000000000", "role": "model", "text": "Xin chào!", "timestamp": 1700000000000, "modeUsed": "CREATIVE"},
                {"id": "1700000000500", "role": "user", "text": "Tạo truyện về rồng", "timestamp": 1700000000500},
                {"id": "1700000000501", "role": "model", "text": "Một câu chuyện", "timestamp": 1700000000900, "wordCount": 3, "modeUsed": "CREATIVE"}
            ],
            "lastUpdated": 1700000000900,
            "preview": "ignored"
        }]"#;
        let store = MemoryBackend::with_entry(SESSIONS_KEY, json);
        let sessions = SessionStore::load_all(&store);

        assert_eq!(sessions.len(), 1);
        let session = sessions.active();
        assert_eq!(session.id, "1700000000000");
        assert_eq!(session.title, "Rồng lửa");
        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.messages[2].word_count, Some(3));
    }

    #[test]
    fn most_recent_session_is_active_after_load() {
        let mut older = Session::new();
        older.id = "older".to_string();
        older.last_updated = 1_000;
        let mut newer = Session::new();
        newer.id = "newer".to_string();
        newer.last_updated = 2_000;

        let json = serde_json::to_string(&vec![older, newer]).unwrap();
        let store = MemoryBackend::with_entry(SESSIONS_KEY, &json);
        let sessions = SessionStore::load_all(&store);

        assert_eq!(sessions.active_id(), "newer");
        let order: Vec<&str> = sessions.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["newer", "older"]);
    }

    #[test]
    fn create_adds_active_session() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let first = sessions.active_id().to_string();

        let created = sessions.create().id.clone();

        assert_eq!(sessions.len(), 2);
        assert_ne!(created, first);
        assert_eq!(sessions.active_id(), created);
        assert_eq!(sessions.active().title, DEFAULT_TITLE);
        assert_eq!(stored_sessions(&store).len(), 2);
        // New sessions are stored at the front
        assert_eq!(stored_sessions(&store)[0].id, created);
    }

    #[test]
    fn select_known_session() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let first = sessions.active_id().to_string();
        sessions.create();

        assert_eq!(sessions.select(&first), first);
        assert_eq!(sessions.active_id(), first);
    }

    #[test]
    fn select_unknown_falls_back_to_first_displayed() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        sessions.create();
        let expected = sessions.sessions()[0].id.clone();

        let selected = sessions.select("missing").to_string();
        assert_eq!(selected, expected);
    }

    #[test]
    fn rename_updates_title_and_timestamp() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let id = sessions.active_id().to_string();
        let before = sessions.active().last_updated;

        sessions.rename(&id, "  Chapter One  ").unwrap();

        let session = sessions.get(&id).unwrap();
        assert_eq!(session.title, "Chapter One");
        assert!(session.last_updated >= before);
        assert_eq!(stored_sessions(&store)[0].title, "Chapter One");
    }

    #[test]
    fn rename_rejects_blank_titles() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let id = sessions.active_id().to_string();

        for blank in ["", "   ", "\t\n"] {
            let err = sessions.rename(&id, blank).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert_eq!(sessions.active().title, DEFAULT_TITLE);
    }

    #[test]
    fn rename_unknown_session() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let err = sessions.rename("missing", "Title").unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
    }

    #[test]
    fn delete_last_session_is_rejected() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let id = sessions.active_id().to_string();

        let err = sessions.delete(&id).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(sessions.len(), 1);
        assert!(sessions.get(&id).is_some());
    }

    #[test]
    fn delete_unknown_session() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        sessions.create();
        let err = sessions.delete("missing").unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
        assert_eq!(sessions.len(), 2);
    }

    fn store_with_ordered_sessions(ids: &[&str]) -> MemoryBackend {
        // First id is the most recently updated.
        let count = i64::try_from(ids.len()).unwrap();
        let sessions: Vec<Session> = ids
            .iter()
            .zip(0..)
            .map(|(id, i)| {
                let mut s = Session::new();
                s.id = (*id).to_string();
                s.last_updated = 10_000 + (count - i) * 100;
                s
            })
            .collect();
        MemoryBackend::with_entry(SESSIONS_KEY, &serde_json::to_string(&sessions).unwrap())
    }

    #[test]
    fn delete_active_moves_to_preceding_session() {
        let store = store_with_ordered_sessions(&["a", "b", "c"]);
        let mut sessions = SessionStore::load_all(&store);
        sessions.select("c");

        sessions.delete("c").unwrap();
        assert_eq!(sessions.active_id(), "b");
    }

    #[test]
    fn delete_first_active_moves_to_next_first() {
        let store = store_with_ordered_sessions(&["a", "b", "c"]);
        let mut sessions = SessionStore::load_all(&store);
        assert_eq!(sessions.active_id(), "a");

        sessions.delete("a").unwrap();
        assert_eq!(sessions.active_id(), "b");
    }

    #[test]
    fn delete_inactive_keeps_active() {
        let store = store_with_ordered_sessions(&["a", "b", "c"]);
        let mut sessions = SessionStore::load_all(&store);
        sessions.select("c");

        sessions.delete("a").unwrap();
        assert_eq!(sessions.active_id(), "c");
        assert_eq!(stored_sessions(&store).len(), 2);
    }

    #[test]
    fn append_grows_log_and_bumps_timestamp() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let id = sessions.active_id().to_string();
        let before = sessions.active().clone();

        sessions
            .append_message(&id, Message::user("Viết tiếp chương hai"))
            .unwrap();

        let after = sessions.get(&id).unwrap();
        assert_eq!(after.messages.len(), before.messages.len() + 1);
        assert!(after.last_updated >= before.last_updated);
        assert_eq!(stored_sessions(&store)[0].messages.len(), 2);
    }

    #[test]
    fn append_to_unknown_session() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let err = sessions
            .append_message("missing", Message::user("hi"))
            .unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
    }

    #[test]
    fn first_prompt_sets_auto_title() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let id = sessions.active_id().to_string();

        sessions
            .append_message(
                &id,
                Message::user("Một con rồng già sống trên đỉnh núi tuyết"),
            )
            .unwrap();

        assert_eq!(
            sessions.get(&id).unwrap().title,
            "Một con rồng già sống trên..."
        );
    }

    #[test]
    fn auto_title_uses_latest_user_message_for_model_reply() {
        let mut session = Session::new();
        session.messages.push(Message::user("Kể chuyện cổ tích"));
        let json = serde_json::to_string(&vec![session.clone()]).unwrap();
        let store = MemoryBackend::with_entry(SESSIONS_KEY, &json);
        let mut sessions = SessionStore::load_all(&store);

        sessions
            .append_message(&session.id, Message::model("Ngày xửa ngày xưa", Mode::Creative))
            .unwrap();

        assert_eq!(sessions.get(&session.id).unwrap().title, "Kể chuyện cổ tích...");
    }

    #[test]
    fn auto_title_skipped_for_longer_sessions() {
        let mut session = Session::new();
        session.messages.push(Message::user("một"));
        session.messages.push(Message::model("hai", Mode::Creative));
        let json = serde_json::to_string(&vec![session.clone()]).unwrap();
        let store = MemoryBackend::with_entry(SESSIONS_KEY, &json);
        let mut sessions = SessionStore::load_all(&store);

        sessions
            .append_message(&session.id, Message::user("ba bốn năm"))
            .unwrap();

        assert_eq!(sessions.get(&session.id).unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn auto_title_never_overwrites_renamed_title() {
        let store = MemoryBackend::new();
        let mut sessions = SessionStore::load_all(&store);
        let id = sessions.active_id().to_string();
        sessions.rename(&id, "Sử thi").unwrap();

        sessions
            .append_message(&id, Message::user("Tạo truyện về rồng"))
            .unwrap();

        assert_eq!(sessions.get(&id).unwrap().title, "Sử thi");
    }

    #[test]
    fn derive_title_takes_six_words() {
        assert_eq!(
            derive_title("a b c d e f g h").as_deref(),
            Some("a b c d e f...")
        );
        assert_eq!(derive_title("  hai   từ ").as_deref(), Some("hai từ..."));
        assert_eq!(derive_title("   "), None);
    }
}
