//! Application state: sessions, settings, the current mode and the busy flag.
//!
//! Sending is split into [`App::begin_send`] and [`App::finish_send`] so that a
//! caller can run the completion request wherever it likes while the state
//! stays consistent. [`App::send`] does both around one blocking call.

use crate::client::{CompletionClient, CompletionRequest};
use crate::core::message::{Message, Mode};
use crate::core::prompt;
use crate::core::session::{Session, SessionStore};
use crate::core::settings::{AppSettings, SettingsStore};
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// Reply used when the completion request fails.
pub const ERROR_FALLBACK: &str = "Đã xảy ra lỗi khi kết nối với AI. Vui lòng thử lại sau.";

/// Reply used when the model returns no text.
pub const EMPTY_FALLBACK: &str = "Xin lỗi, tôi không thể tạo nội dung lúc này.";

/// Notice shown when sending a blank message.
pub const EMPTY_MESSAGE_NOTICE: &str = "Vui lòng nhập nội dung trước khi gửi.";

/// A request that has been recorded but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingSend {
    /// Session the reply belongs to.
    pub session_id: String,

    /// Mode the request was composed in.
    pub mode: Mode,

    /// The composed request.
    pub request: CompletionRequest,
}

/// What happened to a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The generated text was appended.
    Replied(Message),

    /// A fallback notice was appended in place of a reply.
    Fallback(Message),

    /// The target session was deleted meanwhile; the text was dropped.
    Discarded(String),
}

impl SendOutcome {
    /// The appended message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Replied(m) | Self::Fallback(m) => Some(m),
            Self::Discarded(_) => None,
        }
    }
}

/// Owner of all mutable application state.
#[derive(Debug)]
pub struct App<'a> {
    sessions: SessionStore<'a>,
    settings: SettingsStore<'a>,
    mode: Mode,
    busy: bool,
}

impl<'a> App<'a> {
    /// Load sessions and settings from the backend.
    pub fn load(store: &'a dyn KeyValueStore) -> Self {
        Self {
            sessions: SessionStore::load_all(store),
            settings: SettingsStore::load(store),
            mode: Mode::default(),
            busy: false,
        }
    }

    /// The session collection.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore<'a> {
        &self.sessions
    }

    /// The active session.
    #[must_use]
    pub fn active(&self) -> &Session {
        self.sessions.active()
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        self.settings.get()
    }

    /// Mode applied to the next message.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Create a session and make it active. Returns its ID.
    pub fn create_session(&mut self) -> String {
        self.sessions.create().id.clone()
    }

    /// Make a session active. Returns the ID that is active afterwards.
    pub fn select_session(&mut self, id: &str) -> String {
        self.sessions.select(id).to_string()
    }

    /// Rename a session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a blank title and
    /// `Error::SessionNotFound` for an unknown ID.
    pub fn rename_session(&mut self, id: &str, title: &str) -> Result<()> {
        self.sessions.rename(id, title)
    }

    /// Delete a session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when it is the last session and
    /// `Error::SessionNotFound` for an unknown ID.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        self.sessions.delete(id)
    }

    /// Switch the mode for subsequent messages.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Change settings and save them.
    pub fn update_settings(&mut self, change: impl FnOnce(&mut AppSettings)) {
        self.settings.update(change);
    }

    /// Record a user message in the active session and compose its request.
    ///
    /// The request is built from the history as it was before the message was
    /// appended, so the text is carried only by the final turn.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for blank text and `Error::Busy` while
    /// another request is in flight. Nothing changes on error.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend> {
        if text.trim().is_empty() {
            return Err(Error::Validation(EMPTY_MESSAGE_NOTICE.to_string()));
        }
        if self.busy {
            return Err(Error::Busy);
        }

        let session = self.sessions.active();
        let session_id = session.id.clone();
        let request = prompt::compose(
            &session.messages,
            text,
            self.mode,
            &self.settings.get().writing,
        );

        self.sessions
            .append_message(&session_id, Message::user(text))?;
        self.busy = true;

        tracing::debug!(session = %session_id, mode = ?self.mode, "request composed");
        Ok(PendingSend {
            session_id,
            mode: self.mode,
            request,
        })
    }

    /// Record the result of a pending request and clear the busy flag.
    ///
    /// Failures and empty replies are replaced by a fixed notice. A reply for
    /// a session that no longer exists is dropped.
    pub fn finish_send(&mut self, pending: PendingSend, result: Result<String>) -> SendOutcome {
        self.busy = false;

        let (text, fallback) = match result {
            Ok(text) if !text.trim().is_empty() => (text, false),
            Ok(_) | Err(Error::EmptyCompletion) => (EMPTY_FALLBACK.to_string(), true),
            Err(e) => {
                tracing::warn!(error = %e, session = %pending.session_id, "completion failed");
                (ERROR_FALLBACK.to_string(), true)
            }
        };

        if self.sessions.get(&pending.session_id).is_none() {
            tracing::warn!(
                session = %pending.session_id,
                "session deleted before its reply arrived, discarding reply"
            );
            return SendOutcome::Discarded(text);
        }

        let message = Message::model(&text, pending.mode);
        if let Err(e) = self
            .sessions
            .append_message(&pending.session_id, message.clone())
        {
            tracing::warn!(error = %e, "failed to record reply");
            return SendOutcome::Discarded(text);
        }

        if fallback {
            SendOutcome::Fallback(message)
        } else {
            SendOutcome::Replied(message)
        }
    }

    /// Send a message to the active session and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`App::begin_send`]. Completion
    /// failures are not errors; they produce [`SendOutcome::Fallback`].
    pub fn send(&mut self, text: &str, client: &dyn CompletionClient) -> Result<SendOutcome> {
        let pending = self.begin_send(text)?;
        let result = client.complete(&pending.request);
        Ok(self.finish_send(pending, result))
    }

    /// Ask the model to edit a whole session into one manuscript.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` for an unknown ID, `Error::Busy` while
    /// a request is in flight, or the completion error.
    pub fn compile(&self, session_id: &str, client: &dyn CompletionClient) -> Result<String> {
        if self.busy {
            return Err(Error::Busy);
        }
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
        client.complete(&prompt::compose_compilation(&session.messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use crate::core::settings::ResponseLength;
    use crate::storage::MemoryBackend;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned results and records every request.
    struct ScriptedClient {
        replies: RefCell<VecDeque<Result<String>>>,
        requests: RefCell<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for ScriptedClient {
        fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(Error::EmptyCompletion))
        }
    }

    #[test]
    fn send_appends_user_and_reply() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        let client = ScriptedClient::new(vec![Ok("Ngày xửa ngày xưa có một con rồng".into())]);

        let outcome = app.send("Tạo truyện về rồng", &client).unwrap();

        let reply = outcome.message().unwrap();
        assert!(matches!(outcome, SendOutcome::Replied(_)));
        assert_eq!(reply.word_count, Some(8));
        assert_eq!(reply.mode_used, Some(Mode::Creative));

        let session = app.active();
        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.messages[1].role, Role::User);
        assert_eq!(session.messages[2].role, Role::Model);
        assert_eq!(session.title, "Tạo truyện về rồng...");
        assert!(!app.is_busy());
    }

    #[test]
    fn request_history_excludes_new_message() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        let client = ScriptedClient::new(vec![Ok("Được.".into())]);

        app.send("Viết đoạn mở đầu", &client).unwrap();

        let requests = client.requests.borrow();
        let turns = &requests[0].turns;
        // welcome + final turn
        assert_eq!(turns.len(), 2);
        assert!(turns[1].text.ends_with("Hãy thực hiện yêu cầu sau: Viết đoạn mở đầu"));
    }

    #[test]
    fn request_uses_current_mode_and_settings() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        app.set_mode(Mode::Editor);
        app.update_settings(|s| s.writing.response_length = ResponseLength::Short);

        let pending = app.begin_send("Sửa câu này").unwrap();
        assert_eq!(pending.mode, Mode::Editor);
        assert_eq!(pending.request.params.max_output_tokens, 1024);
        assert!(pending
            .request
            .final_turn()
            .unwrap()
            .text
            .contains("[BẠN ĐANG Ở: EDITOR]"));

        let outcome = app.finish_send(pending, Ok("Đã sửa.".into()));
        assert_eq!(outcome.message().unwrap().mode_used, Some(Mode::Editor));
    }

    #[test]
    fn failure_appends_error_fallback() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        let client = ScriptedClient::new(vec![Err(Error::Completion("500 - boom".into()))]);

        let outcome = app.send("Viết tiếp", &client).unwrap();

        assert!(matches!(outcome, SendOutcome::Fallback(_)));
        assert_eq!(outcome.message().unwrap().text, ERROR_FALLBACK);
        // user message stays
        assert_eq!(app.active().messages[1].text, "Viết tiếp");
        assert!(!app.is_busy());
    }

    #[test]
    fn empty_reply_appends_empty_fallback() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);

        let pending = app.begin_send("Viết tiếp").unwrap();
        let outcome = app.finish_send(pending, Ok("   ".into()));
        assert_eq!(outcome.message().unwrap().text, EMPTY_FALLBACK);

        let pending = app.begin_send("Viết tiếp nữa").unwrap();
        let outcome = app.finish_send(pending, Err(Error::EmptyCompletion));
        assert_eq!(outcome.message().unwrap().text, EMPTY_FALLBACK);
    }

    #[test]
    fn second_send_while_busy_is_rejected() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);

        let pending = app.begin_send("Một").unwrap();
        assert!(app.is_busy());
        let before = app.active().messages.len();

        assert!(matches!(app.begin_send("Hai"), Err(Error::Busy)));
        assert_eq!(app.active().messages.len(), before);

        app.finish_send(pending, Ok("Xong".into()));
        assert!(app.begin_send("Hai").is_ok());
    }

    #[test]
    fn blank_message_is_rejected() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);

        let result = app.begin_send("  \n ");
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(app.active().messages.len(), 1);
        assert!(!app.is_busy());
    }

    #[test]
    fn reply_for_deleted_session_is_discarded() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        let keep = app.active().id.clone();
        let doomed = app.create_session();

        let pending = app.begin_send("Viết chương một").unwrap();
        assert_eq!(pending.session_id, doomed);
        app.delete_session(&doomed).unwrap();

        let outcome = app.finish_send(pending, Ok("Chương một...".into()));

        assert_eq!(outcome, SendOutcome::Discarded("Chương một...".into()));
        assert!(!app.is_busy());
        assert_eq!(app.sessions().len(), 1);
        assert_eq!(app.sessions().get(&keep).unwrap().messages.len(), 1);
    }

    #[test]
    fn reply_lands_in_original_session_after_switch() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        let first = app.active().id.clone();

        let pending = app.begin_send("Viết cảnh mưa").unwrap();
        let second = app.create_session();
        app.finish_send(pending, Ok("Mưa rơi.".into()));

        assert_eq!(app.sessions().get(&first).unwrap().messages.len(), 3);
        assert_eq!(app.sessions().get(&second).unwrap().messages.len(), 1);
        assert_eq!(app.active().id, second);
    }

    #[test]
    fn state_survives_reload() {
        let store = MemoryBackend::new();
        {
            let mut app = App::load(&store);
            let client = ScriptedClient::new(vec![Ok("Xin chào".into())]);
            app.send("Lời chào", &client).unwrap();
            app.update_settings(|s| s.writing.creativity_level = 0.1);
        }

        let app = App::load(&store);
        assert_eq!(app.active().messages.len(), 3);
        assert!((app.settings().writing.creativity_level - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn compile_sends_flattened_history() {
        let store = MemoryBackend::new();
        let mut app = App::load(&store);
        let client = ScriptedClient::new(vec![Ok("Lan ra khơi.".into()), Ok("# Biển".into())]);
        app.send("Giới thiệu Lan", &client).unwrap();

        let id = app.active().id.clone();
        let manuscript = app.compile(&id, &client).unwrap();

        assert_eq!(manuscript, "# Biển");
        let requests = client.requests.borrow();
        assert!(requests[1].turns[0].text.contains("AI: Lan ra khơi."));
        assert!(requests[1].system_instruction.is_none());
    }

    #[test]
    fn compile_unknown_session_fails() {
        let store = MemoryBackend::new();
        let app = App::load(&store);
        let client = ScriptedClient::new(vec![]);
        assert!(matches!(
            app.compile("missing", &client),
            Err(Error::SessionNotFound(_))
        ));
    }
}
