//! Chat sessions with the site's digital persona.
//!
//! A session is either idle or awaiting a response. Submitting a message
//! appends the user's entry before the dispatcher is called, and the
//! assistant's entry is appended once the dispatcher resolves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::content::{CHAT_GREETING, CHAT_PERSONA};
use crate::error::FALLBACK_MESSAGE;
use crate::llm::{TextGenerator, reply_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
}

impl TranscriptEntry {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self { role, text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("message is empty")]
    EmptyInput,
    #[error("still waiting for the previous answer")]
    AwaitingResponse,
}

/// Proof that a user entry was appended and a reply is owed.
///
/// Only [`ChatSession::submit`] creates one, and [`ChatSession::resolve`]
/// consumes it.
#[derive(Debug)]
#[must_use]
pub struct PendingTurn {
    prompt: String,
}

impl PendingTurn {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub transcript: Vec<TranscriptEntry>,
    pub awaiting_response: bool,
    pub input_enabled: bool,
    pub panel_open: bool,
    /// Index of the entry the transcript view should scroll to.
    pub scroll_to: Option<usize>,
}

#[derive(Debug)]
pub struct ChatSession {
    transcript: Vec<TranscriptEntry>,
    awaiting_response: bool,
    panel_open: bool,
    scroll_to: Option<usize>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let mut session = Self {
            transcript: Vec::new(),
            awaiting_response: false,
            panel_open: false,
            scroll_to: None,
        };
        session.append(TranscriptEntry::new(Role::Assistant, CHAT_GREETING));
        session
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Idle → awaiting-response. The user entry is appended right away.
    pub fn submit(&mut self, input: &str) -> Result<PendingTurn, Rejected> {
        if input.trim().is_empty() {
            return Err(Rejected::EmptyInput);
        }
        if self.awaiting_response {
            return Err(Rejected::AwaitingResponse);
        }

        self.append(TranscriptEntry::new(Role::User, input));
        self.awaiting_response = true;
        Ok(PendingTurn { prompt: input.to_string() })
    }

    /// Awaiting-response → idle.
    pub fn resolve(&mut self, turn: PendingTurn, reply: String) {
        debug!(prompt_chars = turn.prompt.chars().count(), "Chat turn resolved");
        self.append(TranscriptEntry::new(Role::Assistant, reply));
        self.awaiting_response = false;
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
        if open {
            self.scroll_to_latest();
        }
    }

    pub fn view(&self) -> ChatView {
        ChatView {
            transcript: self.transcript.clone(),
            awaiting_response: self.awaiting_response,
            input_enabled: !self.awaiting_response,
            panel_open: self.panel_open,
            scroll_to: self.scroll_to,
        }
    }

    fn append(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
        self.scroll_to_latest();
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_to = self.transcript.len().checked_sub(1);
    }
}

/// Drives one [`ChatSession`] against a text generator.
pub struct ChatController {
    session: Mutex<ChatSession>,
    generator: Arc<dyn TextGenerator>,
}

impl ChatController {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            session: Mutex::new(ChatSession::new()),
            generator,
        }
    }

    fn session(&self) -> MutexGuard<'_, ChatSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn send(&self, input: &str) -> Result<ChatView, Rejected> {
        let turn = {
            let mut session = self.session();
            session.submit(input)?
        };
        let turn = OpenTurn { controller: self, turn: Some(turn) };

        let result = self.generator.generate(turn.prompt(), Some(CHAT_PERSONA)).await;
        Ok(turn.finish(reply_text(result)))
    }

    /// Opens or closes the panel; `None` flips the current state.
    pub fn set_panel(&self, open: Option<bool>) -> ChatView {
        let mut session = self.session();
        let open = open.unwrap_or(!session.panel_open);
        session.set_panel_open(open);
        session.view()
    }

    pub fn view(&self) -> ChatView {
        self.session().view()
    }
}

/// A submitted turn that still owes the transcript an assistant entry.
///
/// Dropping it unfinished, e.g. when the generator panics, resolves the turn
/// with the fallback text so the session never stays busy.
struct OpenTurn<'a> {
    controller: &'a ChatController,
    turn: Option<PendingTurn>,
}

impl OpenTurn<'_> {
    fn prompt(&self) -> &str {
        self.turn.as_ref().map(PendingTurn::prompt).unwrap_or_default()
    }

    fn finish(mut self, reply: String) -> ChatView {
        let mut session = self.controller.session();
        if let Some(turn) = self.turn.take() {
            session.resolve(turn, reply);
        }
        session.view()
    }
}

impl Drop for OpenTurn<'_> {
    fn drop(&mut self) {
        if let Some(turn) = self.turn.take() {
            warn!("Chat turn abandoned, answering with fallback text");
            self.controller.session().resolve(turn, FALLBACK_MESSAGE.to_string());
        }
    }
}

pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct SessionSlot {
    controller: Arc<ChatController>,
    last_active: Instant,
}

/// Independent chat sessions keyed by id.
///
/// Sessions idle for longer than the TTL are dropped when a new one is
/// created, and the least recently used session makes room once the cap is
/// reached.
pub struct ChatSessions {
    sessions: Mutex<HashMap<Uuid, SessionSlot>>,
    generator: Arc<dyn TextGenerator>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl ChatSessions {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_limits(generator, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL)
    }

    pub fn with_limits(generator: Arc<dyn TextGenerator>, max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            generator,
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self) -> (Uuid, Arc<ChatController>) {
        self.create_at(Instant::now())
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<ChatController>> {
        self.get_at(id, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn create_at(&self, now: Instant) -> (Uuid, Arc<ChatController>) {
        let id = Uuid::new_v4();
        let controller = Arc::new(ChatController::new(self.generator.clone()));

        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, slot| now.saturating_duration_since(slot.last_active) < self.idle_ttl);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_active)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => sessions.remove(&oldest),
                None => break,
            };
        }
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Chat sessions evicted");
        }

        sessions.insert(
            id,
            SessionSlot {
                controller: controller.clone(),
                last_active: now,
            },
        );
        info!(session = %id, "Chat session created");
        (id, controller)
    }

    fn get_at(&self, id: &Uuid, now: Instant) -> Option<Arc<ChatController>> {
        let mut sessions = self.sessions();
        let slot = sessions.get_mut(id)?;
        slot.last_active = now;
        Some(slot.controller.clone())
    }
}
