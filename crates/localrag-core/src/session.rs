//! Per-session state keyed by chat/session id.
//!
//! Sessions are created on first touch and evicted once idle for longer than
//! the configured timeout. The caller supplies `now`, so eviction is
//! deterministic under test.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::SessionSettings;

pub type SessionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Bounded dialogue history; the oldest turns are dropped first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    max_turns: usize,
    max_message_chars: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self { Self::new(&SessionSettings::default()) }
}

impl ConversationHistory {
    pub fn new(settings: &SessionSettings) -> Self {
        Self { turns: VecDeque::new(), max_turns: settings.max_turns.max(1), max_message_chars: settings.max_message_chars }
    }

    /// Record a turn. User messages over the length limit are truncated.
    pub fn push(&mut self, role: Role, content: &str) {
        let content = if role == Role::User && content.chars().count() > self.max_message_chars {
            content.chars().take(self.max_message_chars).collect()
        } else {
            content.to_string()
        };
        self.turns.push_back(Turn { role, content });
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> { self.turns.iter() }

    pub fn last_user_message(&self) -> Option<&str> {
        self.turns.iter().rev().find(|t| t.role == Role::User).map(|t| t.content.as_str())
    }

    pub fn len(&self) -> usize { self.turns.len() }

    pub fn is_empty(&self) -> bool { self.turns.is_empty() }

    pub fn clear(&mut self) { self.turns.clear(); }
}

struct Entry<S> {
    state: S,
    last_seen: Instant,
}

pub struct SessionStore<S> {
    sessions: Mutex<HashMap<SessionId, Entry<S>>>,
    idle_timeout: Duration,
    init: Box<dyn Fn() -> S + Send + Sync>,
}

impl<S> SessionStore<S> {
    pub fn new(idle_timeout: Duration, init: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), idle_timeout, init: Box::new(init) }
    }

    /// Run `f` against the session, creating it first if needed, and mark it active.
    pub fn with_session<R>(&self, id: SessionId, now: Instant, f: impl FnOnce(&mut S) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let entry = sessions.entry(id).or_insert_with(|| {
            debug!(session = id, "creating session");
            Entry { state: (self.init)(), last_seen: now }
        });
        entry.last_seen = now;
        f(&mut entry.state)
    }

    /// Replace the session's state with a fresh one.
    pub fn reset(&self, id: SessionId, now: Instant) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.insert(id, Entry { state: (self.init)(), last_seen: now });
    }

    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).remove(&id).is_some()
    }

    /// Drop sessions idle for longer than the timeout; returns how many were evicted.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, e| now.saturating_duration_since(e.last_seen) <= timeout);
        let evicted = before - sessions.len();
        if evicted > 0 { debug!(evicted, "evicted idle sessions"); }
        evicted
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).contains_key(&id)
    }

    pub fn len(&self) -> usize { self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl SessionStore<ConversationHistory> {
    pub fn conversations(settings: &SessionSettings) -> Self {
        let settings = settings.clone();
        Self::new(Duration::from_secs(settings.idle_timeout_secs), move || ConversationHistory::new(&settings))
    }
}
