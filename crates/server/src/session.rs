//! In-memory conversation sessions.
//!
//! A session is an opaque id plus the recent turns of the conversation.
//! Nothing survives a restart. Idle sessions live forever unless
//! [`SessionStore::evict_idle`] is called, either directly or by the
//! background sweeper.

use crate::error::SessionError;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// One answered query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub query: String,
    pub answer: String,
}

impl Turn {
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
        }
    }
}

struct Session {
    turns: VecDeque<Turn>,
    last_active: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            last_active: Instant::now(),
        }
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    /// Turns remembered per session, oldest dropped first
    max_turns: usize,
}

impl SessionStore {
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_turns,
        }
    }

    /// Resolve the session for a request.
    ///
    /// A known id is reused. An unknown id is adopted as a new session so
    /// clients may choose their own ids. `None` creates a fresh UUID.
    pub fn get_or_create(&self, session_id: Option<&str>) -> String {
        let mut sessions = self.sessions.write();

        if let Some(id) = session_id {
            if let Some(session) = sessions.get_mut(id) {
                session.last_active = Instant::now();
                return id.to_string();
            }
        }

        let id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        sessions.insert(id.clone(), Session::new());
        info!(session_id = %id, "Created session");
        id
    }

    /// Append a turn; no-op for unknown sessions
    pub fn record_turn(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write();
        if let Some(session) = sessions.get_mut(session_id) {
            session.turns.push_back(turn);
            while session.turns.len() > self.max_turns {
                session.turns.pop_front();
            }
            session.last_active = Instant::now();
        }
    }

    /// Remembered turns, oldest first (empty for unknown sessions)
    pub fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .read()
            .get(session_id)
            .map(|s| s.turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    pub fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        match self.sessions.write().remove(session_id) {
            Some(_) => {
                info!(session_id = %session_id, "Deleted session");
                Ok(())
            }
            None => Err(SessionError::NotFound(session_id.to_string())),
        }
    }

    /// Active session ids, sorted
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop sessions idle for longer than `ttl`; returns how many went
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.last_active.elapsed() <= ttl;
            if !keep {
                debug!(session_id = %id, "Evicting idle session");
            }
            keep
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Evict idle sessions every `interval` until the handle is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, ttl: Duration, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.evict_idle(ttl);
            }
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(10)
    }
}
