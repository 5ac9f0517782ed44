//! In-memory per-user session store.
//!
//! Each user's [`Session`] sits behind its own async mutex, so handling one
//! event can hold the session across network calls without blocking other
//! users. Nothing here survives a restart.

use crate::catalog::Lang;
use crate::message::MessageRef;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Where a user is in the conversation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConvState {
    #[default]
    Idle,
    AwaitingQuestion,
}

/// Per-user conversation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    /// Chosen display language; `None` until a language button is pressed.
    pub language: Option<Lang>,
    pub state: ConvState,
    /// Last bot message the user is looking at. The confirmation after a
    /// relayed question is written over this message.
    pub prompt: Option<MessageRef>,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            language: None,
            state: ConvState::Idle,
            prompt: None,
        }
    }

    /// Language to render texts in.
    pub fn lang(&self) -> Lang {
        self.language.unwrap_or(Lang::FALLBACK)
    }

    pub fn set_language(&mut self, lang: Option<Lang>) {
        self.language = lang;
    }

    pub fn set_state(&mut self, state: ConvState) {
        self.state = state;
    }

    /// Back to idle after a question was handled. The language is kept.
    pub fn clear(&mut self) {
        self.state = ConvState::Idle;
        self.prompt = None;
    }

    /// Fresh start: idle, no language, no prompt.
    pub fn reset(&mut self) {
        *self = Self::new(self.user_id);
    }
}

/// Exclusive access to one user's session.
pub type SessionGuard = OwnedMutexGuard<Session>;

/// Owns every user's [`Session`], keyed by user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock one user's session, creating it if absent. The guard keeps other
    /// tasks touching the same user waiting until it is dropped.
    pub async fn lock(&self, user_id: i64) -> SessionGuard {
        let entry = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(user_id))))
                .clone()
        };
        entry.lock_owned().await
    }

    /// Snapshot of a user's session, creating a default one if absent.
    pub async fn get(&self, user_id: i64) -> Session {
        self.lock(user_id).await.clone()
    }

    pub async fn set_language(&self, user_id: i64, lang: Option<Lang>) {
        self.lock(user_id).await.set_language(lang);
    }

    pub async fn set_state(&self, user_id: i64, state: ConvState) {
        self.lock(user_id).await.set_state(state);
    }

    pub async fn clear(&self, user_id: i64) {
        self.lock(user_id).await.clear();
    }

    /// Drop a user's session if it is idle with no language chosen.
    ///
    /// A session that another task still references is kept. Returns
    /// whether the session was removed.
    pub async fn evict_if_blank(&self, user_id: i64) -> bool {
        let mut sessions = self.sessions.lock().await;
        let blank = sessions.get(&user_id).is_some_and(|entry| {
            Arc::strong_count(entry) == 1
                && entry
                    .try_lock()
                    .is_ok_and(|s| s.state == ConvState::Idle && s.language.is_none())
        });
        if blank {
            sessions.remove(&user_id);
        }
        blank
    }

    /// Number of users with a stored session.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
