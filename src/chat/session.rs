//! Core chat session management.
//!
//! This module provides the `ChatClient` state machine, which owns a session's
//! history and synchronizes it with a stateless relay one turn at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::chat::config::ChatConfig;
use crate::chat::view::ChatView;
use crate::client::{ChatTransport, RelayClient};
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::observability::{
    SESSION_DROPPED, SESSION_FAILURES, SESSION_REJECTED, SESSION_SUBMISSIONS,
};
use crate::types::{ChatRequest, ProtocolVariant, Turn};

/// Where a session is in its request cycle.
///
/// `Succeeded` and `Failed` are transient: the session returns to `Idle` as
/// soon as the submission that produced them settles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
    Succeeded,
    Failed,
}

/// What happened to a call to [`ChatClient::submit_turn`].
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The input was empty; nothing was recorded or sent.
    Rejected(Error),
    /// Another submission was in flight; this one was discarded.
    Dropped,
    /// The relay answered and the assistant turn was recorded.
    Answered(Turn),
    /// The request failed; the user turn stays unanswered.
    Failed(Error),
}

impl TurnOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, TurnOutcome::Answered(_))
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, TurnOutcome::Dropped)
    }

    /// The error behind a rejected or failed submission.
    pub fn error(&self) -> Option<&Error> {
        match self {
            TurnOutcome::Rejected(err) | TurnOutcome::Failed(err) => Some(err),
            TurnOutcome::Dropped | TurnOutcome::Answered(_) => None,
        }
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The wire contract in use.
    pub protocol: ProtocolVariant,
    /// The number of turns in the conversation.
    pub turn_count: usize,
    /// Submissions that issued a request.
    pub submissions: u64,
    /// Submissions that were answered.
    pub answered: u64,
    /// Submissions whose request failed.
    pub failed: u64,
    /// Submissions discarded because another was in flight.
    pub dropped: u64,
    /// Submissions rejected as empty.
    pub rejected: u64,
}

/// A chat session that keeps the conversation and talks to the relay.
///
/// At most one request is in flight per session.  Submissions made while a
/// request is pending are dropped, never queued, so requests cannot be
/// reordered or interleaved.
pub struct ChatClient<T: ChatTransport> {
    transport: T,
    protocol: ProtocolVariant,
    history: Mutex<HistoryStore>,
    state: Mutex<SessionState>,
    submissions: AtomicU64,
    answered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
}

impl ChatClient<RelayClient> {
    /// Creates a session that talks to the relay described by `config`.
    pub fn connect(config: &ChatConfig) -> Result<Self> {
        let transport = RelayClient::with_options(config.base_url.clone(), Some(config.timeout))?;
        Ok(Self::new(transport, config.protocol))
    }

    /// The endpoint this session posts to.
    pub fn endpoint(&self) -> &url::Url {
        self.transport.endpoint()
    }
}

impl<T: ChatTransport> ChatClient<T> {
    /// Creates a new session with an empty history.
    pub fn new(transport: T, protocol: ProtocolVariant) -> Self {
        Self {
            transport,
            protocol,
            history: Mutex::new(HistoryStore::new()),
            state: Mutex::new(SessionState::Idle),
            submissions: AtomicU64::new(0),
            answered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Submits one user message and waits for it to settle.
    ///
    /// The user turn is recorded and rendered before the request goes out.
    /// Only a successful reply appends an assistant turn; on failure the
    /// user turn is left unanswered and the next stateful request replays it.
    pub async fn submit_turn(&self, text: &str, view: &dyn ChatView) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            SESSION_REJECTED.click();
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return TurnOutcome::Rejected(Error::validation(
                "message is empty",
                Some("text".to_string()),
            ));
        }

        let Some(_pending) = PendingGuard::acquire(&self.state, view) else {
            SESSION_DROPPED.click();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("submission dropped: a request is already in flight");
            return TurnOutcome::Dropped;
        };
        SESSION_SUBMISSIONS.click();
        self.submissions.fetch_add(1, Ordering::Relaxed);

        let user_turn = Turn::user(text);
        let request = {
            let mut history = lock(&self.history);
            history.append(user_turn.clone());
            match self.protocol {
                ProtocolVariant::Stateless => ChatRequest::query(text),
                ProtocolVariant::Stateful => ChatRequest::history(&history.snapshot()),
            }
        };
        view.render_turn(&user_turn);

        match self.transport.send(&request).await {
            Ok(response) => {
                let turn = Turn::assistant(response.answer);
                lock(&self.history).append(turn.clone());
                self.answered.fetch_add(1, Ordering::Relaxed);
                set_state(&self.state, SessionState::Succeeded);
                view.render_turn(&turn);
                TurnOutcome::Answered(turn)
            }
            Err(err) => {
                SESSION_FAILURES.click();
                self.failed.fetch_add(1, Ordering::Relaxed);
                set_state(&self.state, SessionState::Failed);
                tracing::warn!(kind = ?err.kind(), error = %err, "turn failed");
                view.render_error(err.user_message());
                TurnOutcome::Failed(err)
            }
        }
    }

    /// Returns a copy of the conversation so far.
    pub fn history(&self) -> Vec<Turn> {
        lock(&self.history).snapshot()
    }

    /// Returns the number of turns in the conversation.
    pub fn turn_count(&self) -> usize {
        lock(&self.history).len()
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn protocol(&self) -> ProtocolVariant {
        self.protocol
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            protocol: self.protocol,
            turn_count: self.turn_count(),
            submissions: self.submissions.load(Ordering::Relaxed),
            answered: self.answered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Holds the session in `Sending` and the view's pending indicator up.
///
/// Dropping the guard, on any path out of a submission, returns the session to
/// `Idle` and clears the indicator.
struct PendingGuard<'a> {
    state: &'a Mutex<SessionState>,
    view: &'a dyn ChatView,
}

impl<'a> PendingGuard<'a> {
    fn acquire(state: &'a Mutex<SessionState>, view: &'a dyn ChatView) -> Option<Self> {
        {
            let mut current = lock(state);
            if *current == SessionState::Sending {
                return None;
            }
            *current = SessionState::Sending;
        }
        tracing::debug!("session state: sending");
        let guard = Self { state, view };
        view.set_pending(true);
        Some(guard)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        set_state(self.state, SessionState::Idle);
        self.view.set_pending(false);
    }
}

fn set_state(state: &Mutex<SessionState>, next: SessionState) {
    tracing::debug!(state = ?next, "session state");
    *lock(state) = next;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
