//! Turn orchestration between the session transcript and the chat backend.
//!
//! Every mutation of [`SessionStore`] goes through [`ConversationController`].
//! A turn runs `Idle -> AwaitingResponse -> Completed | Failed`; whatever the
//! backend does, the turn ends with exactly one user message and exactly one
//! assistant message appended.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::chat_client::ChatBackend;
use crate::core::error::BackendError;
use crate::core::message::{Message, Role};
use crate::core::session::SessionStore;
use crate::core::trace::{TraceInterpreter, TraceRecord};
use crate::utils::logging::LoggingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse,
    Completed,
    Failed,
}

#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input, or a turn was already outstanding; nothing was appended.
    Ignored,
    Completed {
        response: String,
        trace: Vec<TraceRecord>,
    },
    Failed {
        error: BackendError,
        message: String,
    },
}

/// A submitted turn whose user message is already in the transcript.
///
/// Dropping it unresolved (including cancelling `resolve_turn`) releases the
/// controller so later submissions are accepted again.
#[derive(Debug)]
#[must_use = "a pending turn must be resolved"]
pub(crate) struct PendingTurn {
    query: String,
    enable_web_search: bool,
    in_flight: Arc<AtomicBool>,
}

impl PendingTurn {
    pub(crate) fn query(&self) -> &str {
        &self.query
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

pub struct ConversationController<B: ChatBackend> {
    store: SessionStore,
    backend: B,
    interpreter: TraceInterpreter,
    logging: LoggingState,
    state: TurnState,
    in_flight: Arc<AtomicBool>,
}

impl<B: ChatBackend> ConversationController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_store(SessionStore::new(), backend)
    }

    pub fn with_store(mut store: SessionStore, backend: B) -> Self {
        store.ensure_initialized();
        Self {
            store,
            backend,
            interpreter: TraceInterpreter::new(),
            logging: LoggingState::new(None),
            state: TurnState::Idle,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_interpreter(mut self, interpreter: TraceInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Messages recorded from now on are appended to the log file.
    pub fn with_logging(mut self, logging: LoggingState) -> Self {
        self.logging = logging;
        self
    }

    pub fn session_id(&self) -> &str {
        self.store.session_id().unwrap_or_default()
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn state(&self) -> TurnState {
        match self.state {
            TurnState::AwaitingResponse if !self.in_flight.load(Ordering::Acquire) => {
                TurnState::Idle
            }
            state => state,
        }
    }

    pub fn web_search_enabled(&self) -> bool {
        self.store.web_search_enabled()
    }

    pub fn set_web_search_enabled(&mut self, enabled: bool) {
        self.store.set_web_search_enabled(enabled);
    }

    pub fn logging_mut(&mut self) -> &mut LoggingState {
        &mut self.logging
    }

    /// Run a whole turn: record the user message, query the backend, record
    /// the reply or the failure.
    pub async fn submit(&mut self, text: &str, enable_web_search: bool) -> TurnOutcome {
        match self.begin_turn(text, enable_web_search) {
            Some(pending) => self.resolve_turn(pending).await,
            None => TurnOutcome::Ignored,
        }
    }

    /// Append the user message before any network traffic so it can be shown
    /// straight away. Returns `None` for blank input or while a turn is
    /// outstanding.
    pub(crate) fn begin_turn(
        &mut self,
        text: &str,
        enable_web_search: bool,
    ) -> Option<PendingTurn> {
        if self.in_flight.load(Ordering::Acquire) {
            warn!("Ignoring submission while a turn is outstanding");
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }

        self.record(Role::User, text);
        self.state = TurnState::AwaitingResponse;
        self.in_flight.store(true, Ordering::Release);
        Some(PendingTurn {
            query: text.to_string(),
            enable_web_search,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub(crate) async fn resolve_turn(&mut self, pending: PendingTurn) -> TurnOutcome {
        let session_id = self.session_id().to_string();
        let result = self
            .backend
            .send_query(&session_id, &pending.query, pending.enable_web_search)
            .await;

        match result {
            Ok(reply) => {
                debug!(
                    session_id = %session_id,
                    trace_events = reply.trace_events.len(),
                    "Turn completed"
                );
                self.record(Role::Assistant, &reply.response);
                let trace = self.interpreter.present(&reply.trace_events);
                self.state = TurnState::Completed;
                TurnOutcome::Completed {
                    response: reply.response,
                    trace,
                }
            }
            Err(error) => {
                warn!(session_id = %session_id, kind = error.kind(), error = %error, "Turn failed");
                let message = failure_message(&error);
                self.record(Role::Assistant, &message);
                self.state = TurnState::Failed;
                TurnOutcome::Failed { error, message }
            }
        }
    }

    fn record(&mut self, role: Role, content: &str) {
        let message = self.store.append_message(role, content);
        if let Err(err) = self.logging.log_message(message) {
            warn!(error = %err, "Failed to write transcript log");
        }
    }
}

/// Assistant-visible text for a failed turn.
pub fn failure_message(error: &BackendError) -> String {
    match error {
        BackendError::Connection { .. } => "Error: Could not connect to the backend.".to_string(),
        BackendError::Protocol { .. } => format!("Error: {error}"),
        BackendError::Decode { .. } => "Error: Invalid response from backend.".to_string(),
        BackendError::Unexpected { detail } => format!("Unexpected Error: {detail}"),
    }
}
