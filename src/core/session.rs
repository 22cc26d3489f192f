//! In-memory session identity and transcript.

use uuid::Uuid;

use crate::core::message::{Message, Role};

pub const GREETING: &str = "Hello! How can I help you today?";

/// Opaque identifier that scopes one conversation on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug)]
pub struct SessionStore {
    session: Option<Session>,
    messages: Vec<Message>,
    web_search_enabled: bool,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            session: None,
            messages: Vec::new(),
            web_search_enabled: true,
        }
    }

    /// Create the session and seed the greeting on first call. Later calls
    /// return the existing identifier untouched.
    pub fn ensure_initialized(&mut self) -> &str {
        if self.session.is_none() {
            self.session = Some(Session::generate());
            self.messages.push(Message::assistant(GREETING));
        }
        self.session
            .as_ref()
            .map(Session::id)
            .unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(Session::id)
    }

    pub fn append_message(&mut self, role: Role, content: impl Into<String>) -> &Message {
        self.messages.push(Message::new(role, content));
        let last = self.messages.len() - 1;
        &self.messages[last]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn web_search_enabled(&self) -> bool {
        self.web_search_enabled
    }

    pub fn set_web_search_enabled(&mut self, enabled: bool) {
        self.web_search_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_starts_with_single_greeting() {
        let mut store = SessionStore::new();
        assert!(store.messages().is_empty());
        assert!(!store.is_initialized());

        store.ensure_initialized();
        assert!(store.is_initialized());

        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].role, Role::Assistant);
        assert_eq!(store.messages()[0].content, GREETING);
    }

    #[test]
    fn ensure_initialized_is_idempotent() {
        let mut store = SessionStore::new();
        let first = store.ensure_initialized().to_string();
        let second = store.ensure_initialized().to_string();

        assert_eq!(first, second);
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.session_id(), Some(first.as_str()));
    }

    #[test]
    fn session_ids_are_unique_per_store() {
        let mut a = SessionStore::new();
        let mut b = SessionStore::new();
        assert_ne!(a.ensure_initialized(), b.ensure_initialized());
    }

    #[test]
    fn generated_id_is_a_uuid() {
        let mut store = SessionStore::new();
        let id = store.ensure_initialized();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut store = SessionStore::new();
        store.ensure_initialized();
        store.append_message(Role::User, "first");
        store.append_message(Role::Assistant, "second");

        let contents: Vec<&str> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![GREETING, "first", "second"]);
    }

    #[test]
    fn web_search_defaults_to_enabled() {
        let mut store = SessionStore::new();
        assert!(store.web_search_enabled());
        store.set_web_search_enabled(false);
        assert!(!store.web_search_enabled());
    }
}
