use dashmap::DashMap;
use log::debug;

use super::sessions_model::SearchSession;

/// Search sessions keyed by conversation id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SearchSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session, replacing the conversation's previous one.
    pub fn store(&self, conversation_id: &str, session: SearchSession) {
        debug!(
            "Caching {} results for conversation {}",
            session.results.len(),
            conversation_id
        );
        self.sessions.insert(conversation_id.to_string(), session);
    }

    pub fn get(&self, conversation_id: &str) -> Option<SearchSession> {
        self.sessions
            .get(conversation_id)
            .map(|session| session.value().clone())
    }

    /// Discards a conversation's session. Returns whether one existed.
    pub fn remove(&self, conversation_id: &str) -> bool {
        self.sessions.remove(conversation_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
