//! Process-wide map from game id to session
//!
//! Every consumer of the same game id gets the same [`SharedSession`], so a
//! move made from one view shows up in all of them. Sessions are never
//! evicted; they live until [`SessionRegistry::clear`] or process exit.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::game::Session;

/// Handle to a session shared between views
///
/// Every mutation takes the write lock once, so readers see either the state
/// before a broadcast or after it, never a mix.
pub type SharedSession = Arc<RwLock<Session>>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `game_id`, creating it on first access
    pub fn subscribe(&self, game_id: &str) -> SharedSession {
        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(game_id) {
            return Arc::clone(existing);
        }
        debug!("[REGISTRY] Creating session for {}", game_id);
        let session = Arc::new(RwLock::new(Session::new(game_id)));
        sessions.insert(game_id.to_string(), Arc::clone(&session));
        session
    }

    /// Existing session, without creating one
    pub fn get(&self, game_id: &str) -> Option<SharedSession> {
        self.sessions.lock().get(game_id).cloned()
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.sessions.lock().contains_key(game_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    pub fn game_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every session; handles already given out stay valid
    pub fn clear(&self) {
        self.sessions.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;

    #[test]
    fn test_subscribe_creates_defaults() {
        let registry = SessionRegistry::new();
        let session = registry.subscribe("g1");

        assert_eq!(registry.len(), 1);
        assert_eq!(session.read().status(), GameStatus::Initializing);
        assert_eq!(session.read().game_id(), "g1");
    }

    #[test]
    fn test_subscribe_reuses_instance() {
        //! Two subscriptions to one game share a single session
        let registry = SessionRegistry::new();
        let first = registry.subscribe("g1");
        let second = registry.subscribe("g1");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_games_are_isolated() {
        let registry = SessionRegistry::new();
        let a = registry.subscribe("a");
        let b = registry.subscribe("b");

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.game_ids(), vec!["a".to_string(), "b".to_string()]);
        assert!(registry.get("c").is_none());
        assert!(!registry.contains("c"));
    }

    #[test]
    fn test_clear_forgets_sessions() {
        let registry = SessionRegistry::new();
        let held = registry.subscribe("g1");
        registry.clear();

        assert!(registry.is_empty());
        let fresh = registry.subscribe("g1");
        assert!(!Arc::ptr_eq(&held, &fresh));
    }
}
