//! Session storage behind a trait so the backend can be swapped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::model::Session;
use crate::persona::Persona;

/// Keyed session storage.
///
/// Each session sits behind its own mutex; holding it for a whole turn is
/// what serializes concurrent requests on the same key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Existing session, or a fresh one in the initial persona.
    async fn get_or_create(&self, key: &str) -> Arc<Mutex<Session>>;

    /// Reset a session to defaults. Unknown keys are a no-op.
    async fn clear(&self, key: &str);

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

/// Process-lifetime in-memory store.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    initial_persona: Persona,
    max_history: usize,
}

impl InMemorySessionStore {
    pub fn new(initial_persona: Persona, max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            initial_persona,
            max_history,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, key: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(key) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have created it between the two locks.
        Arc::clone(sessions.entry(key.to_string()).or_insert_with(|| {
            tracing::info!(session = %key, persona = %self.initial_persona, "Session created");
            Arc::new(Mutex::new(Session::new(key, self.initial_persona, self.max_history)))
        }))
    }

    async fn clear(&self, key: &str) {
        let session = self.sessions.read().await.get(key).cloned();
        if let Some(session) = session {
            // Waits for any in-flight turn on this key.
            session.lock().await.reset();
            tracing::info!(session = %key, "Session cleared");
        }
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Turn;

    #[tokio::test]
    async fn same_key_same_session() {
        let store = InMemorySessionStore::new(Persona::Triage, 10);
        let a = store.get_or_create("k").await;
        let b = store.get_or_create("k").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
        assert_eq!(a.lock().await.active_persona(), Persona::Triage);
    }

    #[tokio::test]
    async fn clear_is_idempotent_and_ignores_unknown_keys() {
        let store = InMemorySessionStore::new(Persona::ShopAssistant, 10);
        store.clear("missing").await;
        assert_eq!(store.len().await, 0);

        let session = store.get_or_create("k").await;
        {
            let mut s = session.lock().await;
            s.set_active_persona(Persona::Companion);
            s.append_turn(Turn::user("hello"));
        }
        store.clear("k").await;
        store.clear("k").await;

        let s = session.lock().await;
        assert_eq!(s.active_persona(), Persona::ShopAssistant);
        assert_eq!(s.history_len(), 0);
    }

    #[tokio::test]
    async fn concurrent_turns_on_one_key_do_not_interleave() {
        let store = Arc::new(InMemorySessionStore::new(Persona::Triage, 100));
        let handles = (0..10).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let session = store.get_or_create("shared").await;
                let mut s = session.lock().await;
                s.append_turn(Turn::user(format!("q{i}")));
                tokio::task::yield_now().await;
                s.append_turn(Turn::assistant(format!("a{i}")));
            })
        });
        for result in futures::future::join_all(handles).await {
            result.unwrap();
        }

        let session = store.get_or_create("shared").await;
        let history = session.lock().await.history();
        assert_eq!(history.len(), 20);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].content[1..], pair[1].content[1..]);
        }
    }
}
