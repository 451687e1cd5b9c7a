//! Session management

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::context::ContextWindow;
use super::types::ChatSession;
use crate::{Error, Result};

/// A session handle; holding the lock serialises exchanges on that session
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// In-memory registry of sessions keyed by id
///
/// With an idle TTL set, sessions untouched for longer than the TTL are
/// dropped whenever a new session is created.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SharedSession>>,
    window: ContextWindow,
    greeting: Option<String>,
    idle_ttl: Option<Duration>,
}

impl SessionManager {
    /// Create a session manager whose sessions use `window`
    pub fn new(window: ContextWindow) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            window,
            greeting: None,
            idle_ttl: None,
        }
    }

    /// Sessions created by this manager start with `greeting` in their display log
    pub fn with_greeting(window: ContextWindow, greeting: impl Into<String>) -> Self {
        Self {
            greeting: Some(greeting.into()),
            ..Self::new(window)
        }
    }

    /// Expire sessions idle for longer than `ttl`
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = Some(ttl);
        self
    }

    /// Create and register a new session
    pub async fn create(&self) -> (String, SharedSession) {
        self.evict_idle().await;

        let session = match &self.greeting {
            Some(greeting) => ChatSession::with_greeting(self.window, greeting),
            None => ChatSession::new(self.window),
        };
        let id = session.id().to_string();
        let shared = Arc::new(Mutex::new(session));

        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::clone(&shared));
        info!("Created session: {}", id);

        (id, shared)
    }

    /// Look up a session by id
    pub async fn get(&self, id: &str) -> Result<SharedSession> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// Clear a session and re-register it under its new id
    ///
    /// Waits for an in-flight exchange on that session to finish first.
    pub async fn clear(&self, id: &str) -> Result<String> {
        let shared = self.get(id).await?;

        let new_id = {
            let mut session = shared.lock().await;
            if session.id() != id {
                // cleared concurrently; the old id is gone
                return Err(Error::SessionNotFound(id.to_string()));
            }
            session.clear()
        };

        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        sessions.insert(new_id.clone(), shared);
        info!("Cleared session {} -> {}", id, new_id);

        Ok(new_id)
    }

    /// Drop sessions idle for longer than the TTL; returns how many went
    ///
    /// A session whose lock is held is mid-exchange and is kept.
    pub async fn evict_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let now = Utc::now();

        let expired: Vec<String> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter(|(_, shared)| match shared.try_lock() {
                    Ok(session) => (now - session.updated_at())
                        .to_std()
                        .map(|idle| idle > ttl)
                        .unwrap_or(false),
                    Err(_) => false,
                })
                .map(|(id, _)| id.clone())
                .collect()
        };

        let mut evicted = 0;
        for id in &expired {
            if self.remove(id).await {
                evicted += 1;
            }
        }
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }

    /// Drop a session entirely
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            debug!("Removed session: {}", id);
        }
        removed
    }

    /// Get session count
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let manager = SessionManager::new(ContextWindow::WEB);

        let (id, _) = manager.create().await;
        let session = manager.get(&id).await.unwrap();

        assert_eq!(session.lock().await.id(), id);
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let manager = SessionManager::new(ContextWindow::WEB);
        let result = manager.get("nope").await;
        assert!(matches!(result, Err(Error::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new(ContextWindow::WEB);
        let (a, _) = manager.create().await;
        let (b, _) = manager.create().await;
        assert_ne!(a, b);

        manager
            .get(&a)
            .await
            .unwrap()
            .lock()
            .await
            .history
            .push(crate::session::Turn::user("only in a"));

        assert!(manager.get(&b).await.unwrap().lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_clear_rekeys_session() {
        let manager = SessionManager::with_greeting(ContextWindow::WEB, "Welcome");
        let (old_id, shared) = manager.create().await;
        shared
            .lock()
            .await
            .history
            .push(crate::session::Turn::user("Hi"));

        let new_id = manager.clear(&old_id).await.unwrap();

        assert_ne!(new_id, old_id);
        assert!(manager.get(&old_id).await.is_err());

        let session = manager.get(&new_id).await.unwrap();
        let session = session.lock().await;
        assert!(session.history().is_empty());
        assert_eq!(session.display_log().len(), 1);
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let manager = SessionManager::new(ContextWindow::CLI);
        let (id, _) = manager.create().await;

        assert!(manager.remove(&id).await);
        assert!(!manager.remove(&id).await);
        assert_eq!(manager.len().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_on_create() {
        let manager =
            SessionManager::new(ContextWindow::WEB).with_idle_ttl(Duration::from_millis(20));
        let (stale, _) = manager.create().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        let (fresh, _) = manager.create().await;

        assert!(manager.get(&stale).await.is_err());
        assert!(manager.get(&fresh).await.is_ok());
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_busy_sessions_survive_eviction() {
        let manager =
            SessionManager::new(ContextWindow::WEB).with_idle_ttl(Duration::from_millis(20));
        let (busy, shared) = manager.create().await;
        let _guard = shared.lock().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        manager.create().await;

        assert!(manager.get(&busy).await.is_ok());
        assert_eq!(manager.len().await, 2);
    }

    #[tokio::test]
    async fn test_without_ttl_nothing_expires() {
        let manager = SessionManager::new(ContextWindow::WEB);
        manager.create().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(manager.evict_idle().await, 0);
        assert_eq!(manager.len().await, 1);
    }
}
