//! In-memory session store keyed by the (unsigned) session identifier.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

use crate::crypto::random_token;

/// Authentication state held for one browser.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    /// Kept as issued. Nothing refreshes tokens; an expired session re-runs the login.
    pub refresh_token: Option<String>,
    pub last_seen: DateTime<Utc>,
}

/// Thread-safe session map with idle expiry.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36500)),
        }
    }

    /// Store a fresh token pair and return the new session id.
    pub fn create(&self, access_token: String, refresh_token: Option<String>) -> String {
        let id = random_token();
        let now = Utc::now();
        self.sessions.write().insert(
            id.clone(),
            Session {
                access_token,
                refresh_token,
                last_seen: now,
            },
        );
        id
    }

    /// Look up a live session and mark it as seen.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.get_at(id, Utc::now())
    }

    fn get_at(&self, id: &str, now: DateTime<Utc>) -> Option<Session> {
        let mut guard = self.sessions.write();
        let expired = guard.get(id).map(|s| self.is_expired(s, now))?;
        if expired {
            guard.remove(id);
            return None;
        }
        let session = guard.get_mut(id)?;
        session.last_seen = now;
        Some(session.clone())
    }

    /// Remove a session. Returns whether one existed.
    pub fn destroy(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    /// Drop every idle session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.sessions.write();
        let before = guard.len();
        guard.retain(|_, s| !self.is_expired(s, now));
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.last_seen) > self.ttl
    }
}
