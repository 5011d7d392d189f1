//! Server-side session storage.
//!
//! Clients hold only an opaque token; the username it maps to lives here.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};

use galley_auth::{Session, SessionToken, validate_session};

/// Default session lifetime: twelve hours.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 12 * 60 * 60;

pub trait SessionStore: Send + Sync {
    fn insert(&self, session: Session);
    fn get(&self, token: &SessionToken) -> Option<Session>;
    fn remove(&self, token: &SessionToken) -> Option<Session>;
    /// Drop every session failing `keep`; returns how many were removed.
    fn retain(&self, keep: &dyn Fn(&Session) -> bool) -> usize;
}

/// In-memory session store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionToken, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Writes are single map operations, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionToken, Session>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionToken, Session>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) {
        self.write().insert(session.token.clone(), session);
    }

    fn get(&self, token: &SessionToken) -> Option<Session> {
        self.read().get(token).cloned()
    }

    fn remove(&self, token: &SessionToken) -> Option<Session> {
        self.write().remove(token)
    }

    fn retain(&self, keep: &dyn Fn(&Session) -> bool) -> usize {
        let mut map = self.write();
        let before = map.len();
        map.retain(|_, s| keep(s));
        before - map.len()
    }
}

/// Issues, resolves and revokes sessions with a fixed lifetime.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(InMemorySessionStore::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `username`. Sessions already expired at `now`
    /// are purged first, so abandoned logins do not accumulate.
    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Session {
        let purged = self.purge_expired(now);
        if purged > 0 {
            tracing::debug!(purged, "expired sessions purged");
        }
        let session = Session::issue(username, now, self.ttl);
        self.store.insert(session.clone());
        tracing::debug!(username, expires_at = %session.expires_at, "session issued");
        session
    }

    /// Live session for `token`. Expired sessions are removed on sight.
    pub fn resolve(&self, token: &SessionToken, now: DateTime<Utc>) -> Option<Session> {
        let session = self.store.get(token)?;
        match validate_session(&session, now) {
            Ok(()) => Some(session),
            Err(reason) => {
                tracing::debug!(username = %session.username, %reason, "session rejected");
                self.store.remove(token);
                None
            }
        }
    }

    pub fn revoke(&self, token: &SessionToken) -> bool {
        self.store.remove(token).is_some()
    }

    /// Drop sessions whose lifetime ended at or before `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.store.retain(&|s| now < s.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::in_memory(Duration::seconds(60))
    }

    #[test]
    fn issued_session_resolves_until_expiry() {
        let sessions = manager();
        let now = Utc::now();
        let session = sessions.issue("cook1", now);

        let resolved = sessions.resolve(&session.token, now + Duration::seconds(30)).unwrap();
        assert_eq!(resolved.username, "cook1");

        assert!(sessions.resolve(&session.token, now + Duration::seconds(60)).is_none());
        // Dropped on the failed lookup, so an earlier clock no longer finds it.
        assert!(sessions.resolve(&session.token, now).is_none());
    }

    #[test]
    fn revoked_session_no_longer_resolves() {
        let sessions = manager();
        let now = Utc::now();
        let session = sessions.issue("admin1", now);
        assert!(sessions.revoke(&session.token));
        assert!(!sessions.revoke(&session.token));
        assert!(sessions.resolve(&session.token, now).is_none());
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let sessions = manager();
        assert!(sessions
            .resolve(&SessionToken::from_string("nope"), Utc::now())
            .is_none());
    }

    #[test]
    fn purge_removes_only_expired_sessions() {
        let sessions = manager();
        let now = Utc::now();
        let fresh = sessions.issue("cook1", now - Duration::seconds(10));
        let old = sessions.issue("cook1", now - Duration::seconds(120));
        assert_eq!(sessions.purge_expired(now), 1);
        assert!(sessions.resolve(&fresh.token, now).is_some());
        assert!(sessions.resolve(&old.token, now).is_none());
    }

    #[test]
    fn abandoned_sessions_are_dropped_by_later_logins() {
        let store = Arc::new(InMemorySessionStore::new());
        let sessions = SessionManager::new(store.clone(), Duration::seconds(60));
        let now = Utc::now();

        for _ in 0..1000 {
            sessions.issue("cook1", now - Duration::hours(1));
        }
        assert_eq!(store.len(), 1000);

        let fresh = sessions.issue("admin1", now);
        assert!(sessions.resolve(&fresh.token, now).is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(sessions.purge_expired(now), 0);
    }

    #[test]
    fn sessions_survive_a_poisoned_lock() {
        let store = Arc::new(InMemorySessionStore::new());
        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("writer panicked while holding the session lock");
        })
        .join();
        assert!(store.inner.is_poisoned());

        let sessions = SessionManager::new(store.clone(), Duration::seconds(60));
        let now = Utc::now();
        let session = sessions.issue("cook1", now);
        assert_eq!(sessions.resolve(&session.token, now).unwrap().username, "cook1");
        assert!(sessions.revoke(&session.token));
        assert!(store.is_empty());
    }
}
