use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::RwLock};
use uuid::Uuid;

/// Maps opaque session tokens to the user that logged in.
pub trait SessionStore: Send + Sync {
    fn create(&self, user: &str) -> String;
    fn lookup(&self, token: &str) -> Option<String>;
    fn remove(&self, token: &str);
}

#[derive(Debug, Clone)]
struct Session {
    user: String,
    expires_at: DateTime<Utc>,
}

/// Process-local sessions with an absolute lifetime.
pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn purge_expired(map: &mut HashMap<String, Session>, now: DateTime<Utc>) {
        map.retain(|_, s| s.expires_at > now);
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let session = Session {
            user: user.to_string(),
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        // a poisoned map only held plain data; keep using it
        let mut map = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        Self::purge_expired(&mut map, now);
        map.insert(token.clone(), session);
        token
    }

    fn lookup(&self, token: &str) -> Option<String> {
        let now = Utc::now();
        {
            let map = self.sessions.read().unwrap_or_else(|e| e.into_inner());
            match map.get(token) {
                Some(s) if s.expires_at > now => return Some(s.user.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.remove(token);
        None
    }

    fn remove(&self, token: &str) {
        let mut map = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        map.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(store: &InMemorySessionStore) -> usize {
        store.sessions.read().unwrap().len()
    }

    #[test]
    fn test_create_lookup_remove() {
        let store = InMemorySessionStore::new(Duration::hours(1));
        let token = store.create("ana");
        assert_eq!(token.len(), 32);
        assert_eq!(store.lookup(&token).as_deref(), Some("ana"));
        assert_eq!(store.lookup("bogus"), None);

        store.remove(&token);
        assert_eq!(store.lookup(&token), None);
        assert_eq!(active(&store), 0);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let store = InMemorySessionStore::new(Duration::hours(1));
        let a = store.create("ana");
        let b = store.create("ana");
        assert_ne!(a, b);
        assert_eq!(active(&store), 2);
    }

    #[test]
    fn test_expired_session_resolves_to_none() {
        let store = InMemorySessionStore::new(Duration::seconds(-1));
        let token = store.create("ana");
        assert_eq!(store.lookup(&token), None);
        assert_eq!(active(&store), 0);
    }

    #[test]
    fn test_oversized_ttl_saturates() {
        let store = InMemorySessionStore::new(Duration::MAX);
        let token = store.create("ana");
        assert_eq!(store.lookup(&token).as_deref(), Some("ana"));
    }
}
