use super::{Session, Step};
use crate::shared::UserId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Keyed storage for in-progress sessions. A user without a stored session
/// is idle; storing an `Idle` session is the same as removing it.
///
/// Callers serialize work per user (see `runtime::scheduler`), so a
/// `get` followed by `put` for one user never interleaves with another
/// handler for the same user.
pub trait SessionStore: Send + Sync {
    fn get(&self, user: UserId) -> Option<Session>;
    fn put(&self, user: UserId, session: Session);
    fn remove(&self, user: UserId) -> Option<Session>;
    /// Drops sessions untouched since before `cutoff` (unix seconds).
    fn evict_idle(&self, cutoff: i64) -> Vec<UserId>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<UserId, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user: UserId) -> Option<Session> {
        self.sessions().get(&user).cloned()
    }

    fn put(&self, user: UserId, session: Session) {
        let mut sessions = self.sessions();
        if session.step() == Step::Idle {
            sessions.remove(&user);
            return;
        }
        sessions.insert(user, session);
    }

    fn remove(&self, user: UserId) -> Option<Session> {
        self.sessions().remove(&user)
    }

    fn evict_idle(&self, cutoff: i64) -> Vec<UserId> {
        let mut sessions = self.sessions();
        let mut evicted: Vec<UserId> = sessions
            .iter()
            .filter(|(_, session)| session.touched_at() < cutoff)
            .map(|(user, _)| *user)
            .collect();
        for user in &evicted {
            sessions.remove(user);
        }
        evicted.sort();
        evicted
    }

    fn len(&self) -> usize {
        self.sessions().len()
    }
}
