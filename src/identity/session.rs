use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

use super::user::{AuthSession, AuthUser};

/// Opaque id carried in the visitor's cookie.
pub type SessionId = String;

/// Used when upstream omits both `expires_at` and `expires_in`.
const FALLBACK_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl StoredSession {
    pub fn from_auth(session: AuthSession, now: DateTime<Utc>) -> Self {
        let expires_at = session
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + Duration::seconds(session.expires_in.unwrap_or(FALLBACK_TTL_SECS)));
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at,
            user: session.user,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Expired with nothing to refresh it: upstream would reject it anyway.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_none() && self.is_expired(now)
    }
}

fn gen_id() -> ServiceResult<SessionId> {
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| ServiceError::Unknown(format!("session id generation failed: {e}")))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// Server-side session table keyed by cookie id. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, StoredSession>>>,
}

impl SessionStore {
    pub fn new() -> Self { Self::default() }

    /// Store a fresh session under a new id. Stale entries are swept first.
    pub fn issue(&self, session: AuthSession) -> ServiceResult<SessionId> {
        let sid = gen_id()?;
        let now = Utc::now();
        let stored = StoredSession::from_auth(session, now);
        debug!(user = %stored.user.id, expires_at = %stored.expires_at, "session.issue");
        let mut map = self.sessions.write();
        let before = map.len();
        map.retain(|_, s| !s.is_stale(now));
        if map.len() < before {
            debug!(pruned = before - map.len(), "session.prune");
        }
        map.insert(sid.clone(), stored);
        Ok(sid)
    }

    /// Stale sessions read as absent and are dropped on the way.
    pub fn get(&self, sid: &str) -> Option<StoredSession> {
        let now = Utc::now();
        let found = self.sessions.read().get(sid).cloned()?;
        if found.is_stale(now) {
            self.sessions.write().remove(sid);
            return None;
        }
        Some(found)
    }

    /// Drop every stale session. Returns how many were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut map = self.sessions.write();
        let before = map.len();
        map.retain(|_, s| !s.is_stale(now));
        before - map.len()
    }

    /// Swap in refreshed tokens. Returns false if the session was removed meanwhile.
    pub fn replace(&self, sid: &str, session: AuthSession) -> bool {
        let mut map = self.sessions.write();
        match map.get_mut(sid) {
            Some(slot) => {
                *slot = StoredSession::from_auth(session, Utc::now());
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, sid: &str) -> Option<StoredSession> {
        self.sessions.write().remove(sid)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
