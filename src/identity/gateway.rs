use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::SessionClient;
use crate::error::{ServiceError, ServiceResult};

use super::profile::Role;
use super::session::{SessionId, SessionStore};
use super::user::{AuthUser, SignUpResponse};

/// Metadata attached to the account at sign-up; read back by the profile adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpData {
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    /// `None` while upstream waits for email confirmation.
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: AuthUser,
    pub session_id: SessionId,
}

/// Sign-up, sign-in, sign-out and current-user lookups. Each call is at most
/// one round trip to the auth service and nothing is retried.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    client: Arc<SessionClient>,
    sessions: SessionStore,
}

impl AuthGateway {
    pub fn new(client: Arc<SessionClient>, sessions: SessionStore) -> Self {
        Self { client, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn sign_up(&self, email: &str, password: &str, data: &SignUpData) -> ServiceResult<SignUpOutcome> {
        let meta = serde_json::to_value(data).map_err(|e| ServiceError::Unknown(e.to_string()))?;
        match self.client.sign_up(email, password, &meta).await? {
            SignUpResponse::Session(session) => {
                let user = session.user.clone();
                let sid = self.sessions.issue(session)?;
                info!(user = %user.id, role = data.role.as_str(), "auth.sign_up active");
                Ok(SignUpOutcome { user, session_id: Some(sid) })
            }
            SignUpResponse::Pending(user) => {
                info!(user = %user.id, role = data.role.as_str(), "auth.sign_up pending confirmation");
                Ok(SignUpOutcome { user, session_id: None })
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<SignedIn> {
        let session = self.client.sign_in_with_password(email, password).await?;
        let user = session.user.clone();
        let session_id = self.sessions.issue(session)?;
        info!(user = %user.id, "auth.sign_in");
        Ok(SignedIn { user, session_id })
    }

    /// Drops the local session, then revokes it upstream. Without a session
    /// this is a no-op.
    pub async fn sign_out(&self, sid: Option<&str>) -> ServiceResult<()> {
        let Some(stored) = sid.and_then(|s| self.sessions.remove(s)) else {
            debug!("auth.sign_out without active session");
            return Ok(());
        };
        info!(user = %stored.user.id, "auth.sign_out");
        self.client.logout(&stored.access_token).await
    }

    /// Current user for `sid`, or `None` when there is no local session.
    ///
    /// A live token is checked with the user endpoint; an expired one is
    /// refreshed instead, and the refresh answer carries the user. Sessions
    /// the service rejects are forgotten.
    pub async fn current_user(&self, sid: Option<&str>) -> ServiceResult<Option<AuthUser>> {
        let Some(sid) = sid else { return Ok(None) };
        let Some(stored) = self.sessions.get(sid) else { return Ok(None) };

        let result = match stored.refresh_token.as_deref() {
            Some(refresh) if stored.is_expired(Utc::now()) => {
                debug!(user = %stored.user.id, "auth.refresh");
                self.client.refresh_session(refresh).await.map(|fresh| {
                    let user = fresh.user.clone();
                    self.sessions.replace(sid, fresh);
                    user
                })
            }
            _ => self.client.get_user(&stored.access_token).await,
        };

        match result {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                if matches!(err, ServiceError::Auth(_)) {
                    self.sessions.remove(sid);
                }
                Err(err)
            }
        }
    }
}
