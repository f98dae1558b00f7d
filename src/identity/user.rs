use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity issued by the hosted auth service. Only read, never written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata attached at sign-up (role, full name, school, grade).
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Token pair plus user returned by sign-in, refresh and auto-confirmed sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// Sign-up answers with a session when the project auto-confirms, or with the
/// bare user while email confirmation is pending.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(AuthSession),
    Pending(AuthUser),
}
