use serde::Serialize;

use crate::error::ServiceError;

const SQL_HINT: &str = "Make sure you've run the SQL scripts in your Supabase project.";

/// Outcome of one connectivity probe. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub success: bool,
    pub message: String,
}

impl ProbeResult {
    pub fn connected() -> Self {
        Self { success: true, message: "Connected to Supabase successfully".to_string() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }

    pub fn from_error(err: &ServiceError) -> Self {
        match err {
            ServiceError::ConfigMissing(msg) => Self::failed(msg.clone()),
            ServiceError::Query(msg) => Self::failed(format!("Database error: {msg}. {SQL_HINT}")),
            ServiceError::Auth(_) | ServiceError::Unknown(_) => Self::failed(format!("Connection failed: {err}")),
        }
    }
}
