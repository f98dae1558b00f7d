//! Error model.
//!
//! [`ServiceError`] classifies failures at the boundary with the hosted
//! auth/data service. [`AppError`] is what HTTP handlers return when a request
//! cannot be answered with a regular page; it carries a stable code and the
//! message shown to the visitor.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    ConfigMissing(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Query(String),
    #[error("{}", or_unknown(.0))]
    Unknown(String),
}

fn or_unknown(msg: &str) -> &str {
    if msg.is_empty() { "Unknown error" } else { msg }
}

impl ServiceError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ServiceError::ConfigMissing(_) => "config_missing",
            ServiceError::Auth(_) => "auth_error",
            ServiceError::Query(_) => "query_error",
            ServiceError::Unknown(_) => "unknown_error",
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Unknown(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Auth { code: String, message: String },
    NotFound { code: String, message: String },
    Upstream { code: String, message: String },
    Unavailable { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Auth { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Upstream { code, .. }
            | AppError::Unavailable { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Auth { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Upstream { message, .. }
            | AppError::Unavailable { message, .. } => message.as_str(),
        }
    }

    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Auth { .. } => 401,
            AppError::NotFound { .. } => 404,
            AppError::Upstream { .. } => 502,
            AppError::Unavailable { .. } => 503,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let code = err.code_str().to_string();
        let message = err.to_string();
        match err {
            ServiceError::ConfigMissing(_) => AppError::Unavailable { code, message },
            ServiceError::Auth(_) => AppError::Auth { code, message },
            ServiceError::Query(_) | ServiceError::Unknown(_) => AppError::Upstream { code, message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::debug!(code = self.code_str(), status = status.as_u16(), "request failed");
        (status, Html(crate::views::error_page(status.as_u16(), self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_page() {
        let e = AppError::not_found("not_found", "Page not found");
        assert_eq!(e.http_status(), 404);
        assert_eq!(e.to_string(), "not_found: Page not found");
    }

    #[test]
    fn service_error_mapping() {
        let e: AppError = ServiceError::Auth("Invalid login credentials".into()).into();
        assert_eq!(e.http_status(), 401);
        assert_eq!(e.code_str(), "auth_error");
        assert_eq!(e.message(), "Invalid login credentials");

        let e: AppError = ServiceError::ConfigMissing("SUPABASE_URL is required".into()).into();
        assert_eq!(e.http_status(), 503);
        assert_eq!(e.code_str(), "config_missing");

        let e: AppError = ServiceError::Query("relation does not exist".into()).into();
        assert_eq!(e.http_status(), 502);
        let e: AppError = ServiceError::Unknown(String::new()).into();
        assert_eq!(e.http_status(), 502);
        assert_eq!(e.message(), "Unknown error");
    }

    #[test]
    fn unknown_error_with_empty_message_has_fallback_text() {
        assert_eq!(ServiceError::Unknown(String::new()).to_string(), "Unknown error");
        assert_eq!(ServiceError::Unknown("socket closed".into()).to_string(), "socket closed");
    }
}
