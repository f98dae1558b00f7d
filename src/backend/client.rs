use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{ServiceConfig, SERVICE_KEY_VAR, SERVICE_URL_VAR};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::{AuthSession, AuthUser, SignUpResponse};

use super::probe::ProbeResult;

/// Collection the connectivity probe counts rows in.
pub const PROBE_COLLECTION: &str = "profiles";

pub fn missing_config_message() -> String {
    format!("Environment variables {SERVICE_URL_VAR} and {SERVICE_KEY_VAR} are required")
}

/// Client for the hosted auth (`/auth/v1`) and data (`/rest/v1`) APIs.
///
/// Built once from an explicit [`ServiceConfig`]. When configuration is
/// missing the placeholder endpoint is kept so the process still boots, but
/// every call short-circuits with [`ServiceError::ConfigMissing`] instead of
/// touching the network.
#[derive(Debug, Clone)]
pub struct SessionClient {
    config: ServiceConfig,
    http: reqwest::Client,
}

impl SessionClient {
    pub fn new(config: ServiceConfig) -> Self {
        if !config.is_configured() {
            warn!(endpoint = config.endpoint(), "service client created with placeholder configuration");
        }
        Self { config, http: reqwest::Client::new() }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn ensure_configured(&self) -> ServiceResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(ServiceError::ConfigMissing(missing_config_message()))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint().trim_end_matches('/'), path)
    }

    fn headers(&self, bearer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(self.config.key()) {
            headers.insert("apikey", v);
        }
        let token = bearer.unwrap_or(self.config.key());
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }

    async fn auth_post<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>, body: &Value) -> ServiceResult<T> {
        self.ensure_configured()?;
        debug!(path, "auth request");
        let resp = self
            .http
            .post(self.url(path))
            .headers(self.headers(bearer))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;
        decode_auth(resp).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, data: &Value) -> ServiceResult<SignUpResponse> {
        let body = json!({"email": email, "password": password, "data": data});
        self.auth_post("/auth/v1/signup", None, &body).await
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let body = json!({"email": email, "password": password});
        self.auth_post("/auth/v1/token?grant_type=password", None, &body).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> ServiceResult<AuthSession> {
        let body = json!({"refresh_token": refresh_token});
        self.auth_post("/auth/v1/token?grant_type=refresh_token", None, &body).await
    }

    pub async fn get_user(&self, access_token: &str) -> ServiceResult<AuthUser> {
        self.ensure_configured()?;
        debug!("auth request path=/auth/v1/user");
        let resp = self
            .http
            .get(self.url("/auth/v1/user"))
            .headers(self.headers(Some(access_token)))
            .send()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;
        decode_auth(resp).await
    }

    pub async fn logout(&self, access_token: &str) -> ServiceResult<()> {
        self.ensure_configured()?;
        debug!("auth request path=/auth/v1/logout");
        let resp = self
            .http
            .post(self.url("/auth/v1/logout"))
            .headers(self.headers(Some(access_token)))
            .send()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        Err(ServiceError::Auth(upstream_message(status, &text)))
    }

    /// One `HEAD` count query against `collection`; no rows are transferred.
    /// Returns the exact total when the service reports it.
    pub async fn count_rows(&self, collection: &str) -> ServiceResult<Option<u64>> {
        self.ensure_configured()?;
        let resp = self
            .http
            .head(self.url(&format!("/rest/v1/{collection}")))
            .headers(self.headers(None))
            .header("Prefer", "count=exact")
            .query(&[("select", "id")])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Query(upstream_message(status, &text)));
        }
        let total = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        Ok(total)
    }

    /// Connectivity probe driven by the setup wizard.
    pub async fn probe(&self) -> ProbeResult {
        match self.count_rows(PROBE_COLLECTION).await {
            Ok(total) => {
                debug!(collection = PROBE_COLLECTION, ?total, "probe succeeded");
                ProbeResult::connected()
            }
            Err(err) => {
                debug!(code = err.code_str(), "probe failed: {err}");
                ProbeResult::from_error(&err)
            }
        }
    }
}

async fn decode_auth<T: DeserializeOwned>(resp: Response) -> ServiceResult<T> {
    let status = resp.status();
    let text = resp.text().await.map_err(|e| ServiceError::Auth(e.to_string()))?;
    if !status.is_success() {
        return Err(ServiceError::Auth(upstream_message(status, &text)));
    }
    serde_json::from_str(&text).map_err(|e| ServiceError::Unknown(format!("unexpected auth response: {e}")))
}

/// Pull the human readable message out of an upstream error body.
pub fn upstream_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if let Some(v) = parsed.as_ref() {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(s) = v.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()) {
                return s.to_string();
            }
        }
    }
    format!("HTTP {}", status.as_u16())
}

/// `0-0/42` or `*/42` -> 42. `*/*` or garbage -> None.
fn parse_content_range_total(raw: &str) -> Option<u64> {
    raw.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}
