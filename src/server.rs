//!
//! Researchable HTTP server
//! ------------------------
//! Axum router for the marketing site, sign-in/sign-up, the session-gated
//! dashboard and the setup wizard.
//!
//! Responsibilities:
//! - Session cookie handling; the cookie holds only an opaque id into the
//!   gateway's session table.
//! - Forwarding credentials to the auth gateway and rendering its errors inline.
//! - Redirecting visitors without a session away from the dashboard.
//! - Driving the setup wizard's connectivity probe.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::backend::SessionClient;
use crate::config::{ServerConfig, ServiceConfig};
use crate::error::{AppError, ServiceError};
use crate::identity::{AuthGateway, Role, SessionStore, SignUpData};
use crate::views::auth::{confirm_email_page, sign_in_page, sign_up_page, SignUpForm};
use crate::views::dashboard::{self, DashboardState};
use crate::views::setup::{self, SetupWizard};
use crate::views::home;

pub const SESSION_COOKIE: &str = "researchable_session";

pub const HOME_ROUTE: &str = "/";
pub const SIGN_IN_ROUTE: &str = "/auth/signin";
pub const SIGN_UP_ROUTE: &str = "/auth/signup";
pub const SIGN_OUT_ROUTE: &str = "/auth/signout";
pub const DASHBOARD_ROUTE: &str = "/dashboard";
pub const SETUP_ROUTE: &str = "/setup";

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AuthGateway>,
    pub client: Arc<SessionClient>,
    /// One wizard per process; its flag suppresses concurrent probes.
    pub wizard: SetupWizard,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(server: ServerConfig, service: ServiceConfig) -> Self {
        let client = Arc::new(SessionClient::new(service));
        let gateway = Arc::new(AuthGateway::new(client.clone(), SessionStore::new()));
        Self {
            gateway,
            client,
            wizard: SetupWizard::new(),
            config: Arc::new(server),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HOME_ROUTE, get(home_page))
        .route("/healthz", get(|| async { "researchable ok" }))
        .route(SIGN_IN_ROUTE, get(sign_in_form).post(sign_in))
        .route(SIGN_UP_ROUTE, get(sign_up_form).post(sign_up))
        .route(SIGN_OUT_ROUTE, post(sign_out))
        .route(DASHBOARD_ROUTE, get(dashboard_page))
        .route(SETUP_ROUTE, get(setup_page))
        .route("/setup/test", post(setup_test))
        .fallback(not_found)
        .with_state(state)
}

/// Bind and serve until Ctrl+C / SIGTERM.
pub async fn run(server: ServerConfig, service: ServiceConfig) -> anyhow::Result<()> {
    let address = server.address();
    let state = AppState::new(server, service);
    if !state.client.is_configured() {
        warn!("running in demo mode; visit {SETUP_ROUTE} to connect Supabase");
    }
    let app = build_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all("cookie") {
        let Ok(s) = value.to_str() else { continue };
        for part in s.split(';') {
            if let Some((k, v)) = part.trim().split_once('=') {
                if k == name && !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

fn cookie_attrs(secure: bool) -> &'static str {
    if secure { "HttpOnly; Secure; SameSite=Lax; Path=/" } else { "HttpOnly; SameSite=Lax; Path=/" }
}

fn set_session_cookie(sid: &str, secure: bool) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{SESSION_COOKIE}={sid}; {}", cookie_attrs(secure))).ok()
}

fn clear_session_cookie(secure: bool) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; {}",
        cookie_attrs(secure)
    ))
    .ok()
}

fn with_cookie(cookie: Option<HeaderValue>, to: &str) -> Response {
    let mut headers = HeaderMap::new();
    if let Some(c) = cookie {
        headers.insert(SET_COOKIE, c);
    }
    (headers, Redirect::to(to)).into_response()
}

fn failure_status(err: &ServiceError) -> StatusCode {
    StatusCode::from_u16(AppError::from(err.clone()).http_status()).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn home_page() -> Html<String> {
    Html(home::render())
}

async fn not_found() -> AppError {
    AppError::not_found("not_found", "Page not found")
}

#[derive(Debug, Deserialize)]
struct SignInInput {
    email: String,
    password: String,
}

async fn sign_in_form() -> Html<String> {
    Html(sign_in_page("", None))
}

async fn sign_in(State(state): State<AppState>, Form(input): Form<SignInInput>) -> Response {
    let email = input.email.trim();
    match state.gateway.sign_in(email, &input.password).await {
        Ok(signed_in) => with_cookie(set_session_cookie(&signed_in.session_id, state.config.secure_cookies), DASHBOARD_ROUTE),
        Err(err) => {
            warn!(code = err.code_str(), "sign-in rejected: {err}");
            (failure_status(&err), Html(sign_in_page(email, Some(&err.to_string())))).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SignUpQuery {
    role: Option<String>,
}

async fn sign_up_form(Query(q): Query<SignUpQuery>) -> Html<String> {
    let form = SignUpForm { role: q.role.as_deref().map(Role::parse).unwrap_or_default(), ..Default::default() };
    Html(sign_up_page(&form, None))
}

#[derive(Debug, Deserialize)]
struct SignUpInput {
    email: String,
    password: String,
    full_name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    school_name: Option<String>,
    #[serde(default)]
    grade_level: Option<String>,
}

impl SignUpInput {
    fn echo(&self) -> SignUpForm {
        SignUpForm {
            email: self.email.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            role: self.role.as_deref().map(Role::parse).unwrap_or_default(),
            school_name: self.school_name.clone().unwrap_or_default(),
            grade_level: self.grade_level.clone().unwrap_or_default(),
        }
    }

    fn metadata(&self) -> Result<SignUpData, String> {
        let form = self.echo();
        if form.full_name.is_empty() {
            return Err("Full name is required".to_string());
        }
        let grade_level = match self.grade_level.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            None => None,
            Some(raw) => Some(raw.parse::<u8>().map_err(|_| format!("Grade must be a number, got '{raw}'"))?),
        };
        let school_name = Some(form.school_name.trim().to_string()).filter(|s| !s.is_empty());
        Ok(SignUpData { full_name: form.full_name, role: form.role, school_name, grade_level })
    }
}

async fn sign_up(State(state): State<AppState>, Form(input): Form<SignUpInput>) -> Response {
    let echo = input.echo();
    let data = match input.metadata() {
        Ok(d) => d,
        Err(msg) => return (StatusCode::BAD_REQUEST, Html(sign_up_page(&echo, Some(&msg)))).into_response(),
    };
    match state.gateway.sign_up(&echo.email, &input.password, &data).await {
        Ok(outcome) => match outcome.session_id {
            Some(sid) => with_cookie(set_session_cookie(&sid, state.config.secure_cookies), DASHBOARD_ROUTE),
            None => Html(confirm_email_page(&echo.email)).into_response(),
        },
        Err(err) => {
            warn!(code = err.code_str(), "sign-up rejected: {err}");
            let status = match &err {
                ServiceError::Auth(_) => StatusCode::BAD_REQUEST,
                other => failure_status(other),
            };
            (status, Html(sign_up_page(&echo, Some(&err.to_string())))).into_response()
        }
    }
}

/// Sign-out always lands on home. An upstream failure is logged and dropped.
async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = parse_cookie(&headers, SESSION_COOKIE);
    if let Err(err) = state.gateway.sign_out(sid.as_deref()).await {
        warn!(code = err.code_str(), "ignoring sign-out failure: {err}");
    }
    with_cookie(clear_session_cookie(state.config.secure_cookies), HOME_ROUTE)
}

async fn dashboard_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = parse_cookie(&headers, SESSION_COOKIE);
    match DashboardState::load(&state.gateway, sid.as_deref()).await {
        DashboardState::Authenticated(profile) => Html(dashboard::render(&profile)).into_response(),
        DashboardState::Unauthenticated | DashboardState::Loading => Redirect::to(SIGN_IN_ROUTE).into_response(),
    }
}

async fn setup_page(State(state): State<AppState>) -> Html<String> {
    Html(setup::render(&state.wizard.landing_status()))
}

/// Runs one probe. The guard puts the wizard back into a triggerable state
/// even if this future is dropped mid-probe.
async fn setup_test(State(state): State<AppState>) -> Response {
    let Some(guard) = state.wizard.begin() else {
        return (StatusCode::CONFLICT, Html(setup::render(&state.wizard.status()))).into_response();
    };
    let result = state.client.probe().await;
    info!(success = result.success, "setup probe: {}", result.message);
    let status = guard.finish(result);
    Html(setup::render(&status)).into_response()
}
