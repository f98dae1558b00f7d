//! Process configuration.
//!
//! Two explicitly constructed objects, built once in `main` and handed to the
//! components that need them:
//! - [`ServiceConfig`]: endpoint and public key of the hosted Supabase project.
//! - [`ServerConfig`]: listener and cookie settings for the HTTP server.
//!
//! Missing service configuration never aborts startup; the app boots in a
//! degraded mode and the setup wizard reports what is absent.

use std::env;

use tracing::{info, warn};

pub const SERVICE_URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_KEY_VAR: &str = "SUPABASE_ANON_KEY";

pub const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";
pub const PLACEHOLDER_KEY: &str = "placeholder-key";

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_BIND_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl ServiceConfig {
    pub fn new(url: Option<String>, anon_key: Option<String>) -> Self {
        Self { url: non_blank(url), anon_key: non_blank(anon_key) }
    }

    pub fn from_env() -> Self {
        let cfg = Self::new(env::var(SERVICE_URL_VAR).ok(), env::var(SERVICE_KEY_VAR).ok());
        if !cfg.is_configured() {
            warn!(missing = ?cfg.missing(), "Supabase environment variables not found. Some features may not work.");
        }
        cfg
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.url.is_none() { out.push(SERVICE_URL_VAR); }
        if self.anon_key.is_none() { out.push(SERVICE_KEY_VAR); }
        out
    }

    /// Configured endpoint, or the placeholder used in degraded mode.
    pub fn endpoint(&self) -> &str {
        self.url.as_deref().unwrap_or(PLACEHOLDER_URL)
    }

    pub fn key(&self) -> &str {
        self.anon_key.as_deref().unwrap_or(PLACEHOLDER_KEY)
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_port: u16,
    pub bind_host: String,
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { http_port: DEFAULT_HTTP_PORT, bind_host: DEFAULT_BIND_HOST.to_string(), secure_cookies: true }
    }
}

pub const USAGE: &str = "researchable\n\nUSAGE:\n  researchable [--http-port N] [--bind HOST] [--insecure-cookies]\n\nOPTIONS:\n  --http-port N        HTTP port (env: RESEARCHABLE_HTTP_PORT, default 3000)\n  --bind HOST          Bind address (env: RESEARCHABLE_BIND, default 0.0.0.0)\n  --insecure-cookies   Drop the Secure cookie flag for plain-http development (env: RESEARCHABLE_SECURE_COOKIES=false)\n\nSERVICE:\n  SUPABASE_URL         Project URL\n  SUPABASE_ANON_KEY    Public anon key\n";

impl ServerConfig {
    /// Resolve settings from CLI arguments first, then environment, then defaults.
    pub fn from_args_and_env(args: &[String]) -> Self {
        let defaults = Self::default();

        let http_port = parse_port_arg(args, "--http-port")
            .or_else(|| parse_port_env("RESEARCHABLE_HTTP_PORT"))
            .unwrap_or(defaults.http_port);
        let bind_host = parse_value_arg(args, "--bind")
            .or_else(|| env::var("RESEARCHABLE_BIND").ok())
            .unwrap_or(defaults.bind_host);
        let secure_cookies = if has_flag(args, "--insecure-cookies") {
            false
        } else {
            parse_bool_env("RESEARCHABLE_SECURE_COOKIES").unwrap_or(defaults.secure_cookies)
        };

        info!(http_port, bind_host = %bind_host, secure_cookies, "server configuration resolved");
        Self { http_port, bind_host, secure_cookies }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_host, self.http_port)
    }
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_value_arg(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).filter(|v| !v.starts_with('-')).cloned()
}

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let raw = parse_value_arg(args, flag)?;
    parse_port(flag, &raw)
}

fn parse_port_env(name: &str) -> Option<u16> {
    let raw = env::var(name).ok()?;
    parse_port(name, &raw)
}

fn parse_port(source: &str, raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("Invalid {source} value '{raw}': {e}; using default");
            None
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    let parsed = parse_bool(&raw);
    if parsed.is_none() {
        warn!("Invalid {name} value '{raw}'; using default");
    }
    parsed
}
