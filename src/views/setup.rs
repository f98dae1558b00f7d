//! Setup wizard: a numbered checklist for provisioning the Supabase project
//! and a connectivity probe with an `Idle -> Testing -> Success | Error` flag.
//!
//! One wizard is shared by the whole process. A probe holds a [`ProbeGuard`]
//! while it runs; further triggers are refused until the guard is settled or
//! dropped. A dropped guard (cancelled request) leaves the wizard in `Error`.
//! A plain page load shows `Idle` unless a probe is in flight, so one
//! visitor's result is only rendered in the response to their own trigger.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::backend::ProbeResult;
use crate::config::{SERVICE_KEY_VAR, SERVICE_URL_VAR};

use super::{brand_link, escape, layout};

pub const CANCELLED_MESSAGE: &str = "Connection failed: probe cancelled before it finished";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProbeStatus {
    #[default]
    Idle,
    Testing,
    Success,
    Error(String),
}

#[derive(Debug, Default)]
struct WizardState {
    status: ProbeStatus,
}

/// Process-wide wizard. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct SetupWizard {
    state: Arc<Mutex<WizardState>>,
}

impl SetupWizard {
    pub fn new() -> Self { Self::default() }

    pub fn status(&self) -> ProbeStatus {
        self.state.lock().status.clone()
    }

    /// What a plain page load shows: `Testing` while a probe runs, else `Idle`.
    pub fn landing_status(&self) -> ProbeStatus {
        match self.status() {
            ProbeStatus::Testing => ProbeStatus::Testing,
            _ => ProbeStatus::Idle,
        }
    }

    pub fn trigger_enabled(&self) -> bool {
        self.state.lock().status != ProbeStatus::Testing
    }

    /// Enter `Testing`. Returns `None` when a probe is already running.
    pub fn begin(&self) -> Option<ProbeGuard> {
        let mut state = self.state.lock();
        if state.status == ProbeStatus::Testing {
            return None;
        }
        state.status = ProbeStatus::Testing;
        Some(ProbeGuard { state: Arc::clone(&self.state), settled: false })
    }
}

/// Held for the duration of one probe.
#[derive(Debug)]
pub struct ProbeGuard {
    state: Arc<Mutex<WizardState>>,
    settled: bool,
}

impl ProbeGuard {
    /// Record the outcome and return the status to render.
    pub fn finish(mut self, result: ProbeResult) -> ProbeStatus {
        let status = if result.success { ProbeStatus::Success } else { ProbeStatus::Error(result.message) };
        self.state.lock().status = status.clone();
        self.settled = true;
        status
    }
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        if !self.settled {
            warn!("setup probe dropped before finishing");
            self.state.lock().status = ProbeStatus::Error(CANCELLED_MESSAGE.to_string());
        }
    }
}

const CREATE_PROJECT: &str = "<p>First, you'll need to create a free Supabase project to handle authentication and database.</p>\
<p><a class=\"button\" href=\"https://supabase.com/dashboard\" target=\"_blank\" rel=\"noopener noreferrer\">Go to Supabase Dashboard</a> \
<a class=\"button outline\" href=\"https://supabase.com/docs/guides/getting-started\" target=\"_blank\" rel=\"noopener noreferrer\">View Setup Guide</a></p>\
<ol><li>Sign up at supabase.com</li><li>Click \"New Project\"</li><li>Choose a name like \"researchable-platform\"</li><li>Set a strong database password</li><li>Select a region close to you</li></ol>";

const API_KEYS: &str = "<p>Once your project is created, get your API keys from the project settings.</p>\
<ol><li>Go to your project dashboard</li><li>Click \"Settings\" in the sidebar</li><li>Click \"API\" in the settings menu</li><li>Copy the \"Project URL\" and \"anon public\" key</li></ol>";

const DATABASE: &str = "<p>Run the SQL scripts to create your database tables and policies.</p>\
<ol><li>Go to your Supabase project dashboard</li><li>Click \"SQL Editor\" in the sidebar</li><li>Copy and paste the contents of <code>scripts/001_initial_schema.sql</code></li><li>Click \"Run\" to execute</li><li>Repeat for <code>scripts/002_workshops_schema.sql</code></li></ol>";

const START: &str = "<p>Once everything is set up, start the server:</p><pre>cargo run</pre><p>Your platform will be available at <code>http://localhost:3000</code></p>";

const FIXES: [&str; 4] = [
    "Check your environment variables are correct",
    "Make sure you've run the database scripts",
    "Verify your Supabase project is active",
    "Restart the server after changing the environment",
];

fn env_step() -> String {
    format!(
        "<p>Export these variables in the environment the server runs in:</p>\
<pre>{SERVICE_URL_VAR}=your-project-url-here\n{SERVICE_KEY_VAR}=your-anon-key-here</pre>\
<p>Replace <code>your-project-url-here</code> and <code>your-anon-key-here</code> with the actual values from your Supabase project.</p>"
    )
}

fn probe_step(status: &ProbeStatus) -> String {
    let (label, disabled) = match status {
        ProbeStatus::Testing => ("Testing...", " disabled"),
        _ => ("Test Connection", ""),
    };
    let mut out = format!(
        "<p>Test your Supabase connection to make sure everything is working.</p>\n\
<form method=\"post\" action=\"/setup/test\"><button id=\"probe\" type=\"submit\"{disabled}>{label}</button></form>\n"
    );
    match status {
        ProbeStatus::Success => out.push_str("<p class=\"ok\">Connected successfully!</p>\n"),
        ProbeStatus::Error(message) => {
            let fixes: String = FIXES.iter().map(|f| format!("<li>{f}</li>")).collect();
            out.push_str(&format!(
                "<p class=\"error\">Connection failed</p>\n<div class=\"card\"><p><strong>Error:</strong> {}</p><p><strong>Common fixes:</strong></p><ul>{fixes}</ul></div>\n",
                escape(message)
            ));
        }
        ProbeStatus::Idle | ProbeStatus::Testing => {}
    }
    out
}

fn step_card(number: usize, title: &str, content: &str) -> String {
    format!("<div class=\"card\"><h2>{number}. {title}</h2>\n{content}\n</div>\n")
}

fn steps(status: &ProbeStatus) -> [(&'static str, String); 6] {
    [
        ("Create Supabase Project", CREATE_PROJECT.to_string()),
        ("Get Your API Keys", API_KEYS.to_string()),
        ("Set Environment Variables", env_step()),
        ("Set Up Database", DATABASE.to_string()),
        ("Test Connection", probe_step(status)),
        ("Start Development", START.to_string()),
    ]
}

pub fn render(status: &ProbeStatus) -> String {
    let mut cards = String::new();
    for (i, (title, content)) in steps(status).iter().enumerate() {
        cards.push_str(&step_card(i + 1, title, content));
    }
    if *status == ProbeStatus::Success {
        cards.push_str("<p><a class=\"button\" href=\"/\">Go to Platform</a></p>\n");
    }

    let body = format!(
        "<header>{brand}</header>\n<main>\n<h1>Setup Researchable Platform</h1>\n<p>Follow these steps to get your local development environment running</p>\n{cards}</main>",
        brand = brand_link(),
    );
    layout("Setup", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_disabled_exactly_while_testing() {
        let w = SetupWizard::new();
        assert!(w.trigger_enabled());
        let guard = w.begin().expect("idle wizard starts a probe");
        assert_eq!(w.status(), ProbeStatus::Testing);
        assert!(!w.trigger_enabled());
        assert!(w.begin().is_none(), "duplicate probe must be refused");

        let shown = guard.finish(ProbeResult::failed("Connection failed: refused"));
        assert_eq!(shown, ProbeStatus::Error("Connection failed: refused".into()));
        assert!(w.trigger_enabled());
        assert_eq!(w.status(), shown);

        let guard = w.begin().expect("re-entering from a terminal state returns to testing");
        assert_eq!(guard.finish(ProbeResult::connected()), ProbeStatus::Success);
        assert!(w.trigger_enabled());
    }

    #[test]
    fn dropped_guard_releases_the_trigger() {
        let w = SetupWizard::new();
        let guard = w.begin().expect("start");
        drop(guard);
        assert_eq!(w.status(), ProbeStatus::Error(CANCELLED_MESSAGE.into()));
        assert!(w.trigger_enabled());
        assert!(w.begin().is_some());
    }

    #[test]
    fn page_load_hides_previous_result() {
        let w = SetupWizard::new();
        w.begin().expect("start").finish(ProbeResult::connected());
        assert_eq!(w.status(), ProbeStatus::Success);
        assert_eq!(w.landing_status(), ProbeStatus::Idle);

        let _running = w.begin().expect("start");
        assert_eq!(w.landing_status(), ProbeStatus::Testing);
    }

    #[test]
    fn six_numbered_steps() {
        let html = render(&ProbeStatus::Idle);
        for (n, title) in ["Create Supabase Project", "Get Your API Keys", "Set Environment Variables", "Set Up Database", "Test Connection", "Start Development"]
            .iter()
            .enumerate()
        {
            assert!(html.contains(&format!("<h2>{}. {title}</h2>", n + 1)), "missing step {title}");
        }
        assert!(html.contains("scripts/002_workshops_schema.sql"));
    }

    #[test]
    fn render_reflects_state() {
        let idle = render(&ProbeStatus::Idle);
        assert!(idle.contains(">Test Connection</button>"));
        assert!(!idle.contains("Go to Platform"));

        let testing = render(&ProbeStatus::Testing);
        assert!(testing.contains("type=\"submit\" disabled>Testing...</button>"));

        let ok = render(&ProbeStatus::Success);
        assert!(ok.contains("Connected successfully!"));
        assert!(ok.contains("Go to Platform"));

        let err = render(&ProbeStatus::Error("Database error: <nope>".into()));
        assert!(err.contains("Connection failed"));
        assert!(err.contains("Database error: &lt;nope&gt;"));
        assert!(err.contains("Verify your Supabase project is active"));
    }

    #[test]
    fn env_step_names_variables() {
        let html = render(&ProbeStatus::Idle);
        assert!(html.contains("SUPABASE_URL=your-project-url-here"));
        assert!(html.contains("SUPABASE_ANON_KEY=your-anon-key-here"));
    }
}
