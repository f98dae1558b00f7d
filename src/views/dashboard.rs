//! Session-gated dashboard.
//!
//! A load starts in [`DashboardState::Loading`] and settles exactly once:
//! no user (or any lookup failure) ends in `Unauthenticated`, which the
//! handler answers with a redirect to sign-in before any profile exists.
//! Metric cards are static zero placeholders; nothing backs them yet.

use tracing::{debug, warn};

use crate::identity::{derive_profile, AuthGateway, AuthUser, Profile, Role};

use super::{brand_link, escape, layout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    Unauthenticated,
    Authenticated(Profile),
}

impl DashboardState {
    /// Resolve the state for one request.
    pub async fn load(gateway: &AuthGateway, sid: Option<&str>) -> Self {
        let mut state = DashboardState::Loading;
        let user = match gateway.current_user(sid).await {
            Ok(user) => user,
            Err(err) => {
                warn!(code = err.code_str(), "dashboard session check failed: {err}");
                None
            }
        };
        state.settle(user);
        state
    }

    fn settle(&mut self, user: Option<AuthUser>) {
        if !matches!(self, DashboardState::Loading) {
            return;
        }
        *self = match user {
            Some(user) => DashboardState::Authenticated(derive_profile(&user)),
            None => {
                debug!("dashboard: no session, redirecting to sign-in");
                DashboardState::Unauthenticated
            }
        };
    }
}

/// Role-specific copy for the dashboard.
struct RoleCopy {
    headline: &'static str,
    subtitle: &'static str,
    people_metric: &'static str,
    actions: [&'static str; 4],
}

fn copy_for(role: Role) -> RoleCopy {
    match role {
        Role::Teacher => RoleCopy {
            headline: "Teacher Dashboard",
            subtitle: "Manage your students, competitions, and workshops",
            people_metric: "Students",
            actions: ["Create Competition", "Schedule Workshop", "Create Lesson", "Manage Students"],
        },
        Role::Student => RoleCopy {
            headline: "Student Dashboard",
            subtitle: "Track your progress and join competitions",
            people_metric: "Teams",
            actions: ["Browse Competitions", "Join Workshop", "Continue Lessons", "Find Team"],
        },
    }
}

pub fn render(profile: &Profile) -> String {
    let copy = copy_for(profile.role);
    let metrics: String = ["Competitions", "Workshops", "Lessons", copy.people_metric]
        .iter()
        .map(|label| format!("<div class=\"card\"><p class=\"brand\">0</p><p>{label}</p></div>\n"))
        .collect();
    let actions: String = copy
        .actions
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let class = if i == 0 { "button" } else { "button outline" };
            format!("<p><a class=\"{class}\" href=\"#\">{label}</a></p>\n")
        })
        .collect();

    let body = format!(
        "<header>{brand}\n<div><span>Welcome, {name}</span>\n<form method=\"post\" action=\"/auth/signout\" style=\"display:inline\"><button class=\"outline\" type=\"submit\">Sign Out</button></form></div>\n</header>\n\
<main>\n<h1>{headline}</h1>\n<p>{subtitle}</p>\n<div class=\"grid\">\n{metrics}</div>\n<div class=\"grid\">\n\
<div class=\"card\"><h2>Recent Activity</h2><p>No recent activity yet. Start by joining a competition or workshop!</p></div>\n\
<div class=\"card\"><h2>Quick Actions</h2>\n{actions}</div>\n</div>\n</main>",
        brand = brand_link(),
        name = escape(&profile.full_name),
        headline = copy.headline,
        subtitle = copy.subtitle,
    );
    layout(copy.headline, &body)
}
