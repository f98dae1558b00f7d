//! Sign-in and sign-up pages. Failures from the auth service are shown inline
//! above the form, verbatim.

use crate::identity::Role;

use super::{brand_link, escape, layout};

fn error_block(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(msg)),
        None => String::new(),
    }
}

pub fn sign_in_page(email: &str, error: Option<&str>) -> String {
    let body = format!(
        "<header>{brand}</header>\n<main>\n<div class=\"card\">\n<h1>Sign In</h1>\n{err}<form method=\"post\" action=\"/auth/signin\">\n\
<label for=\"email\">Email</label><input id=\"email\" name=\"email\" type=\"email\" required value=\"{email}\">\n\
<label for=\"password\">Password</label><input id=\"password\" name=\"password\" type=\"password\" required>\n\
<p><button type=\"submit\">Sign In</button></p>\n</form>\n<p>New here? <a href=\"/auth/signup\">Create an account</a></p>\n</div>\n</main>",
        brand = brand_link(),
        err = error_block(error),
        email = escape(email),
    );
    layout("Sign In", &body)
}

/// Values echoed back into the sign-up form after a failed attempt.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub school_name: String,
    pub grade_level: String,
}

fn role_option(role: Role, selected: Role, label: &str) -> String {
    let sel = if role == selected { " selected" } else { "" };
    format!("<option value=\"{}\"{sel}>{label}</option>", role.as_str())
}

pub fn sign_up_page(form: &SignUpForm, error: Option<&str>) -> String {
    let heading = match form.role {
        Role::Teacher => "Create your teacher account",
        Role::Student => "Create your student account",
    };
    let body = format!(
        "<header>{brand}</header>\n<main>\n<div class=\"card\">\n<h1>{heading}</h1>\n{err}<form method=\"post\" action=\"/auth/signup\">\n\
<label for=\"full_name\">Full name</label><input id=\"full_name\" name=\"full_name\" required value=\"{full_name}\">\n\
<label for=\"email\">Email</label><input id=\"email\" name=\"email\" type=\"email\" required value=\"{email}\">\n\
<label for=\"password\">Password</label><input id=\"password\" name=\"password\" type=\"password\" required>\n\
<label for=\"role\">I am a</label><select id=\"role\" name=\"role\">{teacher}{student}</select>\n\
<label for=\"school_name\">School (optional)</label><input id=\"school_name\" name=\"school_name\" value=\"{school}\">\n\
<label for=\"grade_level\">Grade (optional)</label><input id=\"grade_level\" name=\"grade_level\" inputmode=\"numeric\" value=\"{grade}\">\n\
<p><button type=\"submit\">Create Account</button></p>\n</form>\n<p>Already have an account? <a href=\"/auth/signin\">Sign in</a></p>\n</div>\n</main>",
        brand = brand_link(),
        err = error_block(error),
        full_name = escape(&form.full_name),
        email = escape(&form.email),
        teacher = role_option(Role::Teacher, form.role, "Teacher"),
        student = role_option(Role::Student, form.role, "Student"),
        school = escape(&form.school_name),
        grade = escape(&form.grade_level),
    );
    layout("Sign Up", &body)
}

pub fn confirm_email_page(email: &str) -> String {
    let body = format!(
        "<header>{brand}</header>\n<main>\n<div class=\"card\">\n<h1>Check your email</h1>\n<p>We sent a confirmation link to <strong>{email}</strong>. Follow it, then <a href=\"/auth/signin\">sign in</a>.</p>\n</div>\n</main>",
        brand = brand_link(),
        email = escape(email),
    );
    layout("Confirm your email", &body)
}
