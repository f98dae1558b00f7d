use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::AuthUser;

const DEFAULT_FULL_NAME: &str = "User";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    #[default]
    Student,
}

impl Role {
    /// Case-insensitive; anything other than "teacher" is a student.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("teacher") { Role::Teacher } else { Role::Student }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

/// Display-ready view of the signed-in user, rebuilt on every dashboard load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub school_name: Option<String>,
    pub grade_level: Option<u8>,
    pub created_at: String,
    pub updated_at: String,
}

fn meta_str<'a>(user: &'a AuthUser, key: &str) -> Option<&'a str> {
    user.user_metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn meta_grade(user: &AuthUser) -> Option<u8> {
    match user.user_metadata.get("grade_level")? {
        Value::Number(n) => n.as_u64().and_then(|g| u8::try_from(g).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Derive the profile from sign-up metadata. No separate profile store is read.
pub fn derive_profile(user: &AuthUser) -> Profile {
    let updated_at = user
        .updated_at
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| user.created_at.clone());
    Profile {
        id: user.id.clone(),
        email: user.email.clone().unwrap_or_default(),
        full_name: meta_str(user, "full_name").unwrap_or(DEFAULT_FULL_NAME).to_string(),
        role: meta_str(user, "role").map(Role::parse).unwrap_or_default(),
        school_name: meta_str(user, "school_name").map(str::to_string),
        grade_level: meta_grade(user),
        created_at: user.created_at.clone(),
        updated_at,
    }
}
