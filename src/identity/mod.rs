//! Identity: the auth gateway in front of the hosted service, the local
//! session table and the profile adapter used by the dashboard.
//! Keep the public surface thin and split implementation across sub-modules.

mod gateway;
mod profile;
mod session;
mod user;

pub use gateway::{AuthGateway, SignUpData, SignUpOutcome, SignedIn};
pub use profile::{derive_profile, Profile, Role};
pub use session::{SessionId, SessionStore, StoredSession};
pub use user::{AuthSession, AuthUser, SignUpResponse};
