//! Access to the hosted Supabase project: auth endpoints and the
//! connectivity probe used by the setup wizard.

mod client;
mod probe;

pub use client::{missing_config_message, upstream_message, SessionClient, PROBE_COLLECTION};
pub use probe::ProbeResult;
