//! Researchable: marketing site and thin dashboard shell for an education
//! platform. Identity and data live in a hosted Supabase project; this crate
//! renders pages, keeps the visitor's session id and forwards everything else.

pub mod backend;
pub mod config;
pub mod error;
pub mod identity;
pub mod server;
pub mod views;
