//! Request extractors.
//!
//! - [`auth::AuthUser`] -- runs the authenticator and yields the [`Principal`](sentinel_core::principal::Principal).
//! - [`client::ClientMeta`] -- client IP, user agent and device description for new sessions.

pub mod auth;
pub mod client;
