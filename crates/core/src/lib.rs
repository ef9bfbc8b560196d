//! Shared domain types for the sentinel authentication layer.
//!
//! Nothing in this crate performs I/O; the `db` and `api` crates build on it.

pub mod error;
pub mod principal;
pub mod types;
