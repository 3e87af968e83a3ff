//! CSE Motors Core - Shared domain types.
//!
//! This crate provides the value types used by the site binary and the CLI:
//! typed row identifiers, validated email addresses, account roles, and
//! price formatting.
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding is available behind the `postgres` feature.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
