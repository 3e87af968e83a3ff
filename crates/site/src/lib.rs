//! CSE Motors dealership site library.
//!
//! The binary in `main.rs` wires these modules to `PostgreSQL`; the
//! integration tests wire them to in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
