//! Business logic services for the dealership site.
//!
//! # Services
//!
//! - `auth` - Password hashing and credential checks
//! - `token` - Signed identity tokens carried in the `jwt` cookie

pub mod auth;
pub mod token;

pub use token::{TokenError, TokenService, VerificationError};
