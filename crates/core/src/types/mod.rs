//! Core types for CSE Motors.

pub mod account_type;
pub mod email;
pub mod id;
pub mod price;

pub use account_type::AccountType;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, format_number};
