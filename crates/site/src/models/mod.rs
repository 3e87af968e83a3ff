//! Domain models for the dealership site.
//!
//! Row types are loaded with `sqlx::FromRow`; the identity types travel inside
//! the signed `jwt` cookie and are never persisted server-side.

pub mod account;
pub mod identity;
pub mod inventory;
pub mod review;

pub use account::{Account, AccountUpdate, AccountWithPassword, NewAccount};
pub use identity::{Identity, IdentityClaims};
pub use inventory::{Classification, Vehicle, VehicleDraft};
pub use review::{NewReview, Review};
