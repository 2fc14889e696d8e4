//! Data models for academy entities.
//!
//! - `Identity`, `Role`: the authenticated user and the closed set of role tags
//! - `UserRecord`: a row in the admin user table
//! - `Category`, `Material`: the free-material catalog

pub mod material;
pub mod user;

pub use material::{Category, CategoryRef, Material};
pub use user::{Identity, Role, UnknownRole, UserRecord};
