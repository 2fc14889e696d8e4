//! Core library for the academy client.
//!
//! This crate holds everything a frontend needs to talk to the academy
//! REST API and to decide who may see what:
//!
//! - `api`: REST client and error mapping
//! - `auth`: session store, persisted storage backends and the access guard
//! - `models`: identities, user records, categories and materials
//! - `catalog`: free-material search and category filtering
//! - `forms`: client-side validation for registration and password reset
//! - `cache`: local catalog cache
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod forms;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AccessGuard, AuthError, Navigator, Session, SessionStore};
pub use config::Config;
pub use models::{Identity, Role};
