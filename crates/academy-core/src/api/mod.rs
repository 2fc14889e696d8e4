//! REST API client module for the academy backend.
//!
//! This module provides the `ApiClient` for authentication, password
//! recovery, admin user management and the free-material catalog.
//!
//! Authenticated endpoints use a bearer token taken from the session store
//! at call time.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
