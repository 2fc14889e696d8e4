//! Local cache for the public free-material catalog.
//!
//! Categories and published materials are stored as JSON with the time they
//! were fetched, so the library can be shown before the network answers.
//! Entries are considered stale after 60 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData, Catalog};
