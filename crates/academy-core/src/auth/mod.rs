//! Authentication module: who is logged in, and who may see what.
//!
//! This module provides:
//! - `Session`: snapshot of the current identity and hydration state
//! - `SessionStore`: the single owner of the session, persisted and observable
//! - `SessionStorage`: durable backends (file, OS keyring, memory)
//! - `AccessGuard`: role-gated rendering with redirect to the login route

pub mod error;
pub mod guard;
pub mod session;
pub mod storage;
pub mod store;

pub use error::AuthError;
pub use guard::{AccessGuard, Decision, Denial, GuardPhase, Guarded, Navigator, LOGIN_PATH};
pub use session::{PersistedSession, Session};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage, SESSION_KEY};
pub use store::SessionStore;
