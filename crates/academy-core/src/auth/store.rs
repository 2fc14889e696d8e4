//! The session store: single owner of "who is logged in".
//!
//! State is published through a `tokio::sync::watch` channel so any number
//! of consumers can hold an always-current, read-only view. Every mutation
//! happens under one lock that also covers the persisted copy, so memory and
//! storage never disagree once an operation returns.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::forms::{Credentials, Registration};
use crate::models::Identity;

use super::session::{PersistedSession, Session};
use super::storage::SessionStorage;
use super::AuthError;

/// Bookkeeping guarded by the store lock.
struct Control {
    /// Advanced by logout and invalidation. Logins started before the
    /// current epoch never commit.
    epoch: u64,
    /// Sequence number handed to the next login attempt.
    next_seq: u64,
    /// Sequence of the newest login that committed in this epoch.
    committed_seq: u64,
    hydrated: bool,
}

/// Identifies one login attempt for the race check in `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    epoch: u64,
    seq: u64,
}

pub struct SessionStore {
    api: ApiClient,
    storage: Box<dyn SessionStorage>,
    state: watch::Sender<Session>,
    control: Mutex<Control>,
}

impl SessionStore {
    /// Create an empty store in the loading state. Call `hydrate` next.
    pub fn new(api: ApiClient, storage: impl SessionStorage + 'static) -> Self {
        let (state, _) = watch::channel(Session::loading());
        Self {
            api,
            storage: Box::new(storage),
            state,
            control: Mutex::new(Control {
                epoch: 0,
                next_seq: 1,
                committed_seq: 0,
                hydrated: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the current session
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that always sees the latest session
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Bearer token held right now, if any
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// The unauthenticated API client
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// An API client carrying the current token
    pub fn authorized_client(&self) -> Option<ApiClient> {
        self.token().map(|token| self.api.with_token(token))
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Restore the persisted session, once.
    ///
    /// Missing or corrupt payloads resolve to anonymous; corrupt ones are
    /// removed. `is_loading` becomes false on the first call and later calls
    /// only return the current state.
    pub fn hydrate(&self) -> Session {
        let mut control = self.lock();
        if control.hydrated {
            return self.current();
        }
        control.hydrated = true;

        let already_committed = self.state.borrow().user.is_some();
        let restored = if already_committed {
            debug!("Session committed before hydration, keeping it");
            None
        } else {
            self.read_persisted()
        };

        self.state.send_modify(|session| {
            if let Some(identity) = restored {
                session.user = Some(identity);
            }
            session.is_loading = false;
        });

        let session = self.current();
        debug!(authenticated = session.is_authenticated(), "Hydration complete");
        session
    }

    fn read_persisted(&self) -> Option<Identity> {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted session");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not read persisted session");
                return None;
            }
        };

        match PersistedSession::decode(&raw) {
            Ok(persisted) => {
                info!(
                    role = %persisted.identity.role,
                    age_minutes = persisted.age_minutes(),
                    "Restored persisted session"
                );
                Some(persisted.identity)
            }
            Err(e) => {
                warn!(error = %e, "Discarding corrupt persisted session");
                if let Err(e) = self.storage.remove() {
                    warn!(error = %e, "Failed to remove corrupt session");
                }
                None
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Log in against the API and make the result the current session
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;
        let ticket = self.begin();

        let identity = self
            .api
            .login(&credentials.email, &credentials.password)
            .await
            .inspect_err(|e| warn!(error = %e, "Login rejected"))?;

        self.commit(ticket, identity)
    }

    /// Create an account and log straight in with the returned identity
    pub async fn register(&self, registration: &Registration) -> Result<Session, AuthError> {
        registration.validate()?;
        let ticket = self.begin();

        let identity = self
            .api
            .register(&registration.name, &registration.email, &registration.password)
            .await
            .inspect_err(|e| warn!(error = %e, "Registration rejected"))?;

        self.commit(ticket, identity)
    }

    /// Adopt an identity that was already authenticated elsewhere
    pub fn login_with_identity(&self, identity: Identity) -> Result<Session, AuthError> {
        let ticket = self.begin();
        self.commit(ticket, identity)
    }

    /// Clear the session and its persisted copy. Safe to call repeatedly.
    ///
    /// Memory is cleared even if the persisted copy cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        let mut control = self.lock();
        control.advance_epoch();

        let was_authenticated = self.state.borrow().user.is_some();
        self.state.send_if_modified(|session| session.user.take().is_some());
        if was_authenticated {
            info!("Logged out");
        }

        self.storage.remove().map_err(AuthError::Storage)
    }

    /// Drop the session if it still holds `token`.
    ///
    /// Used when an authenticated request came back 401. A rejection of an
    /// older token does not touch a newer session.
    pub fn invalidate(&self, token: &str) -> bool {
        let mut control = self.lock();
        if self.state.borrow().token() != Some(token) {
            debug!("Ignoring rejection of a token that is no longer current");
            return false;
        }

        control.advance_epoch();
        self.state.send_modify(|session| session.user = None);
        if let Err(e) = self.storage.remove() {
            warn!(error = %e, "Failed to remove invalidated session");
        }
        warn!("Session token rejected by server, logged out");
        true
    }

    /// Run an authenticated request with the current token.
    ///
    /// Fails with `LoginRequired` when nobody is logged in. A 401 response
    /// invalidates the session that made the request.
    pub async fn with_authorized<T, F, Fut>(&self, request: F) -> Result<T, AuthError>
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let token = self.token().ok_or(AuthError::LoginRequired)?;
        match request(self.api.with_token(token.clone())).await {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_unauthorized() {
                    self.invalidate(&token);
                }
                Err(e.into())
            }
        }
    }

    fn begin(&self) -> Ticket {
        let mut control = self.lock();
        let seq = control.next_seq;
        control.next_seq += 1;
        Ticket {
            epoch: control.epoch,
            seq,
        }
    }

    /// Persist and publish `identity`, unless a logout happened since the
    /// attempt began or a newer attempt already committed.
    ///
    /// A failed attempt never reaches here, so it cannot shadow an older
    /// attempt that succeeded.
    fn commit(&self, ticket: Ticket, identity: Identity) -> Result<Session, AuthError> {
        let mut control = self.lock();
        if ticket.epoch != control.epoch {
            debug!(seq = ticket.seq, "Discarding login that started before a logout");
            return Err(AuthError::Superseded);
        }
        if ticket.seq < control.committed_seq {
            debug!(
                seq = ticket.seq,
                committed = control.committed_seq,
                "Discarding login older than the committed one"
            );
            return Err(AuthError::Superseded);
        }
        if !identity.is_complete() {
            return Err(AuthError::IncompleteIdentity);
        }

        let payload = PersistedSession::new(identity.clone())
            .encode()
            .map_err(AuthError::Storage)?;
        self.storage.write(&payload).map_err(AuthError::Storage)?;
        control.committed_seq = ticket.seq;

        let role = identity.role;
        self.state.send_modify(|session| session.user = Some(identity));
        info!(role = %role, "Logged in");

        drop(control);
        Ok(self.current())
    }
}

impl Control {
    fn advance_epoch(&mut self) {
        self.epoch += 1;
        self.committed_seq = 0;
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("is_loading", &session.is_loading)
            .finish()
    }
}
