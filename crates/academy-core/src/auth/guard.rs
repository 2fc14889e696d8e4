//! Role-gated rendering.
//!
//! `AccessGuard` looks at a `Session` and decides, in this order:
//!
//! 1. still hydrating → show a loading placeholder, never redirect
//! 2. logged in with the required role → render the protected content
//! 3. anything else → ask the `Navigator` to replace the route with the
//!    login page and render nothing
//!
//! The guard does no I/O. Navigation goes through the injected `Navigator`,
//! and only when it reports an interactive environment.

use tracing::{debug, info};

use crate::models::{Identity, Role};

use super::Session;

/// Public route unauthorized visitors are sent to
pub const LOGIN_PATH: &str = "/login";

/// Client-side navigation capability.
pub trait Navigator {
    /// False while rendering somewhere navigation is impossible
    /// (headless output, pre-rendering).
    fn is_interactive(&self) -> bool;

    /// Replace the current route with `path`.
    fn replace(&mut self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }

    fn replace(&mut self, path: &str) {
        (**self).replace(path)
    }
}

/// Why access was refused. Both lead to the same redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Anonymous,
    InsufficientRole { actual: Role, required: Role },
}

/// Pure outcome of checking a session against a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    Wait,
    Allow(&'a Identity),
    Deny(Denial),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Loading,
    Authorized,
    /// Refused where navigation is impossible; re-evaluated on the next render
    Denied,
    Redirecting,
}

/// What the guarded view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Loading,
    Content(T),
    Nothing,
}

impl<T> Guarded<T> {
    pub fn content(self) -> Option<T> {
        match self {
            Guarded::Content(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Guarded::Loading)
    }
}

pub struct AccessGuard<N> {
    required: Role,
    redirect_path: String,
    navigator: N,
    phase: GuardPhase,
    denial: Option<Denial>,
}

impl<N: Navigator> AccessGuard<N> {
    pub fn new(required: Role, navigator: N) -> Self {
        Self {
            required,
            redirect_path: LOGIN_PATH.to_string(),
            navigator,
            phase: GuardPhase::Loading,
            denial: None,
        }
    }

    /// Guard for admin-only screens
    pub fn admin_only(navigator: N) -> Self {
        Self::new(Role::Admin, navigator)
    }

    /// Send refused visitors somewhere other than `/login`
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = path.into();
        self
    }

    /// Check `session` against `required` without side effects
    pub fn decide(required: Role, session: &Session) -> Decision<'_> {
        if session.is_loading {
            return Decision::Wait;
        }
        match session.user {
            Some(ref user) if user.role == required => Decision::Allow(user),
            Some(ref user) => Decision::Deny(Denial::InsufficientRole {
                actual: user.role,
                required,
            }),
            None => Decision::Deny(Denial::Anonymous),
        }
    }

    /// Evaluate the guard for one render and build the content if allowed.
    ///
    /// The guard never goes back to `Loading` once it has left it, and a
    /// redirect is issued at most once per guard.
    pub fn render<T, F>(&mut self, session: &Session, content: F) -> Guarded<T>
    where
        F: FnOnce(&Identity) -> T,
    {
        if self.phase == GuardPhase::Redirecting {
            return Guarded::Nothing;
        }

        match Self::decide(self.required, session) {
            Decision::Wait if self.phase == GuardPhase::Loading => Guarded::Loading,
            Decision::Wait => Guarded::Nothing,
            Decision::Allow(user) => {
                self.phase = GuardPhase::Authorized;
                self.denial = None;
                Guarded::Content(content(user))
            }
            Decision::Deny(denial) => {
                self.denial = Some(denial);
                if self.navigator.is_interactive() {
                    info!(?denial, path = %self.redirect_path, "Access denied, redirecting");
                    self.phase = GuardPhase::Redirecting;
                    self.navigator.replace(&self.redirect_path);
                } else {
                    debug!(?denial, "Access denied in non-interactive context, not redirecting");
                    self.phase = GuardPhase::Denied;
                }
                Guarded::Nothing
            }
        }
    }

    /// `render` that hands back the authorized identity itself
    pub fn check(&mut self, session: &Session) -> Guarded<Identity> {
        self.render(session, Identity::clone)
    }

    pub fn required_role(&self) -> Role {
        self.required
    }

    pub fn phase(&self) -> GuardPhase {
        self.phase
    }

    /// Reason for the most recent refusal
    pub fn denial(&self) -> Option<Denial> {
        self.denial
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }
}
