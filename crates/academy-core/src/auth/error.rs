use thiserror::Error;

use crate::api::ApiError;
use crate::forms::ValidationError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to persist session: {0:#}")]
    Storage(anyhow::Error),

    #[error("Identity is missing id, email or token")]
    IncompleteIdentity,

    #[error("Please log in to continue")]
    LoginRequired,

    #[error("Superseded by a newer login or logout")]
    Superseded,
}

impl AuthError {
    /// Message for the person at the keyboard, with `fallback` for errors
    /// that carry nothing better.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Api(e) => e.user_message(fallback),
            AuthError::Validation(e) => e.to_string(),
            AuthError::LoginRequired => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// True when the server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Api(e) if e.is_unauthorized())
    }
}
