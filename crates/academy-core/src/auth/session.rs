use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Identity, Role};

/// Snapshot of the client-side session.
///
/// `user` is either absent or a complete identity. `is_loading` is true
/// only until the store has been hydrated from persisted storage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Session {
    pub user: Option<Identity>,
    pub is_loading: bool,
}

impl Session {
    /// State of a freshly created store, before hydration
    pub fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            user: Some(identity),
            is_loading: false,
        }
    }

    /// Get the bearer token if someone is logged in
    pub fn token(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }
}

/// What gets written under the session key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub identity: Identity,
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            saved_at: Utc::now(),
        }
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize session")
    }

    /// Parse a stored payload. Anything unparsable or incomplete is an error.
    pub fn decode(raw: &str) -> Result<Self> {
        let persisted: PersistedSession =
            serde_json::from_str(raw).context("Failed to parse persisted session")?;
        if !persisted.identity.is_complete() {
            anyhow::bail!("Persisted session is missing id, email or token");
        }
        Ok(persisted)
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.saved_at).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: "u1".to_string(),
            name: "Sana".to_string(),
            email: "sana@x.com".to_string(),
            role,
            token: "t1".to_string(),
        }
    }

    #[test]
    fn test_session_accessors() {
        let session = Session::authenticated(identity(Role::Admin));
        assert_eq!(session.token(), Some("t1"));
        assert!(session.has_role(Role::Admin));
        assert!(!session.has_role(Role::Student));
        assert!(!session.is_loading);

        let anon = Session::anonymous();
        assert_eq!(anon.token(), None);
        assert_eq!(anon.role(), None);
        assert!(Session::loading().is_loading);
    }

    #[test]
    fn test_persisted_session_decode() {
        let encoded = PersistedSession::new(identity(Role::Student))
            .encode()
            .expect("session should encode");
        let decoded = PersistedSession::decode(&encoded).expect("session should decode");
        assert_eq!(decoded.identity, identity(Role::Student));
        assert!(decoded.age_minutes() <= 1);
    }

    #[test]
    fn test_persisted_session_rejects_garbage() {
        for raw in [
            "",
            "null",
            "{}",
            "not json",
            r#"{"identity":{"id":"u1","email":"a@x.com","role":"admin"},"saved_at":"2024-01-01T00:00:00Z"}"#,
            r#"{"identity":{"id":"","email":"a@x.com","role":"admin","token":"t"},"saved_at":"2024-01-01T00:00:00Z"}"#,
            r#"{"identity":{"id":"u1","email":"a@x.com","role":"wizard","token":"t"},"saved_at":"2024-01-01T00:00:00Z"}"#,
        ] {
            assert!(PersistedSession::decode(raw).is_err(), "should reject {:?}", raw);
        }
    }
}
