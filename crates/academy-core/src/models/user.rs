use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role tag attached to every account.
///
/// The set is closed: a persisted or received identity carrying any other
/// tag is rejected during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    ContentManager,
    MarketingManager,
    Admin,
}

impl Role {
    /// All roles in the order the admin table offers them.
    pub const ALL: [Role; 4] = [
        Role::Student,
        Role::ContentManager,
        Role::MarketingManager,
        Role::Admin,
    ];

    /// Wire tag used by the API (`"content_manager"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::ContentManager => "content_manager",
            Role::MarketingManager => "marketing_manager",
            Role::Admin => "admin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::ContentManager => "Content Manager",
            Role::MarketingManager => "Marketing Manager",
            Role::Admin => "Admin",
        }
    }

    /// Next role in `ALL`, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Role::Student => Role::ContentManager,
            Role::ContentManager => Role::MarketingManager,
            Role::MarketingManager => Role::Admin,
            Role::Admin => Role::Student,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// The authenticated user as returned by `/users/login` and `/users/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl Identity {
    /// A usable identity has an id, an email and a bearer token.
    pub fn is_complete(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty() && !self.token.trim().is_empty()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Name for greetings, falling back to the email address.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// A row of the admin user table (`GET /users`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserRecord {
    /// Whether this row is the signed-in user, whose own role cannot be changed.
    pub fn is_self(&self, identity: &Identity) -> bool {
        self.id == identity.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_wire_tags() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_next_wraps() {
        assert_eq!(Role::Student.next(), Role::ContentManager);
        assert_eq!(Role::Admin.next(), Role::Student);
    }

    #[test]
    fn test_identity_accepts_mongo_id() {
        let json = r#"{"_id":"64f1","name":"Ayesha","email":"a@x.com","role":"content_manager","token":"t1"}"#;
        let identity: Identity = serde_json::from_str(json).expect("identity should parse");
        assert_eq!(identity.id, "64f1");
        assert_eq!(identity.role, Role::ContentManager);
        assert!(identity.is_complete());

        // Persisted form uses `id`
        let stored = serde_json::to_string(&identity).expect("identity should serialize");
        assert!(stored.contains(r#""id":"64f1""#));
    }

    #[test]
    fn test_identity_rejects_unknown_role() {
        let json = r#"{"id":"1","name":"x","email":"a@x.com","role":"root","token":"t"}"#;
        assert!(serde_json::from_str::<Identity>(json).is_err());
    }

    #[test]
    fn test_identity_incomplete() {
        let identity = Identity {
            id: "1".to_string(),
            name: String::new(),
            email: "a@x.com".to_string(),
            role: Role::Student,
            token: "  ".to_string(),
        };
        assert!(!identity.is_complete());
        assert_eq!(identity.display_name(), "a@x.com");
    }
}
