//! Client-side validation for the account forms.
//!
//! These checks run before any request is sent; the server still has the
//! final word.

use thiserror::Error;

/// Minimum password length accepted by the registration and reset forms
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum length for any single text field.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_FIELD_LENGTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required.")]
    Missing(&'static str),

    #[error("Please enter your email address.")]
    MissingEmail,

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Password must be at least {} characters long.", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    #[error("No reset token found.")]
    MissingResetToken,
}

/// Whether `c` may be typed into a form field
pub fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character can be added to a field of the given length
pub fn can_add_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

fn check_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Login form
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::Missing("Password"));
        }
        Ok(())
    }
}

/// Sign-up form
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Missing("Full name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        check_new_password(&self.password, &self.confirm_password)
    }
}

/// "Forgot password" form
#[derive(Debug, Clone, Default)]
pub struct ForgotPassword {
    pub email: String,
}

impl ForgotPassword {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        Ok(())
    }
}

/// "Set a new password" form reached from an emailed reset link
#[derive(Debug, Clone, Default)]
pub struct PasswordReset {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl PasswordReset {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token.trim().is_empty() {
            return Err(ValidationError::MissingResetToken);
        }
        check_new_password(&self.password, &self.confirm_password)
    }

    /// Accept either a bare token or a pasted `.../reset-password/<token>` link
    pub fn token_from_input(input: &str) -> String {
        let trimmed = input.trim().trim_end_matches('/');
        match trimmed.rsplit_once("/reset-password/") {
            Some((_, token)) => token.to_string(),
            None => trimmed.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(password: &str, confirm: &str) -> Registration {
        Registration {
            name: "Zain".to_string(),
            email: "zain@x.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_registration_rules() {
        assert_eq!(registration("secret1", "secret1").validate(), Ok(()));
        assert_eq!(
            registration("secret1", "secret2").validate(),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            registration("abc", "abc").validate(),
            Err(ValidationError::PasswordTooShort)
        );

        let mut unnamed = registration("secret1", "secret1");
        unnamed.name = "  ".to_string();
        assert_eq!(unnamed.validate(), Err(ValidationError::Missing("Full name")));
    }

    #[test]
    fn test_mismatch_checked_before_length() {
        assert_eq!(
            registration("abc", "abd").validate(),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters long."
        );
        assert_eq!(ValidationError::MissingResetToken.to_string(), "No reset token found.");
    }

    #[test]
    fn test_credentials_required() {
        assert_eq!(Credentials::new("", "x").validate(), Err(ValidationError::MissingEmail));
        assert_eq!(
            Credentials::new("a@x.com", "").validate(),
            Err(ValidationError::Missing("Password"))
        );
        assert!(Credentials::new("a@x.com", "x").validate().is_ok());
    }

    #[test]
    fn test_password_reset_requires_token() {
        let reset = PasswordReset {
            token: String::new(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert_eq!(reset.validate(), Err(ValidationError::MissingResetToken));
    }

    #[test]
    fn test_token_from_input() {
        assert_eq!(PasswordReset::token_from_input(" abc123 "), "abc123");
        assert_eq!(
            PasswordReset::token_from_input("https://academy.example/reset-password/abc123/"),
            "abc123"
        );
    }

    #[test]
    fn test_forgot_password_requires_email() {
        assert!(ForgotPassword::default().validate().is_err());
        let form = ForgotPassword {
            email: "a@x.com".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(0, 'a'));
        assert!(can_add_char(MAX_FIELD_LENGTH - 1, '!'));
        assert!(!can_add_char(MAX_FIELD_LENGTH, 'a'));
        assert!(!can_add_char(0, '\n'));
        assert!(!can_add_char(0, '\x00'));
    }
}
