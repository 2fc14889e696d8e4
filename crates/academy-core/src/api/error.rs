use serde::Deserialize;
use thiserror::Error;

/// Maximum length for error response bodies kept in errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when the server could not be reached at all
pub const CONNECTION_MESSAGE: &str = "Unable to connect to server. Check your internet connection.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized{}", suffix(.message))]
    Unauthorized { message: Option<String> },

    #[error("Access denied{}", suffix(.message))]
    AccessDenied { message: Option<String> },

    #[error("Resource not found{}", suffix(.message))]
    NotFound { message: Option<String> },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error{}", suffix(.message))]
    ServerError { message: Option<String> },

    #[error("Request rejected ({status}){}", suffix(.message))]
    Rejected { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

/// Error payload shape used by the academy API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull `message` out of a JSON error body, if there is one.
    fn extract_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { message },
            404 => ApiError::NotFound { message },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { message },
            code if message.is_some() => ApiError::Rejected { status: code, message },
            code => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                code,
                Self::truncate_body(body)
            )),
        }
    }

    /// The server-provided `message`, if the error carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::AccessDenied { message }
            | ApiError::NotFound { message }
            | ApiError::ServerError { message }
            | ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for the person at the keyboard.
    ///
    /// Prefers the API's own message; transport failures get a connection
    /// hint; everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(e) if e.is_connect() => CONNECTION_MESSAGE.to_string(),
            ApiError::RateLimited => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
