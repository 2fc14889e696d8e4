//! API client for communicating with the academy REST API.
//!
//! This module provides the `ApiClient` struct for authentication, password
//! recovery, admin user management and the free-material catalog.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::active_categories;
use crate::models::{Category, Identity, Material, Role, UserRecord};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) GET requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    password: &'a str,
    #[serde(rename = "confirmPassword")]
    confirm_password: &'a str,
}

#[derive(Debug, Serialize)]
struct RoleUpdateRequest {
    role: Role,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    #[serde(rename = "fileUrl")]
    file_url: String,
}

/// API client for the academy backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client for the given base URL (e.g. `http://host/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bearer token this client attaches, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange email and password for an identity with a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        debug!(email, "Sending login request");
        let request = self
            .client
            .post(self.url("/users/login"))
            .json(&LoginRequest { email, password });
        self.send_identity(request).await
    }

    /// Create an account; the backend logs the new user in directly
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Identity, ApiError> {
        debug!(email, "Sending registration request");
        let request = self
            .client
            .post(self.url("/users/register"))
            .json(&RegisterRequest { name, email, password });
        self.send_identity(request).await
    }

    async fn send_identity(&self, request: RequestBuilder) -> Result<Identity, ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        let identity: Identity = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("identity: {}", e)))?;

        if !identity.is_complete() {
            warn!(id = %identity.id, "Identity response is missing id, email or token");
            return Err(ApiError::InvalidResponse("incomplete identity".to_string()));
        }
        Ok(identity)
    }

    /// Ask the backend to email a reset link. Returns the server's message.
    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/users/forgot-password"))
            .json(&ForgotPasswordRequest { email })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body: MessageResponse = response.json().await.unwrap_or_default();
        Ok(body
            .message
            .unwrap_or_else(|| "If that email is registered, a reset link is on its way.".to_string()))
    }

    /// Set a new password using the token from a reset link
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/users/reset-password/{}", reset_token)))
            .json(&ResetPasswordRequest {
                password,
                confirm_password,
            })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body: MessageResponse = response.json().await.unwrap_or_default();
        Ok(body.message)
    }

    // =========================================================================
    // Admin: users
    // =========================================================================

    /// All accounts (admin only)
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.get("/users").await
    }

    /// Change the role of another account (admin only)
    pub async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), ApiError> {
        let request = self
            .client
            .patch(self.url(&format!("/users/{}/role", user_id)))
            .json(&RoleUpdateRequest { role });
        let response = self.authorized(request).send().await?;
        Self::check_response(response).await?;
        debug!(user_id, role = %role, "Role updated");
        Ok(())
    }

    // =========================================================================
    // Free material
    // =========================================================================

    /// All categories; callers filter on `is_active`
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/materials/categories").await
    }

    pub async fn list_published_materials(&self) -> Result<Vec<Material>, ApiError> {
        self.get("/materials?status=published").await
    }

    /// Active categories and published materials, fetched concurrently
    pub async fn fetch_catalog(&self) -> Result<(Vec<Category>, Vec<Material>), ApiError> {
        let (categories, materials) =
            futures::try_join!(self.list_categories(), self.list_published_materials())?;
        Ok((active_categories(&categories), materials))
    }

    /// Record a download and get the file URL (requires a token)
    pub async fn request_download(&self, material_id: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/materials/{}/download", material_id)))
            .json(&serde_json::json!({}));
        let response = self.authorized(request).send().await?;
        let response = Self::check_response(response).await?;
        let body: DownloadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("download: {}", e)))?;
        Ok(body.file_url)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .authorized(self.client.get(&url).header(header::ACCEPT, "application/json"))
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)));
                }
                None if retries < MAX_RATE_LIMIT_RETRIES => {
                    retries += 1;
                    warn!(path, retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
                None => return Err(ApiError::RateLimited),
            }
        }
    }
}
