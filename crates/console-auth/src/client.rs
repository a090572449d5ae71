//! HTTP client for the exam platform's auth endpoints.

use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use console_storage::UserAttributes;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request timeout. Slow answers count as unreachable, never as a
/// verdict on the token.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Outcome of a token validity check.
///
/// `Invalid` is authoritative (the caller must clear the session);
/// `Unreachable` covers every transient failure and must never log the
/// user out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
    Unreachable,
}

/// Seam for the validity monitor: anything that can answer whether the
/// backend still accepts a token.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Verdict;
}

/// Login request body.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Login response payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the token expires, when the backend reports it.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// User attributes embedded in the login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Full user profile as returned by the profile endpoint.
///
/// Everything past `role` is populated only for some accounts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub birth: Option<String>,
    #[serde(default)]
    pub citizen_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<UserProfile> for UserAttributes {
    fn from(profile: UserProfile) -> Self {
        UserAttributes {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: profile.role,
            birth: profile.birth,
            citizen_id: profile.citizen_id,
            phone_number: profile.phone_number,
            address: profile.address,
            avatar: profile.avatar,
        }
    }
}

/// Client for the exam platform API.
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_url` - API base URL, e.g. `https://exams.example.com/api`
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the full URL for an API path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Authenticate with email and password.
    ///
    /// Non-2xx responses surface the backend's `message` field when the
    /// body carries one, so the login form can show it inline.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse> {
        let url = self.endpoint("/auth/login");

        debug!(url = %url, email = %email, "Attempting email/password login");

        let response = self
            .http_client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Login failed");
            let message = extract_message(&body)
                .unwrap_or_else(|| format!("Login failed (HTTP {})", status.as_u16()));
            return Err(AuthError::InvalidCredentials(message));
        }

        Ok(response.json().await?)
    }

    /// Perform an authenticated GET and decode the JSON body.
    ///
    /// A 401 comes back as `AuthError::TokenRejected` so the session layer
    /// can apply the clear-and-redirect policy; other failures map to
    /// `AuthError::Api`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> AuthResult<T> {
        let url = self.endpoint(path);

        debug!(url = %url, "Authenticated GET");

        let response = self
            .http_client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Backend rejected the bearer token");
            return Err(AuthError::TokenRejected);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_message(&body).unwrap_or_else(|| status.to_string());
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the current user's profile.
    pub async fn fetch_profile(&self, token: &str) -> AuthResult<UserProfile> {
        self.get_json("/user/profile", token).await
    }

    /// Notify the backend of a logout, best effort.
    ///
    /// Failures are logged and swallowed; the local session is already
    /// gone by the time this runs.
    pub async fn post_logout(&self, token: &str) {
        let url = self.endpoint("/auth/logout");

        let result = self
            .http_client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Backend logout acknowledged");
            }
            Ok(response) => {
                debug!(status = %response.status(), "Backend logout returned an error");
            }
            Err(error) => {
                debug!(%error, "Backend logout call failed");
            }
        }
    }

    /// Fire the backend logout without waiting for it.
    ///
    /// Outside an async runtime (e.g. in unit tests) the network call is
    /// skipped entirely; local logout never depends on it.
    pub fn spawn_logout(&self, token: String) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let client = self.clone();
                handle.spawn(async move {
                    client.post_logout(&token).await;
                });
            }
            Err(_) => {
                debug!("No async runtime available, skipping backend logout call");
            }
        }
    }
}

#[async_trait]
impl TokenValidator for ApiClient {
    /// Ask the backend whether it still accepts `token`.
    ///
    /// 2xx means valid, 401 means invalid, anything else (timeouts,
    /// connection errors, 5xx, proxies answering oddly) means the
    /// backend could not be consulted.
    async fn validate(&self, token: &str) -> Verdict {
        let url = self.endpoint("/auth/validate-token");

        let response = self
            .http_client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => Verdict::Valid,
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                debug!("Validation endpoint answered 401");
                Verdict::Invalid
            }
            Ok(response) => {
                debug!(status = %response.status(), "Validation endpoint answered a non-auth error");
                Verdict::Unreachable
            }
            Err(error) => {
                debug!(%error, "Validation request failed");
                Verdict::Unreachable
            }
        }
    }
}

/// Pull the human-readable `message` field out of an error body, if any.
fn extract_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}
