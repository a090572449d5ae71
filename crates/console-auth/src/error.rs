//! Authentication error types.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login rejected by the backend (bad email or password)
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Login succeeded upstream but the account's role is not allowed
    /// into this console
    #[error("Role {0} is not permitted in the administrative console")]
    RoleNotPermitted(String),

    /// No session is present
    #[error("Not logged in")]
    NotLoggedIn,

    /// The session was cleared because the server rejected the token
    #[error("Session expired")]
    SessionExpired,

    /// An authenticated endpoint answered 401
    #[error("Token rejected by the backend")]
    TokenRejected,

    /// Any other non-success API response
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid state transition in the auth FSM
    #[error("Invalid auth state transition: {0}")]
    InvalidStateTransition(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] console_storage::StorageError),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Returns true if this error is transient and the operation can be
    /// retried: connection failures, timeouts, and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            AuthError::Api { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
