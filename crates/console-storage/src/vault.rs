//! High-level API for the persisted session record.

use crate::{SessionStorage, StorageKeys, StorageResult};
use serde::{Deserialize, Serialize};

/// Cached user attributes written at login time.
///
/// The profile fields past `role` only appear for some accounts, so
/// absence is a typed state rather than an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAttributes {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Authorization input for route guarding, e.g. `ADMIN` or `CANDIDATE`.
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citizen_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The persisted session: bearer token plus the user it belongs to.
///
/// Token and user attributes exist as a unit; they are saved and cleared
/// together, never separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    /// Opaque bearer credential. Never decoded locally.
    pub token: String,
    /// Refresh credential returned by login, persisted pass-through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Advisory expiry timestamp (RFC3339) for status display. Validity
    /// decisions always go through the server, never this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub user: UserAttributes,
}

/// Typed facade over the storage backend for the one session record.
pub struct SessionVault {
    storage: Box<dyn SessionStorage>,
}

impl SessionVault {
    /// Create a new vault with the given storage backend.
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Persist the record, overwriting any prior one.
    pub fn save(&self, record: &SessionRecord) -> StorageResult<()> {
        let raw = serde_json::to_string(record)
            .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::SESSION_RECORD, &raw)
    }

    /// Load the current record.
    ///
    /// Absent, unreadable, and malformed states all degrade to `None`;
    /// no error ever reaches the caller.
    pub fn load(&self) -> Option<SessionRecord> {
        let raw = match self.storage.get(StorageKeys::SESSION_RECORD) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "Session store unreadable, treating as logged out");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::debug!(%error, "Persisted session is malformed, treating as absent");
                None
            }
        }
    }

    /// Remove the record. Returns true when a record was actually removed,
    /// so callers can make double-clearing a no-op.
    pub fn clear(&self) -> StorageResult<bool> {
        self.storage.delete(StorageKeys::SESSION_RECORD)
    }

    /// True iff a record with a non-empty token is present.
    pub fn has_token(&self) -> bool {
        self.load().map(|r| !r.token.is_empty()).unwrap_or(false)
    }

    /// The bearer token, when present and non-empty.
    pub fn token(&self) -> Option<String> {
        self.load().map(|r| r.token).filter(|t| !t.is_empty())
    }

    /// The cached user attributes, when a record is present.
    pub fn current_user(&self) -> Option<UserAttributes> {
        self.load().map(|r| r.user)
    }
}
