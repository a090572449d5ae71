//! Session storage for the Examdesk console.
//!
//! This crate provides the persistence layer for the console's one piece
//! of shared mutable state, the session record:
//! - A `SessionStorage` trait over string key/value backends
//! - A file-backed implementation shared by every console process
//! - A typed `SessionVault` facade that degrades malformed data to
//!   "no session" instead of erroring

mod file;
mod keys;
mod traits;
mod vault;

pub use file::{FileStorage, StoreDocument};
pub use keys::StorageKeys;
pub use traits::SessionStorage;
pub use vault::{SessionRecord, SessionVault, UserAttributes};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
