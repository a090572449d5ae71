//! Storage key constants.

/// Storage keys used by the console
pub struct StorageKeys;

impl StorageKeys {
    /// The one session record: token plus cached user attributes,
    /// always written and cleared together.
    pub const SESSION_RECORD: &'static str = "session_record";
}
