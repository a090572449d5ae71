//! Route guarding for protected views.

use crate::session::{SessionService, ADMIN_ROLE};
use tracing::warn;

/// Where denied navigations are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of a route-guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Render the protected view.
    Granted,
    /// Do not render; navigate to `redirect` instead.
    Denied { redirect: &'static str },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

impl SessionService {
    /// Decide whether the current session may enter the administrative
    /// area. Evaluated fresh on every protected navigation; never cached,
    /// since the record may have changed via another process or the
    /// validity monitor since the last check.
    ///
    /// A present session whose role is not `ADMIN` is cleared in full
    /// before the denial: a non-admin record must not linger in protected
    /// UI state even transiently. The check and the clear are one
    /// synchronous block, so nothing can interleave between them.
    pub fn require_admin(&self) -> Access {
        let denied = Access::Denied {
            redirect: LOGIN_ROUTE,
        };

        let Some(record) = self.vault().load() else {
            return denied;
        };
        if record.token.is_empty() {
            return denied;
        }

        if record.user.role != ADMIN_ROLE {
            warn!(role = %record.user.role, "Session role is not administrative, clearing it");
            self.expire_locally();
            return denied;
        }

        Access::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use console_storage::{
        SessionRecord, SessionStorage, SessionVault, StorageResult, UserAttributes,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct MemoryStorage {
        data: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    impl SessionStorage for MemoryStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        fn delete(&self, key: &str) -> StorageResult<bool> {
            Ok(self.data.lock().unwrap().remove(key).is_some())
        }
    }

    fn service_with_record(record: Option<SessionRecord>) -> SessionService {
        let vault = Arc::new(SessionVault::new(Box::new(MemoryStorage::new())));
        if let Some(record) = record {
            vault.save(&record).unwrap();
        }
        let service = SessionService::new(vault, ApiClient::new("http://localhost:8080/api"));
        service.resync();
        service
    }

    fn record_with_role(role: &str) -> SessionRecord {
        SessionRecord {
            token: "tok-123".to_string(),
            refresh_token: None,
            expires_at: None,
            user: UserAttributes {
                id: "user-1".to_string(),
                name: "An Tran".to_string(),
                email: "an@example.com".to_string(),
                role: role.to_string(),
                birth: None,
                citizen_id: None,
                phone_number: None,
                address: None,
                avatar: None,
            },
        }
    }

    #[test]
    fn test_denies_without_session() {
        let service = service_with_record(None);
        assert_eq!(
            service.require_admin(),
            Access::Denied {
                redirect: LOGIN_ROUTE
            }
        );
    }

    #[test]
    fn test_denies_empty_token() {
        let mut record = record_with_role(ADMIN_ROLE);
        record.token = String::new();
        let service = service_with_record(Some(record));
        assert!(!service.require_admin().is_granted());
    }

    #[test]
    fn test_grants_admin() {
        let service = service_with_record(Some(record_with_role(ADMIN_ROLE)));
        assert_eq!(service.require_admin(), Access::Granted);
        // Session stays intact.
        assert!(service.is_logged_in());
    }

    #[test]
    fn test_denies_and_clears_non_admin_even_with_token() {
        let service = service_with_record(Some(record_with_role("CANDIDATE")));

        assert!(!service.require_admin().is_granted());

        // The whole record is gone, not just the token.
        assert!(!service.is_logged_in());
        assert!(service.current_user().is_none());
    }

    #[test]
    fn test_reevaluated_on_every_call() {
        let service = service_with_record(Some(record_with_role(ADMIN_ROLE)));
        assert!(service.require_admin().is_granted());

        // The record disappears between navigations.
        service.vault().clear().unwrap();
        assert!(!service.require_admin().is_granted());
    }
}
