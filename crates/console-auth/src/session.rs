//! Session lifecycle management.
//!
//! `SessionService` is the one authority over the persisted session
//! record: UI collaborators go through it instead of touching storage
//! directly. The internal FSM tracks the in-process lifecycle while the
//! record itself lives in the shared store, so state observed after a
//! crash or an external mutation is always re-derived from storage via
//! [`SessionService::resync`].

use crate::auth_fsm::{AuthMachine, AuthMachineInput, AuthState};
use crate::client::{ApiClient, LoginResponse};
use crate::{AuthError, AuthResult};
use chrono::{Duration, Utc};
use console_storage::{SessionRecord, SessionVault, UserAttributes};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The role allowed into the administrative console.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Callback type for session-expiration notifications.
pub type ExpiredCallback = Box<dyn Fn() + Send + Sync>;

/// Snapshot of authentication state for status reporting.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub authenticated: bool,
    pub user: Option<UserAttributes>,
    pub expires_at: Option<String>,
    pub state: AuthState,
}

/// Session service owning the vault, the API client, and the auth FSM.
pub struct SessionService {
    vault: Arc<SessionVault>,
    client: ApiClient,
    fsm: Mutex<AuthMachine>,
    expired_callbacks: Mutex<Vec<ExpiredCallback>>,
}

impl SessionService {
    /// Create a new session service.
    ///
    /// Call [`SessionService::resync`] once after construction so a
    /// record persisted by a previous run is picked up.
    pub fn new(vault: Arc<SessionVault>, client: ApiClient) -> Self {
        Self {
            vault,
            client,
            fsm: Mutex::new(AuthMachine::new()),
            expired_callbacks: Mutex::new(Vec::new()),
        }
    }

    /// The vault backing this service.
    pub fn vault(&self) -> &SessionVault {
        &self.vault
    }

    // ==========================================
    // Queries
    // ==========================================

    /// True iff a session record with a token is persisted.
    pub fn is_logged_in(&self) -> bool {
        self.vault.has_token()
    }

    /// The cached user attributes, when present.
    pub fn current_user(&self) -> Option<UserAttributes> {
        self.vault.current_user()
    }

    /// True iff the cached user's role equals `required`.
    pub fn is_authorized_role(&self, required: &str) -> bool {
        self.current_user()
            .map(|user| user.role == required)
            .unwrap_or(false)
    }

    /// The current bearer token, when present.
    pub fn token(&self) -> Option<String> {
        self.vault.token()
    }

    /// Get the current FSM state.
    pub fn fsm_state(&self) -> AuthState {
        let fsm = self.fsm.lock().expect("lock poisoned");
        AuthState::from(fsm.state())
    }

    /// Current status snapshot, re-read from storage on every call.
    pub fn status(&self) -> AuthSnapshot {
        let record = self.vault.load();
        AuthSnapshot {
            authenticated: record
                .as_ref()
                .map(|r| !r.token.is_empty())
                .unwrap_or(false),
            user: record.as_ref().map(|r| r.user.clone()),
            expires_at: record.as_ref().and_then(|r| r.expires_at.clone()),
            state: self.fsm_state(),
        }
    }

    // ==========================================
    // Lifecycle
    // ==========================================

    /// Login with email and password.
    ///
    /// The backend confirms the credentials; the console then applies its
    /// own gate: accounts whose role is not `ADMIN` are rejected before
    /// anything is persisted, even on a 2xx response carrying a token.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<()> {
        self.transition(&AuthMachineInput::LoginAttempt)?;

        let response = match self.client.login(email, password).await {
            Ok(response) => response,
            Err(error) => {
                let _ = self.transition(&AuthMachineInput::LoginFailed);
                return Err(error);
            }
        };

        match self.admit(response) {
            Ok(user_id) => {
                self.transition(&AuthMachineInput::LoginSucceeded)?;
                info!(user_id = %user_id, "Login successful");
                Ok(())
            }
            Err(error) => {
                let _ = self.transition(&AuthMachineInput::LoginFailed);
                Err(error)
            }
        }
    }

    /// Apply the console's admission policy to a login response and, when
    /// it passes, persist the whole session record at once.
    fn admit(&self, response: LoginResponse) -> AuthResult<String> {
        if response.user.role != ADMIN_ROLE {
            warn!(role = %response.user.role, "Login rejected: role not permitted in this console");
            return Err(AuthError::RoleNotPermitted(response.user.role));
        }

        let expires_at = response
            .expires_in
            .map(|secs| (Utc::now() + Duration::seconds(secs)).to_rfc3339());

        let record = SessionRecord {
            token: response.token,
            refresh_token: response.refresh_token,
            expires_at,
            user: UserAttributes {
                id: response.user.id.clone(),
                name: response.user.name,
                email: response.user.email,
                role: response.user.role,
                birth: None,
                citizen_id: None,
                phone_number: None,
                address: None,
                avatar: None,
            },
        };
        self.vault.save(&record)?;

        Ok(response.user.id)
    }

    /// Logout: clear the local session synchronously, then tell the
    /// backend without waiting for it.
    pub fn logout(&self) {
        let token = self.vault.token();

        let _ = self.transition(&AuthMachineInput::LogoutRequested);

        match self.vault.clear() {
            Ok(removed) => {
                if removed {
                    info!("Logged out");
                }
            }
            Err(error) => warn!(%error, "Failed to clear session during logout"),
        }

        let _ = self.transition(&AuthMachineInput::LogoutComplete);

        if let Some(token) = token {
            self.client.spawn_logout(token);
        }
    }

    /// Reconcile the FSM against what is actually persisted.
    ///
    /// Called once at startup, and by the cross-process watcher whenever
    /// another process mutates the shared store. A record that vanished
    /// underneath a logged-in state fires the expiration signal; a record
    /// that appeared flips the machine to logged in. No network calls.
    pub fn resync(&self) {
        let has_token = self.vault.has_token();
        let state = self.fsm_state();

        if has_token && state == AuthState::NotLoggedIn {
            debug!("Session record detected in storage");
            let _ = self.transition(&AuthMachineInput::SessionDetected);
        } else if !has_token && state.is_authenticated() {
            info!("Session record gone from storage, treating as logged out");
            self.mark_logged_out();
        }
    }

    /// Fetch the user profile from the backend and refresh the cached
    /// attributes in the session record.
    pub async fn fetch_profile(&self) -> AuthResult<UserAttributes> {
        let profile = self
            .get_authenticated::<crate::client::UserProfile>("/user/profile")
            .await?;
        let attributes: UserAttributes = profile.into();

        // No suspension point between the load and the save.
        if let Some(mut record) = self.vault.load() {
            record.user = attributes.clone();
            self.vault.save(&record)?;
        }

        Ok(attributes)
    }

    /// Perform an authenticated GET against the backend.
    ///
    /// A 401 from any endpoint applies the same policy as a validator
    /// rejection: the session is cleared, the expiration signal fires,
    /// and the caller sees `AuthError::SessionExpired`.
    pub async fn get_authenticated<T: DeserializeOwned>(&self, path: &str) -> AuthResult<T> {
        let token = self.vault.token().ok_or(AuthError::NotLoggedIn)?;

        match self.client.get_json(path, &token).await {
            Ok(value) => Ok(value),
            Err(AuthError::TokenRejected) => {
                self.expire_locally();
                Err(AuthError::SessionExpired)
            }
            Err(error) => Err(error),
        }
    }

    // ==========================================
    // Expiration
    // ==========================================

    /// Register a callback for the process-wide expiration signal.
    ///
    /// Fired once per expiration event, no matter how many concurrent
    /// paths (monitor tick, in-flight 401, cross-process clear) observe
    /// the same rejection.
    pub fn on_session_expired(&self, callback: ExpiredCallback) {
        let mut callbacks = self.expired_callbacks.lock().expect("lock poisoned");
        callbacks.push(callback);
    }

    /// Clear the session because the server rejected the token.
    ///
    /// Clearing an already-cleared vault is a no-op; the expiration
    /// signal only fires when this call actually took the machine out of
    /// the logged-in state.
    pub(crate) fn expire_locally(&self) {
        match self.vault.clear() {
            Ok(removed) => {
                if removed {
                    info!("Session cleared after server rejection");
                }
            }
            Err(error) => warn!(%error, "Failed to clear rejected session"),
        }
        self.mark_logged_out();
    }

    /// Take the FSM out of LoggedIn and fire the expiration signal when
    /// this caller won the transition.
    fn mark_logged_out(&self) {
        if self.transition(&AuthMachineInput::SessionExpired).is_ok() {
            self.notify_expired();
        }
    }

    fn notify_expired(&self) {
        let callbacks = self.expired_callbacks.lock().expect("lock poisoned");
        for callback in callbacks.iter() {
            callback();
        }
    }

    /// Transition the FSM, logging state changes.
    fn transition(&self, input: &AuthMachineInput) -> AuthResult<AuthState> {
        let mut fsm = self.fsm.lock().expect("lock poisoned");
        let old_state = AuthState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = AuthState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Auth state transition"
            );
        }

        Ok(new_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LoginUser;
    use console_storage::{SessionStorage, StorageResult};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory storage for testing.
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

    fn create_test_service() -> SessionService {
        let vault = Arc::new(SessionVault::new(Box::new(MemoryStorage::new())));
        SessionService::new(vault, ApiClient::new("http://localhost:8080/api"))
    }

    fn login_response(role: &str) -> LoginResponse {
        LoginResponse {
            token: "tok-123".to_string(),
            user: LoginUser {
                id: "user-1".to_string(),
                name: "An Tran".to_string(),
                email: "an@example.com".to_string(),
                role: role.to_string(),
            },
            refresh_token: Some("ref-456".to_string()),
            expires_in: Some(3600),
        }
    }

    fn admin_record() -> SessionRecord {
        SessionRecord {
            token: "tok-123".to_string(),
            refresh_token: None,
            expires_at: None,
            user: UserAttributes {
                id: "user-1".to_string(),
                name: "An Tran".to_string(),
                email: "an@example.com".to_string(),
                role: ADMIN_ROLE.to_string(),
                birth: None,
                citizen_id: None,
                phone_number: None,
                address: None,
                avatar: None,
            },
        }
    }

    #[test]
    fn test_initial_state() {
        let service = create_test_service();
        assert_eq!(service.fsm_state(), AuthState::NotLoggedIn);
        assert!(!service.is_logged_in());
        assert!(service.current_user().is_none());
    }

    #[test]
    fn test_admit_persists_admin_session() {
        let service = create_test_service();

        service.admit(login_response(ADMIN_ROLE)).unwrap();

        assert!(service.is_logged_in());
        let user = service.current_user().unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.role, ADMIN_ROLE);
        assert!(service.is_authorized_role(ADMIN_ROLE));

        let record = service.vault.load().unwrap();
        assert_eq!(record.refresh_token.as_deref(), Some("ref-456"));
        assert!(record.expires_at.is_some());
    }

    #[test]
    fn test_admit_rejects_candidate_even_with_token() {
        let service = create_test_service();

        let result = service.admit(login_response("CANDIDATE"));
        assert!(matches!(result, Err(AuthError::RoleNotPermitted(_))));

        // Nothing was persisted: no token, no user attributes.
        assert!(!service.is_logged_in());
        assert!(service.current_user().is_none());
        assert!(service.vault.load().is_none());
    }

    #[test]
    fn test_logout_clears_session_and_state() {
        let service = create_test_service();
        service.vault.save(&admin_record()).unwrap();
        service.resync();
        assert_eq!(service.fsm_state(), AuthState::LoggedIn);

        service.logout();

        assert!(!service.is_logged_in());
        assert!(service.vault.load().is_none());
        assert_eq!(service.fsm_state(), AuthState::NotLoggedIn);
    }

    #[test]
    fn test_logout_when_not_logged_in_is_a_noop() {
        let service = create_test_service();
        service.logout();
        assert!(!service.is_logged_in());
        assert_eq!(service.fsm_state(), AuthState::NotLoggedIn);
    }

    #[test]
    fn test_expiration_signal_fires_once_across_observers() {
        let service = create_test_service();
        service.vault.save(&admin_record()).unwrap();
        service.resync();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        service.on_session_expired(Box::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        // Two concurrent paths (say, a monitor tick and an in-flight 401)
        // both observe a rejection and both apply the clearing policy.
        service.expire_locally();
        service.expire_locally();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!service.is_logged_in());
        assert!(service.vault.load().is_none());
    }

    #[test]
    fn test_no_expiration_signal_on_explicit_logout() {
        let service = create_test_service();
        service.vault.save(&admin_record()).unwrap();
        service.resync();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        service.on_session_expired(Box::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        service.logout();

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resync_picks_up_external_login() {
        let service = create_test_service();
        assert_eq!(service.fsm_state(), AuthState::NotLoggedIn);

        // Another process wrote a record into the shared store.
        service.vault.save(&admin_record()).unwrap();
        service.resync();

        assert_eq!(service.fsm_state(), AuthState::LoggedIn);
        assert!(service.is_logged_in());
    }

    #[test]
    fn test_resync_detects_external_logout_and_fires_signal() {
        let service = create_test_service();
        service.vault.save(&admin_record()).unwrap();
        service.resync();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        service.on_session_expired(Box::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        // Another process cleared the store.
        service.vault.clear().unwrap();
        service.resync();

        assert!(!service.is_logged_in());
        assert_eq!(service.fsm_state(), AuthState::NotLoggedIn);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Repeated resyncs do not re-fire.
        service.resync();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_snapshot_reflects_storage() {
        let service = create_test_service();
        let snapshot = service.status();
        assert!(!snapshot.authenticated);
        assert!(snapshot.user.is_none());

        service.vault.save(&admin_record()).unwrap();
        let snapshot = service.status();
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.user.unwrap().email, "an@example.com");
    }
}
