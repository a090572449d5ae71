//! Authentication state machine using rust-fsm.
//!
//! The machine tracks the in-process view of the session lifecycle. The
//! session record itself lives in shared storage; on startup or when
//! another process mutates the store, `SessionService::resync` reconciles
//! the machine against what is actually persisted.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐  SessionDetected   ┌─────────────────┐
//! │   NotLoggedIn   │ ─────────────────► │    LoggedIn     │
//! └────────┬────────┘                    └───┬─────────┬───┘
//!          │ LoginAttempt                    │         │ SessionExpired
//!          ▼                                 │         ▼
//! ┌─────────────────┐   LoginSucceeded       │    NotLoggedIn
//! │    LoggingIn    │ ───────────────────────┘
//! └────────┬────────┘                        │ LogoutRequested
//!          │ LoginFailed                     ▼
//!          ▼                        ┌─────────────────┐
//!     NotLoggedIn                   │   LoggingOut    │
//!                                   └────────┬────────┘
//!                                            │ LogoutComplete
//!                                            ▼
//!                                       NotLoggedIn
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Define the FSM using rust-fsm's declarative macro.
// This generates a module `auth_machine` with:
// - auth_machine::State (enum)
// - auth_machine::Input (enum)
// - auth_machine::StateMachine (type alias)
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub auth_machine(NotLoggedIn)

    NotLoggedIn => {
        SessionDetected => LoggedIn,
        LoginAttempt => LoggingIn
    },
    LoggingIn => {
        LoginSucceeded => LoggedIn,
        LoginFailed => NotLoggedIn
    },
    LoggedIn => {
        SessionExpired => NotLoggedIn,
        LogoutRequested => LoggingOut
    },
    LoggingOut => {
        LogoutComplete => NotLoggedIn
    }
}

// Re-export the generated types with clearer names
pub use auth_machine::Input as AuthMachineInput;
pub use auth_machine::State as AuthMachineState;
pub use auth_machine::StateMachine as AuthMachine;

/// Simplified view of the FSM state for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// Not logged in.
    NotLoggedIn,
    /// Currently logging in.
    LoggingIn,
    /// Logged in with a persisted session.
    LoggedIn,
    /// Currently logging out.
    LoggingOut,
}

impl AuthState {
    /// Returns true if a session is established (LoggedIn state only).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::LoggedIn)
    }

    /// Returns true if the state is a transient/in-progress state.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthState::LoggingIn | AuthState::LoggingOut)
    }
}

impl From<&AuthMachineState> for AuthState {
    fn from(state: &AuthMachineState) -> Self {
        match state {
            AuthMachineState::NotLoggedIn => AuthState::NotLoggedIn,
            AuthMachineState::LoggingIn => AuthState::LoggingIn,
            AuthMachineState::LoggedIn => AuthState::LoggedIn,
            AuthMachineState::LoggingOut => AuthState::LoggingOut,
        }
    }
}
