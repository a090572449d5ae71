//! Session and authentication engine for the Examdesk console.
//!
//! This crate provides:
//! - Login/logout against the exam platform API with a local role gate
//! - Typed token validation (valid / invalid / unreachable)
//! - A periodic validity monitor with cancellable handles
//! - Route guarding for the administrative area
//! - Cross-process session synchronization over the shared store
//! - Explicit FSM-based auth state management

mod auth_fsm;
mod client;
mod error;
mod guard;
mod monitor;
mod session;
mod watcher;

pub use auth_fsm::auth_machine;
pub use auth_fsm::{AuthMachine, AuthMachineInput, AuthMachineState, AuthState};
pub use client::{ApiClient, LoginResponse, LoginUser, TokenValidator, UserProfile, Verdict};
pub use error::{AuthError, AuthResult};
pub use guard::{Access, LOGIN_ROUTE};
pub use monitor::{MonitorHandle, ValidityMonitor, DEFAULT_VALIDATE_INTERVAL};
pub use session::{AuthSnapshot, ExpiredCallback, SessionService, ADMIN_ROLE};
pub use watcher::{SessionWatcher, WatcherHandle, DEFAULT_WATCH_INTERVAL};
