//! Core types, configuration, and utilities for the Examdesk console.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_VALIDATE_INTERVAL_SECS};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
