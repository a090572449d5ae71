//! CLI command implementations.

mod auth;
mod profile;
mod watch;

pub use auth::{login, logout, status};
pub use profile::profile;
pub use watch::watch;

use anyhow::Result;
use console_auth::{ApiClient, SessionService};
use console_core::{Config, Paths};
use console_storage::{FileStorage, SessionVault};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs: config plus the wired-up session service.
pub struct ConsoleContext {
    pub config: Config,
    pub service: Arc<SessionService>,
    pub api_client: ApiClient,
    /// Location of the shared session document, for the watcher.
    pub store_path: PathBuf,
    /// This process's storage writer id, for self-write suppression.
    pub writer_id: String,
}

/// Build the command context: paths → config → storage → session service.
pub fn build_context(base_dir: Option<PathBuf>) -> Result<ConsoleContext> {
    let paths = match base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;

    let config = Config::load(&paths)?;

    let storage = FileStorage::new(paths.session_file())?;
    let store_path = storage.path().to_path_buf();
    let writer_id = storage.instance_id().to_string();

    let api_client = ApiClient::new(config.api_url.clone());
    let vault = Arc::new(SessionVault::new(Box::new(storage)));
    let service = Arc::new(SessionService::new(vault, api_client.clone()));

    // Pick up a session persisted by a previous run or another process.
    service.resync();

    Ok(ConsoleContext {
        config,
        service,
        api_client,
        store_path,
        writer_id,
    })
}
