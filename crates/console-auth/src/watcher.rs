//! Cross-process session synchronization.
//!
//! Every console process shares one session document on disk. The watcher
//! polls that document and, when another process mutates it, re-derives
//! local state through [`SessionService::resync`]. A login or logout in
//! one window becomes visible in the others without waiting for a
//! navigation or a monitor tick, and without any network call.
//!
//! Mutations stamped with this process's own writer id are ignored, the
//! same way platform storage events never fire in the tab that wrote.

use crate::session::SessionService;
use console_storage::StoreDocument;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::interval;
use tracing::debug;

/// Default cadence for checking the shared document.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Watches the shared session document for foreign writes.
pub struct SessionWatcher;

impl SessionWatcher {
    /// Start watching `store_path`. `local_writer` is this process's
    /// storage instance id; changes it wrote itself are skipped.
    pub fn spawn(
        service: Arc<SessionService>,
        store_path: PathBuf,
        local_writer: String,
        poll_interval: Duration,
    ) -> WatcherHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let mut last_seen = StoreDocument::read(&store_path);
            let mut ticker = interval(poll_interval);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let current = StoreDocument::read(&store_path);
                        if current == last_seen {
                            continue;
                        }

                        // A vanished document has no writer stamp, so it
                        // counts as foreign.
                        let foreign = current
                            .as_ref()
                            .map(|doc| doc.writer.as_deref() != Some(local_writer.as_str()))
                            .unwrap_or(true);
                        last_seen = current;

                        if foreign {
                            debug!("Session store changed by another process, resyncing");
                            service.resync();
                        }
                    }
                }
            }

            debug!("Session watcher stopped");
        });

        WatcherHandle {
            shutdown: Some(shutdown_tx),
        }
    }
}

/// Handle owning a running watcher. Stop is idempotent; dropping the
/// handle stops the watcher too.
pub struct WatcherHandle {
    shutdown: Option<oneshot::Sender<()>>,
}

impl WatcherHandle {
    /// Stop watching. Calling this more than once is a no-op.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
