//! Foreground session watch command.

use super::ConsoleContext;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use console_auth::{Access, SessionWatcher, ValidityMonitor, DEFAULT_WATCH_INTERVAL};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::info;

/// Keep the session under watch in the foreground.
///
/// Arms the periodic validity monitor and the cross-process watcher, then
/// waits until the session expires or ctrl-c arrives. Both background
/// tasks are stopped before returning, whichever way the wait ends.
pub async fn watch(
    ctx: &ConsoleContext,
    interval_secs: Option<u64>,
    format: &OutputFormat,
) -> Result<()> {
    if let Access::Denied { .. } = ctx.service.require_admin() {
        output::print_error("Not authorized. Log in first (`examdesk login`)", format);
        return Ok(());
    }

    let expired = Arc::new(Notify::new());
    let expired_signal = expired.clone();
    ctx.service.on_session_expired(Box::new(move || {
        expired_signal.notify_one();
    }));

    let check_interval =
        Duration::from_secs(interval_secs.unwrap_or(ctx.config.validate_interval_secs));

    let mut monitor = ValidityMonitor::spawn(
        ctx.service.clone(),
        Arc::new(ctx.api_client.clone()),
        check_interval,
    );
    let mut watcher = SessionWatcher::spawn(
        ctx.service.clone(),
        ctx.store_path.clone(),
        ctx.writer_id.clone(),
        DEFAULT_WATCH_INTERVAL,
    );

    info!(
        interval_secs = check_interval.as_secs(),
        "Watching session validity"
    );
    println!("Watching session (ctrl-c to stop)...");

    tokio::select! {
        _ = expired.notified() => {
            output::print_error("Session expired. Log in again with `examdesk login`", format);
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Stopping");
        }
    }

    monitor.stop();
    watcher.stop();

    Ok(())
}
