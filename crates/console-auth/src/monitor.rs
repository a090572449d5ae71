//! Periodic token validity monitoring.
//!
//! A monitor is a background task a protected view owns for its lifetime:
//! started when the view appears, stopped (or dropped) when it goes away.
//! Several monitors can run at once; each answers only to its own handle.

use crate::client::{TokenValidator, Verdict};
use crate::session::SessionService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::interval;
use tracing::{debug, warn};

/// Default interval between validity checks.
pub const DEFAULT_VALIDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic validity monitor.
pub struct ValidityMonitor;

impl ValidityMonitor {
    /// Arm a monitor: every `check_interval`, ask `validator` whether the
    /// persisted token is still accepted and clear the session when it is
    /// not. Returns the handle that disarms it.
    ///
    /// Ticks with no persisted token are skipped. An `Unreachable`
    /// verdict changes nothing: an outage must not log anyone out.
    pub fn spawn(
        service: Arc<SessionService>,
        validator: Arc<dyn TokenValidator>,
        check_interval: Duration,
    ) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let mut ticker = interval(check_interval);
            // The first tick completes immediately; consume it so the
            // first check lands one full interval after arming.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        run_tick(&service, validator.as_ref()).await;
                    }
                }
            }

            debug!("Validity monitor disarmed");
        });

        MonitorHandle {
            shutdown: Some(shutdown_tx),
        }
    }
}

/// One validation pass. Must never take the timer loop down.
async fn run_tick(service: &SessionService, validator: &dyn TokenValidator) {
    let Some(token) = service.token() else {
        // Nothing to validate.
        return;
    };

    match validator.validate(&token).await {
        Verdict::Invalid => {
            warn!("Server no longer accepts the session token");
            service.expire_locally();
        }
        Verdict::Valid => debug!("Session token still accepted"),
        Verdict::Unreachable => {
            debug!("Validation endpoint unreachable, keeping session");
        }
    }
}

/// Handle owning an armed monitor.
///
/// `stop` is idempotent; dropping the handle disarms as well, so an
/// owner that goes away cannot leak a ticking monitor.
pub struct MonitorHandle {
    shutdown: Option<oneshot::Sender<()>>,
}

impl MonitorHandle {
    /// Disarm the monitor. Calling this more than once, or on an
    /// already-disarmed monitor, is a no-op.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }

    /// True once `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_none()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
