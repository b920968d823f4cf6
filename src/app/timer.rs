use super::config::ConfigError;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Recurring flush trigger. At most one timer task is alive per instance.
#[derive(Debug, Default)]
pub struct FlushTimer {
    active: Option<CancellationToken>,
}

impl FlushTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any running timer and starts a new one whose first tick is
    /// one `period` from now. The task stops when `on_tick` breaks.
    pub fn arm<F>(&mut self, period: Duration, mut on_tick: F) -> Result<(), ConfigError>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        if period.is_zero() {
            self.disarm();
            return Ok(());
        }

        let handle = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        self.disarm();

        let token = CancellationToken::new();
        let cancelled = token.clone();

        handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if on_tick().is_break() {
                            break;
                        }
                    }
                }
            }
        });

        debug!("Flush timer armed ({:?})", period);
        self.active = Some(token);
        Ok(())
    }

    pub fn disarm(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
            debug!("Flush timer disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
