//! Auto-refresh timer.
//!
//! Each page owns one `AutoRefresh`: an enabled flag and at most one recurring
//! timer task. Starting while a timer is already running is a no-op, so a
//! double toggle can never leave two timers reloading the same page.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest interval a timer will run at.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub struct AutoRefresh {
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AutoRefresh {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            handle: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Start calling `tick` every interval. The first call happens one
    /// interval from now. Returns `false` if a timer was already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(&self, tick: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!("auto-refresh already running; ignoring start");
            return false;
        }

        let period = self.interval;
        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick().await;
            }
        }));
        tracing::info!(interval_secs = period.as_secs(), "auto-refresh enabled");
        true
    }

    /// Stop the timer. Returns `false` if none was running.
    pub fn stop(&self) -> bool {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(h) if !h.is_finished() => {
                h.abort();
                tracing::info!("auto-refresh disabled");
                true
            }
            _ => false,
        }
    }

    /// Flip between running and stopped. Returns the new enabled state.
    pub fn toggle<F, Fut>(&self, tick: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_enabled() {
            self.stop();
            false
        } else {
            self.start(tick)
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        if let Some(h) = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            h.abort();
        }
    }
}
