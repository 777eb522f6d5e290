//! Autoplay timer: at most one pending advance at a time.
//!
//! Each armed timer is a small task that sleeps for the configured delay and
//! then sends an [`AutoplayTick`]. Cancelling goes through a child
//! [`CancellationToken`]. A tick that was already in the channel when its
//! timer got cancelled carries a stale generation and is refused by
//! [`AutoplayScheduler::accept`].

use std::time::Duration;

use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayTick {
    generation: u64,
}

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Debug)]
pub struct AutoplayScheduler {
    enabled: bool,
    delay: Duration,
    ticks: Sender<AutoplayTick>,
    parent: CancellationToken,
    pending: Option<PendingTimer>,
    generation: u64,
}

impl AutoplayScheduler {
    pub fn new(
        enabled: bool,
        delay: Duration,
        ticks: Sender<AutoplayTick>,
        parent: CancellationToken,
    ) -> Self {
        Self {
            enabled,
            delay,
            ticks,
            parent,
            pending: None,
            generation: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of armed timers, zero or one.
    pub fn pending_count(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    /// Turn autoplay on with `delay` and arm a timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enable(&mut self, delay: Duration) {
        self.enabled = true;
        self.delay = delay;
        info!(delay_ms = delay.as_millis() as u64, "autoplay enabled");
        self.arm();
    }

    /// Turn autoplay off and cancel any pending timer.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.cancel();
        info!("autoplay disabled");
    }

    /// Flip enablement; returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.enabled {
            self.disable();
        } else {
            self.enable(self.delay);
        }
        self.enabled
    }

    /// Replace any pending timer with a fresh one for the full delay.
    /// Does nothing while disabled.
    pub fn arm(&mut self) {
        self.cancel();
        if !self.enabled {
            return;
        }
        self.generation += 1;
        let generation = self.generation;
        let cancel = self.parent.child_token();
        let ticks = self.ticks.clone();
        let delay = self.delay;
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                select! {
                    _ = cancel.cancelled() => {}
                    _ = sleep(delay) => {
                        let _ = ticks.send(AutoplayTick { generation }).await;
                    }
                }
            }
        });
        debug!(generation, delay_ms = delay.as_millis() as u64, "autoplay armed");
        self.pending = Some(PendingTimer { generation, cancel });
    }

    /// Cancel the pending timer, if any. Repeated calls are no-ops.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.cancel.cancel();
            debug!(generation = timer.generation, "autoplay timer cancelled");
        }
    }

    /// Claim a fired tick. Returns `false` for ticks of cancelled timers.
    pub fn accept(&mut self, tick: AutoplayTick) -> bool {
        match &self.pending {
            Some(timer) if timer.generation == tick.generation => {
                self.pending = None;
                true
            }
            _ => {
                debug!(generation = tick.generation, "stale autoplay tick dropped");
                false
            }
        }
    }
}

impl Drop for AutoplayScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
