//! Request pacing against the shared command proxy.
//!
//! The sequential poller pauses for a fixed interval after every device.
//! The concurrent poller instead funnels every request start through a
//! [`RateGate`], which keeps starts at least one interval apart no matter
//! how many workers are waiting.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Abstracts the actual waiting so poll loops can be tested without delays.
#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, interval: Duration);
}

/// Waits on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait::async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, interval: Duration) {
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
}

/// Returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPacer;

#[async_trait::async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self, _interval: Duration) {}
}

/// Shared admission point spacing request starts by `interval`.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits for the next free slot and claims it. The lock is held while
    /// waiting so callers are admitted one at a time, in arrival order.
    pub async fn admit(&self, pacer: &dyn Pacer) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            let now = Instant::now();
            if slot > now {
                pacer.pause(slot - now).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}
