//! Suspension points for the expansion controller.
//!
//! Every poll interval and settle wait goes through a [`Clock`], so a run can
//! be driven by real time ([`TokioClock`]) or simulated time ([`ManualClock`]).

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Source of waits.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend for `duration`, yielding to the host so pending renders complete.
    async fn sleep(&self, duration: Duration);
}

/// Real-time clock backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Simulated clock that returns immediately and records the time it was asked to wait.
#[derive(Debug, Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time waited so far.
    pub fn elapsed(&self) -> Duration {
        self.state
            .lock()
            .map(|s| s.elapsed)
            .unwrap_or_default()
    }

    /// Every individual wait, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state
            .lock()
            .map(|s| s.sleeps.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.elapsed += duration;
            state.sleeps.push(duration);
        }
    }
}
