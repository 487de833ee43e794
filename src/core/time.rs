//! Refresh timing: the injectable clock and rolling pass statistics

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

/// Source of inter-pass delays.
///
/// The refresh task only ever suspends through this trait, so tests can
/// substitute a clock that returns immediately and records what was asked.
pub trait Clock: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall clock backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Duration statistics over the recent pass window
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PassWindow {
    pub avg_ms: f32,
    pub min_ms: f32,
    pub max_ms: f32,
    pub samples: usize,
}

/// Tracks flood-fill pass durations
pub struct PassTimer {
    history: VecDeque<Duration>,
    capacity: usize,
    pass_count: u64,
    skipped_count: u64,
}

impl PassTimer {
    /// Create a timer keeping the last `capacity` passes
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            pass_count: 0,
            skipped_count: 0,
        }
    }

    /// Record a completed pass
    pub fn record(&mut self, duration: Duration) {
        self.pass_count += 1;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(duration);
    }

    /// Record a pass that was skipped because a host capability was unavailable
    pub fn record_skip(&mut self) {
        self.skipped_count += 1;
    }

    /// Total completed passes
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    /// Total skipped passes
    pub fn skipped_count(&self) -> u64 {
        self.skipped_count
    }

    /// Rolling avg/min/max over the retained window
    pub fn window(&self) -> PassWindow {
        if self.history.is_empty() {
            return PassWindow::default();
        }

        let mut total = 0.0f32;
        let mut min_ms = f32::INFINITY;
        let mut max_ms = 0.0f32;

        for duration in &self.history {
            let ms = duration.as_secs_f32() * 1000.0;
            total += ms;
            min_ms = min_ms.min(ms);
            max_ms = max_ms.max(ms);
        }

        PassWindow {
            avg_ms: total / self.history.len() as f32,
            min_ms,
            max_ms,
            samples: self.history.len(),
        }
    }
}

impl Default for PassTimer {
    fn default() -> Self {
        Self::new(64)
    }
}
