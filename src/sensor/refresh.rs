//! Periodic field regeneration
//!
//! A single tokio task runs passes back to back: regenerate, publish, then
//! wait `100 ms + refresh_delay` on the injected [`Clock`]. A pass is never
//! interrupted; the stop signal is only observed between passes.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::field::SensorField;
use super::oracle::{LineOfSight, ReferencePosition};
use super::sampler::VolumeSampler;
use crate::core::time::{Clock, PassTimer, PassWindow};
use crate::core::{Error, Result};

/// What the refresh task publishes after every cycle.
#[derive(Clone, Debug, Default)]
pub struct RefreshState {
    /// Latest complete field; kept across skipped passes
    pub field: Option<Arc<SensorField>>,
    /// Completed passes
    pub passes: u64,
    /// Passes skipped because a host capability was unavailable
    pub skipped: u64,
    /// Rolling pass timing
    pub timing: PassWindow,
}

/// Read side of the published fields. Cheap to clone.
#[derive(Clone, Debug)]
pub struct FieldReader {
    rx: watch::Receiver<RefreshState>,
}

impl FieldReader {
    /// Latest complete field, if any pass has finished
    pub fn latest(&self) -> Option<Arc<SensorField>> {
        self.rx.borrow().field.clone()
    }

    /// Snapshot of the whole refresh state
    pub fn state(&self) -> RefreshState {
        self.rx.borrow().clone()
    }

    /// Wait for the next published cycle. Fails once the task has ended.
    pub async fn changed(&mut self) -> Result<RefreshState> {
        self.rx
            .changed()
            .await
            .map_err(|_| Error::Shutdown("refresh task ended".into()))?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

/// Repeating regeneration loop around one sampler.
pub struct RefreshTask<L, P, C> {
    sampler: VolumeSampler<L, P>,
    clock: C,
    timer: PassTimer,
    state_tx: watch::Sender<RefreshState>,
    stop_rx: watch::Receiver<bool>,
}

/// Owner handle of a spawned refresh task.
pub struct RefreshHandle<L, P> {
    stop_tx: watch::Sender<bool>,
    reader: FieldReader,
    join: JoinHandle<VolumeSampler<L, P>>,
}

impl<L, P, C> RefreshTask<L, P, C>
where
    L: LineOfSight,
    P: ReferencePosition,
    C: Clock,
{
    /// Build the task together with its stop sender and reader.
    ///
    /// Use [`RefreshTask::spawn`] unless the passes should be driven by hand.
    pub fn new(
        sampler: VolumeSampler<L, P>,
        clock: C,
    ) -> (Self, watch::Sender<bool>, FieldReader) {
        let (state_tx, state_rx) = watch::channel(RefreshState::default());
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = Self {
            sampler,
            clock,
            timer: PassTimer::default(),
            state_tx,
            stop_rx,
        };
        (task, stop_tx, FieldReader { rx: state_rx })
    }

    /// Spawn the loop on the current tokio runtime
    pub fn spawn(sampler: VolumeSampler<L, P>, clock: C) -> RefreshHandle<L, P> {
        let (task, stop_tx, reader) = Self::new(sampler, clock);
        let join = tokio::spawn(task.run());
        RefreshHandle { stop_tx, reader, join }
    }

    /// Run one pass and publish the outcome.
    ///
    /// Returns the new field, or None when the pass was skipped.
    pub fn run_pass(&mut self) -> Option<Arc<SensorField>> {
        let field = match self.sampler.regenerate_field() {
            Ok(field) => {
                self.timer.record(field.stats().duration);
                Some(Arc::new(field))
            }
            Err(e) => {
                if e.is_transient() {
                    log::warn!("Skipping sensor pass: {}", e);
                } else {
                    log::error!("Sensor pass failed: {}", e);
                }
                self.timer.record_skip();
                None
            }
        };

        let passes = self.timer.pass_count();
        let skipped = self.timer.skipped_count();
        let timing = self.timer.window();
        self.state_tx.send_modify(|state| {
            if let Some(field) = &field {
                state.field = Some(field.clone());
            }
            state.passes = passes;
            state.skipped = skipped;
            state.timing = timing;
        });

        field
    }

    fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Loop until stopped. Hands the sampler back on exit.
    pub async fn run(mut self) -> VolumeSampler<L, P> {
        log::info!(
            "Sensor refresh started (interval {:?})",
            self.sampler.config().refresh_interval()
        );

        while !self.stop_requested() {
            self.run_pass();

            let interval = self.sampler.config().refresh_interval();
            tokio::select! {
                _ = self.clock.sleep(interval) => {}
                changed = self.stop_rx.changed() => {
                    // Sender gone means the owner went away: stop as well
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        log::info!(
            "Sensor refresh stopped after {} passes ({} skipped)",
            self.timer.pass_count(),
            self.timer.skipped_count()
        );
        self.sampler
    }
}

impl<L, P> RefreshHandle<L, P> {
    /// Reader for the published fields
    pub fn reader(&self) -> FieldReader {
        self.reader.clone()
    }

    /// Request a stop, wait for the loop to exit and recover the sampler.
    ///
    /// A pass in flight runs to completion first.
    pub async fn stop(self) -> Result<VolumeSampler<L, P>> {
        // The loop may already be gone; the join below reports that
        let _ = self.stop_tx.send(true);
        self.join
            .await
            .map_err(|e| Error::Shutdown(format!("refresh task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::TokioClock;
    use crate::core::types::Vec3;
    use crate::sensor::{SensorConfig, SharedPosition};
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Clock that returns at once and records every requested delay
    #[derive(Clone, Default)]
    struct RecordingClock {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl Clock for RecordingClock {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            self.delays.lock().unwrap().push(duration);
            tokio::task::yield_now()
        }
    }

    fn open_space(_: Vec3, _: Vec3) -> bool {
        false
    }

    fn config() -> SensorConfig {
        SensorConfig {
            resolution: 1.0,
            max_distance: 3.0,
            min_spawn_dist: 1.0,
            dead_zone: 0.0,
            refresh_delay: 0.25,
        }
    }

    #[test]
    fn test_manual_passes_publish() {
        let position = SharedPosition::at(Vec3::new(0.5, 0.5, 0.5));
        let sampler = VolumeSampler::new(config(), open_space, position.clone()).unwrap();
        let (mut task, _stop, reader) = RefreshTask::new(sampler, RecordingClock::default());

        assert!(reader.latest().is_none());

        let first = task.run_pass().unwrap();
        assert_eq!(reader.state().passes, 1);
        assert!(Arc::ptr_eq(&reader.latest().unwrap(), &first));

        position.set(Vec3::new(4.0, 0.0, 0.0));
        task.run_pass();
        assert_eq!(reader.latest().unwrap().origin(), Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(reader.state().passes, 2);
    }

    #[test]
    fn test_skipped_pass_keeps_previous_field() {
        let position = SharedPosition::at(Vec3::ZERO);
        let sampler = VolumeSampler::new(config(), open_space, position.clone()).unwrap();
        let (mut task, _stop, reader) = RefreshTask::new(sampler, RecordingClock::default());

        let first = task.run_pass().unwrap();
        position.clear();
        assert!(task.run_pass().is_none());

        let state = reader.state();
        assert_eq!(state.passes, 1);
        assert_eq!(state.skipped, 1);
        assert!(Arc::ptr_eq(state.field.as_ref().unwrap(), &first));
    }

    #[tokio::test]
    async fn test_loop_waits_configured_interval_and_stops() {
        let clock = RecordingClock::default();
        let sampler = VolumeSampler::new(config(), open_space, SharedPosition::at(Vec3::ZERO)).unwrap();
        let handle = RefreshTask::spawn(sampler, clock.clone());

        let mut reader = handle.reader();
        loop {
            let state = reader.changed().await.unwrap();
            if state.passes >= 3 {
                break;
            }
        }

        let sampler = handle.stop().await.unwrap();
        let interval = sampler.config().refresh_interval();
        assert_eq!(interval, Duration::from_millis(350));

        let delays = clock.delays.lock().unwrap();
        assert!(delays.len() >= 3);
        assert!(delays.iter().all(|d| *d == interval));

        // Nothing is published after the stop
        let final_passes = reader.state().passes;
        assert_eq!(final_passes as usize, delays.len());
    }

    #[tokio::test]
    async fn test_unavailable_position_retries_next_cycle() {
        let position = SharedPosition::new();
        let clock = RecordingClock::default();
        let sampler = VolumeSampler::new(config(), open_space, position.clone()).unwrap();
        let handle = RefreshTask::spawn(sampler, clock);

        let mut reader = handle.reader();
        let state = reader.changed().await.unwrap();
        assert_eq!(state.passes, 0);
        assert!(state.skipped >= 1);
        assert!(state.field.is_none());

        position.set(Vec3::new(2.2, 0.0, 2.2));
        let field = loop {
            let state = reader.changed().await.unwrap();
            if let Some(field) = state.field {
                break field;
            }
        };
        assert_eq!(field.origin(), Vec3::new(2.0, 0.0, 2.0));

        handle.stop().await.unwrap();
    }

    /// Clock whose waits never end on their own
    struct StalledClock;

    impl Clock for StalledClock {
        fn sleep(&self, _: Duration) -> impl Future<Output = ()> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn test_stop_interrupts_wait() {
        let sampler = VolumeSampler::new(config(), open_space, SharedPosition::at(Vec3::ZERO)).unwrap();
        let handle = RefreshTask::spawn(sampler, StalledClock);
        let mut reader = handle.reader();

        let state = reader.changed().await.unwrap();
        assert_eq!(state.passes, 1);

        // The loop is parked in a wait that never completes
        let stopped = tokio::time::timeout(Duration::from_secs(5), handle.stop()).await;
        let sampler = stopped.expect("stop should not wait out the interval").unwrap();
        assert_eq!(sampler.config().max_distance, 3.0);
        assert_eq!(reader.state().passes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_spaces_passes() {
        let sampler = VolumeSampler::new(config(), open_space, SharedPosition::at(Vec3::ZERO)).unwrap();
        let handle = RefreshTask::spawn(sampler, TokioClock);
        let mut reader = handle.reader();

        reader.changed().await.unwrap();
        let first = tokio::time::Instant::now();
        reader.changed().await.unwrap();
        let elapsed = first.elapsed();

        assert!(elapsed >= Duration::from_millis(350), "{elapsed:?}");
        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_reader_reports_shutdown() {
        let sampler = VolumeSampler::new(config(), open_space, SharedPosition::at(Vec3::ZERO)).unwrap();
        let handle = RefreshTask::spawn(sampler, RecordingClock::default());
        let mut reader = handle.reader();
        handle.stop().await.unwrap();

        // Drain whatever was published before the stop
        while reader.changed().await.is_ok() {}
        assert!(matches!(reader.changed().await, Err(Error::Shutdown(_))));
    }
}
