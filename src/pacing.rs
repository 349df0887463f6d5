//! Delayed, cancellable schedule computation
//!
//! Results are held back for a short delay before being delivered so the
//! display does not flicker while the user is still typing. Each new input
//! aborts whatever is still waiting: only the latest input produces a result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::schedule::{ScheduleRequest, ScheduleResult};

/// Default pause before results appear
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(600);

/// Debounces schedule requests, delivering results on a channel
pub struct PacedScheduler {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
    results: mpsc::UnboundedSender<ScheduleResult>,
}

impl PacedScheduler {
    /// Create a scheduler and the receiver its results arrive on
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<ScheduleResult>) {
        let (results, receiver) = mpsc::unbounded_channel();
        let scheduler = PacedScheduler {
            delay,
            pending: None,
            generation: Arc::new(AtomicU64::new(0)),
            results,
        };
        (scheduler, receiver)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending computation with this request
    ///
    /// A request without an anchor only cancels. Returns whether a
    /// computation was scheduled.
    pub fn submit(&mut self, request: ScheduleRequest) -> bool {
        self.cancel();

        if request.anchor.is_none() {
            debug!("Empty anchor, nothing scheduled");
            return false;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let current = Arc::clone(&self.generation);
        let results = self.results.clone();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // A newer submit may have landed after this task woke up
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            if let Some(result) = request.compute() {
                if results.send(result).is_err() {
                    debug!("Result receiver dropped");
                }
            }
        }));

        debug!(anchor = ?request.anchor, delay_ms = delay.as_millis() as u64, "Scheduled computation");
        true
    }

    /// Abort the pending computation, if any
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("Cancelled pending computation");
            }
            handle.abort();
        }
    }

    /// Whether a computation is waiting to be delivered
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for PacedScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
