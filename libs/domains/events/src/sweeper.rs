//! Time-driven status sweeper.
//!
//! A periodic batch job that re-evaluates every non-terminal event against
//! the clock: past-end events close, reached-start CREATE events move to
//! PROCESS. The two batches target disjoint status sets, so their order
//! does not matter.
//!
//! The sweeper owns its scheduler lifecycle and carries a single
//! in-flight-tick guard; a tick that fires while the previous one is still
//! running is skipped rather than overlapped. Across replicas nothing is
//! serialized: both batch updates are idempotent, so at-least-once
//! execution is tolerated.
//!
//! Failures are logged and swallowed; a sweep never propagates out of the
//! scheduler loop. `run_once` takes the current instant as a parameter so
//! one tick can be driven synchronously in tests.

use crate::repository::EventRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, instrument, warn};

/// Result of one sweep tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Events moved to CLOSED
    pub closed: u64,
    /// Events moved to PROCESS
    pub started: u64,
    /// True when the tick was skipped because the previous one was still
    /// running
    pub skipped: bool,
}

pub struct StatusSweeper<R: EventRepository> {
    events: Arc<R>,
    in_flight: Arc<AtomicBool>,
}

impl<R: EventRepository> Clone for StatusSweeper<R> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<R: EventRepository + 'static> StatusSweeper<R> {
    pub fn new(events: Arc<R>) -> Self {
        Self {
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one sweep tick against the given instant.
    ///
    /// Never fails: store errors are logged and count as zero transitions
    /// for this tick; the next tick retries.
    #[instrument(skip(self))]
    pub async fn run_once(&self, now: DateTime<Utc>) -> SweepOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Previous sweep still running, skipping this tick");
            return SweepOutcome {
                skipped: true,
                ..SweepOutcome::default()
            };
        }

        let closed = match self.events.close_ended(now).await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "Close sweep failed");
                0
            }
        };

        let started = match self.events.start_due(now).await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "Start sweep failed");
                0
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);

        if closed > 0 || started > 0 {
            info!(closed, started, "Sweep transitioned events");
        } else {
            debug!("Sweep found nothing to transition");
        }

        SweepOutcome {
            closed,
            started,
            skipped: false,
        }
    }

    /// Start sweeping on the given cron schedule.
    ///
    /// Returns a handle owning the scheduler; drop it or call
    /// [`SweeperHandle::shutdown`] to stop.
    pub async fn start(&self, cron_expr: &str) -> Result<SweeperHandle, JobSchedulerError> {
        info!(cron = cron_expr, "Starting status sweeper");

        let scheduler = JobScheduler::new().await?;

        let sweeper = self.clone();
        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                sweeper.run_once(Utc::now()).await;
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        Ok(SweeperHandle { scheduler })
    }
}

/// Owns the running scheduler of a started sweeper.
pub struct SweeperHandle {
    scheduler: JobScheduler,
}

impl SweeperHandle {
    /// Stop the scheduler; in-flight ticks finish on their own.
    pub async fn shutdown(mut self) -> Result<(), JobSchedulerError> {
        info!("Stopping status sweeper");
        self.scheduler.shutdown().await
    }
}
