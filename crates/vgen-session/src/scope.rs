//! Background work owned by the Generating phase.
//!
//! A [`GeneratingScope`] is acquired when a session enters Generating and
//! dropped on every exit. Dropping it aborts both the generation task and
//! the progress-message ticker, so neither outlives the attempt that
//! started them.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;
use vgen_models::{AttemptId, GenerationRequest};

use crate::poller::Poller;

/// Message from background work to the controller.
#[derive(Debug)]
pub enum Notice {
    /// Terminal outcome of an attempt.
    Job(vgen_models::JobEvent),
    /// Time to rotate the progress message for an attempt.
    Tick(AttemptId),
}

/// Generation task and status ticker for one attempt.
pub struct GeneratingScope {
    attempt: AttemptId,
    job: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl GeneratingScope {
    /// Spawn the generation and its ticker. Both report through `notices`.
    pub fn start(
        attempt: AttemptId,
        request: GenerationRequest,
        poller: Poller,
        status_interval: Duration,
        notices: UnboundedSender<Notice>,
    ) -> Self {
        let job_notices = notices.clone();
        let job = tokio::spawn(async move {
            let event = poller.run_generation(attempt, request).await;
            // Receiver gone means the controller was dropped.
            let _ = job_notices.send(Notice::Job(event));
        });

        let ticker = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + status_interval, status_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if notices.send(Notice::Tick(attempt)).is_err() {
                    break;
                }
            }
        });

        debug!(attempt = %attempt, "Generating scope started");
        Self {
            attempt,
            job,
            ticker,
        }
    }
}

impl Drop for GeneratingScope {
    fn drop(&mut self) {
        self.ticker.abort();
        self.job.abort();
        debug!(attempt = %self.attempt, "Generating scope released");
    }
}
