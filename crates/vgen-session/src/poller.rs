//! Drives a submitted job to a terminal state.
//!
//! Polling is strictly sequential: wait one interval, query, repeat. There
//! is no backoff, no jitter and no attempt cap. The loop ends when the
//! service reports the job done, when a query fails (never retried), or,
//! only if configured, when the optional deadline passes.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use vgen_client::{ClientError, JobClient, GENERIC_FAILURE_MESSAGE};
use vgen_models::{
    AttemptId, GenerationRequest, JobEvent, JobHandle, JobStatus, MediaReference, SubmittedJob,
};

use crate::config::DEFAULT_POLL_INTERVAL;

/// Reported when the service finishes a job without a usable clip.
pub const MISSING_MEDIA_MESSAGE: &str =
    "Video generation succeeded, but no download link was found.";

/// Why a poll loop ended without a clip.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Video generation failed: {0}")]
    JobFailed(String),

    #[error("{}", MISSING_MEDIA_MESSAGE)]
    MissingMedia,

    #[error("Video generation timed out after {0:?}")]
    TimedOut(Duration),
}

impl PollerError {
    /// Message for the session's error panel.
    pub fn user_message(&self) -> String {
        match self {
            PollerError::Client(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Fixed-interval poller over a [`JobClient`].
#[derive(Clone)]
pub struct Poller {
    client: Arc<dyn JobClient>,
    interval: Duration,
    timeout: Option<Duration>,
}

impl Poller {
    /// A zero `interval` falls back to [`DEFAULT_POLL_INTERVAL`].
    pub fn new(client: Arc<dyn JobClient>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!("Zero poll interval requested; using {:?}", DEFAULT_POLL_INTERVAL);
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };

        Self {
            client,
            interval,
            timeout: None,
        }
    }

    /// Give up after `timeout`. Without this the loop waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Poll `handle` until the job is done and return its media reference.
    pub async fn wait_for_completion(
        &self,
        handle: &JobHandle,
    ) -> Result<MediaReference, PollerError> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if let Some(timeout) = self.timeout {
                if started.elapsed() + self.interval > timeout {
                    warn!(operation = %handle, attempts, "Polling deadline reached");
                    return Err(PollerError::TimedOut(timeout));
                }
            }

            sleep(self.interval).await;
            attempts += 1;
            metrics::counter!("vgen_poll_attempts_total").increment(1);

            let status = self.client.poll(handle).await?;
            debug!(operation = %handle, attempt = attempts, done = status.done, "Polled job");

            if !status.is_terminal() {
                continue;
            }

            info!(operation = %handle, attempts, "Job reached terminal state");
            return media_of(status);
        }
    }

    /// Run one complete generation: submit, poll to completion, download.
    ///
    /// Always produces exactly one event tagged with `attempt`; failures at
    /// any step become [`JobEvent::Failed`].
    pub async fn run_generation(&self, attempt: AttemptId, request: GenerationRequest) -> JobEvent {
        let started = Instant::now();
        metrics::counter!("vgen_generations_total").increment(1);

        let SubmittedJob { handle, status } = match self.client.submit(&request).await {
            Ok(job) => job,
            Err(err) => {
                warn!(attempt = %attempt, "Submission failed: {}", err);
                return failed(attempt, None, err.user_message());
            }
        };

        let media = if status.is_terminal() {
            info!(attempt = %attempt, operation = %handle, "Job finished at submit time");
            media_of(status)
        } else {
            info!(attempt = %attempt, operation = %handle, "Polling for video generation status");
            self.wait_for_completion(&handle).await
        };

        let outcome = match media {
            Ok(media) => self.client.fetch_result(&media).await.map_err(PollerError::from),
            Err(err) => Err(err),
        };

        metrics::histogram!("vgen_generation_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(video) => {
                metrics::counter!("vgen_generation_outcomes_total", "outcome" => "succeeded")
                    .increment(1);
                JobEvent::Succeeded {
                    attempt,
                    handle,
                    video,
                }
            }
            Err(err) => {
                metrics::counter!("vgen_generation_outcomes_total", "outcome" => "failed")
                    .increment(1);
                failed(attempt, Some(handle), err.user_message())
            }
        }
    }
}

fn media_of(status: JobStatus) -> Result<MediaReference, PollerError> {
    if let Some(message) = status.error {
        return Err(PollerError::JobFailed(message));
    }
    status.media.ok_or(PollerError::MissingMedia)
}

fn failed(attempt: AttemptId, handle: Option<JobHandle>, message: String) -> JobEvent {
    let message = if message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        message
    };
    JobEvent::Failed {
        attempt,
        handle,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{request, ScriptedClient};

    const INTERVAL: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn test_done_on_third_poll() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(JobStatus::running()),
            Ok(JobStatus::running()),
            Ok(JobStatus::succeeded(MediaReference::new("https://files/v"))),
        ]));
        let poller = Poller::new(client.clone(), INTERVAL);

        let start = Instant::now();
        let event = poller.run_generation(AttemptId::new(), request()).await;

        assert!(event.is_success());
        assert_eq!(client.poll_count(), 3);
        assert_eq!(client.poll_offsets_secs(start), vec![10, 20, 30]);
        assert_eq!(client.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_at_submit_skips_polling() {
        let client = Arc::new(ScriptedClient::new(vec![]).with_submit_status(
            JobStatus::succeeded(MediaReference::new("https://files/v")),
        ));
        let poller = Poller::new(client.clone(), INTERVAL);

        let start = Instant::now();
        let event = poller.run_generation(AttemptId::new(), request()).await;

        assert!(event.is_success());
        assert_eq!(client.poll_count(), 0);
        assert_eq!(client.fetch_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_at_submit_is_reported() {
        let client = Arc::new(
            ScriptedClient::new(vec![]).with_submit_status(JobStatus::failed("quota exceeded")),
        );
        let poller = Poller::new(client.clone(), INTERVAL);

        match poller.run_generation(AttemptId::new(), request()).await {
            JobEvent::Failed { message, handle, .. } => {
                assert_eq!(message, "Video generation failed: quota exceeded");
                assert!(handle.is_some());
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(client.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_without_media_is_failure() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus {
            done: true,
            error: None,
            media: None,
        })]));
        let poller = Poller::new(client.clone(), INTERVAL);

        match poller.run_generation(AttemptId::new(), request()).await {
            JobEvent::Failed { message, handle, .. } => {
                assert_eq!(message, MISSING_MEDIA_MESSAGE);
                assert!(handle.is_some());
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(client.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_error_is_reported() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(JobStatus::running()),
            Ok(JobStatus::failed("prompt rejected by safety filter")),
        ]));
        let poller = Poller::new(client, INTERVAL);

        match poller.run_generation(AttemptId::new(), request()).await {
            JobEvent::Failed { message, .. } => {
                assert_eq!(message, "Video generation failed: prompt rejected by safety filter");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_error_skips_polling() {
        let client = Arc::new(ScriptedClient::new(vec![]).with_submit_error("invalid image payload"));
        let poller = Poller::new(client.clone(), INTERVAL);

        match poller.run_generation(AttemptId::new(), request()).await {
            JobEvent::Failed { message, handle, .. } => {
                assert_eq!(message, "Submission failed: invalid image payload");
                assert!(handle.is_none());
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(client.poll_count(), 0);
        assert_eq!(client.submissions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_is_not_retried() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(JobStatus::running()),
            Err(ClientError::poll("connection reset")),
            Ok(JobStatus::succeeded(MediaReference::new("https://files/v"))),
        ]));
        let poller = Poller::new(client.clone(), INTERVAL);

        match poller.run_generation(AttemptId::new(), request()).await {
            JobEvent::Failed { message, .. } => {
                assert_eq!(message, "Status check failed: connection reset");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(client.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_becomes_failure() {
        let client = Arc::new(
            ScriptedClient::new(vec![Ok(JobStatus::succeeded(MediaReference::new(
                "https://files/v",
            )))])
            .with_fetch_error("Failed to download video. Status: 403 Forbidden"),
        );
        let poller = Poller::new(client, INTERVAL);

        match poller.run_generation(AttemptId::new(), request()).await {
            JobEvent::Failed { message, .. } => {
                assert_eq!(message, "Failed to download video. Status: 403 Forbidden");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_uses_default() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus::succeeded(
            MediaReference::new("https://files/v"),
        ))]));
        let poller = Poller::new(client.clone(), Duration::ZERO);

        let start = Instant::now();
        let media = tokio::time::timeout(
            Duration::from_secs(60),
            poller.wait_for_completion(&JobHandle::from_string("op")),
        )
        .await
        .expect("poll loop must yield to the timer")
        .unwrap();

        assert_eq!(media.uri, "https://files/v");
        assert_eq!(client.poll_offsets_secs(start), vec![10]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_optional_timeout() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let poller =
            Poller::new(client.clone(), INTERVAL).with_timeout(Some(Duration::from_secs(35)));

        let err = poller
            .wait_for_completion(&JobHandle::from_string("op"))
            .await
            .unwrap_err();
        assert!(matches!(err, PollerError::TimedOut(_)));
        assert_eq!(client.poll_count(), 3);
    }
}
