//! Test doubles shared by the session crate's unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use vgen_client::{ClientError, ClientResult, JobClient};
use vgen_models::{
    AspectRatio, GeneratedVideo, GenerationRequest, JobHandle, JobStatus, MediaReference,
    SourceImage, SubmittedJob,
};

pub fn image() -> SourceImage {
    SourceImage::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png").unwrap()
}

pub fn request() -> GenerationRequest {
    GenerationRequest {
        image: image(),
        prompt: "An epic cinematic shot of this car".to_string(),
        aspect_ratio: AspectRatio::Landscape,
    }
}

/// Job client that replays a fixed script of poll responses.
///
/// Once the script runs out, every poll reports the job as still running.
#[derive(Default)]
pub struct ScriptedClient {
    polls: Mutex<VecDeque<ClientResult<JobStatus>>>,
    submit_error: Option<String>,
    submit_delay: Option<Duration>,
    submit_status: Option<JobStatus>,
    fetch_error: Option<String>,
    submissions: Mutex<Vec<GenerationRequest>>,
    poll_times: Mutex<Vec<Instant>>,
    fetches: Mutex<u32>,
}

impl ScriptedClient {
    pub fn new(polls: Vec<ClientResult<JobStatus>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            ..Default::default()
        }
    }

    pub fn with_submit_error(mut self, message: &str) -> Self {
        self.submit_error = Some(message.to_string());
        self
    }

    pub fn with_submit_status(mut self, status: JobStatus) -> Self {
        self.submit_status = Some(status);
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    pub fn with_fetch_error(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }

    pub fn submissions(&self) -> Vec<GenerationRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }

    /// Whole seconds between `start` and each poll.
    pub fn poll_offsets_secs(&self, start: Instant) -> Vec<u64> {
        self.poll_times
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.duration_since(start).as_secs())
            .collect()
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl JobClient for ScriptedClient {
    async fn submit(&self, request: &GenerationRequest) -> ClientResult<SubmittedJob> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(request.clone());

        match &self.submit_error {
            Some(message) => Err(ClientError::submission(message.clone())),
            None => Ok(SubmittedJob {
                handle: JobHandle::from_string(format!(
                    "models/veo-2.0-generate-001/operations/op-{}",
                    submissions.len()
                )),
                status: self.submit_status.clone().unwrap_or_default(),
            }),
        }
    }

    async fn poll(&self, _handle: &JobHandle) -> ClientResult<JobStatus> {
        self.poll_times.lock().unwrap().push(Instant::now());
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobStatus::running()))
    }

    async fn fetch_result(&self, media: &MediaReference) -> ClientResult<GeneratedVideo> {
        *self.fetches.lock().unwrap() += 1;
        match &self.fetch_error {
            Some(message) => Err(ClientError::retrieval(message.clone())),
            None => Ok(GeneratedVideo::new(
                media.uri.clone(),
                Some("video/mp4".to_string()),
                vec![0, 0, 0, 24, 0x66, 0x74, 0x79, 0x70],
            )),
        }
    }
}
