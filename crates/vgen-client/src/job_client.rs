//! Capability interface for asynchronous video generation services.

use async_trait::async_trait;
use vgen_models::{
    GeneratedVideo, GenerationRequest, JobHandle, JobStatus, MediaReference, SubmittedJob,
};

use crate::error::ClientResult;

/// Submit-then-poll access to a long-running video generation service.
///
/// Implementations hold their own credential. The poller and the session
/// only ever see this trait, never a vendor SDK.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Submit a generation request and return the job's handle together
    /// with the status the service reported at submit time.
    ///
    /// Every call creates a new remote job, even for identical inputs.
    async fn submit(&self, request: &GenerationRequest) -> ClientResult<SubmittedJob>;

    /// Query the current status of a job.
    ///
    /// Safe to repeat; a terminal job keeps reporting the same outcome.
    async fn poll(&self, handle: &JobHandle) -> ClientResult<JobStatus>;

    /// Download the media a finished job refers to.
    async fn fetch_result(&self, media: &MediaReference) -> ClientResult<GeneratedVideo>;
}
