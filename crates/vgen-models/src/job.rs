//! Generation job definitions.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AspectRatio, SourceImage};

/// Opaque handle returned by the generation service on submit.
///
/// Must be passed back unchanged on every status query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobHandle(pub String);

impl JobHandle {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-local identifier for one accepted submit.
///
/// Allocated before the job exists remotely, so events from a failed
/// submission can still be matched against the session's active attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AttemptId(pub Uuid);

impl AttemptId {
    /// Generate a new random attempt ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inputs for one generation. Every submit builds a fresh request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub image: SourceImage,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// Reference to a finished clip on the service's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaReference {
    pub uri: String,
}

impl MediaReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Snapshot of a job as reported by one status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// True once the service reports the job finished (successfully or not)
    pub done: bool,
    /// Failure reported by the service
    pub error: Option<String>,
    /// Media produced by the job, if any
    pub media: Option<MediaReference>,
}

impl JobStatus {
    /// A job that is still running.
    pub fn running() -> Self {
        Self::default()
    }

    /// A finished job with a usable media reference.
    pub fn succeeded(media: MediaReference) -> Self {
        Self {
            done: true,
            error: None,
            media: Some(media),
        }
    }

    /// A finished job that the service reports as failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            done: true,
            error: Some(message.into()),
            media: None,
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        self.done
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    pub handle: JobHandle,
    /// Status reported in the submit response; may already be terminal
    pub status: JobStatus,
}

impl SubmittedJob {
    /// A freshly accepted job that is still running.
    pub fn pending(handle: JobHandle) -> Self {
        Self {
            handle,
            status: JobStatus::running(),
        }
    }
}

/// Downloaded clip, the session's result media.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedVideo {
    /// URI the clip was fetched from
    pub source_uri: String,
    /// Content type reported by the download, if any
    pub content_type: Option<String>,
    /// Raw video bytes
    pub bytes: Vec<u8>,
    /// When the download completed
    pub fetched_at: DateTime<Utc>,
}

impl GeneratedVideo {
    pub fn new(source_uri: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            source_uri: source_uri.into(),
            content_type,
            bytes,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for GeneratedVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedVideo")
            .field("source_uri", &self.source_uri)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

/// Terminal outcome of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// The clip was generated and downloaded.
    Succeeded {
        attempt: AttemptId,
        handle: JobHandle,
        video: GeneratedVideo,
    },
    /// Submission, polling, or download failed.
    Failed {
        attempt: AttemptId,
        /// Absent when the submission itself failed
        handle: Option<JobHandle>,
        message: String,
    },
}

impl JobEvent {
    /// The attempt this event originates from.
    pub fn attempt(&self) -> AttemptId {
        match self {
            JobEvent::Succeeded { attempt, .. } | JobEvent::Failed { attempt, .. } => *attempt,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobEvent::Succeeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_constructors() {
        assert!(!JobStatus::running().is_terminal());

        let done = JobStatus::succeeded(MediaReference::new("https://example.com/v.mp4"));
        assert!(done.is_terminal());
        assert!(done.error.is_none());

        let failed = JobStatus::failed("quota exceeded");
        assert!(failed.is_terminal());
        assert!(failed.media.is_none());
    }

    #[test]
    fn test_attempt_ids_are_unique() {
        assert_ne!(AttemptId::new(), AttemptId::new());
    }

    #[test]
    fn test_event_attempt() {
        let attempt = AttemptId::new();
        let event = JobEvent::Failed {
            attempt,
            handle: None,
            message: "boom".to_string(),
        };
        assert_eq!(event.attempt(), attempt);
        assert!(!event.is_success());
    }

    #[test]
    fn test_handle_serializes_transparently() {
        let handle = JobHandle::from_string("models/veo/operations/abc");
        assert_eq!(
            serde_json::to_string(&handle).unwrap(),
            "\"models/veo/operations/abc\""
        );
    }
}
