//! Veo REST request/response types.

use serde::{Deserialize, Serialize};
use vgen_models::{GenerationRequest, JobStatus, MediaReference};

/// Number of clips requested per job.
pub const SAMPLE_COUNT: u32 = 1;

/// Body of a `predictLongRunning` call.
#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<Instance>,
    pub parameters: Parameters,
}

#[derive(Debug, Serialize)]
pub struct Instance {
    pub prompt: String,
    pub image: InlineImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub aspect_ratio: String,
    pub sample_count: u32,
}

impl From<&GenerationRequest> for PredictRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            instances: vec![Instance {
                prompt: request.prompt.clone(),
                image: InlineImage {
                    bytes_base64_encoded: request.image.to_base64(),
                    mime_type: request.image.mime_type().to_string(),
                },
            }],
            parameters: Parameters {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
                sample_count: SAMPLE_COUNT,
            },
        }
    }
}

/// Long-running operation, returned by both submit and poll.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: String,
}

/// Payload of a finished operation.
///
/// The REST API nests samples under `generateVideoResponse`; the SDK shape
/// uses a top-level `generatedVideos` list. Both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
    #[serde(default)]
    pub generated_videos: Option<Vec<GeneratedSample>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

impl Operation {
    /// URI of the first generated clip, if present and non-empty.
    pub fn first_video_uri(&self) -> Option<&str> {
        let response = self.response.as_ref()?;
        let samples = response
            .generate_video_response
            .as_ref()
            .map(|r| r.generated_samples.as_slice())
            .or(response.generated_videos.as_deref())?;

        samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
    }

    /// Convert into the client-neutral status.
    pub fn to_status(&self) -> JobStatus {
        JobStatus {
            done: self.done,
            error: self.error.as_ref().map(|e| {
                if e.message.is_empty() {
                    format!("error code {}", e.code.unwrap_or_default())
                } else {
                    e.message.clone()
                }
            }),
            media: self.first_video_uri().map(MediaReference::new),
        }
    }
}
