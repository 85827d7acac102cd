//! Generation session state machine.
//!
//! [`Session`] is the single mutable unit of work. It is a pure, synchronous
//! machine: intents and job events go in, an optional [`Effect`] comes out
//! for the controller to carry out. Nothing here touches the network or a
//! timer, so every transition is testable without a runtime.
//!
//! ```text
//!            SelectImage              Submit
//!   Idle ───────────────▶ ImageSelected ──────▶ Generating ──┬─▶ Ready
//!                              ▲   ▲                          │
//!                  SelectImage │   └──── Submit ── Error ◀────┘
//!                              └───────────────────┘
//!   Reset: any phase ─▶ Idle (all fields back to defaults)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use vgen_models::{
    AspectRatio, AttemptId, GeneratedVideo, GenerationRequest, JobEvent, Phase, SourceImage,
    StatusCursor,
};

/// User intent issued by the presentation layer.
#[derive(Debug, Clone)]
pub enum Intent {
    SelectImage(SourceImage),
    EditPrompt(String),
    ChangeAspectRatio(AspectRatio),
    Submit,
    Reset,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SelectImage(_) => "select_image",
            Intent::EditPrompt(_) => "edit_prompt",
            Intent::ChangeAspectRatio(_) => "change_aspect_ratio",
            Intent::Submit => "submit",
            Intent::Reset => "reset",
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a brand-new generation for this attempt.
    StartGeneration {
        attempt: AttemptId,
        request: GenerationRequest,
    },
    /// Stop listening to this attempt; its events are stale from now on.
    Abandon { attempt: AttemptId },
}

/// State of one generation session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    phase: Phase,
    source_image: Option<SourceImage>,
    prompt: String,
    aspect_ratio: AspectRatio,
    result: Option<Arc<GeneratedVideo>>,
    last_error: Option<String>,
    status: StatusCursor,
    active_attempt: Option<AttemptId>,
    generating_since: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a session in its initial idle state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source_image(&self) -> Option<&SourceImage> {
        self.source_image.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn result(&self) -> Option<&Arc<GeneratedVideo>> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> StatusCursor {
        self.status
    }

    /// Progress message to show, only while generating.
    pub fn status_message(&self) -> Option<&'static str> {
        (self.phase == Phase::Generating).then(|| self.status.message())
    }

    pub fn active_attempt(&self) -> Option<AttemptId> {
        self.active_attempt
    }

    pub fn generating_since(&self) -> Option<DateTime<Utc>> {
        self.generating_since
    }

    /// Whether a submit would currently be accepted.
    pub fn can_submit(&self) -> bool {
        self.phase.can_submit() && self.source_image.is_some() && !self.prompt.trim().is_empty()
    }

    /// Apply a user intent.
    pub fn handle_intent(&mut self, intent: Intent) -> Option<Effect> {
        let name = intent.name();
        let phase = self.phase;

        match intent {
            Intent::SelectImage(image) => {
                if !matches!(phase, Phase::Idle | Phase::ImageSelected | Phase::Error) {
                    debug!(intent = name, phase = %phase, "Ignoring intent in current phase");
                    return None;
                }
                debug!(mime_type = image.mime_type(), bytes = image.len(), "Image selected");
                self.source_image = Some(image);
                self.last_error = None;
                self.phase = Phase::ImageSelected;
                None
            }
            Intent::EditPrompt(text) => {
                if phase.accepts_edits() {
                    self.prompt = text;
                } else {
                    debug!(intent = name, phase = %phase, "Ignoring intent in current phase");
                }
                None
            }
            Intent::ChangeAspectRatio(ratio) => {
                if phase.accepts_edits() {
                    self.aspect_ratio = ratio;
                } else {
                    debug!(intent = name, phase = %phase, "Ignoring intent in current phase");
                }
                None
            }
            Intent::Submit => self.submit(),
            Intent::Reset => self.reset(),
        }
    }

    fn submit(&mut self) -> Option<Effect> {
        if !self.can_submit() {
            debug!(phase = %self.phase, "Submit disabled");
            return None;
        }
        let image = self.source_image.clone()?;

        let attempt = AttemptId::new();
        let request = GenerationRequest {
            image,
            prompt: self.prompt.clone(),
            aspect_ratio: self.aspect_ratio,
        };

        self.phase = Phase::Generating;
        self.active_attempt = Some(attempt);
        self.generating_since = Some(Utc::now());
        self.status.reset();
        self.last_error = None;
        self.result = None;

        info!(
            attempt = %attempt,
            aspect_ratio = %self.aspect_ratio,
            "Starting generation"
        );
        Some(Effect::StartGeneration { attempt, request })
    }

    fn reset(&mut self) -> Option<Effect> {
        let abandoned = match (self.phase, self.active_attempt) {
            (Phase::Generating, Some(attempt)) => Some(Effect::Abandon { attempt }),
            _ => None,
        };

        *self = Session::default();

        if let Some(Effect::Abandon { attempt }) = &abandoned {
            info!(attempt = %attempt, "Session reset during generation; abandoning attempt");
        }
        abandoned
    }

    /// Apply the outcome of a generation attempt.
    ///
    /// Returns `false` and leaves the session untouched when the event does
    /// not belong to the active attempt.
    pub fn handle_event(&mut self, event: JobEvent) -> bool {
        let attempt = event.attempt();
        if self.phase != Phase::Generating || self.active_attempt != Some(attempt) {
            debug!(attempt = %attempt, phase = %self.phase, "Discarding stale job event");
            return false;
        }

        match event {
            JobEvent::Succeeded { video, handle, .. } => {
                info!(attempt = %attempt, operation = %handle, bytes = video.len(), "Video ready");
                self.result = Some(Arc::new(video));
                self.phase = Phase::Ready;
            }
            JobEvent::Failed { message, handle, .. } => {
                warn!(
                    attempt = %attempt,
                    operation = handle.as_ref().map(|h| h.as_str()).unwrap_or("-"),
                    "Generation failed: {}", message
                );
                self.last_error = Some(message);
                self.phase = Phase::Error;
            }
        }

        self.active_attempt = None;
        self.generating_since = None;
        true
    }

    /// Record a failure that does not come from a generation attempt, such
    /// as a rejected sign-in.
    ///
    /// Moves to Error from any phase, abandoning an attempt in flight.
    pub fn fail(&mut self, message: impl Into<String>) -> Option<Effect> {
        let message = message.into();
        let abandoned = match (self.phase, self.active_attempt.take()) {
            (Phase::Generating, Some(attempt)) => Some(Effect::Abandon { attempt }),
            _ => None,
        };

        warn!(phase = %self.phase, "Session failed: {}", message);
        self.phase = Phase::Error;
        self.last_error = Some(message);
        self.generating_since = None;
        abandoned
    }

    /// Rotate the progress message for the active attempt.
    pub fn advance_status(&mut self, attempt: AttemptId) -> bool {
        if self.phase != Phase::Generating || self.active_attempt != Some(attempt) {
            return false;
        }
        self.status.advance();
        true
    }

    /// Serializable view for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            image_mime_type: self.source_image.as_ref().map(|i| i.mime_type().to_string()),
            prompt: self.prompt.clone(),
            aspect_ratio: self.aspect_ratio,
            status_message: self.status_message().map(str::to_string),
            last_error: self.last_error.clone(),
            result_uri: self.result.as_ref().map(|v| v.source_uri.clone()),
            can_submit: self.can_submit(),
            generating_since: self.generating_since,
            result: self.result.clone(),
        }
    }
}

/// Point-in-time view of a [`Session`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub image_mime_type: Option<String>,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub status_message: Option<String>,
    pub last_error: Option<String>,
    pub result_uri: Option<String>,
    pub can_submit: bool,
    pub generating_since: Option<DateTime<Utc>>,
    /// Downloaded clip; shared, not serialized
    #[serde(skip)]
    pub result: Option<Arc<GeneratedVideo>>,
}
