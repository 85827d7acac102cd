//! Session phase and the cosmetic progress cursor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Phase of a generation session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No image chosen yet
    #[default]
    Idle,
    /// Image chosen, prompt and ratio editable
    ImageSelected,
    /// Job submitted, waiting for the service
    Generating,
    /// Clip downloaded and available
    Ready,
    /// Last attempt failed
    Error,
}

impl Phase {
    /// Get string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ImageSelected => "image_selected",
            Phase::Generating => "generating",
            Phase::Ready => "ready",
            Phase::Error => "error",
        }
    }

    /// Whether prompt and aspect ratio may be edited in this phase.
    pub fn accepts_edits(&self) -> bool {
        matches!(self, Phase::Idle | Phase::ImageSelected | Phase::Error)
    }

    /// Whether a submit may start from this phase.
    pub fn can_submit(&self) -> bool {
        matches!(self, Phase::ImageSelected | Phase::Error)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Messages shown while a clip is generating, in rotation order.
pub const PROGRESS_MESSAGES: [&str; 7] = [
    "Warming up the AI director...",
    "Scouting for the perfect shot...",
    "Setting up the virtual cameras...",
    "Applying cinematic magic...",
    "This can take a few minutes, sit tight...",
    "Adding some extra stoke...",
    "Rendering the final cut...",
];

/// Position in [`PROGRESS_MESSAGES`]. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StatusCursor(usize);

impl StatusCursor {
    pub fn index(&self) -> usize {
        self.0
    }

    pub fn message(&self) -> &'static str {
        PROGRESS_MESSAGES[self.0 % PROGRESS_MESSAGES.len()]
    }

    /// Move to the next message, wrapping after the last one.
    pub fn advance(&mut self) {
        self.0 = (self.0 + 1) % PROGRESS_MESSAGES.len();
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}
