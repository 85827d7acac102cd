//! Shared data models for the VGen generation session.
//!
//! This crate provides Serde-serializable types for:
//! - Source images and output aspect ratios
//! - Generation jobs, their status and outcome events
//! - Session phases and the progress-message cursor

pub mod aspect;
pub mod image;
pub mod job;
pub mod phase;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use image::{ImageError, ImageResult, SourceImage};
pub use job::{
    AttemptId, GeneratedVideo, GenerationRequest, JobEvent, JobHandle, JobStatus, MediaReference,
    SubmittedJob,
};
pub use phase::{Phase, StatusCursor, PROGRESS_MESSAGES};
