//! Image-to-video generation session.
//!
//! [`Session`] is the pure state machine. [`SessionController`] drives it
//! on a Tokio runtime: it starts a [`Poller`] for each submitted attempt,
//! rotates progress messages while generating, and drops late outcomes of
//! abandoned attempts. [`AuthGate`] optionally guards access behind a
//! federated sign-in.

pub mod auth;
pub mod config;
pub mod controller;
pub mod image_loader;
pub mod logging;
pub mod poller;
pub mod scope;
pub mod session;

#[cfg(test)]
mod testing;

pub use auth::{
    AuthConfig, AuthError, AuthGate, AuthResult, IdentityProvider, UserIdentity,
    AUTH_UNAVAILABLE_MESSAGE,
};
pub use config::{AppConfig, SessionConfig, DEFAULT_POLL_INTERVAL, DEFAULT_STATUS_INTERVAL};
pub use controller::SessionController;
pub use image_loader::{load_image, load_image_source, ImageLoadError};
pub use logging::{init_tracing, LogFormat};
pub use poller::{Poller, PollerError};
pub use session::{Effect, Intent, Session, SessionSnapshot};

pub use vgen_client::{ClientError, JobClient, VeoClient, VeoClientConfig};
pub use vgen_models::{
    AspectRatio, AttemptId, GeneratedVideo, GenerationRequest, JobEvent, Phase, SourceImage,
};
