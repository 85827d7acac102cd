//! Client for the Veo image-to-video generation API.
//!
//! The [`JobClient`] trait is the capability the session core depends on;
//! [`VeoClient`] is the REST adapter for Google's Generative Language API.
//! A job is submitted once, polled by handle until done, and its clip is
//! downloaded from the URI the finished operation reports.

pub mod client;
pub mod error;
pub mod job_client;
pub mod types;


pub use client::{VeoClient, VeoClientConfig};
pub use error::{ClientError, ClientResult, GENERIC_FAILURE_MESSAGE};
pub use job_client::JobClient;
