//! Optional sign-in gate in front of the session.
//!
//! The identity provider itself (popup flow, token handling) is an external
//! collaborator behind [`IdentityProvider`]. The gate only tracks the
//! current user and decides whether the session UI is reachable. When
//! authentication is not configured the gate is disabled and always open.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Shown when sign-in is requested but no provider is configured.
pub const AUTH_UNAVAILABLE_MESSAGE: &str =
    "Authentication is not available. Please check the application configuration.";

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", AUTH_UNAVAILABLE_MESSAGE)]
    Unavailable,

    #[error("Failed to sign in: {0}")]
    SignIn(String),

    #[error("Failed to sign out: {0}")]
    SignOut(String),
}

impl AuthError {
    pub fn sign_in(msg: impl Into<String>) -> Self {
        Self::SignIn(msg.into())
    }

    pub fn sign_out(msg: impl Into<String>) -> Self {
        Self::SignOut(msg.into())
    }
}

/// Identity provider project settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

impl AuthConfig {
    /// Read provider settings from the environment.
    ///
    /// Returns `None`, disabling authentication, unless the API key, auth
    /// domain and project ID are all present.
    pub fn from_env() -> Option<Self> {
        let required = (
            non_empty_env("FIREBASE_API_KEY"),
            non_empty_env("FIREBASE_AUTH_DOMAIN"),
            non_empty_env("FIREBASE_PROJECT_ID"),
        );

        match required {
            (Some(api_key), Some(auth_domain), Some(project_id)) => Some(Self {
                api_key,
                auth_domain,
                project_id,
                storage_bucket: non_empty_env("FIREBASE_STORAGE_BUCKET"),
                messaging_sender_id: non_empty_env("FIREBASE_MESSAGING_SENDER_ID"),
                app_id: non_empty_env("FIREBASE_APP_ID"),
            }),
            _ => {
                warn!(
                    "Authentication configuration is missing or incomplete; authentication \
                     will be disabled. Provide FIREBASE_API_KEY, FIREBASE_AUTH_DOMAIN and \
                     FIREBASE_PROJECT_ID to enable it."
                );
                None
            }
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// Federated sign-in service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the interactive sign-in flow. `Ok(None)` means the user backed out.
    async fn sign_in(&self) -> AuthResult<Option<UserIdentity>>;

    async fn sign_out(&self) -> AuthResult<()>;
}

/// Decides whether the session is reachable and tracks the current user.
pub struct AuthGate {
    provider: Option<Arc<dyn IdentityProvider>>,
    user: watch::Sender<Option<UserIdentity>>,
}

impl AuthGate {
    /// Gate backed by a provider; closed until someone signs in.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider: Some(provider),
            user: watch::channel(None).0,
        }
    }

    /// Gate with authentication turned off; always open.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            user: watch::channel(None).0,
        }
    }

    /// Build the gate from optional configuration.
    ///
    /// `connect` is only called when configuration is present.
    pub fn from_config<F>(config: Option<&AuthConfig>, connect: F) -> Self
    where
        F: FnOnce(&AuthConfig) -> Arc<dyn IdentityProvider>,
    {
        match config {
            Some(config) => {
                info!(project_id = %config.project_id, "Authentication enabled");
                Self::new(connect(config))
            }
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.user.borrow().clone()
    }

    /// Whether the session UI may be shown.
    pub fn is_authorized(&self) -> bool {
        !self.is_enabled() || self.user.borrow().is_some()
    }

    /// Notified whenever the current user changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.user.subscribe()
    }

    pub async fn sign_in(&self) -> AuthResult<Option<UserIdentity>> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            error!("Sign-in requested but authentication is not configured");
            AuthError::Unavailable
        })?;

        let user = provider.sign_in().await.map_err(|e| {
            error!("Authentication error: {}", e);
            match e {
                AuthError::SignIn(_) => e,
                other => AuthError::sign_in(other.to_string()),
            }
        })?;

        if let Some(user) = &user {
            info!(email = user.email.as_deref().unwrap_or("-"), "User signed in");
        }
        self.user.send_replace(user.clone());
        Ok(user)
    }

    /// Sign out. A no-op when authentication is disabled.
    pub async fn sign_out(&self) -> AuthResult<()> {
        let Some(provider) = &self.provider else {
            return Ok(());
        };

        provider.sign_out().await.map_err(|e| {
            error!("Sign out error: {}", e);
            e
        })?;
        self.user.send_replace(None);
        info!("User signed out");
        Ok(())
    }
}
