//! Async driver around the session state machine.
//!
//! The controller is the only writer of the [`Session`]. Background work
//! (the generation task and the status ticker) reports through a channel
//! as [`Notice`]s; the controller applies them in order and publishes a
//! fresh [`SessionSnapshot`] after every change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::{debug, info};
use vgen_client::JobClient;
use vgen_models::Phase;

use crate::auth::{AuthGate, AuthResult, UserIdentity};
use crate::config::{SessionConfig, DEFAULT_STATUS_INTERVAL};
use crate::poller::Poller;
use crate::scope::{GeneratingScope, Notice};
use crate::session::{Effect, Intent, Session, SessionSnapshot};

/// Owns one session and the background work of its active attempt.
///
/// Must be used from within a Tokio runtime; a `current_thread` runtime is
/// enough.
pub struct SessionController {
    session: Session,
    poller: Poller,
    status_interval: Duration,
    scope: Option<GeneratingScope>,
    notices_tx: UnboundedSender<Notice>,
    notices_rx: UnboundedReceiver<Notice>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn new(client: Arc<dyn JobClient>, config: &SessionConfig) -> Self {
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let session = Session::new();
        let (snapshots, _) = watch::channel(session.snapshot());

        Self {
            session,
            poller: Poller::new(client, config.poll_interval).with_timeout(config.poll_timeout),
            // The ticker rejects a zero period.
            status_interval: if config.status_interval.is_zero() {
                DEFAULT_STATUS_INTERVAL
            } else {
                config.status_interval
            },
            scope: None,
            notices_tx,
            notices_rx,
            snapshots,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Observe every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Whether background work for an attempt is currently alive.
    pub fn is_generating(&self) -> bool {
        self.scope.is_some()
    }

    /// Apply a user intent and carry out its effect.
    pub fn dispatch(&mut self, intent: Intent) {
        let effect = self.session.handle_intent(intent);
        self.apply_effect(effect);
    }

    fn apply_effect(&mut self, effect: Option<Effect>) {
        match effect {
            Some(Effect::StartGeneration { attempt, request }) => {
                // Replacing an old scope aborts its work.
                self.scope = Some(GeneratingScope::start(
                    attempt,
                    request,
                    self.poller.clone(),
                    self.status_interval,
                    self.notices_tx.clone(),
                ));
            }
            Some(Effect::Abandon { attempt }) => {
                debug!(attempt = %attempt, "Abandoning in-flight generation");
                self.scope = None;
            }
            None => {}
        }

        if self.session.phase() != Phase::Generating {
            self.scope = None;
        }
        self.publish();
    }

    /// Wait for the next background notice and apply it.
    ///
    /// Returns `true` if the notice changed the session.
    pub async fn next_notice(&mut self) -> bool {
        match self.notices_rx.recv().await {
            Some(notice) => self.apply_notice(notice),
            None => false,
        }
    }

    /// Process notices until the session leaves Generating.
    pub async fn settle(&mut self) -> Phase {
        while self.session.phase() == Phase::Generating {
            self.next_notice().await;
        }
        self.session.phase()
    }

    /// Serve intents until the sender side is closed.
    pub async fn run(mut self, mut intents: mpsc::Receiver<Intent>) {
        info!("Session controller started");
        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.dispatch(intent),
                    None => break,
                },
                Some(notice) = self.notices_rx.recv() => {
                    self.apply_notice(notice);
                }
            }
        }
        info!("Session controller stopped");
    }

    /// Sign in through the gate.
    ///
    /// A failure, including a gate without a provider, is also shown in the
    /// session's error panel; Reset clears it.
    pub async fn sign_in(&mut self, gate: &AuthGate) -> AuthResult<Option<UserIdentity>> {
        match gate.sign_in().await {
            Ok(user) => Ok(user),
            Err(err) => {
                let effect = self.session.fail(err.to_string());
                self.apply_effect(effect);
                Err(err)
            }
        }
    }

    /// Sign out through the gate, then start over with a fresh session.
    pub async fn sign_out(&mut self, gate: &AuthGate) -> AuthResult<()> {
        gate.sign_out().await?;
        self.dispatch(Intent::Reset);
        Ok(())
    }

    fn apply_notice(&mut self, notice: Notice) -> bool {
        let changed = match notice {
            Notice::Job(event) => {
                let applied = self.session.handle_event(event);
                if applied {
                    self.scope = None;
                }
                applied
            }
            Notice::Tick(attempt) => self.session.advance_status(attempt),
        };

        if changed {
            self.publish();
        }
        changed
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}
