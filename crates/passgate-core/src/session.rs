//! The unlock session state machine
//!
//! One [`UnlockSession`] lives for the whole application. It mediates between
//! "the host wants the user verified" and the two ways of proving it: typing
//! the passcode on the lock screen, or passing a biometric challenge. Either
//! way the host's completion runs exactly once.
//!
//! # Biometric prompt states
//!
//! ```text
//!            attempt                 Success / Unavailable
//!   Idle ─────────────────► InFlight ─────────────────────► Idle
//!    ▲                         │
//!    │ passcode accepted,      │ Failed / Cancelled / timeout
//!    │ retry, abandon          ▼
//!    └──────────────────── Suppressed
//! ```
//!
//! A prompt is only started from `Idle`, which keeps at most one challenge on
//! screen. After a failed or cancelled challenge the session stays
//! `Suppressed`, so returning to the foreground does not immediately pop the
//! prompt again; the user unlocks with the passcode or asks for a retry.
//!
//! The challenge itself runs on a spawned task. Its reply is queued and only
//! applied when the owner calls [`UnlockSession::pump`] or
//! [`UnlockSession::handle_prompt_reply`], so session state is never touched
//! from another task.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::biometric::{BiometricOutcome, BiometricPrompt};
use crate::credential::PasscodeKeychain;
use crate::error::{PresentError, SessionError};
use crate::lifecycle::{LifecycleBus, LifecycleEvent, Subscription};
use crate::presenter::{ModalKind, Presenter, Transition};
use crate::settings::SettingsSource;

/// Default justification shown by the biometric prompt
pub const DEFAULT_BIOMETRIC_REASON: &str = "Unlock to access your data";

/// Default time a biometric prompt may stay unanswered
const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Callback run once the user is authenticated
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Session configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Justification passed to the biometric prompt
    pub biometric_reason: String,
    /// Give up on an unanswered prompt after this long
    pub prompt_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            biometric_reason: DEFAULT_BIOMETRIC_REASON.to_string(),
            prompt_timeout: Some(DEFAULT_PROMPT_TIMEOUT),
        }
    }
}

impl SessionConfig {
    /// Never time out a biometric prompt
    pub fn without_timeout() -> Self {
        Self {
            prompt_timeout: None,
            ..Self::default()
        }
    }
}

/// State of the biometric prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// No prompt showing, one may be started
    Idle,
    /// A prompt is showing
    InFlight {
        /// Attempt number the reply must carry
        attempt: u64,
        /// When the prompt was started
        started: Instant,
    },
    /// The last prompt failed, was cancelled or timed out
    Suppressed,
}

impl PromptState {
    /// Check if a new prompt may be started
    pub fn is_idle(&self) -> bool {
        matches!(self, PromptState::Idle)
    }
}

/// Answer from a biometric prompt, tagged with its attempt number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptReply {
    /// Attempt this reply belongs to
    pub attempt: u64,
    /// What the user did
    pub outcome: BiometricOutcome,
}

/// Passcode-gated unlock session
pub struct UnlockSession {
    keychain: PasscodeKeychain,
    biometric: Arc<dyn BiometricPrompt>,
    settings: Arc<dyn SettingsSource>,
    config: SessionConfig,

    /// Completion of the flow waiting for the user
    pending: Option<Completion>,
    prompt: PromptState,
    /// Task running the current prompt
    prompt_task: Option<JoinHandle<()>>,
    attempts: u64,
    app_active: bool,

    replies_tx: mpsc::UnboundedSender<PromptReply>,
    replies_rx: mpsc::UnboundedReceiver<PromptReply>,
    lifecycle: Option<Subscription>,
}

impl UnlockSession {
    /// Create a session subscribed to `lifecycle`
    pub fn new(
        keychain: PasscodeKeychain,
        biometric: Arc<dyn BiometricPrompt>,
        settings: Arc<dyn SettingsSource>,
        lifecycle: &LifecycleBus,
        config: SessionConfig,
    ) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            keychain,
            biometric,
            settings,
            config,
            pending: None,
            prompt: PromptState::Idle,
            prompt_task: None,
            attempts: 0,
            app_active: true,
            replies_tx,
            replies_rx,
            lifecycle: Some(lifecycle.subscribe()),
        }
    }

    /// Passcode storage used by this session
    pub fn keychain(&self) -> &PasscodeKeychain {
        &self.keychain
    }

    /// Check if an unlock flow is waiting for the user
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Current biometric prompt state
    pub fn prompt_state(&self) -> PromptState {
        self.prompt
    }

    /// Whether automatic biometric prompts are currently held back
    pub fn biometric_suppressed(&self) -> bool {
        !self.prompt.is_idle()
    }

    /// Whether the app is in the foreground as far as the session knows
    pub fn is_app_active(&self) -> bool {
        self.app_active
    }

    /// Whether the host should gate the app right now
    pub fn lock_required(&self) -> bool {
        self.settings.lock_settings().passcode_lock_enabled() && self.keychain.is_set()
    }

    /// Start an unlock flow
    ///
    /// Presents the lock screen seeded with the stored passcode, then tries
    /// biometrics if they are enabled. `on_success` runs once the user is
    /// authenticated. If the presenter has no surface the flow is silently
    /// dropped, whatever is on screen stays, and `on_success` never runs.
    pub fn begin_unlock<P, F>(&mut self, presenter: &mut P, on_success: F) -> Result<(), SessionError>
    where
        P: Presenter + ?Sized,
        F: FnOnce() + Send + 'static,
    {
        if self.pending.is_some() {
            tracing::warn!("Unlock requested while another unlock is pending");
            return Err(SessionError::UnlockPending);
        }

        let expected = self.keychain.passcode();
        if expected.is_empty() {
            return Err(SessionError::PasscodeNotSet);
        }

        if !presenter.has_surface() {
            tracing::warn!("Unlock aborted: {}", PresentError::NoSurface);
            return Ok(());
        }

        if presenter.presented().is_some() {
            presenter.dismiss(Transition::Immediate);
        }

        if let Err(e) = presenter.present_lock_screen(expected) {
            tracing::warn!("Unlock aborted: {}", e);
            return Ok(());
        }

        self.cancel_prompt();
        self.prompt = PromptState::Idle;
        self.pending = Some(Box::new(on_success));
        tracing::info!("Lock screen presented");

        if self.settings.lock_settings().biometrics_enabled() {
            self.attempt_biometric();
        }
        Ok(())
    }

    /// The lock screen confirmed a correct passcode
    pub fn passcode_accepted<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        tracing::info!("Passcode accepted");
        self.cancel_prompt();
        self.prompt = PromptState::Idle;
        dismiss_lock_screen(presenter, Transition::Animated);
        self.complete();
    }

    /// The app came back to the foreground
    pub fn app_became_active<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        self.app_active = true;

        if presenter.presented() == Some(ModalKind::LockScreen)
            && self.settings.lock_settings().biometrics_enabled()
        {
            self.attempt_biometric();
        }
    }

    /// The app left the foreground
    pub fn app_resigned_active(&mut self) {
        self.app_active = false;
    }

    /// Ask for another biometric prompt after a failed or cancelled one
    ///
    /// Returns whether a prompt was started.
    pub fn retry_biometric<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> bool {
        if self.pending.is_none()
            || presenter.presented() != Some(ModalKind::LockScreen)
            || !self.settings.lock_settings().biometrics_enabled()
        {
            return false;
        }

        if self.prompt == PromptState::Suppressed {
            self.prompt = PromptState::Idle;
        }
        self.attempt_biometric()
    }

    /// Give up on the pending flow without running its completion
    pub fn abandon<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        if self.pending.take().is_some() {
            tracing::info!("Unlock abandoned");
        }
        self.cancel_prompt();
        self.prompt = PromptState::Idle;
        dismiss_lock_screen(presenter, Transition::Immediate);
    }

    /// Apply queued lifecycle events and prompt replies, and expire a stale
    /// prompt. Call this regularly from the owning context.
    pub fn pump<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        while let Some(event) = self.lifecycle.as_mut().and_then(Subscription::try_next) {
            match event {
                LifecycleEvent::BecameActive => self.app_became_active(presenter),
                LifecycleEvent::ResignedActive => self.app_resigned_active(),
            }
        }

        while let Ok(reply) = self.replies_rx.try_recv() {
            self.handle_prompt_reply(reply, presenter);
        }

        self.expire_prompt();
    }

    /// Wait for the next prompt reply
    pub async fn next_prompt_reply(&mut self) -> Option<PromptReply> {
        self.replies_rx.recv().await
    }

    /// Apply a prompt reply. Replies from superseded attempts are ignored.
    pub fn handle_prompt_reply<P: Presenter + ?Sized>(&mut self, reply: PromptReply, presenter: &mut P) {
        match self.prompt {
            PromptState::InFlight { attempt, .. } if attempt == reply.attempt => {}
            _ => {
                tracing::debug!("Ignoring stale biometric reply for attempt {}", reply.attempt);
                return;
            }
        }
        self.prompt_task = None;

        match reply.outcome {
            BiometricOutcome::Success => {
                tracing::info!("Biometric unlock succeeded");
                dismiss_lock_screen(presenter, Transition::Animated);
                self.prompt = PromptState::Idle;
                self.complete();
            }
            BiometricOutcome::Failed | BiometricOutcome::Cancelled => {
                tracing::info!("Biometric unlock {:?}, waiting for passcode", reply.outcome);
                self.prompt = PromptState::Suppressed;
            }
            BiometricOutcome::Unavailable => {
                tracing::debug!("Biometrics became unavailable");
                self.prompt = PromptState::Idle;
            }
        }
    }

    /// Release the lifecycle subscription and any running prompt
    pub fn dispose(mut self) {
        self.lifecycle = None;
        tracing::debug!("Unlock session disposed");
    }

    fn attempt_biometric(&mut self) -> bool {
        if self.pending.is_none() || !self.prompt.is_idle() || !self.app_active {
            tracing::debug!(
                "Biometric prompt skipped (pending: {}, state: {:?}, active: {})",
                self.pending.is_some(),
                self.prompt,
                self.app_active
            );
            return false;
        }

        if !self.biometric.can_evaluate() {
            tracing::debug!("Biometric prompt skipped, biometrics unavailable");
            return false;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("Biometric prompt skipped, no async runtime");
            return false;
        };

        self.attempts += 1;
        let attempt = self.attempts;
        self.prompt = PromptState::InFlight {
            attempt,
            started: Instant::now(),
        };

        let prompt = Arc::clone(&self.biometric);
        let reason = self.config.biometric_reason.clone();
        let replies = self.replies_tx.clone();
        self.prompt_task = Some(runtime.spawn(async move {
            let outcome = prompt.evaluate(&reason).await;
            // The session may have been dropped meanwhile
            let _ = replies.send(PromptReply { attempt, outcome });
        }));

        tracing::debug!("Biometric prompt {} started", attempt);
        true
    }

    fn expire_prompt(&mut self) {
        let (Some(timeout), PromptState::InFlight { attempt, started }) =
            (self.config.prompt_timeout, self.prompt)
        else {
            return;
        };

        if started.elapsed() >= timeout {
            tracing::warn!("Biometric prompt {} timed out after {:?}", attempt, timeout);
            self.cancel_prompt();
            self.prompt = PromptState::Suppressed;
        }
    }

    fn cancel_prompt(&mut self) {
        if let Some(task) = self.prompt_task.take() {
            task.abort();
        }
    }

    fn complete(&mut self) {
        match self.pending.take() {
            Some(completion) => completion(),
            None => tracing::debug!("Unlock completed with no pending flow"),
        }
    }
}

impl Drop for UnlockSession {
    fn drop(&mut self) {
        self.cancel_prompt();
    }
}

impl std::fmt::Debug for UnlockSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockSession")
            .field("pending", &self.pending.is_some())
            .field("prompt", &self.prompt)
            .field("app_active", &self.app_active)
            .field("subscribed", &self.lifecycle.is_some())
            .finish_non_exhaustive()
    }
}

fn dismiss_lock_screen<P: Presenter + ?Sized>(presenter: &mut P, transition: Transition) {
    if presenter.presented() == Some(ModalKind::LockScreen) {
        presenter.dismiss(transition);
    }
}
