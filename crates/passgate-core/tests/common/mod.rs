//! Mock collaborators shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use passgate_core::{
    BiometricOutcome, BiometricPrompt, LifecycleBus, LockSettings, MemoryStore, ModalKind,
    PasscodeKeychain, PresentError, Presenter, SessionConfig, Transition, UnlockSession,
};
use zeroize::Zeroizing;

/// Presenter that records what it was asked to do
pub struct MockPresenter {
    pub stack: Vec<ModalKind>,
    pub expected: Option<String>,
    pub dismissals: Vec<Transition>,
    pub has_surface: bool,
}

impl MockPresenter {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            expected: None,
            dismissals: Vec::new(),
            has_surface: true,
        }
    }

    pub fn showing_lock_screen(&self) -> bool {
        self.presented() == Some(ModalKind::LockScreen)
    }
}

impl Presenter for MockPresenter {
    fn has_surface(&self) -> bool {
        self.has_surface
    }

    fn presented(&self) -> Option<ModalKind> {
        self.stack.last().copied()
    }

    fn dismiss(&mut self, transition: Transition) {
        if self.stack.pop().is_some() {
            self.dismissals.push(transition);
        }
    }

    fn present_lock_screen(&mut self, expected: Zeroizing<String>) -> Result<(), PresentError> {
        if !self.has_surface {
            return Err(PresentError::NoSurface);
        }
        self.expected = Some(expected.to_string());
        self.stack.push(ModalKind::LockScreen);
        Ok(())
    }
}

/// Biometric prompt with a scripted answer
///
/// An outcome of `None` never answers.
pub struct ScriptedPrompt {
    pub available: AtomicBool,
    pub calls: AtomicUsize,
    pub outcome: Mutex<Option<BiometricOutcome>>,
}

impl ScriptedPrompt {
    pub fn new(outcome: Option<BiometricOutcome>) -> Self {
        Self {
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(outcome),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BiometricPrompt for ScriptedPrompt {
    fn can_evaluate(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn evaluate(&self, _reason: &str) -> BiometricOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = *self.outcome.lock().unwrap();
        match outcome {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

/// Counts how often a completion ran
#[derive(Clone, Default)]
pub struct CompletionCounter(Arc<AtomicUsize>);

impl CompletionCounter {
    pub fn callback(&self) -> impl FnOnce() + Send + 'static {
        let count = Arc::clone(&self.0);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A session wired to mocks
pub struct Harness {
    pub session: UnlockSession,
    pub presenter: MockPresenter,
    pub prompt: Arc<ScriptedPrompt>,
    pub settings: Arc<RwLock<LockSettings>>,
    pub store: Arc<MemoryStore>,
    pub bus: LifecycleBus,
}

impl Harness {
    pub fn new(settings: LockSettings, outcome: Option<BiometricOutcome>) -> Self {
        Self::with_config(settings, outcome, SessionConfig::default())
    }

    pub fn with_config(
        settings: LockSettings,
        outcome: Option<BiometricOutcome>,
        config: SessionConfig,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let keychain = PasscodeKeychain::new(store.clone());
        keychain.set_passcode(Some("1234"));

        let prompt = Arc::new(ScriptedPrompt::new(outcome));
        let settings = Arc::new(RwLock::new(settings));
        let bus = LifecycleBus::new();
        let session = UnlockSession::new(
            keychain,
            prompt.clone(),
            settings.clone(),
            &bus,
            config,
        );

        Self {
            session,
            presenter: MockPresenter::new(),
            prompt,
            settings,
            store,
            bus,
        }
    }

    pub fn pump(&mut self) {
        self.session.pump(&mut self.presenter);
    }
}

pub fn lock_only() -> LockSettings {
    LockSettings {
        passcode_lock_enabled: true,
        ..Default::default()
    }
}

pub fn lock_with_touch() -> LockSettings {
    LockSettings {
        passcode_lock_enabled: true,
        touch_biometric_enabled: true,
        ..Default::default()
    }
}
