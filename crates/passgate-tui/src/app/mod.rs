//! Application state and event handling

mod config;
mod events;
mod state;

pub use config::{BiometricConfig, ConfigError, TuiConfig};
pub use events::{AppEvent, EventChannel};
pub use state::{AppState, MenuItem, Modal, ProtectedAction, Verification};

use std::fs;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use passgate_core::{
    BiometricPrompt, CredentialStore, FileStore, LifecycleBus, LifecycleEvent, LockSettings,
    PasscodeKeychain, SessionConfig, SessionError, SettingsFile, SettingsSource, UnlockSession,
};
use ratatui::prelude::*;
use tokio::time::MissedTickBehavior;

use crate::auth::{AttemptFile, AttemptRecord, EntryResult, PasscodeSetup, SetupProgress};
use crate::ui::{self, Theme};

/// Main application struct
pub struct App {
    /// Application state, also the lock screen presenter
    pub state: AppState,

    /// Color theme
    pub theme: Theme,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Tick counter for animations
    pub tick: u64,

    session: UnlockSession,
    settings: Arc<RwLock<LockSettings>>,
    settings_file: Option<SettingsFile>,
    attempt_file: Option<AttemptFile>,
    lifecycle: LifecycleBus,
    events: EventChannel,

    /// Cached so rendering does not hit the credential store
    passcode_set: bool,
    /// Focus was lost since the last unlock
    backgrounded: bool,
    unlocked_at: Option<DateTime<Local>>,
    tick_rate: Duration,
}

impl App {
    /// Create the application from its configuration
    pub fn new(config: &TuiConfig) -> anyhow::Result<Self> {
        let data_dir = config.resolve_data_dir()?;
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let settings_file = SettingsFile::in_dir(&data_dir);
        let settings = settings_file.load();
        tracing::info!("Using data directory {:?}", data_dir);

        Ok(Self::with_parts(
            Arc::new(FileStore::in_dir(&data_dir)),
            config.biometric_prompt(),
            settings,
            Some(settings_file),
            config.session_config(),
            config.tick_rate(),
        )
        .with_attempt_file(AttemptFile::in_dir(&data_dir)))
    }

    /// Create the application from explicit collaborators
    pub fn with_parts(
        store: Arc<dyn CredentialStore>,
        biometric: Arc<dyn BiometricPrompt>,
        settings: LockSettings,
        settings_file: Option<SettingsFile>,
        session_config: SessionConfig,
        tick_rate: Duration,
    ) -> Self {
        let settings = Arc::new(RwLock::new(settings));
        let lifecycle = LifecycleBus::new();
        let source: Arc<dyn SettingsSource> = settings.clone();
        let keychain = PasscodeKeychain::new(store);
        let passcode_set = keychain.is_set();
        let session = UnlockSession::new(
            keychain,
            biometric,
            source,
            &lifecycle,
            session_config,
        );

        Self {
            state: AppState::new(),
            theme: Theme::default(),
            should_quit: false,
            tick: 0,
            session,
            settings,
            settings_file,
            attempt_file: None,
            lifecycle,
            events: EventChannel::new(),
            passcode_set,
            backgrounded: false,
            unlocked_at: None,
            tick_rate,
        }
    }

    /// Persist wrong entries in `file`, resuming any lockout recorded there
    pub fn with_attempt_file(mut self, file: AttemptFile) -> Self {
        self.state.attempts = file.load();
        if self.state.attempts.lockout_remaining().is_some() {
            tracing::info!(
                "Resuming lockout after {} failed attempts",
                self.state.attempts.failed_attempts
            );
        }
        self.attempt_file = Some(file);
        self
    }

    /// Unlock session driving the lock screen
    pub fn session(&self) -> &UnlockSession {
        &self.session
    }

    /// Current lock preferences
    pub fn settings(&self) -> LockSettings {
        self.settings.lock_settings()
    }

    /// Whether a passcode is stored
    pub fn passcode_set(&self) -> bool {
        self.passcode_set
    }

    /// When the last unlock completed
    pub fn unlocked_at(&self) -> Option<DateTime<Local>> {
        self.unlocked_at
    }

    /// Lock the app on startup if the passcode lock is on
    pub fn start(&mut self) {
        if self.session.lock_required() {
            self.lock_now();
        }
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut terminal_events = EventStream::new();
        let mut ticker = tokio::time::interval(self.tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.start();

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            tokio::select! {
                event = terminal_events.next() => match event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => self.should_quit = true,
                },
                Some(reply) = self.session.next_prompt_reply() => {
                    self.session.handle_prompt_reply(reply, &mut self.state);
                    self.process_events();
                }
                _ = ticker.tick() => self.on_tick(),
            }
        }

        tracing::info!("Exiting");
        Ok(())
    }

    /// Apply a terminal event
    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::FocusLost => self.resign_active(),
            Event::FocusGained => self.become_active(),
            _ => {}
        }

        self.session.pump(&mut self.state);
        self.process_events();
    }

    /// Apply events queued by unlock completions
    pub fn process_events(&mut self) {
        while let Some(event) = self.events.try_recv() {
            match event {
                AppEvent::Unlocked => {
                    tracing::info!("Unlocked");
                    self.unlocked_at = Some(Local::now());
                    self.backgrounded = false;
                    self.state.set_status("Unlocked");
                }
            }
        }
    }

    /// Start an unlock flow now
    pub fn lock_now(&mut self) {
        let events = self.events.sender();
        let result = self.session.begin_unlock(&mut self.state, move || {
            // The loop may already be gone on shutdown
            let _ = events.send(AppEvent::Unlocked);
        });

        match result {
            Ok(()) => self.state.clear_messages(),
            Err(SessionError::UnlockPending) => {}
            Err(e) => {
                tracing::debug!("Lock refused: {}", e);
                self.state.set_error(e.to_string());
            }
        }
    }

    fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.state.on_tick();
        self.session.pump(&mut self.state);
        self.process_events();
    }

    fn resign_active(&mut self) {
        tracing::debug!("Terminal lost focus");
        self.backgrounded = true;
        self.lifecycle.publish(LifecycleEvent::ResignedActive);
    }

    fn become_active(&mut self) {
        tracing::debug!("Terminal gained focus");
        self.lifecycle.publish(LifecycleEvent::BecameActive);
        // Let the session see the foreground before a new flow begins
        self.session.pump(&mut self.state);

        if std::mem::take(&mut self.backgrounded)
            && self.settings().passcode_lock_enabled()
            && !self.session.is_pending()
        {
            self.lock_now();
        }
    }

    fn quit(&mut self) {
        if self.session.is_pending() {
            self.session.abandon(&mut self.state);
        }
        self.should_quit = true;
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.state.modal {
            Some(Modal::Lock(_)) => self.handle_lock_key(key.code),
            Some(Modal::Setup(_)) => self.handle_setup_key(key.code),
            Some(Modal::Verify(_)) => self.handle_verify_key(key.code),
            Some(Modal::Help) => self.handle_help_key(key.code),
            None => self.handle_home_key(key.code),
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) {
        let count = MenuItem::ALL.len();
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.menu_index = (self.state.menu_index + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.menu_index = (self.state.menu_index + 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(self.state.selected_item()),
            KeyCode::Esc => self.state.clear_messages(),
            KeyCode::Char(c) => {
                if let Some(item) = MenuItem::ALL.iter().find(|item| item.shortcut() == c) {
                    self.activate(*item);
                }
            }
            _ => {}
        }
    }

    fn activate(&mut self, item: MenuItem) {
        match item {
            MenuItem::PasscodeLock => self.toggle_passcode_lock(),
            MenuItem::TouchBiometric => {
                self.update_settings(|s| s.touch_biometric_enabled = !s.touch_biometric_enabled)
            }
            MenuItem::FaceBiometric => {
                self.update_settings(|s| s.face_biometric_enabled = !s.face_biometric_enabled)
            }
            MenuItem::ChangePasscode if self.passcode_set => {
                self.verify_then(ProtectedAction::ChangePasscode)
            }
            MenuItem::ChangePasscode => self.open_setup(),
            MenuItem::RemovePasscode if self.passcode_set => {
                self.verify_then(ProtectedAction::RemovePasscode)
            }
            MenuItem::RemovePasscode => {
                self.state.set_error(SessionError::PasscodeNotSet.to_string())
            }
            MenuItem::LockNow => self.lock_now(),
            MenuItem::Help => self.state.modal = Some(Modal::Help),
            MenuItem::Quit => self.quit(),
        }
    }

    fn toggle_passcode_lock(&mut self) {
        if self.settings().passcode_lock_enabled() {
            self.update_settings(|s| s.passcode_lock_enabled = false);
            self.state.set_status("Passcode lock disabled");
        } else if self.passcode_set {
            self.update_settings(|s| s.passcode_lock_enabled = true);
            self.state.set_status("Passcode lock enabled");
        } else {
            self.open_setup();
            self.state.set_status("Choose a passcode to enable the lock");
        }
    }

    fn open_setup(&mut self) {
        self.state.modal = Some(Modal::Setup(PasscodeSetup::new()));
        self.state.clear_messages();
    }

    /// Ask for the current passcode before running `action`
    fn verify_then(&mut self, action: ProtectedAction) {
        let screen = self.state.passcode_entry(self.session.keychain().passcode());
        self.state.modal = Some(Modal::Verify(Verification { screen, action }));
        self.state.clear_messages();
    }

    fn run_protected(&mut self, action: ProtectedAction) {
        tracing::info!("Current passcode confirmed for {:?}", action);
        match action {
            ProtectedAction::ChangePasscode => self.open_setup(),
            ProtectedAction::RemovePasscode => {
                self.state.modal = None;
                self.remove_passcode();
            }
        }
    }

    fn remove_passcode(&mut self) {
        self.session.keychain().set_passcode(None);
        self.passcode_set = self.session.keychain().is_set();
        self.update_settings(|s| s.passcode_lock_enabled = false);
        self.state.set_status("Passcode removed");
    }

    fn handle_lock_key(&mut self, key: KeyCode) {
        let Some(Modal::Lock(lock)) = self.state.modal.as_mut() else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                lock.push_digit(c);
            }
            KeyCode::Backspace => lock.pop_digit(),
            KeyCode::Enter => {
                let result = lock.submit();
                let record = lock.record();
                if result != EntryResult::Empty {
                    self.record_attempts(record);
                }
                if result == EntryResult::Accepted {
                    self.session.passcode_accepted(&mut self.state);
                }
            }
            KeyCode::Char('b') => {
                if !self.session.retry_biometric(&mut self.state) {
                    self.state.set_error("Biometric unlock is not available");
                }
            }
            KeyCode::Esc => self.quit(),
            _ => {}
        }
    }

    fn handle_setup_key(&mut self, key: KeyCode) {
        let Some(Modal::Setup(setup)) = self.state.modal.as_mut() else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                setup.push_digit(c);
            }
            KeyCode::Backspace => setup.pop_digit(),
            KeyCode::Enter => {
                if let SetupProgress::Complete(passcode) = setup.submit() {
                    let keychain = self.session.keychain();
                    keychain.set_passcode(Some(&passcode));
                    self.passcode_set = keychain.is_set();

                    // Storage failures are swallowed by the keychain
                    if keychain.passcode().as_str() != passcode.as_str() {
                        tracing::warn!("Passcode was not stored");
                        setup.fail("Could not save the passcode");
                        self.state.set_error("Could not save the passcode");
                        return;
                    }

                    self.state.modal = None;
                    self.update_settings(|s| s.passcode_lock_enabled = true);
                    self.state.set_status("Passcode saved");
                }
            }
            KeyCode::Esc => {
                if !setup.back() {
                    self.state.modal = None;
                }
            }
            _ => {}
        }
    }

    fn handle_verify_key(&mut self, key: KeyCode) {
        let Some(Modal::Verify(verification)) = self.state.modal.as_mut() else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                verification.screen.push_digit(c);
            }
            KeyCode::Backspace => verification.screen.pop_digit(),
            KeyCode::Enter => {
                let action = verification.action;
                let result = verification.screen.submit();
                let record = verification.screen.record();
                if result != EntryResult::Empty {
                    self.record_attempts(record);
                }
                if result == EntryResult::Accepted {
                    self.run_protected(action);
                }
            }
            KeyCode::Esc => self.state.modal = None,
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.state.modal = None;
        }
    }

    fn record_attempts(&mut self, record: AttemptRecord) {
        if let Some(file) = &self.attempt_file {
            if let Err(e) = file.save(&record) {
                tracing::warn!("Failed to save attempt record: {}", e);
            }
        }
        self.state.attempts = record;
    }

    fn update_settings(&mut self, change: impl FnOnce(&mut LockSettings)) {
        let snapshot = {
            let mut settings = match self.settings.write() {
                Ok(settings) => settings,
                Err(poisoned) => poisoned.into_inner(),
            };
            change(&mut settings);
            *settings
        };

        if let Some(file) = &self.settings_file {
            if let Err(e) = file.save(&snapshot) {
                tracing::warn!("Failed to save settings: {}", e);
                self.state.set_error(format!("Could not save settings: {}", e));
            }
        }
    }
}
