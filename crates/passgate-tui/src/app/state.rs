//! Application state

use passgate_core::{ModalKind, PresentError, Presenter, Transition};
use zeroize::Zeroizing;

use crate::auth::{AttemptRecord, LockScreen, LockoutPolicy, PasscodeSetup};

/// Ticks the "unlocked" banner stays visible after an animated dismissal
const UNLOCK_BANNER_TICKS: u8 = 15;

/// Entries of the home menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    PasscodeLock,
    TouchBiometric,
    FaceBiometric,
    ChangePasscode,
    RemovePasscode,
    LockNow,
    Help,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 8] = [
        MenuItem::PasscodeLock,
        MenuItem::TouchBiometric,
        MenuItem::FaceBiometric,
        MenuItem::ChangePasscode,
        MenuItem::RemovePasscode,
        MenuItem::LockNow,
        MenuItem::Help,
        MenuItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::PasscodeLock => "Passcode lock",
            MenuItem::TouchBiometric => "Fingerprint unlock",
            MenuItem::FaceBiometric => "Face unlock",
            MenuItem::ChangePasscode => "Change passcode",
            MenuItem::RemovePasscode => "Remove passcode",
            MenuItem::LockNow => "Lock now",
            MenuItem::Help => "Help",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            MenuItem::PasscodeLock => 'p',
            MenuItem::TouchBiometric => 't',
            MenuItem::FaceBiometric => 'f',
            MenuItem::ChangePasscode => 'c',
            MenuItem::RemovePasscode => 'r',
            MenuItem::LockNow => 'l',
            MenuItem::Help => '?',
            MenuItem::Quit => 'q',
        }
    }
}

/// Passcode changes that need the current passcode first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedAction {
    ChangePasscode,
    RemovePasscode,
}

impl ProtectedAction {
    pub fn title(self) -> &'static str {
        match self {
            ProtectedAction::ChangePasscode => "Change Passcode",
            ProtectedAction::RemovePasscode => "Remove Passcode",
        }
    }
}

/// Current passcode check guarding a [`ProtectedAction`]
pub struct Verification {
    pub screen: LockScreen,
    pub action: ProtectedAction,
}

/// Modal overlay on top of the home screen
pub enum Modal {
    /// Passcode lock screen
    Lock(LockScreen),
    /// Create or change the passcode
    Setup(PasscodeSetup),
    /// Confirm the current passcode
    Verify(Verification),
    /// Key bindings
    Help,
}

impl Modal {
    fn kind(&self) -> ModalKind {
        match self {
            Modal::Lock(_) => ModalKind::LockScreen,
            Modal::Setup(_) | Modal::Verify(_) | Modal::Help => ModalKind::Other,
        }
    }
}

/// Application state
pub struct AppState {
    /// Modal on top of the home screen
    pub modal: Option<Modal>,

    /// Home menu selection index
    pub menu_index: usize,

    /// Status message to display
    pub status_message: Option<String>,

    /// Error message to display
    pub error_message: Option<String>,

    /// Remaining ticks of the "unlocked" banner
    pub unlock_banner: u8,

    /// Wrong entries so far, shared by every passcode prompt
    pub attempts: AttemptRecord,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            modal: None,
            menu_index: 0,
            status_message: None,
            error_message: None,
            unlock_banner: 0,
            attempts: AttemptRecord::default(),
        }
    }

    /// Currently selected menu entry
    pub fn selected_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_index.min(MenuItem::ALL.len() - 1)]
    }

    /// Whether the lock screen is on top
    pub fn is_locked(&self) -> bool {
        matches!(self.modal, Some(Modal::Lock(_)))
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.error_message = None;
    }

    /// Set an error message
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status_message = None;
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }

    /// Passcode entry continuing from the recorded failures
    pub fn passcode_entry(&self, expected: Zeroizing<String>) -> LockScreen {
        LockScreen::resume(expected, LockoutPolicy::default(), &self.attempts)
    }

    /// Advance per-tick state
    pub fn on_tick(&mut self) {
        self.unlock_banner = self.unlock_banner.saturating_sub(1);
    }
}

impl Presenter for AppState {
    fn presented(&self) -> Option<ModalKind> {
        self.modal.as_ref().map(Modal::kind)
    }

    fn dismiss(&mut self, transition: Transition) {
        if self.modal.take().is_some() && transition == Transition::Animated {
            self.unlock_banner = UNLOCK_BANNER_TICKS;
        }
    }

    fn present_lock_screen(&mut self, expected: Zeroizing<String>) -> Result<(), PresentError> {
        // The home screen is always there to present on
        self.modal = Some(Modal::Lock(self.passcode_entry(expected)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presenter_reports_modal_kind() {
        let mut state = AppState::new();
        assert_eq!(state.presented(), None);

        state.modal = Some(Modal::Help);
        assert_eq!(state.presented(), Some(ModalKind::Other));

        state
            .present_lock_screen(Zeroizing::new("1234".to_string()))
            .unwrap();
        assert_eq!(state.presented(), Some(ModalKind::LockScreen));
        assert!(state.is_locked());
    }

    #[test]
    fn test_animated_dismiss_shows_banner() {
        let mut state = AppState::new();
        state
            .present_lock_screen(Zeroizing::new("1234".to_string()))
            .unwrap();

        state.dismiss(Transition::Animated);
        assert!(state.modal.is_none());
        assert_eq!(state.unlock_banner, UNLOCK_BANNER_TICKS);

        state.on_tick();
        assert_eq!(state.unlock_banner, UNLOCK_BANNER_TICKS - 1);
    }

    #[test]
    fn test_immediate_dismiss_has_no_banner() {
        let mut state = AppState::new();
        state.modal = Some(Modal::Help);
        state.dismiss(Transition::Immediate);
        assert!(state.modal.is_none());
        assert_eq!(state.unlock_banner, 0);

        // Nothing to dismiss
        state.dismiss(Transition::Animated);
        assert_eq!(state.unlock_banner, 0);
    }

    #[test]
    fn test_lock_screen_resumes_recorded_lockout() {
        let mut state = AppState::new();
        state.attempts = AttemptRecord::capture(5, Some(std::time::Duration::from_secs(30)));
        state
            .present_lock_screen(Zeroizing::new("1234".to_string()))
            .unwrap();

        let Some(Modal::Lock(lock)) = &state.modal else {
            panic!("lock screen not presented");
        };
        assert_eq!(lock.failed_attempts(), 5);
        assert!(lock.lockout_remaining().is_some());
    }

    #[test]
    fn test_verification_is_not_the_lock_screen() {
        let mut state = AppState::new();
        state.modal = Some(Modal::Verify(Verification {
            screen: state.passcode_entry(Zeroizing::new("1234".to_string())),
            action: ProtectedAction::RemovePasscode,
        }));
        assert_eq!(state.presented(), Some(ModalKind::Other));
        assert!(!state.is_locked());
    }

    #[test]
    fn test_messages_replace_each_other() {
        let mut state = AppState::new();
        state.set_error("bad");
        state.set_status("good");
        assert_eq!(state.status_message.as_deref(), Some("good"));
        assert!(state.error_message.is_none());
    }
}
