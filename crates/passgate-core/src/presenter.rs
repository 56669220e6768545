//! Presentation surface for the lock screen

use zeroize::Zeroizing;

use crate::error::PresentError;

/// What kind of modal is currently on top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// The passcode lock screen
    LockScreen,
    /// Any other modal owned by the host
    Other,
}

/// How a modal should leave the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Remove without animation
    Immediate,
    /// Remove with the host's usual animation
    Animated,
}

/// Host-side screen management
///
/// The lock screen checks entered passcodes itself and reports a confirmed
/// match back through
/// [`UnlockSession::passcode_accepted`](crate::UnlockSession::passcode_accepted).
pub trait Presenter {
    /// Whether there is a surface to present the lock screen on
    ///
    /// Checked before anything on screen is touched.
    fn has_surface(&self) -> bool {
        true
    }

    /// Kind of the modal on top, if any
    fn presented(&self) -> Option<ModalKind>;

    /// Dismiss the modal on top. Does nothing if none is presented.
    fn dismiss(&mut self, transition: Transition);

    /// Present the lock screen expecting `expected`
    fn present_lock_screen(&mut self, expected: Zeroizing<String>) -> Result<(), PresentError>;
}
