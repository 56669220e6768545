//! Lock screen and passcode setup for the terminal host

mod attempts;
mod lock_screen;
mod lockout;
mod setup;

pub use attempts::{AttemptError, AttemptFile, AttemptRecord, ATTEMPTS_FILE_NAME};
pub use lock_screen::{EntryResult, LockScreen};
pub use lockout::LockoutPolicy;
pub use setup::{validate_passcode, PasscodeSetup, SetupProgress, SetupStep};

/// Minimum passcode length
pub const MIN_PASSCODE_LENGTH: usize = 4;
/// Maximum passcode length
pub const MAX_PASSCODE_LENGTH: usize = 12;

/// Passcode entry errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasscodeError {
    #[error("Passcode must be {0}-{1} digits")]
    InvalidLength(usize, usize),

    #[error("Passcode must contain only digits")]
    InvalidFormat,

    #[error("Passcodes do not match")]
    Mismatch,
}
