//! Two-step passcode creation

use zeroize::Zeroizing;

use super::{PasscodeError, MAX_PASSCODE_LENGTH, MIN_PASSCODE_LENGTH};

/// Which entry the user is typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// First entry
    Create,
    /// Repeat of the first entry
    Confirm,
}

/// Result of submitting an entry
#[derive(Debug)]
pub enum SetupProgress {
    /// First entry accepted, waiting for confirmation
    NeedsConfirmation,
    /// Both entries match
    Complete(Zeroizing<String>),
    /// The entry was refused; the flow restarts from the reported step
    Invalid(PasscodeError),
}

/// Check that a passcode is 4-12 ASCII digits
pub fn validate_passcode(passcode: &str) -> Result<(), PasscodeError> {
    if passcode.len() < MIN_PASSCODE_LENGTH || passcode.len() > MAX_PASSCODE_LENGTH {
        return Err(PasscodeError::InvalidLength(
            MIN_PASSCODE_LENGTH,
            MAX_PASSCODE_LENGTH,
        ));
    }
    if !passcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(PasscodeError::InvalidFormat);
    }
    Ok(())
}

/// Passcode setup state
pub struct PasscodeSetup {
    step: SetupStep,
    first: Zeroizing<String>,
    input: Zeroizing<String>,
    error: Option<String>,
}

impl Default for PasscodeSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl PasscodeSetup {
    pub fn new() -> Self {
        Self {
            step: SetupStep::Create,
            first: Zeroizing::new(String::new()),
            input: Zeroizing::new(String::new()),
            error: None,
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn push_digit(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() || self.input.len() >= MAX_PASSCODE_LENGTH {
            return false;
        }
        self.input.push(c);
        true
    }

    pub fn pop_digit(&mut self) {
        self.input.pop();
    }

    /// Submit the current entry
    pub fn submit(&mut self) -> SetupProgress {
        let entry = std::mem::replace(&mut self.input, Zeroizing::new(String::new()));

        match self.step {
            SetupStep::Create => {
                if let Err(e) = validate_passcode(&entry) {
                    self.error = Some(e.to_string());
                    return SetupProgress::Invalid(e);
                }
                self.first = entry;
                self.step = SetupStep::Confirm;
                self.error = None;
                SetupProgress::NeedsConfirmation
            }
            SetupStep::Confirm => {
                if *entry != *self.first {
                    self.reset();
                    let e = PasscodeError::Mismatch;
                    self.error = Some(e.to_string());
                    return SetupProgress::Invalid(e);
                }
                SetupProgress::Complete(entry)
            }
        }
    }

    /// Step back. Returns false when already at the first step.
    pub fn back(&mut self) -> bool {
        match self.step {
            SetupStep::Create => false,
            SetupStep::Confirm => {
                self.reset();
                true
            }
        }
    }

    /// Start over showing `message`, e.g. when the passcode could not be stored
    pub fn fail(&mut self, message: impl Into<String>) {
        self.reset();
        self.error = Some(message.into());
    }

    fn reset(&mut self) {
        self.step = SetupStep::Create;
        self.first = Zeroizing::new(String::new());
        self.input = Zeroizing::new(String::new());
    }
}
