//! Biometric prompt capability
//!
//! A prompt answers two questions: can biometrics be used right now, and did
//! the user pass the challenge. How the hardware is reached is up to the
//! implementation.

mod command;

pub use command::CommandPrompt;

use async_trait::async_trait;

/// Result of a biometric challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricOutcome {
    /// The user was recognised
    Success,
    /// The user was not recognised
    Failed,
    /// The user dismissed the prompt
    Cancelled,
    /// No biometric hardware or enrolment was available
    Unavailable,
}

impl BiometricOutcome {
    /// Check if the challenge succeeded
    pub fn is_success(self) -> bool {
        self == BiometricOutcome::Success
    }
}

/// Platform biometric authentication
#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    /// Whether a challenge can be shown right now
    fn can_evaluate(&self) -> bool;

    /// Show a challenge with the given justification and wait for the user
    async fn evaluate(&self, reason: &str) -> BiometricOutcome;
}

/// Prompt for hosts without any biometric support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

#[async_trait]
impl BiometricPrompt for NoBiometrics {
    fn can_evaluate(&self) -> bool {
        false
    }

    async fn evaluate(&self, _reason: &str) -> BiometricOutcome {
        BiometricOutcome::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_biometrics_is_unavailable() {
        let prompt = NoBiometrics;
        assert!(!prompt.can_evaluate());
        assert_eq!(prompt.evaluate("unlock").await, BiometricOutcome::Unavailable);
    }
}
