//! The lock screen collaborator
//!
//! Collects digits, compares them against the expected passcode in constant
//! time and applies the lockout policy. Only a confirmed match is reported
//! back to the unlock session; wrong entries stay inside this type.

use std::time::{Duration, Instant};

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::{AttemptRecord, LockoutPolicy, MAX_PASSCODE_LENGTH};

/// Result of submitting the current entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryResult {
    /// The entry matched
    Accepted,
    /// The entry did not match
    Rejected,
    /// Entry refused because of too many failures
    LockedOut(Duration),
    /// Nothing was entered
    Empty,
}

/// Passcode entry state
pub struct LockScreen {
    expected: Zeroizing<String>,
    input: Zeroizing<String>,
    failed_attempts: u32,
    policy: LockoutPolicy,
    locked_until: Option<Instant>,
    error: Option<String>,
}

impl LockScreen {
    /// Lock screen expecting `expected`, with the default lockout policy
    pub fn new(expected: Zeroizing<String>) -> Self {
        Self::with_policy(expected, LockoutPolicy::default())
    }

    /// Lock screen with a custom lockout policy
    pub fn with_policy(expected: Zeroizing<String>, policy: LockoutPolicy) -> Self {
        Self {
            expected,
            input: Zeroizing::new(String::new()),
            failed_attempts: 0,
            policy,
            locked_until: None,
            error: None,
        }
    }

    /// Lock screen continuing from a recorded failure count and lockout
    pub fn resume(
        expected: Zeroizing<String>,
        policy: LockoutPolicy,
        record: &AttemptRecord,
    ) -> Self {
        let mut screen = Self::with_policy(expected, policy);
        screen.failed_attempts = record.failed_attempts;
        if let Some(remaining) = record.lockout_remaining() {
            screen.locked_until = Some(Instant::now() + remaining);
            screen.error = Some(lockout_message(remaining));
        }
        screen
    }

    /// Failure count and lockout deadline to persist
    pub fn record(&self) -> AttemptRecord {
        AttemptRecord::capture(self.failed_attempts, self.lockout_remaining())
    }

    /// Append a digit. Returns false if it was refused.
    pub fn push_digit(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() || self.input.len() >= MAX_PASSCODE_LENGTH {
            return false;
        }
        if self.lockout_remaining().is_some() {
            return false;
        }
        self.input.push(c);
        self.error = None;
        true
    }

    /// Remove the last digit
    pub fn pop_digit(&mut self) {
        self.input.pop();
    }

    /// Number of digits entered so far
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Check the current entry and clear it
    pub fn submit(&mut self) -> EntryResult {
        if let Some(remaining) = self.lockout_remaining() {
            self.input.clear();
            return EntryResult::LockedOut(remaining);
        }
        if self.input.is_empty() {
            return EntryResult::Empty;
        }

        let matches: bool = self
            .input
            .as_bytes()
            .ct_eq(self.expected.as_bytes())
            .into();
        self.input.clear();

        if matches {
            self.failed_attempts = 0;
            self.error = None;
            return EntryResult::Accepted;
        }

        self.failed_attempts += 1;
        tracing::info!("Wrong passcode entered ({} failures)", self.failed_attempts);

        match self.policy.lockout_duration(self.failed_attempts) {
            Some(duration) => {
                self.locked_until = Some(Instant::now() + duration);
                self.error = Some(lockout_message(duration));
                EntryResult::LockedOut(duration)
            }
            None => {
                self.error = Some(match self.attempts_before_lockout() {
                    Some(left) if left <= 2 => {
                        format!("Wrong passcode ({} attempts before lockout)", left)
                    }
                    _ => "Wrong passcode".to_string(),
                });
                EntryResult::Rejected
            }
        }
    }

    /// Time left in the current lockout
    pub fn lockout_remaining(&self) -> Option<Duration> {
        self.locked_until
            .and_then(|until| until.checked_duration_since(Instant::now()))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Consecutive wrong entries
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Attempts left before the first lockout
    pub fn attempts_before_lockout(&self) -> Option<u32> {
        self.policy.attempts_before_lockout(self.failed_attempts)
    }

    /// Message for the last failed entry
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

fn lockout_message(remaining: Duration) -> String {
    format!(
        "Too many attempts. Try again in {}",
        LockoutPolicy::describe(remaining)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(expected: &str) -> LockScreen {
        LockScreen::new(Zeroizing::new(expected.to_string()))
    }

    fn resumed(expected: &str, record: &AttemptRecord) -> LockScreen {
        LockScreen::resume(
            Zeroizing::new(expected.to_string()),
            LockoutPolicy::default(),
            record,
        )
    }

    fn enter(screen: &mut LockScreen, digits: &str) -> EntryResult {
        for c in digits.chars() {
            screen.push_digit(c);
        }
        screen.submit()
    }

    #[test]
    fn test_correct_passcode() {
        let mut lock = screen("1234");
        assert_eq!(enter(&mut lock, "1234"), EntryResult::Accepted);
        assert!(lock.error().is_none());
    }

    #[test]
    fn test_wrong_passcode_then_correct() {
        let mut lock = screen("1234");
        assert_eq!(enter(&mut lock, "4321"), EntryResult::Rejected);
        assert_eq!(lock.error(), Some("Wrong passcode"));
        assert_eq!(lock.input_len(), 0);

        assert_eq!(enter(&mut lock, "1234"), EntryResult::Accepted);
        assert_eq!(lock.failed_attempts(), 0);
    }

    #[test]
    fn test_prefix_does_not_match() {
        let mut lock = screen("123456");
        assert_eq!(enter(&mut lock, "1234"), EntryResult::Rejected);
        assert_eq!(enter(&mut lock, "1234567"), EntryResult::Rejected);
    }

    #[test]
    fn test_empty_submit() {
        let mut lock = screen("1234");
        assert_eq!(lock.submit(), EntryResult::Empty);
        assert_eq!(lock.failed_attempts(), 0);
    }

    #[test]
    fn test_only_digits_up_to_max() {
        let mut lock = screen("1234");
        assert!(!lock.push_digit('a'));
        for _ in 0..MAX_PASSCODE_LENGTH {
            assert!(lock.push_digit('1'));
        }
        assert!(!lock.push_digit('1'));
        lock.pop_digit();
        assert_eq!(lock.input_len(), MAX_PASSCODE_LENGTH - 1);
    }

    #[test]
    fn test_lockout_refuses_entries() {
        let policy = LockoutPolicy::custom(vec![(2, Duration::from_secs(60))]);
        let mut lock = LockScreen::with_policy(Zeroizing::new("1234".to_string()), policy);

        assert_eq!(enter(&mut lock, "0000"), EntryResult::Rejected);
        assert!(matches!(enter(&mut lock, "0000"), EntryResult::LockedOut(_)));
        assert!(lock.lockout_remaining().is_some());

        // Even the right passcode is refused while locked out
        assert!(!lock.push_digit('1'));
        assert!(matches!(lock.submit(), EntryResult::LockedOut(_)));
    }

    #[test]
    fn test_lockout_expires() {
        let policy = LockoutPolicy::custom(vec![(1, Duration::from_millis(20))]);
        let mut lock = LockScreen::with_policy(Zeroizing::new("1234".to_string()), policy);

        assert!(matches!(enter(&mut lock, "9"), EntryResult::LockedOut(_)));
        std::thread::sleep(Duration::from_millis(40));

        assert!(lock.lockout_remaining().is_none());
        assert_eq!(enter(&mut lock, "1234"), EntryResult::Accepted);
    }

    #[test]
    fn test_warning_near_lockout() {
        let mut lock = screen("1234");
        for _ in 0..3 {
            enter(&mut lock, "0000");
        }
        assert_eq!(
            lock.error(),
            Some("Wrong passcode (2 attempts before lockout)")
        );
    }

    #[test]
    fn test_resume_keeps_lockout() {
        let mut lock = screen("1234");
        for _ in 0..5 {
            enter(&mut lock, "0000");
        }
        let record = lock.record();
        assert_eq!(record.failed_attempts, 5);
        assert!(record.locked_until.is_some());

        let mut relaunched = resumed("1234", &record);
        assert!(relaunched.lockout_remaining().is_some());
        assert_eq!(relaunched.failed_attempts(), 5);
        assert!(relaunched.error().unwrap().starts_with("Too many attempts"));
        assert!(!relaunched.push_digit('1'));
        assert!(matches!(relaunched.submit(), EntryResult::LockedOut(_)));
    }

    #[test]
    fn test_resume_after_lockout_escalates() {
        let record = AttemptRecord {
            failed_attempts: 5,
            locked_until: None,
        };
        let mut lock = resumed("1234", &record);
        assert!(lock.lockout_remaining().is_none());

        assert!(matches!(enter(&mut lock, "0000"), EntryResult::LockedOut(_)));
        assert_eq!(lock.failed_attempts(), 6);
    }

    #[test]
    fn test_acceptance_clears_record() {
        let record = AttemptRecord {
            failed_attempts: 3,
            locked_until: None,
        };
        let mut lock = resumed("1234", &record);
        assert_eq!(enter(&mut lock, "1234"), EntryResult::Accepted);
        assert_eq!(lock.record(), AttemptRecord::default());
    }
}
