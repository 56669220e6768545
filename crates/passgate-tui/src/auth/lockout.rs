//! Brute-force protection for the lock screen through progressive lockout

use std::time::Duration;

/// Lockout policy for wrong passcode entries
#[derive(Clone, Debug)]
pub struct LockoutPolicy {
    /// `(min_failed_attempts, lockout_duration)`, ascending by attempts
    thresholds: Vec<(u32, Duration)>,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            thresholds: vec![
                // Attempts 1-4: No lockout
                (5, Duration::from_secs(30)),
                (7, Duration::from_secs(5 * 60)),
                (9, Duration::from_secs(30 * 60)),
                (10, Duration::from_secs(60 * 60)),
            ],
        }
    }
}

impl LockoutPolicy {
    /// Custom thresholds, sorted by attempt count
    pub fn custom(mut thresholds: Vec<(u32, Duration)>) -> Self {
        thresholds.sort_by_key(|(min, _)| *min);
        Self { thresholds }
    }

    /// Never lock out
    pub fn disabled() -> Self {
        Self {
            thresholds: Vec::new(),
        }
    }

    /// Lockout duration after `failed_attempts` consecutive failures
    pub fn lockout_duration(&self, failed_attempts: u32) -> Option<Duration> {
        self.thresholds
            .iter()
            .rev()
            .find(|(min, _)| failed_attempts >= *min)
            .map(|(_, duration)| *duration)
    }

    /// Attempts left before the first lockout kicks in
    pub fn attempts_before_lockout(&self, failed_attempts: u32) -> Option<u32> {
        self.thresholds
            .first()
            .map(|(min, _)| min.saturating_sub(failed_attempts))
    }

    /// Human-readable lockout length
    pub fn describe(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{} seconds", secs)
        } else if secs < 3600 {
            format!("{} minutes", secs / 60)
        } else {
            format!("{} hours", secs / 3600)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, None)]
    #[case(4, None)]
    #[case(5, Some(30))]
    #[case(6, Some(30))]
    #[case(7, Some(300))]
    #[case(9, Some(1800))]
    #[case(10, Some(3600))]
    #[case(100, Some(3600))]
    fn test_default_policy(#[case] failed: u32, #[case] secs: Option<u64>) {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.lockout_duration(failed), secs.map(Duration::from_secs));
    }

    #[test]
    fn test_attempts_before_lockout() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.attempts_before_lockout(0), Some(5));
        assert_eq!(policy.attempts_before_lockout(3), Some(2));
        assert_eq!(policy.attempts_before_lockout(8), Some(0));
        assert_eq!(LockoutPolicy::disabled().attempts_before_lockout(3), None);
    }

    #[test]
    fn test_custom_policy_is_sorted() {
        let policy = LockoutPolicy::custom(vec![
            (4, Duration::from_secs(60)),
            (2, Duration::from_secs(1)),
        ]);
        assert_eq!(policy.lockout_duration(1), None);
        assert_eq!(policy.lockout_duration(3), Some(Duration::from_secs(1)));
        assert_eq!(policy.lockout_duration(4), Some(Duration::from_secs(60)));
    }

    #[rstest]
    #[case(30, "30 seconds")]
    #[case(300, "5 minutes")]
    #[case(7200, "2 hours")]
    fn test_describe(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(LockoutPolicy::describe(Duration::from_secs(secs)), expected);
    }
}
