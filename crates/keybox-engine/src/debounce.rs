//! Tap debouncing.
//!
//! A tag held near the reader is detected on every poll. The gate collapses
//! such a burst into one tap: only a read arriving at least one cooldown after
//! the last *accepted* read passes, and rejected reads never move the
//! baseline.

use std::time::{Duration, Instant};

use keybox_core::constants::DEBOUNCE_COOLDOWN_MS;

/// Cooldown-based debounce gate.
///
/// # Examples
///
/// ```
/// use keybox_engine::DebounceGate;
/// use std::time::{Duration, Instant};
///
/// let mut gate = DebounceGate::default();
/// let t0 = Instant::now();
///
/// assert!(gate.accept(t0));
/// assert!(!gate.accept(t0 + Duration::from_millis(300)));
/// assert!(gate.accept(t0 + Duration::from_millis(1000)));
/// ```
#[derive(Debug, Clone)]
pub struct DebounceGate {
    cooldown: Duration,

    /// `None` until the first accepted read, so that read always passes.
    last_accepted: Option<Instant>,
}

impl DebounceGate {
    /// Create a gate with the given cooldown.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// Decide whether a read at `now` starts a new tap.
    ///
    /// Returns `true` and records `now` as the new baseline iff at least one
    /// cooldown elapsed since the last accepted read. A `now` earlier than
    /// the baseline counts as inside the window.
    pub fn accept(&mut self, now: Instant) -> bool {
        let accepted = match self.last_accepted {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= self.cooldown),
        };

        if accepted {
            self.last_accepted = Some(now);
        }

        accepted
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    /// Forget the baseline so the next read is accepted.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_COOLDOWN_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_read_always_accepted() {
        let mut gate = DebounceGate::default();
        assert_eq!(gate.last_accepted(), None);
        assert!(gate.accept(Instant::now()));
    }

    #[test]
    fn test_default_cooldown_is_one_second() {
        assert_eq!(DebounceGate::default().cooldown(), ms(1000));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(300, false)]
    #[case(999, false)]
    #[case(1000, true)]
    #[case(1500, true)]
    fn test_second_read(#[case] offset_ms: u64, #[case] expected: bool) {
        let mut gate = DebounceGate::default();
        let t0 = Instant::now();
        gate.accept(t0);

        assert_eq!(gate.accept(t0 + ms(offset_ms)), expected);
    }

    #[test]
    fn test_rejected_read_does_not_move_baseline() {
        let mut gate = DebounceGate::default();
        let t0 = Instant::now();

        assert!(gate.accept(t0));
        assert!(!gate.accept(t0 + ms(600)));
        assert!(!gate.accept(t0 + ms(900)));
        assert_eq!(gate.last_accepted(), Some(t0));

        // Measured from t0, not from the last rejected read
        assert!(gate.accept(t0 + ms(1000)));
        assert_eq!(gate.last_accepted(), Some(t0 + ms(1000)));
    }

    #[test]
    fn test_read_before_baseline_rejected() {
        let mut gate = DebounceGate::default();
        let t0 = Instant::now() + ms(5000);

        assert!(gate.accept(t0));
        assert!(!gate.accept(t0 - ms(2000)));
        assert_eq!(gate.last_accepted(), Some(t0));
    }

    #[test]
    fn test_reset_clears_baseline() {
        let mut gate = DebounceGate::default();
        let t0 = Instant::now();

        assert!(gate.accept(t0));
        gate.reset();
        assert_eq!(gate.last_accepted(), None);
        assert!(gate.accept(t0 + ms(10)));
    }

    #[test]
    fn test_zero_cooldown_accepts_everything() {
        let mut gate = DebounceGate::new(Duration::ZERO);
        let t0 = Instant::now();

        assert!(gate.accept(t0));
        assert!(gate.accept(t0));
        assert!(gate.accept(t0 + ms(1)));
    }
}
