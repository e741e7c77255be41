//! Cooperative time control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides when a search must stop.
///
/// The abort flag is sticky: once raised it stays raised for the rest of
/// the `search` call, and every later consultation returns immediately
/// without touching the clock. The clock itself is only inspected every
/// 2048 nodes, since wall-clock reads cost far more than the flag check
/// that guards them.
pub struct SearchControl {
    start: Instant,
    budget: Option<Duration>,
    aborted: AtomicBool,
}

impl SearchControl {
    /// No time limit; the search runs until its depth cap.
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
            aborted: AtomicBool::new(false),
        }
    }

    /// Stop once `budget` has elapsed. The clock starts now.
    pub fn timed(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
            aborted: AtomicBool::new(false),
        }
    }

    /// Whether the search must stop, re-checking the clock only when
    /// `nodes` crosses a 2048 boundary.
    pub fn should_abort(&self, nodes: u64) -> bool {
        if self.aborted.load(Ordering::Relaxed) {
            return true;
        }
        let budget = match self.budget {
            Some(budget) => budget,
            None => return false,
        };
        if nodes & 2047 != 0 {
            return false;
        }
        if self.start.elapsed() >= budget {
            self.aborted.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Whether the abort flag has been raised, without consulting the
    /// clock.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    /// Time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::SearchControl;

    #[test]
    fn unbounded_never_aborts() {
        let control = SearchControl::unbounded();
        assert!(!control.should_abort(0));
        assert!(!control.should_abort(2048));
        assert!(!control.is_aborted());
    }

    #[test]
    fn zero_budget_aborts_at_the_first_clock_check() {
        let control = SearchControl::timed(Duration::ZERO);
        assert!(control.should_abort(0));
        assert!(control.is_aborted());
    }

    #[test]
    fn clock_checks_are_throttled() {
        let control = SearchControl::timed(Duration::ZERO);
        // Off-boundary node counts never reach the clock.
        assert!(!control.should_abort(1));
        assert!(!control.should_abort(2047));
        assert!(!control.is_aborted());
    }

    #[test]
    fn abort_is_sticky() {
        let control = SearchControl::timed(Duration::ZERO);
        assert!(control.should_abort(4096));
        // Once raised, even off-boundary consultations see it.
        assert!(control.should_abort(1));
        assert!(control.should_abort(12345));
    }

    #[test]
    fn generous_budget_does_not_abort_immediately() {
        let control = SearchControl::timed(Duration::from_secs(3600));
        assert!(!control.should_abort(2048));
    }
}
