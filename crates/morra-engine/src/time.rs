//! Time management: turning UCI clock parameters into a search budget.

use std::time::Duration;

use cozy_chess::Color;

use crate::search::control::SearchControl;

/// Shortest budget ever allocated from a running clock.
const MIN_BUDGET_MS: u64 = 100;

/// Longest budget ever allocated from a running clock.
const MAX_BUDGET_MS: u64 = 10_000;

/// Fraction of the remaining clock spent per move.
const CLOCK_FRACTION: u64 = 30;

/// Build a [`SearchControl`] from `go` parameters.
///
/// Priority order:
/// 1. `movetime`: spend exactly that long.
/// 2. A running clock for the side to move: spend one
///    [`CLOCK_FRACTION`]th of it plus the increment, clamped to
///    `[100 ms, 10 s]`.
/// 3. Neither: unbounded; only the depth cap ends the search.
pub fn budget_from_go(
    wtime: Option<Duration>,
    btime: Option<Duration>,
    winc: Option<Duration>,
    binc: Option<Duration>,
    movetime: Option<Duration>,
    side: Color,
) -> SearchControl {
    if let Some(movetime) = movetime {
        return SearchControl::timed(movetime);
    }

    let (remaining, increment) = match side {
        Color::White => (wtime, winc),
        Color::Black => (btime, binc),
    };

    match remaining {
        Some(remaining) => {
            let increment = increment.unwrap_or(Duration::ZERO);
            let budget = (remaining.as_millis() as u64 / CLOCK_FRACTION
                + increment.as_millis() as u64)
                .clamp(MIN_BUDGET_MS, MAX_BUDGET_MS);
            SearchControl::timed(Duration::from_millis(budget))
        }
        None => SearchControl::unbounded(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cozy_chess::Color;

    use super::budget_from_go;

    #[test]
    fn movetime_is_exact_and_wins_over_the_clock() {
        let control = budget_from_go(
            Some(Duration::from_secs(300)),
            Some(Duration::from_secs(300)),
            None,
            None,
            Some(Duration::from_millis(200)),
            Color::White,
        );
        // A 200 ms budget has not elapsed yet.
        assert!(!control.should_abort(0));
        std::thread::sleep(Duration::from_millis(250));
        assert!(control.should_abort(0));
    }

    #[test]
    fn clock_budget_uses_the_movers_time() {
        // White has 3 s, Black an hour; White to move gets 100 ms
        // (3000 / 30), the floor.
        let control = budget_from_go(
            Some(Duration::from_secs(3)),
            Some(Duration::from_secs(3600)),
            None,
            None,
            None,
            Color::White,
        );
        assert!(!control.should_abort(0));
        std::thread::sleep(Duration::from_millis(150));
        assert!(control.should_abort(0));
    }

    #[test]
    fn long_clocks_are_capped() {
        // 3600 s / 30 = 120 s, far past the 10 s ceiling: after a tenth of
        // a second the budget must still be running.
        let control = budget_from_go(
            None,
            Some(Duration::from_secs(3600)),
            None,
            Some(Duration::from_secs(60)),
            None,
            Color::Black,
        );
        assert!(!control.should_abort(0));
    }

    #[test]
    fn no_parameters_means_unbounded() {
        let control = budget_from_go(None, None, None, None, None, Color::White);
        assert!(!control.should_abort(0));
        assert!(!control.should_abort(1 << 20));
    }
}
