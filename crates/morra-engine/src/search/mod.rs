//! Iterative-deepening search driver.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use cozy_chess::{Board, Move};
use tracing::debug;

use crate::moves::legal_moves;
use control::SearchControl;
use heuristics::{HistoryTable, KillerTable};
use negamax::{negamax, SearchContext, MATE, MAX_PLY};
use tt::TranspositionTable;

/// Half-width of the aspiration window around the previous iteration's
/// score.
const ASPIRATION_WINDOW: i32 = 50;

/// Default transposition table size in megabytes.
const DEFAULT_TT_MB: usize = 32;

/// Node counters for one top-level search.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    /// Nodes visited, quiescence included.
    pub nodes: u64,
    /// Quiescence nodes alone.
    pub qs_nodes: u64,
    /// Transposition table probes that found the position.
    pub tt_hits: u64,
    /// Probes that found nothing, or a colliding fingerprint.
    pub tt_misses: u64,
    /// Nodes answered from the table without searching a move.
    pub tt_cutoffs: u64,
    /// Beta cutoffs in the main move loop.
    pub ab_cutoffs: u64,
}

impl SearchStats {
    /// Table hit rate as a whole percentage.
    pub fn tt_hit_percent(&self) -> u64 {
        let probes = self.tt_hits + self.tt_misses;
        if probes == 0 {
            0
        } else {
            self.tt_hits * 100 / probes
        }
    }

    /// Share of nodes spent in quiescence, as a whole percentage.
    pub fn qs_percent(&self) -> u64 {
        if self.nodes == 0 {
            0
        } else {
            self.qs_nodes * 100 / self.nodes
        }
    }
}

/// Result of one top-level search.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    /// Best move of the deepest completed iteration; `None` only when the
    /// root has no legal move.
    pub best_move: Option<Move>,
    /// Score of the deepest completed iteration, side-to-move relative.
    pub score: i32,
    /// Deepest completed iteration.
    pub depth: u8,
    /// Counters accumulated over all iterations.
    pub stats: SearchStats,
}

/// Iterative-deepening searcher owning the transposition table.
///
/// The table persists across searches and is only emptied by
/// [`clear_tt`](Searcher::clear_tt), on `ucinewgame`. Killers, history,
/// and counters are rebuilt at every [`search`](Searcher::search).
pub struct Searcher {
    tt: TranspositionTable,
}

impl Searcher {
    /// A searcher with the default 32 MB table.
    pub fn new() -> Self {
        Self {
            tt: TranspositionTable::new(DEFAULT_TT_MB),
        }
    }

    /// Empty the transposition table.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Search `board` up to `max_depth`, subject to `control`'s budget.
    ///
    /// `history` holds the Zobrist hashes of the game so far (start
    /// position through the current one) and feeds the repetition rule.
    /// `on_iter(depth, score, best_move, stats)` runs after every
    /// completed iteration so the caller can emit `info` lines; aborted
    /// iterations are discarded and do not reach the callback.
    pub fn search<F>(
        &mut self,
        board: &Board,
        history: &[u64],
        max_depth: u8,
        control: &SearchControl,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(u8, i32, Option<Move>, &SearchStats),
    {
        let max_depth = max_depth.clamp(1, (MAX_PLY - 1) as u8);

        let mut path = history.to_vec();
        if path.last() != Some(&board.hash()) {
            path.push(board.hash());
        }

        let mut ctx = SearchContext {
            tt: &mut self.tt,
            control,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            stats: SearchStats::default(),
            path,
        };

        let mut completed_move = None;
        let mut completed_score = 0;
        let mut completed_depth = 0;
        let mut prev_score = 0;

        for depth in 1..=max_depth {
            if control.is_aborted() {
                break;
            }

            let aspirated = depth >= 2 && prev_score != 0;
            let (alpha, beta) = if aspirated {
                (prev_score - ASPIRATION_WINDOW, prev_score + ASPIRATION_WINDOW)
            } else {
                (-MATE, MATE)
            };

            let mut score = negamax(board, depth, 0, alpha, beta, &mut ctx);
            if aspirated && !control.is_aborted() && (score <= alpha || score >= beta) {
                // The window missed; one full-width re-search settles it.
                score = negamax(board, depth, 0, -MATE, MATE, &mut ctx);
            }

            // An aborted iteration is discarded wholesale; the previous
            // iteration's move stands.
            if control.is_aborted() {
                break;
            }

            prev_score = score;
            completed_score = score;
            completed_depth = depth;
            if let Some(entry) = ctx.tt.probe(board.hash(), 0) {
                if entry.best_move.is_some() {
                    completed_move = entry.best_move;
                }
            }
            on_iter(depth, score, completed_move, &ctx.stats);
        }

        let stats = ctx.stats;
        // Nothing completed (instant abort, or a root-level draw that never
        // stored an entry): any legal move beats standing mute.
        let best_move = completed_move.or_else(|| legal_moves(board).first().copied());

        debug!(
            depth = completed_depth,
            score = completed_score,
            nodes = stats.nodes,
            "search finished"
        );

        SearchResult {
            best_move,
            score: completed_score,
            depth: completed_depth,
            stats,
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher").field("tt", &self.tt).finish()
    }
}

#[cfg(test)]
mod tests {
    use cozy_chess::Board;

    use super::negamax::MATE_THRESHOLD;
    use super::*;

    fn search_depth(searcher: &mut Searcher, board: &Board, depth: u8) -> SearchResult {
        let control = SearchControl::unbounded();
        searcher.search(board, &[board.hash()], depth, &control, |_, _, _, _| {})
    }

    #[test]
    fn depth_1_returns_a_legal_move() {
        let board = Board::default();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 1);
        let mv = result.best_move.unwrap();
        assert!(board.is_legal(mv));
    }

    #[test]
    fn finds_mate_in_one() {
        // Scholar's mate: Qh5xf7, covered by the c4 bishop.
        let board = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse::<Board>()
            .unwrap();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 2);
        assert_eq!(result.best_move.unwrap().to_string(), "h5f7");
        assert!(result.score > MATE_THRESHOLD, "score {}", result.score);
    }

    #[test]
    fn mate_in_one_scores_exactly_mate_minus_one() {
        let board = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".parse::<Board>().unwrap();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 4);
        assert_eq!(result.best_move.unwrap().to_string(), "a1a8");
        assert_eq!(result.score, MATE - 1);
    }

    #[test]
    fn mated_position_scores_deeply_negative() {
        // Black to move, already lost next move whatever happens.
        let board = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1".parse::<Board>().unwrap();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 1);
        assert!(result.score < -MATE_THRESHOLD, "score {}", result.score);
    }

    #[test]
    fn stalemate_scores_zero_with_no_move() {
        let board = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse::<Board>().unwrap();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 3);
        assert_eq!(result.score, 0);
        assert!(result.best_move.is_none());
    }

    #[test]
    fn iterative_deepening_reports_every_depth() {
        let board = Board::default();
        let mut searcher = Searcher::new();
        let control = SearchControl::unbounded();
        let mut depths = Vec::new();
        searcher.search(&board, &[board.hash()], 4, &control, |d, _, _, _| {
            depths.push(d);
        });
        assert_eq!(depths, vec![1, 2, 3, 4]);
    }

    #[test]
    fn callback_always_carries_a_move() {
        let board = Board::default();
        let mut searcher = Searcher::new();
        let control = SearchControl::unbounded();
        searcher.search(&board, &[board.hash()], 4, &control, |_, _, best, _| {
            assert!(best.is_some());
        });
    }

    #[test]
    fn aspiration_survives_mate_scores() {
        let board = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse::<Board>()
            .unwrap();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 5);
        assert_eq!(result.best_move.unwrap().to_string(), "h5f7");
        assert!(result.score > MATE_THRESHOLD);
    }

    #[test]
    fn warm_table_second_search_agrees() {
        let board = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse::<Board>()
            .unwrap();
        let mut searcher = Searcher::new();
        let cold = search_depth(&mut searcher, &board, 4);
        let warm = search_depth(&mut searcher, &board, 4);
        assert_eq!(cold.best_move, warm.best_move);
        assert!(warm.score > MATE_THRESHOLD);
    }

    #[test]
    fn zero_budget_stops_early_with_a_legal_move() {
        let board = Board::default();
        let mut searcher = Searcher::new();
        let control = SearchControl::timed(std::time::Duration::ZERO);
        let result = searcher.search(&board, &[board.hash()], 50, &control, |_, _, _, _| {});
        // The clock is only sampled every 2048 nodes, so a shallow
        // iteration may finish first; depth 50 must never be reached.
        assert!(result.depth < 6, "reached depth {}", result.depth);
        let mv = result.best_move.unwrap();
        assert!(board.is_legal(mv));
    }

    #[test]
    fn threefold_shuffle_scores_zero() {
        let mut board = Board::default();
        let mut history = vec![board.hash()];
        for uci in [
            "e2e4", "e7e5", "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
        ] {
            let mv = cozy_chess::util::parse_uci_move(&board, uci).unwrap();
            board.play(mv);
            history.push(board.hash());
        }
        let mut searcher = Searcher::new();
        let control = SearchControl::unbounded();
        let result = searcher.search(&board, &history, 3, &control, |_, _, _, _| {});
        assert_eq!(result.score, 0);
        // The fallback still produces something playable.
        assert!(result.best_move.is_some());
    }

    #[test]
    fn null_move_pruning_keeps_the_mate() {
        let board = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".parse::<Board>().unwrap();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 5);
        assert_eq!(result.best_move.unwrap().to_string(), "a1a8");
    }

    #[test]
    fn statistics_accumulate() {
        let board = Board::default();
        let mut searcher = Searcher::new();
        let result = search_depth(&mut searcher, &board, 4);
        assert!(result.stats.nodes > 0);
        assert!(result.stats.qs_nodes > 0);
        assert!(result.stats.qs_nodes <= result.stats.nodes);
        assert!(result.stats.qs_percent() <= 100);
    }
}
