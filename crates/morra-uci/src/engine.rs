//! The UCI session loop.

use std::io::{self, BufRead};

use cozy_chess::util::display_uci_move;
use cozy_chess::Board;
use tracing::{info, warn};

use morra_engine::{budget_from_go, SearchStats, Searcher};

use crate::command::{parse_command, Command, GoParams};
use crate::error::UciError;

/// Depth cap used when `go` names no depth; the clock is expected to end
/// the search long before this.
const DEFAULT_DEPTH: u8 = 100;

/// The engine session: current position, its game history, and the
/// searcher with its transposition table.
///
/// Commands are handled synchronously: `go` blocks until `bestmove` is
/// printed, which is the whole protocol surface a single-threaded search
/// needs.
pub struct UciEngine {
    board: Board,
    history: Vec<u64>,
    searcher: Searcher,
}

impl UciEngine {
    /// A fresh session at the starting position.
    pub fn new() -> Self {
        let board = Board::default();
        let history = vec![board.hash()];
        Self {
            board,
            history,
            searcher: Searcher::new(),
        }
    }

    /// Read stdin line by line until `quit` or end of input.
    pub fn run(mut self) -> Result<(), UciError> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_command(line) {
                Ok(Command::Uci) => self.handle_uci(),
                Ok(Command::IsReady) => println!("readyok"),
                Ok(Command::UciNewGame) => self.handle_ucinewgame(),
                Ok(Command::Position { board, history }) => {
                    self.board = board;
                    self.history = history;
                }
                Ok(Command::Go(params)) => self.handle_go(&params),
                Ok(Command::Quit) => break,
                Ok(Command::Unknown(_)) => {}
                Err(e) => warn!(error = %e, "ignoring UCI line"),
            }
        }
        info!("morra shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name morra");
        println!("id author the morra authors");
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.searcher.clear_tt();
        self.board = Board::default();
        self.history = vec![self.board.hash()];
    }

    fn handle_go(&mut self, params: &GoParams) {
        let control = budget_from_go(
            params.wtime,
            params.btime,
            params.winc,
            params.binc,
            params.movetime,
            self.board.side_to_move(),
        );
        let max_depth = params.depth.unwrap_or(DEFAULT_DEPTH);

        let board = self.board.clone();
        let result = self.searcher.search(
            &board,
            &self.history,
            max_depth,
            &control,
            |depth, score, best, stats| {
                print_info(&board, depth, score, best, stats, &control);
            },
        );

        match result.best_move {
            Some(mv) => println!("bestmove {}", display_uci_move(&self.board, mv)),
            None => println!("bestmove 0000"),
        }
    }
}

/// Emit one `info` line for a completed iteration, with the diagnostic
/// counters appended after the standard fields.
fn print_info(
    board: &Board,
    depth: u8,
    score: i32,
    best: Option<cozy_chess::Move>,
    stats: &SearchStats,
    control: &morra_engine::SearchControl,
) {
    let elapsed = control.elapsed().as_millis().max(1) as u64;
    let nps = stats.nodes * 1000 / elapsed;
    let pv = best
        .map(|mv| format!(" pv {}", display_uci_move(board, mv)))
        .unwrap_or_default();

    println!(
        "info depth {depth} score cp {score} nodes {nodes} time {elapsed} nps {nps}{pv} \
         tthits {tt_hits} ttrate {tt_rate} ttcutoffs {tt_cutoffs} abcutoffs {ab_cutoffs} \
         qsnodes {qs_nodes} qspct {qs_pct}",
        nodes = stats.nodes,
        tt_hits = stats.tt_hits,
        tt_rate = stats.tt_hit_percent(),
        tt_cutoffs = stats.tt_cutoffs,
        ab_cutoffs = stats.ab_cutoffs,
        qs_nodes = stats.qs_nodes,
        qs_pct = stats.qs_percent(),
    );
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}
