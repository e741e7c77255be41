//! Tapered material and piece-square evaluation.

pub mod phase;
pub mod pst;
pub mod score;

use cozy_chess::{BitBoard, Board, Color, GameStatus, Piece};

use crate::eval::phase::{game_phase, MAX_PHASE};
use crate::eval::pst::{material, pst_value};
use crate::eval::score::Score;
use crate::search::negamax::MATE;

/// Bonus for having the move, in centipawns.
const TEMPO: i32 = 10;

/// Static evaluation in centipawns, White-positive.
///
/// Terminal positions are scored here: checkmate becomes a mate score
/// shifted by `ply` so that shorter mates dominate longer ones, and every
/// drawn position (stalemate, fifty-move rule, insufficient material)
/// scores zero. Repetition draws are the search's responsibility, since a
/// pure function of one position cannot see the game history.
///
/// Non-terminal positions get the PeSTO sum: material plus piece-square
/// bonus per piece, White minus Black, interpolated between the middlegame
/// and endgame tables by [`game_phase`], plus a tempo bonus for the side
/// to move.
pub fn evaluate(board: &Board, ply: u8) -> i32 {
    match board.status() {
        GameStatus::Won => match board.side_to_move() {
            Color::White => -MATE + i32::from(ply),
            Color::Black => MATE - i32::from(ply),
        },
        GameStatus::Drawn => 0,
        GameStatus::Ongoing => {
            if insufficient_material(board) {
                return 0;
            }

            let mut total = Score::ZERO;
            for &piece in &Piece::ALL {
                for sq in board.colored_pieces(Color::White, piece) {
                    total += material(piece) + pst_value(piece, Color::White, sq);
                }
                for sq in board.colored_pieces(Color::Black, piece) {
                    total -= material(piece) + pst_value(piece, Color::Black, sq);
                }
            }

            let phase = game_phase(board);
            let mg = i32::from(total.mg());
            let eg = i32::from(total.eg());
            let tapered = (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE;

            let tempo = match board.side_to_move() {
                Color::White => TEMPO,
                Color::Black => -TEMPO,
            };
            tapered + tempo
        }
    }
}

/// Whether neither side retains mating material.
///
/// Covers bare kings, king and one minor piece against a bare king, and a
/// single bishop per side when both run on the same square color.
pub fn insufficient_material(board: &Board) -> bool {
    const DARK_SQUARES: BitBoard = BitBoard(0xAA55_AA55_AA55_AA55);

    match board.occupied().len() {
        2 => true,
        3 => !(board.pieces(Piece::Knight) | board.pieces(Piece::Bishop)).is_empty(),
        4 => {
            let bishops = board.pieces(Piece::Bishop);
            let dark = (bishops & DARK_SQUARES).len();
            bishops.len() == 2
                && board.colored_pieces(Color::White, Piece::Bishop).len() == 1
                && (dark == 0 || dark == 2)
        }
        _ => false,
    }
}
