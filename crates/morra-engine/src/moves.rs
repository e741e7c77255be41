//! Move generation wrappers and move classification.
//!
//! The board library encodes castling as king-takes-rook, and en passant
//! lands on an empty square, so neither "destination occupied" nor the raw
//! move value alone classifies a move. These helpers answer the questions
//! the search needs, always against the position *before* the move is
//! played.

use cozy_chess::{Board, Move, Piece, Rank, Square};

/// All legal moves, in generation order.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    board.generate_moves(|batch| {
        moves.extend(batch);
        false
    });
    moves
}

/// Legal captures only, including en passant.
pub fn capture_moves(board: &Board) -> Vec<Move> {
    let enemy = board.colors(!board.side_to_move());
    let mut moves = Vec::with_capacity(16);
    board.generate_moves(|mut batch| {
        let mut targets = enemy;
        if batch.piece == Piece::Pawn {
            if let Some(file) = board.en_passant() {
                let to = Square::new(file, Rank::Sixth.relative_to(board.side_to_move()));
                targets |= to.bitboard();
            }
        }
        batch.to &= targets;
        moves.extend(batch);
        false
    });
    moves
}

/// Whether `mv` is an en passant capture: a pawn moving diagonally onto an
/// empty square.
pub fn is_en_passant(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::Pawn)
        && mv.from.file() != mv.to.file()
        && board.piece_on(mv.to).is_none()
}

/// Whether `mv` captures anything. Castling never does; the king's
/// destination square holds its own rook.
pub fn is_capture(board: &Board, mv: Move) -> bool {
    board.colors(!board.side_to_move()).has(mv.to) || is_en_passant(board, mv)
}

/// Whether `mv` is quiet: neither a capture nor a promotion.
pub fn is_quiet(board: &Board, mv: Move) -> bool {
    !is_capture(board, mv) && mv.promotion.is_none()
}

/// The piece kind removed by `mv`, if any. En passant reports a pawn even
/// though the destination square is empty.
pub fn victim(board: &Board, mv: Move) -> Option<Piece> {
    if is_en_passant(board, mv) {
        Some(Piece::Pawn)
    } else if board.colors(!board.side_to_move()).has(mv.to) {
        board.piece_on(mv.to)
    } else {
        None
    }
}

/// Whether the side to move still has a piece other than pawns and king.
/// Null-move pruning is unsound without one (zugzwang).
pub fn has_non_pawn_material(board: &Board) -> bool {
    let side = board.colors(board.side_to_move());
    let heavy = side & !(board.pieces(Piece::Pawn) | board.pieces(Piece::King));
    !heavy.is_empty()
}
