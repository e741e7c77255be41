//! UCI command parsing.

use std::time::Duration;

use cozy_chess::util::parse_uci_move;
use cozy_chess::Board;
use tracing::warn;

use crate::error::UciError;

/// Parameters of the `go` command. All optional; a bare `go` searches to
/// the default depth cap with no clock.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// White's remaining clock.
    pub wtime: Option<Duration>,
    /// Black's remaining clock.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Fixed search depth.
    pub depth: Option<u8>,
    /// Exact time to spend on this move.
    pub movetime: Option<Duration>,
}

/// One parsed line of UCI input.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- forget the previous game.
    UciNewGame,
    /// `position` -- a board plus the Zobrist hashes of every position on
    /// the way to it (start included), for the repetition rule.
    Position {
        /// The resulting position.
        board: Board,
        /// Hash of each position from the start through `board`.
        history: Vec<u64>,
    },
    /// `go` -- start searching.
    Go(GoParams),
    /// `quit` -- exit.
    Quit,
    /// Anything unrecognized (ignored, per UCI).
    Unknown(String),
}

/// Parse one line into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first() {
        None => Ok(Command::Unknown(String::new())),
        Some(&"uci") => Ok(Command::Uci),
        Some(&"isready") => Ok(Command::IsReady),
        Some(&"ucinewgame") => Ok(Command::UciNewGame),
        Some(&"quit") => Ok(Command::Quit),
        Some(&"position") => parse_position(&tokens[1..]),
        Some(&"go") => parse_go(&tokens[1..]),
        Some(other) => Ok(Command::Unknown(other.to_string())),
    }
}

/// Parse `position startpos|fen <6 fields> [moves m1 m2 ...]`.
///
/// Moves are applied left to right. The first token that is not a legal
/// move stops the walk: the position stays at the last successful move,
/// and the rejected token is logged. UCI leaves this case undefined.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (board, rest) = match tokens.first() {
        Some(&"startpos") => (Board::default(), &tokens[1..]),
        Some(&"fen") => {
            // A FEN spans exactly six whitespace-separated fields.
            if tokens.len() < 7 {
                return Err(UciError::InvalidFen {
                    fen: tokens[1..].join(" "),
                });
            }
            let fen = tokens[1..7].join(" ");
            let board = fen
                .parse::<Board>()
                .map_err(|_| UciError::InvalidFen { fen })?;
            (board, &tokens[7..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    let mut board = board;
    let mut history = vec![board.hash()];
    if rest.first() == Some(&"moves") {
        for token in &rest[1..] {
            match parse_uci_move(&board, token) {
                Ok(mv) if board.is_legal(mv) => {
                    board.play(mv);
                    history.push(board.hash());
                }
                _ => {
                    warn!(uci_move = %token, "illegal move in position command; keeping prefix");
                    break;
                }
            }
        }
    }

    Ok(Command::Position { board, history })
}

/// Parse `go` arguments: depth, wtime, btime, winc, binc, movetime.
/// Unknown tokens are skipped, per UCI convention.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "winc" => {
                params.winc = Some(parse_millis(tokens.get(i + 1), "winc")?);
                i += 2;
            }
            "binc" => {
                params.binc = Some(parse_millis(tokens.get(i + 1), "binc")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// Parse a millisecond count following a `go` parameter.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    let ms: u64 = value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })?;
    Ok(Duration::from_millis(ms))
}

/// Parse an integer following a `go` parameter.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
