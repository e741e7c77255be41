//! UCI protocol errors.

/// Errors raised while handling UCI input. Per protocol convention the
/// engine logs these and keeps reading; none of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command named neither `startpos` nor `fen`.
    #[error("malformed position command: expected startpos or fen")]
    MalformedPosition,

    /// A FEN string failed to parse.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The offending FEN text.
        fen: String,
    },

    /// A `go` parameter appeared without its value.
    #[error("missing value for go parameter: {param}")]
    MissingGoValue {
        /// The parameter name (e.g. "wtime").
        param: String,
    },

    /// A `go` parameter value did not parse.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue {
        /// The parameter name.
        param: String,
        /// The value text that failed to parse.
        value: String,
    },

    /// Reading stdin failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying error.
        #[from]
        source: std::io::Error,
    },
}
