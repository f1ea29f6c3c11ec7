//! Errors used throughout the multiversal chess engine.
//!
//! This module defines the canonical error type returned by game
//! construction, parsing utilities and the coordinate-taking query surface.
//! The enum `ChessErrors` is used as the single error type across the crate
//! to simplify propagation and matching. Each variant carries contextual
//! information where appropriate to aid diagnostics.
//!
//! Usage guidelines:
//! - Construction and parsing return `Result<_, ChessErrors>`; a failed
//!   parse never leaves a partially built session behind.
//! - Expected game-flow rejections (an illegal move, a refused submit, an
//!   undo with nothing to undo) are *not* errors: the mutating calls on
//!   `GameSession` report them as `false` so callers can loop.
//! - `OutOfBounds` marks a caller bug (a coordinate outside the configured
//!   board dimensions) and is meant to fail loudly rather than be recovered.

use std::error::Error;
use std::fmt;
use std::fmt::Display;

use crate::moves::coordinate::Coord;

/// Unified error type for the multiversal chess engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessErrors {
    /// A block of the position notation could not be understood.
    ///
    /// Payload: the offending block text and a human-readable reason.
    MalformedPositionSpec { block: String, reason: String },

    /// A single-board FEN field failed to parse.
    ///
    /// Payload: the FEN text and a human-readable reason.
    InvalidBoardFen { fen: String, reason: String },

    /// The side letter of a board block was not one of `w`/`b` (any case).
    UnknownSideLetter(char),

    /// The position notation contained no board blocks at all.
    MissingBoards,

    /// A timeline was missing boards between the first and last recorded
    /// turn, or the timeline indices left a gap in the multiverse.
    NonContiguousTimeline(i32),

    /// The `Size` metadata tag did not describe a supported board geometry.
    ///
    /// Payload: the raw tag value.
    InvalidBoardSize(String),

    /// A move token in the replay section of a position could not be parsed.
    InvalidMoveNotation(String),

    /// A move in the replay section of a position was rejected by the engine.
    IllegalReplayMove(String),

    /// A coordinate was outside the configured board dimensions.
    ///
    /// This is a programmer error on the calling side, not a game-rule
    /// rejection.
    OutOfBounds(Coord),

    /// The multiverse no longer satisfies its own shape invariants.
    /// Encountering this variant indicates a bug in the engine itself.
    InternalInconsistency(String),
}

impl Display for ChessErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChessErrors::MalformedPositionSpec { block, reason } => {
                write!(f, "Malformed position block [{}]: {}", block, reason)
            }
            ChessErrors::InvalidBoardFen { fen, reason } => {
                write!(f, "Invalid board FEN \"{}\": {}", fen, reason)
            }
            ChessErrors::UnknownSideLetter(c) => {
                write!(f, "Unknown side letter '{}', expected 'w' or 'b'", c)
            }
            ChessErrors::MissingBoards => {
                write!(f, "Position notation contains no board blocks")
            }
            ChessErrors::NonContiguousTimeline(l) => {
                write!(f, "Timeline {} is missing boards or leaves a gap", l)
            }
            ChessErrors::InvalidBoardSize(raw) => {
                write!(f, "Unsupported board size \"{}\"", raw)
            }
            ChessErrors::InvalidMoveNotation(token) => {
                write!(f, "Cannot parse move token \"{}\"", token)
            }
            ChessErrors::IllegalReplayMove(token) => {
                write!(f, "Replayed move \"{}\" was rejected", token)
            }
            ChessErrors::OutOfBounds(coord) => {
                write!(f, "Coordinate {} is outside the board", coord)
            }
            ChessErrors::InternalInconsistency(context) => {
                write!(f, "Internal inconsistency (please report as bug): {}", context)
            }
        }
    }
}

impl Error for ChessErrors {}
