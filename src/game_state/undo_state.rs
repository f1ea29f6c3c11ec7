//! Single undo record for the session history.
//!
//! Because boards are append-only, reversing a move never edits a board: it
//! pops the boards the move appended, drops the timeline it spawned (if
//! any) and restores the present/player/status scalars. The entry keeps the
//! move itself so redo can replay it through the deterministic application
//! path.

use crate::game_state::chess_types::{MatchStatus, Side};
use crate::moves::chess_move::ChessMove;

/// Everything needed to reverse one applied move exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    /// Timelines that each received one appended board, in application
    /// order.
    pub appended: Vec<i32>,
    /// The timeline a branching move spawned.
    pub spawned: Option<i32>,
    pub prev_present_turn: i32,
    pub prev_player: Side,
    pub prev_status: MatchStatus,
}

/// One applied move plus its reversal data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: ChessMove,
    pub reversal: Reversal,
}
