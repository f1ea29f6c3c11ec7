//! Crate root module declarations for the Quince Chess engine project.
//!
//! Quince Chess is the rules engine for a chess variant played across many
//! boards at once: every move extends a timeline with a fresh board, pieces
//! may travel between turns and timelines, and moves into the past spawn new
//! timelines. The crate exposes a session type ([`GameSession`]) owning one
//! multiverse of boards plus an undo/redo history, a move generator aware of
//! the four movement axes, check detection across all playable boards, and a
//! text notation for positions that round-trips through the parser.
//!
//! The engine is a pure in-process state machine: no I/O, no global state,
//! one writer per session. Display layers are expected to drive it through
//! the `GameSession` query/mutation surface.
//!
//! [`GameSession`]: game_state::game_session::GameSession

pub mod chess_errors;

pub mod game_state {
    pub mod board;
    pub mod chess_types;
    pub mod game_session;
    pub mod multiverse;
    pub mod undo_state;
}

pub mod moves {
    pub mod chess_move;
    pub mod coordinate;
    pub mod piece_patterns;
}

pub mod move_generation {
    pub mod completion_search;
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod move_generator;
}

pub mod utils {
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod notation_generator;
    pub mod notation_parser;
    pub mod render_game_state;
}
