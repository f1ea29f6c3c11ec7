//! Plain-text rendering of boards and whole multiverses, for the replay
//! binary, logs and test failure output.

use crate::game_state::board::Board;
use crate::game_state::multiverse::Multiverse;
use crate::moves::coordinate::file_char;

/// Render one board as a rank-by-rank grid with file/rank labels.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..board.height() {
        let rank = board.height() as i8 - 1 - row as i8;
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..board.width() as i8 {
            match board.piece(file, rank) {
                Some(piece) => out.push(piece.letter()),
                None => out.push('.'),
            }
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str("  ");
    for file in 0..board.width() as i8 {
        out.push(file_char(file));
        out.push(' ');
    }
    out.push('\n');
    out
}

/// Render every board of the multiverse with its coordinates, present
/// first.
pub fn render_multiverse(m: &Multiverse) -> String {
    let (turn, side) = m.present();
    let mut out = format!("Present: T{}{}\n", turn, side.letter());
    for (timeline, board_turn, board_side, board) in m.boards() {
        out.push_str(&format!(
            "L{}T{}{}\n",
            timeline,
            board_turn,
            board_side.letter()
        ));
        out.push_str(&render_board(board));
    }
    out
}
