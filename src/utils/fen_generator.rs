//! Board-to-FEN serializer, the inverse of `fen_parser`.

use crate::game_state::board::Board;

/// Serialize a board into the layout field used by position notation
/// blocks. Parsing the result reproduces the board exactly, unmoved
/// markers included.
pub fn generate_board_fen(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..board.height() {
        let rank = board.height() as i8 - 1 - row as i8;
        if row > 0 {
            out.push('/');
        }
        let mut blanks = 0u8;
        for file in 0..board.width() as i8 {
            match board.piece(file, rank) {
                None => blanks += 1,
                Some(piece) => {
                    if blanks > 0 {
                        out.push((b'0' + blanks) as char);
                        blanks = 0;
                    }
                    out.push(piece.letter());
                    if !piece.moved && piece.kind.tracks_unmoved() {
                        out.push('*');
                    }
                }
            }
        }
        if blanks > 0 {
            out.push((b'0' + blanks) as char);
        }
    }
    out
}
