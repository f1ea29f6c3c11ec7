//! FEN-to-board parser.
//!
//! Parses the per-board layout field used inside position notation blocks:
//! ranks listed top to bottom separated by `/`, digit runs for empty
//! squares, piece letters with case encoding the side, and a trailing `*`
//! marking a piece that has not moved yet (kings, rooks, pawns and brawns
//! keep castling / double-step rights that way).

use crate::chess_errors::ChessErrors;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{Piece, PieceKind};

/// Parse one board layout into a `width × height` board.
pub fn parse_board_fen(fen: &str, width: u8, height: u8) -> Result<Board, ChessErrors> {
    let bad = |reason: String| ChessErrors::InvalidBoardFen {
        fen: fen.to_owned(),
        reason,
    };

    let ranks: Vec<&str> = fen.split('/').collect();
    if ranks.len() != height as usize {
        return Err(bad(format!(
            "expected {} ranks, found {}",
            height,
            ranks.len()
        )));
    }

    let mut board = Board::empty(width, height);
    for (row, rank_text) in ranks.iter().enumerate() {
        // FEN rows run from the top of the board down.
        let rank = height as i8 - 1 - row as i8;
        let mut file: i8 = 0;
        let mut chars = rank_text.chars().peekable();

        while let Some(c) = chars.next() {
            if let Some(run) = c.to_digit(10) {
                if run == 0 {
                    return Err(bad(format!("zero-length blank run in rank {}", rank_text)));
                }
                file += run as i8;
                continue;
            }

            let (kind, side) = PieceKind::from_letter(c)
                .ok_or_else(|| bad(format!("unknown piece letter '{}'", c)))?;
            let unmoved = chars.peek() == Some(&'*');
            if unmoved {
                chars.next();
                if !kind.tracks_unmoved() {
                    return Err(bad(format!("'*' marker after '{}'", c)));
                }
            }

            if file >= width as i8 {
                return Err(bad(format!("rank \"{}\" overflows {} files", rank_text, width)));
            }
            let piece = if unmoved {
                Piece::unmoved(kind, side)
            } else {
                Piece::new(kind, side)
            };
            board.set_piece(file, rank, Some(piece));
            file += 1;
        }

        if file != width as i8 {
            return Err(bad(format!(
                "rank \"{}\" covers {} files, expected {}",
                rank_text, file, width
            )));
        }
    }

    Ok(board)
}
