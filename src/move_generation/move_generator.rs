//! Pseudolegal destination generation.
//!
//! `raw_destinations` enumerates every cell the piece at `origin` can reach
//! by its movement pattern, across all four axes: sliders step their unit
//! delta repeatedly and stop at the first occupied cell (a capture if
//! hostile), leapers test each delta once. A step only lands where a board
//! of the given parity actually exists, which keeps generation finite
//! however many timelines the game has grown.
//!
//! The `parity` argument names the board sheet the move traverses — for a
//! piece moved by its owner that is simply the owner's side, while the
//! check scanner also walks threats of pieces standing on the opponent's
//! boards. Friend/foe relations always follow the piece's own side.
//!
//! Pawns are handled from their own tables: straight advances need empty
//! cells, double steps additionally need an unmoved pawn and an empty
//! intermediate cell, captures need a hostile piece, and en passant is
//! resolved by looking at the previous board of the same timeline. Castling
//! is generated for unmoved kings by walking toward an unmoved rook with
//! board-local attack tests on the crossed squares.
//!
//! Legality filtering (self-check) is layered on top by
//! `legal_move_checks`; nothing here mutates state.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Piece, PieceKind, Side};
use crate::game_state::multiverse::Multiverse;
use crate::moves::coordinate::Coord;
use crate::moves::piece_patterns::{movement_pattern, pawn_tables};

/// Every pseudolegal destination for the piece at `origin` on the `parity`
/// sheet. Returns an empty set when the origin cell is empty.
pub fn raw_destinations(m: &Multiverse, origin: Coord, parity: Side) -> Vec<Coord> {
    let piece = match m.piece_at(origin, parity) {
        Some(piece) => piece,
        None => return Vec::new(),
    };

    let mut out = Vec::new();
    if piece.kind.is_pawn_like() {
        pawn_destinations(m, origin, piece, parity, &mut out);
    } else {
        let pattern = movement_pattern(piece.kind)
            .expect("non-pawn kinds always have a movement pattern");
        for &delta in &pattern.deltas {
            if pattern.slides {
                slide(m, origin, delta, piece, parity, &mut out);
            } else {
                leap(m, origin, delta, piece, parity, &mut out);
            }
        }
        if piece.kind == PieceKind::King && !piece.moved {
            castling_destinations(m, origin, piece, parity, &mut out);
        }
    }
    out
}

fn leap(
    m: &Multiverse,
    origin: Coord,
    delta: Coord,
    piece: Piece,
    parity: Side,
    out: &mut Vec<Coord>,
) {
    let dest = origin + delta;
    if !m.inbound(dest, parity) {
        return;
    }
    match m.piece_at(dest, parity) {
        None => out.push(dest),
        Some(target) if target.side != piece.side => out.push(dest),
        Some(_) => {}
    }
}

fn slide(
    m: &Multiverse,
    origin: Coord,
    delta: Coord,
    piece: Piece,
    parity: Side,
    out: &mut Vec<Coord>,
) {
    let mut cur = origin + delta;
    while m.inbound(cur, parity) {
        match m.piece_at(cur, parity) {
            None => {
                out.push(cur);
                cur += delta;
            }
            Some(target) => {
                if target.side != piece.side {
                    out.push(cur);
                }
                break;
            }
        }
    }
}

fn pawn_destinations(
    m: &Multiverse,
    origin: Coord,
    piece: Piece,
    parity: Side,
    out: &mut Vec<Coord>,
) {
    let tables = pawn_tables(piece.side);

    for &delta in &tables.advances {
        let dest = origin + delta;
        if m.inbound(dest, parity) && m.piece_at(dest, parity).is_none() {
            out.push(dest);
        }
    }

    if !piece.moved {
        for &delta in &tables.double_advances {
            let half = Coord::new(
                delta.file / 2,
                delta.rank / 2,
                delta.turn / 2,
                delta.timeline / 2,
            );
            let mid = origin + half;
            let dest = origin + delta;
            if m.inbound(mid, parity)
                && m.piece_at(mid, parity).is_none()
                && m.inbound(dest, parity)
                && m.piece_at(dest, parity).is_none()
            {
                out.push(dest);
            }
        }
    }

    for &delta in &tables.captures {
        let dest = origin + delta;
        if !m.inbound(dest, parity) {
            continue;
        }
        match m.piece_at(dest, parity) {
            Some(target) if target.side != piece.side => out.push(dest),
            Some(_) => {}
            None => {
                if delta.is_physical() && en_passant_possible(m, origin, delta, piece, parity) {
                    out.push(dest);
                }
            }
        }
    }

    if piece.kind == PieceKind::Brawn {
        for &delta in &tables.brawn_captures {
            let dest = origin + delta;
            if let Some(target) = m.piece_at(dest, parity) {
                if target.side != piece.side {
                    out.push(dest);
                }
            }
        }
        for &delta in &tables.brawn_advances {
            let dest = origin + delta;
            if m.inbound(dest, parity) && m.piece_at(dest, parity).is_none() {
                out.push(dest);
            }
        }
    }
}

/// A diagonal pawn capture onto an empty cell is en passant when the
/// adjacent hostile pawn double-stepped on the previous board: one board
/// back it stood unmoved two ranks behind its current square, which was
/// empty then.
fn en_passant_possible(
    m: &Multiverse,
    origin: Coord,
    delta: Coord,
    piece: Piece,
    parity: Side,
) -> bool {
    let victim_square = Coord::new(
        origin.file + delta.file,
        origin.rank,
        origin.turn,
        origin.timeline,
    );
    let victim = match m.piece_at(victim_square, parity) {
        Some(other) if other.side != piece.side && other.kind.is_pawn_like() => other,
        _ => return false,
    };
    if !victim.moved {
        // An unmoved pawn cannot have just double-stepped.
        return false;
    }

    let prev = Coord::new(
        victim_square.file,
        victim_square.rank,
        origin.turn - 1,
        origin.timeline,
    );
    let start_rank = origin.rank + 2 * piece.side.forward();
    let prev_start = Coord::new(victim_square.file, start_rank, origin.turn - 1, origin.timeline);
    if !m.inbound(prev, parity) || !m.inbound(prev_start, parity) {
        return false;
    }
    if m.piece_at(prev, parity).is_some() {
        return false;
    }
    matches!(
        m.piece_at(prev_start, parity),
        Some(p) if p.side != piece.side && p.kind.is_pawn_like() && !p.moved
    )
}

/// Castling: the unmoved king walks two files toward an unmoved rook of its
/// side with only empty cells between them; neither the king's cell nor the
/// two cells it crosses may be attacked on its own board.
fn castling_destinations(
    m: &Multiverse,
    origin: Coord,
    piece: Piece,
    parity: Side,
    out: &mut Vec<Coord>,
) {
    let board = match m.board(origin.timeline, origin.turn, parity) {
        Some(board) => board,
        None => return,
    };
    if square_attacked_on_board(board, origin.file, origin.rank, piece.side.opposite()) {
        return;
    }

    for dx in [1i8, -1] {
        let dest_file = origin.file + 2 * dx;
        if !board.in_bounds(dest_file, origin.rank) {
            continue;
        }
        let mut step = 1i8;
        loop {
            let file = origin.file + step * dx;
            if !board.in_bounds(file, origin.rank) {
                break;
            }
            if step <= 2
                && square_attacked_on_board(board, file, origin.rank, piece.side.opposite())
            {
                break;
            }
            match board.piece(file, origin.rank) {
                Some(other)
                    if other.side == piece.side
                        && other.kind == PieceKind::Rook
                        && !other.moved =>
                {
                    out.push(Coord::new(dest_file, origin.rank, origin.turn, origin.timeline));
                    break;
                }
                Some(_) => break,
                None => step += 1,
            }
        }
    }
}

/// The cells a piece attacks staying on its own board. Pawn-like kinds
/// attack their physical capture diagonals only.
pub fn board_attacks(board: &Board, file: i8, rank: i8) -> Vec<(i8, i8)> {
    let piece = match board.piece(file, rank) {
        Some(piece) => piece,
        None => return Vec::new(),
    };
    let mut out = Vec::new();

    if piece.kind.is_pawn_like() {
        for &delta in &pawn_tables(piece.side).captures {
            if !delta.is_physical() {
                continue;
            }
            let (tf, tr) = (file + delta.file, rank + delta.rank);
            if board.in_bounds(tf, tr) {
                out.push((tf, tr));
            }
        }
        return out;
    }

    let pattern = movement_pattern(piece.kind)
        .expect("non-pawn kinds always have a movement pattern");
    for delta in pattern.deltas.iter().filter(|d| d.is_physical()) {
        let (mut tf, mut tr) = (file + delta.file, rank + delta.rank);
        loop {
            if !board.in_bounds(tf, tr) {
                break;
            }
            out.push((tf, tr));
            if !pattern.slides || board.piece(tf, tr).is_some() {
                break;
            }
            tf += delta.file;
            tr += delta.rank;
        }
    }
    out
}

/// True when any piece of `by` attacks the cell board-locally.
pub fn square_attacked_on_board(board: &Board, file: i8, rank: i8, by: Side) -> bool {
    board
        .pieces()
        .filter(|(_, _, piece)| piece.side == by)
        .any(|(pf, pr, _)| board_attacks(board, pf, pr).contains(&(file, rank)))
}
