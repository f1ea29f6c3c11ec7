//! Board-level application of a validated travel move.
//!
//! Three shapes exist, decided purely by where the destination sits:
//!
//! - *physical*: origin and destination share a board; the timeline gets
//!   one new board with the piece moved (en passant, castling and
//!   promotion resolve here);
//! - *hop*: the destination board is the end of its timeline; the origin
//!   timeline gets a board with the piece removed and the destination
//!   timeline one with it placed;
//! - *branch*: the destination board lies in a timeline's past; the origin
//!   timeline gets a board with the piece removed, and a new timeline is
//!   spawned one ply after the destination board with the piece placed.
//!
//! Callers validate pseudolegality first; this module only turns a
//! validated move into appended boards and reports what it did so history
//! can reverse it.

use crate::chess_errors::ChessErrors;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{Piece, PieceKind, Side};
use crate::game_state::multiverse::{ply_of, Multiverse};
use crate::moves::coordinate::Coord;

/// What applying a travel move did to the multiverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Timelines that received one appended board each, in order.
    pub appended: Vec<i32>,
    /// The spawned timeline of a branching move.
    pub spawned: Option<i32>,
    /// The piece removed from the destination (or the en-passant victim).
    pub captured: Option<Piece>,
}

/// Apply a pseudolegal travel move. The multiverse is mutated; callers
/// wanting atomicity apply to a scratch clone and swap on success.
pub fn apply_travel(
    m: &mut Multiverse,
    origin: Coord,
    dest: Coord,
    mover: Side,
) -> Result<AppliedMove, ChessErrors> {
    let origin_board = m
        .board(origin.timeline, origin.turn, mover)
        .ok_or_else(|| internal("origin board missing", origin))?
        .clone();
    let piece = origin_board
        .piece(origin.file, origin.rank)
        .ok_or_else(|| internal("origin piece missing", origin))?;

    let delta = dest - origin;
    if delta.is_physical() {
        apply_physical(m, origin, dest, piece, &origin_board)
    } else if ply_of(dest.turn, mover) == m.end_ply(dest.timeline).unwrap_or(i32::MIN) {
        apply_hop(m, origin, dest, piece, &origin_board, mover)
    } else {
        apply_branch(m, origin, dest, piece, &origin_board, mover)
    }
}

fn internal(reason: &str, at: Coord) -> ChessErrors {
    ChessErrors::InternalInconsistency(format!("{} at {}", reason, at))
}

fn apply_physical(
    m: &mut Multiverse,
    origin: Coord,
    dest: Coord,
    piece: Piece,
    board: &Board,
) -> Result<AppliedMove, ChessErrors> {
    let mover = piece.side;
    let mut captured = board.piece(dest.file, dest.rank);
    let from = origin.square();
    let to = dest.square();

    let next = if piece.kind.is_pawn_like() && dest.file != origin.file && captured.is_none() {
        // En passant: the victim stands beside the origin, not on the
        // destination.
        captured = board.piece(dest.file, origin.rank);
        board
            .with_piece(dest.file, origin.rank, None)
            .with_move(from, to)
    } else if piece.kind == PieceKind::King && (dest.file - origin.file).abs() > 1 {
        let rook_from = if dest.file > origin.file {
            board.width() as i8 - 1
        } else {
            0
        };
        let rook_to = dest.file + if dest.file > origin.file { -1 } else { 1 };
        board
            .with_move((rook_from, origin.rank), (rook_to, origin.rank))
            .with_move(from, to)
    } else {
        board.with_move(from, to)
    };

    let next = if piece.kind.is_pawn_like() && dest.rank == board.promotion_rank(mover) {
        next.with_piece(dest.file, dest.rank, Some(Piece::new(PieceKind::Queen, mover)))
    } else {
        next
    };

    m.append_board(origin.timeline, next)?;
    Ok(AppliedMove {
        appended: vec![origin.timeline],
        spawned: None,
        captured,
    })
}

fn apply_hop(
    m: &mut Multiverse,
    origin: Coord,
    dest: Coord,
    piece: Piece,
    origin_board: &Board,
    mover: Side,
) -> Result<AppliedMove, ChessErrors> {
    let dest_board = m
        .board(dest.timeline, dest.turn, mover)
        .ok_or_else(|| internal("destination board missing", dest))?
        .clone();
    let captured = dest_board.piece(dest.file, dest.rank);

    let arriving = Piece::new(piece.kind, piece.side);
    let departed = origin_board.with_piece(origin.file, origin.rank, None);
    let arrived = dest_board.with_piece(dest.file, dest.rank, Some(arriving));

    m.append_board(origin.timeline, departed)?;
    m.append_board(dest.timeline, arrived)?;
    Ok(AppliedMove {
        appended: vec![origin.timeline, dest.timeline],
        spawned: None,
        captured,
    })
}

fn apply_branch(
    m: &mut Multiverse,
    origin: Coord,
    dest: Coord,
    piece: Piece,
    origin_board: &Board,
    mover: Side,
) -> Result<AppliedMove, ChessErrors> {
    let target_board = m
        .board(dest.timeline, dest.turn, mover)
        .ok_or_else(|| internal("branch target board missing", dest))?
        .clone();
    let captured = target_board.piece(dest.file, dest.rank);

    let arriving = Piece::new(piece.kind, piece.side);
    let departed = origin_board.with_piece(origin.file, origin.rank, None);
    let seeded = target_board.with_piece(dest.file, dest.rank, Some(arriving));

    m.append_board(origin.timeline, departed)?;
    let start_ply = ply_of(dest.turn, mover) + 1;
    let spawned = m.spawn_timeline(mover, start_ply, seeded, (dest.timeline, dest));
    Ok(AppliedMove {
        appended: vec![origin.timeline],
        spawned: Some(spawned),
        captured,
    })
}
