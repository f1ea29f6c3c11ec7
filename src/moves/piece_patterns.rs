//! Declarative movement tables.
//!
//! Every non-pawn kind moves by a set of unit displacement vectors over the
//! four axes (file, rank, turn, timeline) plus a flag saying whether the
//! pattern repeats (sliders) or is tested once (leapers). The tables are
//! data: adding a new kind means adding a table entry, not a new branch in
//! the generator. Pawns and brawns keep their own advance/capture tables per
//! side because their moves are asymmetric and capture-dependent.
//!
//! Axis counts follow the geometry: orthogonal steps touch one axis,
//! diagonal two, triagonal three, quadragonal four; knights leap two on one
//! axis and one on another.

use std::sync::OnceLock;

use crate::game_state::chess_types::{PieceKind, Side};
use crate::moves::coordinate::Coord;

/// A movement pattern: unit steps plus whether they repeat.
#[derive(Debug, Clone)]
pub struct MovementPattern {
    pub deltas: Vec<Coord>,
    pub slides: bool,
}

/// Advance/capture tables for pawn-like kinds, one instance per side.
#[derive(Debug, Clone)]
pub struct PawnTables {
    /// Non-capturing single steps.
    pub advances: Vec<Coord>,
    /// Non-capturing double steps, legal only for unmoved pawns with an
    /// empty intermediate cell.
    pub double_advances: Vec<Coord>,
    /// Capturing steps (also the squares pawns attack).
    pub captures: Vec<Coord>,
    /// Extra capturing steps available to brawns only.
    pub brawn_captures: Vec<Coord>,
    /// Extra non-capturing steps available to brawns only.
    pub brawn_advances: Vec<Coord>,
}

struct PatternTables {
    rook: MovementPattern,
    bishop: MovementPattern,
    unicorn: MovementPattern,
    dragon: MovementPattern,
    princess: MovementPattern,
    queen: MovementPattern,
    king: MovementPattern,
    knight: MovementPattern,
}

static TABLES: OnceLock<PatternTables> = OnceLock::new();
static PAWNS: OnceLock<[PawnTables; 2]> = OnceLock::new();

/// All displacement vectors with components in `{-1, 0, 1}` touching exactly
/// `axes` axes.
fn units_with_axes(axes: usize) -> Vec<Coord> {
    let mut out = Vec::new();
    for code in 0..81u32 {
        let mut rest = code;
        let mut comps = [0i32; 4];
        for comp in comps.iter_mut() {
            *comp = (rest % 3) as i32 - 1;
            rest /= 3;
        }
        if comps.iter().filter(|v| **v != 0).count() == axes {
            out.push(Coord::new(
                comps[0] as i8,
                comps[1] as i8,
                comps[2],
                comps[3],
            ));
        }
    }
    out
}

/// All 2:1 leaps over ordered pairs of distinct axes.
fn knight_leaps() -> Vec<Coord> {
    let mut out = Vec::new();
    for long_axis in 0..4 {
        for short_axis in 0..4 {
            if long_axis == short_axis {
                continue;
            }
            for long_sign in [2i32, -2] {
                for short_sign in [1i32, -1] {
                    let mut comps = [0i32; 4];
                    comps[long_axis] = long_sign;
                    comps[short_axis] = short_sign;
                    out.push(Coord::new(
                        comps[0] as i8,
                        comps[1] as i8,
                        comps[2],
                        comps[3],
                    ));
                }
            }
        }
    }
    out
}

fn concat(parts: &[&[Coord]]) -> Vec<Coord> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

fn build_tables() -> PatternTables {
    let orthogonal = units_with_axes(1);
    let diagonal = units_with_axes(2);
    let triagonal = units_with_axes(3);
    let quadragonal = units_with_axes(4);
    let all_units = concat(&[&orthogonal, &diagonal, &triagonal, &quadragonal]);

    PatternTables {
        rook: MovementPattern {
            deltas: orthogonal.clone(),
            slides: true,
        },
        bishop: MovementPattern {
            deltas: diagonal.clone(),
            slides: true,
        },
        unicorn: MovementPattern {
            deltas: triagonal,
            slides: true,
        },
        dragon: MovementPattern {
            deltas: quadragonal,
            slides: true,
        },
        princess: MovementPattern {
            deltas: concat(&[&orthogonal, &diagonal]),
            slides: true,
        },
        queen: MovementPattern {
            deltas: all_units.clone(),
            slides: true,
        },
        king: MovementPattern {
            deltas: all_units,
            slides: false,
        },
        knight: MovementPattern {
            deltas: knight_leaps(),
            slides: false,
        },
    }
}

fn build_pawn_tables() -> [PawnTables; 2] {
    // White pawns advance along +rank and toward -timeline; black mirrors
    // both. The turn component of captures is symmetric for both sides.
    let white = PawnTables {
        advances: vec![Coord::new(0, 1, 0, 0), Coord::new(0, 0, 0, -1)],
        double_advances: vec![Coord::new(0, 2, 0, 0), Coord::new(0, 0, 0, -2)],
        captures: vec![
            Coord::new(1, 1, 0, 0),
            Coord::new(-1, 1, 0, 0),
            Coord::new(0, 0, 1, -1),
            Coord::new(0, 0, -1, -1),
        ],
        brawn_captures: vec![
            Coord::new(0, 1, 0, -1),
            Coord::new(1, 0, 0, -1),
            Coord::new(-1, 0, 0, -1),
        ],
        brawn_advances: vec![Coord::new(0, 1, -1, 0)],
    };
    let black = PawnTables {
        advances: vec![Coord::new(0, -1, 0, 0), Coord::new(0, 0, 0, 1)],
        double_advances: vec![Coord::new(0, -2, 0, 0), Coord::new(0, 0, 0, 2)],
        captures: vec![
            Coord::new(1, -1, 0, 0),
            Coord::new(-1, -1, 0, 0),
            Coord::new(0, 0, 1, 1),
            Coord::new(0, 0, -1, 1),
        ],
        brawn_captures: vec![
            Coord::new(0, -1, 0, 1),
            Coord::new(1, 0, 0, 1),
            Coord::new(-1, 0, 0, 1),
        ],
        brawn_advances: vec![Coord::new(0, -1, -1, 0)],
    };
    [white, black]
}

/// The movement pattern for a kind, or `None` for pawn-like kinds which use
/// [`pawn_tables`] instead.
pub fn movement_pattern(kind: PieceKind) -> Option<&'static MovementPattern> {
    let tables = TABLES.get_or_init(build_tables);
    match kind {
        PieceKind::Rook => Some(&tables.rook),
        PieceKind::Bishop => Some(&tables.bishop),
        PieceKind::Unicorn => Some(&tables.unicorn),
        PieceKind::Dragon => Some(&tables.dragon),
        PieceKind::Princess => Some(&tables.princess),
        PieceKind::Queen | PieceKind::RoyalQueen => Some(&tables.queen),
        PieceKind::King | PieceKind::CommonKing => Some(&tables.king),
        PieceKind::Knight => Some(&tables.knight),
        PieceKind::Pawn | PieceKind::Brawn => None,
    }
}

/// The pawn/brawn tables for one side.
pub fn pawn_tables(side: Side) -> &'static PawnTables {
    &PAWNS.get_or_init(build_pawn_tables)[side.index()]
}
