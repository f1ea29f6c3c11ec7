//! The multiverse: every timeline of boards plus the bookkeeping that
//! decides which of them the present sits on.
//!
//! Timelines live in an arena indexed by the signed-to-unsigned interleave
//! of their timeline number (`0, -1, 1, -2, 2, ...`), so branch-spawned
//! timelines always claim a fresh slot and undo can drop them again without
//! touching neighbours. Boards are append-only runs inside each timeline;
//! plies encode `(turn, side)` pairs as `2 * turn + side`.
//!
//! The *activation* rule decides how far from the root timeline the present
//! reaches: a side only activates one timeline beyond the opponent's count,
//! so runaway branching cannot push the present into boards the opponent
//! never had a chance to answer. The exact boundary is a policy value
//! because variant rules draw it differently.

use std::collections::BTreeMap;

use crate::chess_errors::ChessErrors;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{Piece, Side};
use crate::moves::coordinate::Coord;

/// Arena slot for a signed timeline index: `0, -1, 1, -2, 2, ...`.
#[inline]
pub fn timeline_slot(timeline: i32) -> usize {
    if timeline >= 0 {
        timeline as usize * 2
    } else {
        (-timeline as usize) * 2 - 1
    }
}

/// Inverse of [`timeline_slot`].
#[inline]
pub fn slot_timeline(slot: usize) -> i32 {
    if slot % 2 == 0 {
        (slot / 2) as i32
    } else {
        -(((slot + 1) / 2) as i32)
    }
}

/// Ply index of a `(turn, side)` pair.
#[inline]
pub fn ply_of(turn: i32, side: Side) -> i32 {
    turn * 2 + side.index() as i32
}

/// Split a ply back into its `(turn, side)` pair.
#[inline]
pub fn ply_parts(ply: i32) -> (i32, Side) {
    let side = if ply % 2 == 0 { Side::White } else { Side::Black };
    (ply.div_euclid(2), side)
}

/// How many timelines per side may activate (count toward the present).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPolicy {
    /// One timeline beyond the smaller side's count may activate; the rest
    /// stay inactive until the opponent branches too.
    Balanced,
    /// Like `Balanced`, but never more than the given count per side.
    Capped(i32),
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        ActivationPolicy::Balanced
    }
}

/// One append-only run of boards sharing a timeline index.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    start_ply: i32,
    boards: Vec<Board>,
    /// For branch-spawned timelines: the parent timeline and the threatened
    /// coordinate the branch grew from.
    ancestry: Option<(i32, Coord)>,
}

impl Timeline {
    pub fn new(start_ply: i32, board: Board, ancestry: Option<(i32, Coord)>) -> Self {
        Self {
            start_ply,
            boards: vec![board],
            ancestry,
        }
    }

    #[inline]
    pub fn start_ply(&self) -> i32 {
        self.start_ply
    }

    #[inline]
    pub fn end_ply(&self) -> i32 {
        self.start_ply + self.boards.len() as i32 - 1
    }

    #[inline]
    pub fn ancestry(&self) -> Option<(i32, Coord)> {
        self.ancestry
    }

    #[inline]
    pub fn board_at(&self, ply: i32) -> Option<&Board> {
        if ply < self.start_ply {
            return None;
        }
        self.boards.get((ply - self.start_ply) as usize)
    }

    /// The board at the end of the run.
    #[inline]
    pub fn latest(&self) -> &Board {
        // A timeline is never empty by construction.
        &self.boards[self.boards.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

/// A board record as read from the position notation.
#[derive(Debug, Clone)]
pub struct BoardRecord {
    pub timeline: i32,
    pub turn: i32,
    pub side: Side,
    pub board: Board,
}

/// The full collection of timelines.
#[derive(Debug, Clone, PartialEq)]
pub struct Multiverse {
    timelines: Vec<Option<Timeline>>,
    l_min: i32,
    l_max: i32,
    width: u8,
    height: u8,
    metadata: BTreeMap<String, String>,
    policy: ActivationPolicy,
}

impl Multiverse {
    /// Assemble a multiverse from parsed board records. Validates the shape
    /// the way game creation demands: at least one board, timeline indices
    /// contiguous around 0, every timeline a gap-free run of plies, and no
    /// two records naming the same board.
    pub fn assemble(
        records: Vec<BoardRecord>,
        width: u8,
        height: u8,
        metadata: BTreeMap<String, String>,
        policy: ActivationPolicy,
    ) -> Result<Self, ChessErrors> {
        if records.is_empty() {
            return Err(ChessErrors::MissingBoards);
        }

        let mut per_timeline: BTreeMap<i32, Vec<(i32, Board)>> = BTreeMap::new();
        for record in records {
            if record.turn < 0 {
                return Err(ChessErrors::MalformedPositionSpec {
                    block: format!("{}:{}", record.timeline, record.turn),
                    reason: "negative turns are not supported".to_owned(),
                });
            }
            let ply = ply_of(record.turn, record.side);
            per_timeline
                .entry(record.timeline)
                .or_default()
                .push((ply, record.board));
        }

        let l_min = (*per_timeline.keys().next().expect("records not empty")).min(0);
        let l_max = (*per_timeline.keys().next_back().expect("records not empty")).max(0);

        let mut timelines: Vec<Option<Timeline>> = Vec::new();
        for l in l_min..=l_max {
            let runs = per_timeline
                .remove(&l)
                .ok_or(ChessErrors::NonContiguousTimeline(l))?;
            let mut runs = runs;
            runs.sort_by_key(|(ply, _)| *ply);
            let start_ply = runs[0].0;
            let mut boards = Vec::with_capacity(runs.len());
            for (offset, (ply, board)) in runs.into_iter().enumerate() {
                if ply != start_ply + offset as i32 {
                    return Err(ChessErrors::NonContiguousTimeline(l));
                }
                boards.push(board);
            }
            let slot = timeline_slot(l);
            if timelines.len() <= slot {
                timelines.resize(slot + 1, None);
            }
            timelines[slot] = Some(Timeline {
                start_ply,
                boards,
                ancestry: None,
            });
        }

        Ok(Self {
            timelines,
            l_min,
            l_max,
            width,
            height,
            metadata,
            policy,
        })
    }

    // --- Shape queries ---

    #[inline]
    pub fn board_size(&self) -> (u8, u8) {
        (self.width, self.height)
    }

    #[inline]
    pub fn timelines_range(&self) -> (i32, i32) {
        (self.l_min, self.l_max)
    }

    #[inline]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    #[inline]
    pub fn policy(&self) -> ActivationPolicy {
        self.policy
    }

    #[inline]
    pub fn timeline(&self, l: i32) -> Option<&Timeline> {
        if l < self.l_min || l > self.l_max {
            return None;
        }
        self.timelines.get(timeline_slot(l)).and_then(|t| t.as_ref())
    }

    /// Timelines in display order, most-negative first.
    pub fn iter_timelines(&self) -> impl Iterator<Item = (i32, &Timeline)> + '_ {
        (self.l_min..=self.l_max).filter_map(move |l| self.timeline(l).map(|t| (l, t)))
    }

    #[inline]
    pub fn end_ply(&self, l: i32) -> Option<i32> {
        self.timeline(l).map(Timeline::end_ply)
    }

    #[inline]
    pub fn board_at_ply(&self, l: i32, ply: i32) -> Option<&Board> {
        self.timeline(l).and_then(|t| t.board_at(ply))
    }

    #[inline]
    pub fn board(&self, l: i32, turn: i32, side: Side) -> Option<&Board> {
        self.board_at_ply(l, ply_of(turn, side))
    }

    /// True when the coordinate names a real cell on a stored board of the
    /// mover's parity.
    pub fn inbound(&self, c: Coord, mover: Side) -> bool {
        if c.file < 0 || c.rank < 0 || c.file as u8 >= self.width || c.rank as u8 >= self.height {
            return false;
        }
        self.board(c.timeline, c.turn, mover).is_some()
    }

    /// The piece standing at a coordinate on the mover-parity board, if any.
    pub fn piece_at(&self, c: Coord, mover: Side) -> Option<Piece> {
        self.board(c.timeline, c.turn, mover)
            .and_then(|b| b.piece(c.file, c.rank))
    }

    // --- Activation and the present ---

    /// How many timelines on each side of the root count toward the present.
    pub fn number_activated(&self) -> i32 {
        let balanced = {
            let smaller = (-self.l_min).min(self.l_max);
            if smaller < (-self.l_min).max(self.l_max) {
                smaller + 1
            } else {
                smaller
            }
        };
        match self.policy {
            ActivationPolicy::Balanced => balanced,
            ActivationPolicy::Capped(cap) => balanced.min(cap),
        }
    }

    /// The inclusive range of active timelines.
    pub fn active_range(&self) -> (i32, i32) {
        let activated = self.number_activated();
        (self.l_min.max(-activated), self.l_max.min(activated))
    }

    #[inline]
    pub fn is_active(&self, l: i32) -> bool {
        let (lo, hi) = self.active_range();
        lo <= l && l <= hi
    }

    /// The earliest undecided ply across active timelines.
    pub fn present_ply(&self) -> i32 {
        let (lo, hi) = self.active_range();
        (lo..=hi)
            .filter_map(|l| self.end_ply(l))
            .min()
            .unwrap_or(0)
    }

    /// The present as a `(turn, side)` pair.
    pub fn present(&self) -> (i32, Side) {
        ply_parts(self.present_ply())
    }

    // --- Mutation (the move applier and undo machinery only) ---

    /// Extend a timeline with the next board in its run.
    pub(crate) fn append_board(&mut self, l: i32, board: Board) -> Result<(), ChessErrors> {
        let slot = timeline_slot(l);
        match self.timelines.get_mut(slot).and_then(|t| t.as_mut()) {
            Some(timeline) => {
                timeline.boards.push(board);
                Ok(())
            }
            None => Err(ChessErrors::InternalInconsistency(format!(
                "append to missing timeline {}",
                l
            ))),
        }
    }

    /// Drop the newest board of a timeline (undo of `append_board`).
    pub(crate) fn truncate_timeline(&mut self, l: i32) -> Result<(), ChessErrors> {
        let slot = timeline_slot(l);
        match self.timelines.get_mut(slot).and_then(|t| t.as_mut()) {
            Some(timeline) if timeline.boards.len() > 1 => {
                timeline.boards.pop();
                Ok(())
            }
            _ => Err(ChessErrors::InternalInconsistency(format!(
                "truncate of missing or single-board timeline {}",
                l
            ))),
        }
    }

    /// The timeline index the next branch of `side` will claim.
    #[inline]
    pub fn new_timeline_index(&self, side: Side) -> i32 {
        match side {
            Side::White => self.l_max + 1,
            Side::Black => self.l_min - 1,
        }
    }

    /// Spawn a branch timeline for `side`. Returns its timeline index.
    pub(crate) fn spawn_timeline(
        &mut self,
        side: Side,
        start_ply: i32,
        board: Board,
        ancestry: (i32, Coord),
    ) -> i32 {
        let l = self.new_timeline_index(side);
        let slot = timeline_slot(l);
        if self.timelines.len() <= slot {
            self.timelines.resize(slot + 1, None);
        }
        self.timelines[slot] = Some(Timeline::new(start_ply, board, Some(ancestry)));
        self.l_min = self.l_min.min(l);
        self.l_max = self.l_max.max(l);
        l
    }

    /// Remove a branch timeline again (undo of `spawn_timeline`). Only ever
    /// called with the most recently spawned timeline of its side.
    pub(crate) fn remove_timeline(&mut self, l: i32) -> Result<(), ChessErrors> {
        if l == 0 || l < self.l_min || l > self.l_max {
            return Err(ChessErrors::InternalInconsistency(format!(
                "remove of timeline {} outside [{}, {}]",
                l, self.l_min, self.l_max
            )));
        }
        let slot = timeline_slot(l);
        self.timelines[slot] = None;
        while matches!(self.timelines.last(), Some(None)) {
            self.timelines.pop();
        }
        if l > 0 {
            self.l_max = l - 1;
        } else {
            self.l_min = l + 1;
        }
        Ok(())
    }

    /// Every stored board as `(timeline, turn, side, board)`, in display
    /// order. Restartable: each call iterates afresh.
    pub fn boards(&self) -> impl Iterator<Item = (i32, i32, Side, &Board)> + '_ {
        self.iter_timelines().flat_map(|(l, timeline)| {
            (0..timeline.len() as i32).map(move |offset| {
                let ply = timeline.start_ply() + offset;
                let (turn, side) = ply_parts(ply);
                let board = timeline
                    .board_at(ply)
                    .expect("offset enumerated from timeline length");
                (l, turn, side, board)
            })
        })
    }
}
