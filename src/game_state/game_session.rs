//! The game session: one multiverse, one history, one writer.
//!
//! `GameSession` is the surface a display layer drives. It owns the
//! multiverse and an undo/redo history, tracks whose turn the stored
//! present belongs to, and guards every mutation: a call either fully
//! applies (new boards appended, history pushed) or reports `false` with
//! the session untouched. Validation always runs against a scratch clone
//! that is swapped in on success, so readers never observe a half-applied
//! move.
//!
//! The stored present deliberately lags the computed one: it only advances
//! on submit, which is how "all mandatory timelines must move before the
//! turn ends" falls out of a single comparison. Branching into the past
//! can pull the stored present backwards, putting the reactivated boards
//! back on the mover's plate.

use tracing::{debug, warn};

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::{MatchStatus, Side};
use crate::game_state::multiverse::{ply_of, ActivationPolicy, Multiverse};
use crate::game_state::undo_state::{HistoryEntry, Reversal};
use crate::move_generation::completion_search::{has_legal_completion, submit_shape_reached};
use crate::move_generation::legal_move_apply::apply_travel;
use crate::move_generation::legal_move_checks::{
    find_checks, is_in_check, is_legal_travel, is_playable, leaves_self_check, timeline_status,
    TimelineStatus,
};
use crate::move_generation::move_generator::{board_attacks, raw_destinations};
use crate::moves::chess_move::ChessMove;
use crate::moves::coordinate::Coord;
use crate::utils::fen_generator::generate_board_fen;
use crate::utils::notation_generator::generate_position;
use crate::utils::notation_parser::parse_position;

/// The standard single-timeline start.
pub const STANDARD_POSITION: &str = "\
[Size \"8x8\"]
[Board \"Standard\"]
[Mode \"5D\"]
[r*n*b*q*k*b*n*r*/p*p*p*p*p*p*p*p*/8/8/8/8/P*P*P*P*P*P*P*P*/R*N*B*Q*K*B*N*R*:0:1:w]
";

/// One running game: multiverse plus history, mutated only through this
/// type's methods.
#[derive(Debug, Clone)]
pub struct GameSession {
    multiverse: Multiverse,
    present_turn: i32,
    player: Side,
    match_status: MatchStatus,
    history: Vec<HistoryEntry>,
    cursor: usize,
}

impl GameSession {
    /// The standard opening position.
    pub fn standard() -> Self {
        Self::from_notation(STANDARD_POSITION).expect("standard position always parses")
    }

    /// Build a session from position notation, replaying any trailing move
    /// list.
    pub fn from_notation(text: &str) -> Result<Self, ChessErrors> {
        Self::with_policy(text, ActivationPolicy::Balanced)
    }

    /// Like [`GameSession::from_notation`] with an explicit activation
    /// policy.
    pub fn with_policy(text: &str, policy: ActivationPolicy) -> Result<Self, ChessErrors> {
        let parsed = parse_position(text, policy)?;
        let mut session = Self::from_multiverse(parsed.multiverse);
        for step in parsed.replay {
            let applied = if step.indicator {
                session.apply_indicator_move(&step.mv)
            } else {
                session.apply_move(&step.mv)
            };
            if !applied {
                return Err(ChessErrors::IllegalReplayMove(step.token));
            }
        }
        Ok(session)
    }

    /// Wrap an already assembled multiverse.
    pub fn from_multiverse(multiverse: Multiverse) -> Self {
        let (present_turn, player) = multiverse.present();
        let mut session = Self {
            multiverse,
            present_turn,
            player,
            match_status: MatchStatus::Playing,
            history: Vec::new(),
            cursor: 0,
        };
        session.match_status = session.evaluate_terminal();
        session
    }

    // --- Query surface ---

    #[inline]
    pub fn multiverse(&self) -> &Multiverse {
        &self.multiverse
    }

    #[inline]
    pub fn get_board_size(&self) -> (u8, u8) {
        self.multiverse.board_size()
    }

    /// The stored present: the turn the current player is filling in.
    #[inline]
    pub fn get_current_present(&self) -> (i32, Side) {
        (self.present_turn, self.player)
    }

    #[inline]
    pub fn get_match_status(&self) -> MatchStatus {
        self.match_status
    }

    /// Every stored board as `(timeline, turn, side, layout)`.
    pub fn get_current_boards(&self) -> Vec<(i32, i32, Side, String)> {
        self.multiverse
            .boards()
            .map(|(l, turn, side, board)| (l, turn, side, generate_board_fen(board)))
            .collect()
    }

    /// Mandatory / optional / unplayable classification for the player.
    pub fn get_current_timeline_status(&self) -> TimelineStatus {
        timeline_status(&self.multiverse, self.present_turn, self.player)
    }

    /// Attacks standing against the current player's royals.
    pub fn get_current_checks(&self) -> Vec<(Coord, Coord)> {
        find_checks(&self.multiverse, self.player)
    }

    /// True when any royal of the current player is under attack.
    pub fn currently_check(&self) -> bool {
        !self.get_current_checks().is_empty()
    }

    /// Pieces on mandatory boards that have at least one legal move.
    pub fn get_movable_pieces(&self) -> Vec<Coord> {
        let status = self.get_current_timeline_status();
        let mut out = Vec::new();
        for l in status.mandatory {
            let timeline = match self.multiverse.timeline(l) {
                Some(timeline) => timeline,
                None => continue,
            };
            for (file, rank, piece) in timeline.latest().pieces() {
                if piece.side != self.player {
                    continue;
                }
                let origin = Coord::new(file, rank, self.present_turn, l);
                if !self.legal_destinations(origin).is_empty() {
                    out.push(origin);
                }
            }
        }
        out
    }

    /// True when the piece at `origin` may be moved right now.
    pub fn is_playable(&self, origin: Coord) -> Result<bool, ChessErrors> {
        self.ensure_on_board(origin)?;
        Ok(!self.match_status.is_over() && is_playable(&self.multiverse, origin, self.player))
    }

    /// Legal destinations for the piece at `origin`; empty when the piece
    /// is not playable. Coordinates off the board grid fail loudly.
    pub fn candidate_destinations(&self, origin: Coord) -> Result<Vec<Coord>, ChessErrors> {
        self.ensure_on_board(origin)?;
        Ok(self.legal_destinations(origin))
    }

    fn legal_destinations(&self, origin: Coord) -> Vec<Coord> {
        if self.match_status.is_over() || !is_playable(&self.multiverse, origin, self.player) {
            return Vec::new();
        }
        raw_destinations(&self.multiverse, origin, self.player)
            .into_iter()
            .filter(|dest| !leaves_self_check(&self.multiverse, origin, *dest, self.player))
            .collect()
    }

    /// Full legality of a move value, without applying it.
    pub fn is_legal(&self, mv: &ChessMove) -> bool {
        match *mv {
            ChessMove::Submit => self.can_submit(),
            ChessMove::Travel { origin, dest } => {
                !self.match_status.is_over()
                    && is_legal_travel(&self.multiverse, origin, dest, self.player)
            }
        }
    }

    /// True when the turn can end now: every mandatory timeline has been
    /// moved and no royal of the player is left capturable.
    pub fn can_submit(&self) -> bool {
        self.match_status == MatchStatus::Playing
            && submit_shape_reached(&self.multiverse, self.present_turn, self.player)
            && !is_in_check(&self.multiverse, self.player)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Serialize the current position.
    pub fn to_notation(&self) -> String {
        generate_position(&self.multiverse)
    }

    // --- Mutation surface ---

    /// Apply a move. Returns `false` (with no state change) when rejected.
    pub fn apply_move(&mut self, mv: &ChessMove) -> bool {
        match *mv {
            ChessMove::Submit => self.submit(),
            ChessMove::Travel { origin, dest } => self.apply_travel_move(mv, origin, dest, false),
        }
    }

    /// Apply a branching (indicator) move: the destination board must lie
    /// in a timeline's past and the branch must threaten a hostile royal.
    pub fn apply_indicator_move(&mut self, mv: &ChessMove) -> bool {
        match *mv {
            ChessMove::Submit => {
                debug!("indicator application rejected: submit is not a travel");
                false
            }
            ChessMove::Travel { origin, dest } => self.apply_travel_move(mv, origin, dest, true),
        }
    }

    fn apply_travel_move(&mut self, mv: &ChessMove, origin: Coord, dest: Coord, indicator: bool) -> bool {
        if self.match_status.is_over() {
            debug!(%mv, "move rejected: game is over");
            return false;
        }
        if !is_playable(&self.multiverse, origin, self.player) {
            debug!(%mv, "move rejected: origin is not playable");
            return false;
        }
        if !raw_destinations(&self.multiverse, origin, self.player).contains(&dest) {
            debug!(%mv, "move rejected: destination out of reach");
            return false;
        }
        if indicator {
            let dest_is_present =
                self.multiverse.end_ply(dest.timeline) == Some(ply_of(dest.turn, self.player));
            if dest_is_present {
                debug!(%mv, "indicator rejected: destination board is the present");
                return false;
            }
        }

        let mut scratch = self.multiverse.clone();
        let applied = match apply_travel(&mut scratch, origin, dest, self.player) {
            Ok(applied) => applied,
            Err(err) => {
                warn!(%mv, %err, "move application failed");
                return false;
            }
        };
        let royal_captured = applied
            .captured
            .map_or(false, |p| p.kind.is_royal() && p.side != self.player);
        if !royal_captured && is_in_check(&scratch, self.player) {
            debug!(%mv, "move rejected: leaves own royal attacked");
            return false;
        }

        if indicator && !royal_captured {
            let threatens = applied.spawned.is_some()
                && self.branch_threatens_royal(&scratch, applied.spawned, dest);
            if !threatens {
                debug!(%mv, "indicator rejected: branch threatens no royal");
                return false;
            }
        }

        let reversal = Reversal {
            appended: applied.appended.clone(),
            spawned: applied.spawned,
            prev_present_turn: self.present_turn,
            prev_player: self.player,
            prev_status: self.match_status,
        };
        self.history.truncate(self.cursor);
        self.history.push(HistoryEntry { mv: *mv, reversal });
        self.cursor += 1;
        self.multiverse = scratch;
        // Branching into the past can rewind the present.
        self.present_turn = self.present_turn.min(self.multiverse.present().0);
        if royal_captured {
            self.match_status = MatchStatus::win_for(self.player);
        }
        debug!(%mv, spawned = ?applied.spawned, "move applied");
        true
    }

    fn branch_threatens_royal(
        &self,
        scratch: &Multiverse,
        spawned: Option<i32>,
        dest: Coord,
    ) -> bool {
        let board = match spawned.and_then(|l| scratch.timeline(l)) {
            Some(timeline) => timeline.latest(),
            None => return false,
        };
        board_attacks(board, dest.file, dest.rank)
            .into_iter()
            .any(|(file, rank)| {
                matches!(
                    board.piece(file, rank),
                    Some(p) if p.side != self.player && p.kind.is_royal()
                )
            })
    }

    /// End the turn. Rejected while a mandatory timeline is unmoved or a
    /// royal is left capturable.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            debug!("submit rejected");
            return false;
        }
        let reversal = Reversal {
            appended: Vec::new(),
            spawned: None,
            prev_present_turn: self.present_turn,
            prev_player: self.player,
            prev_status: self.match_status,
        };
        self.history.truncate(self.cursor);
        self.history.push(HistoryEntry {
            mv: ChessMove::Submit,
            reversal,
        });
        self.cursor += 1;

        let (turn, side) = self.multiverse.present();
        self.present_turn = turn;
        self.player = side;
        self.match_status = self.evaluate_terminal();
        debug!(turn, player = %side, status = %self.match_status, "turn submitted");
        true
    }

    /// Reverse the newest applied move. A no-op returning `false` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            debug!("nothing to undo");
            return false;
        }
        self.cursor -= 1;
        let entry = self.history[self.cursor].clone();
        for &l in entry.reversal.appended.iter().rev() {
            if let Err(err) = self.multiverse.truncate_timeline(l) {
                warn!(%err, "undo lost a board");
            }
        }
        if let Some(l) = entry.reversal.spawned {
            if let Err(err) = self.multiverse.remove_timeline(l) {
                warn!(%err, "undo lost a timeline");
            }
        }
        self.present_turn = entry.reversal.prev_present_turn;
        self.player = entry.reversal.prev_player;
        self.match_status = entry.reversal.prev_status;
        debug!(mv = %entry.mv, "move undone");
        true
    }

    /// Re-apply the most recently undone move. A no-op returning `false`
    /// when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.cursor >= self.history.len() {
            debug!("nothing to redo");
            return false;
        }
        let entry = self.history[self.cursor].clone();
        match entry.mv {
            ChessMove::Submit => {
                let (turn, side) = self.multiverse.present();
                self.present_turn = turn;
                self.player = side;
                self.match_status = self.evaluate_terminal();
            }
            ChessMove::Travel { origin, dest } => {
                let mut scratch = self.multiverse.clone();
                let applied = match apply_travel(&mut scratch, origin, dest, self.player) {
                    Ok(applied) => applied,
                    Err(err) => {
                        warn!(%err, "redo failed to re-apply");
                        return false;
                    }
                };
                self.multiverse = scratch;
                self.present_turn = self.present_turn.min(self.multiverse.present().0);
                if applied
                    .captured
                    .map_or(false, |p| p.kind.is_royal() && p.side != self.player)
                {
                    self.match_status = MatchStatus::win_for(self.player);
                }
            }
        }
        self.cursor += 1;
        debug!(mv = %entry.mv, "move redone");
        true
    }

    // --- Internals ---

    fn ensure_on_board(&self, c: Coord) -> Result<(), ChessErrors> {
        let (width, height) = self.multiverse.board_size();
        if c.file < 0 || c.rank < 0 || c.file as u8 >= width || c.rank as u8 >= height {
            return Err(ChessErrors::OutOfBounds(c));
        }
        Ok(())
    }

    /// Decide the match status for the player about to move: `Playing`
    /// while some legal turn completion exists, otherwise a win for the
    /// opponent (standing check) or a draw (stalemate).
    fn evaluate_terminal(&self) -> MatchStatus {
        if has_legal_completion(&self.multiverse, self.present_turn, self.player) {
            MatchStatus::Playing
        } else if !find_checks(&self.multiverse, self.player).is_empty() {
            MatchStatus::win_for(self.player.opposite())
        } else {
            MatchStatus::Draw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str =
        "r*n*b*q*k*b*n*r*/p*p*p*p*p*p*p*p*/8/8/8/8/P*P*P*P*P*P*P*P*/R*N*B*Q*K*B*N*R*";

    fn two_timeline_start() -> GameSession {
        let text = format!(
            "[Size \"8x8\"]\n[{fen}:0:1:w]\n[{fen}:1:1:w]\n",
            fen = START_FEN
        );
        GameSession::from_notation(&text).unwrap()
    }

    fn travel(of: i8, or: i8, ot: i32, ol: i32, df: i8, dr: i8, dt: i32, dl: i32) -> ChessMove {
        ChessMove::travel(Coord::new(of, or, ot, ol), Coord::new(df, dr, dt, dl))
    }

    #[test]
    fn standard_session_starts_playing() {
        let session = GameSession::standard();
        assert_eq!(session.get_current_present(), (1, Side::White));
        assert_eq!(session.get_match_status(), MatchStatus::Playing);
        assert_eq!(session.get_board_size(), (8, 8));
        assert!(!session.can_submit());
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.get_current_boards().len(), 1);
    }

    #[test]
    fn two_timeline_submit_requires_every_mandatory_line() {
        let mut session = two_timeline_start();
        let status = session.get_current_timeline_status();
        assert_eq!(status.mandatory, vec![0, 1]);

        // White pushes a pawn on timeline 0 only.
        assert!(session.apply_move(&travel(4, 1, 1, 0, 4, 3, 1, 0)));
        assert!(!session.can_submit());
        assert!(!session.submit());
        assert_eq!(session.get_current_present(), (1, Side::White));

        let status = session.get_current_timeline_status();
        assert_eq!(status.mandatory, vec![1]);
        assert_eq!(status.unplayable, vec![0]);

        // Timeline 1 too, then the turn can end.
        assert!(session.apply_move(&travel(4, 1, 1, 1, 4, 3, 1, 1)));
        assert!(session.can_submit());
        assert!(session.submit());
        assert_eq!(session.get_current_present(), (1, Side::Black));

        // Black answers symmetrically on both lines.
        assert!(session.apply_move(&travel(4, 6, 1, 0, 4, 4, 1, 0)));
        assert!(!session.can_submit());
        assert!(session.apply_move(&travel(4, 6, 1, 1, 4, 4, 1, 1)));
        assert!(session.submit());
        assert_eq!(session.get_current_present(), (2, Side::White));
        assert_eq!(session.get_match_status(), MatchStatus::Playing);
    }

    #[test]
    fn rejected_moves_change_nothing() {
        let mut session = GameSession::standard();
        let before = session.clone();

        // Not the player's piece.
        assert!(!session.apply_move(&travel(4, 6, 1, 0, 4, 4, 1, 0)));
        // Not a reachable destination.
        assert!(!session.apply_move(&travel(4, 1, 1, 0, 4, 5, 1, 0)));
        // Submit before any move.
        assert!(!session.submit());

        assert_eq!(session.multiverse(), before.multiverse());
        assert_eq!(session.get_current_present(), before.get_current_present());
        assert!(!session.can_undo());
    }

    #[test]
    fn undo_restores_identical_boards_and_redo_replays() {
        let mut session = GameSession::standard();
        let initial = session.multiverse().clone();

        let mv = travel(4, 1, 1, 0, 4, 3, 1, 0);
        assert!(session.apply_move(&mv));
        let after_move = session.multiverse().clone();

        assert!(session.can_undo());
        assert!(session.undo());
        assert_eq!(session.multiverse(), &initial);
        assert_eq!(session.get_current_present(), (1, Side::White));

        assert!(session.can_redo());
        assert!(session.redo());
        assert_eq!(session.multiverse(), &after_move);

        // Undo again, then a fresh move discards the redo tail.
        assert!(session.undo());
        assert!(session.apply_move(&travel(3, 1, 1, 0, 3, 3, 1, 0)));
        assert!(!session.can_redo());
    }

    #[test]
    fn undo_crosses_submits_exactly() {
        let mut session = GameSession::standard();
        let initial = session.multiverse().clone();

        assert!(session.apply_move(&travel(4, 1, 1, 0, 4, 3, 1, 0)));
        assert!(session.submit());
        assert_eq!(session.get_current_present(), (1, Side::Black));

        assert!(session.undo());
        assert_eq!(session.get_current_present(), (1, Side::White));
        assert!(session.can_submit());

        assert!(session.undo());
        assert_eq!(session.multiverse(), &initial);
        assert!(!session.can_undo());

        // Redo both steps lands back on black's turn.
        assert!(session.redo());
        assert!(session.redo());
        assert_eq!(session.get_current_present(), (1, Side::Black));
    }

    #[test]
    fn empty_history_undo_redo_are_quiet_noops() {
        let mut session = GameSession::standard();
        assert!(!session.undo());
        assert!(!session.redo());
        assert_eq!(session.get_match_status(), MatchStatus::Playing);
    }

    #[test]
    fn self_check_moves_are_rejected_despite_valid_pattern() {
        // The white king stands in the black rook's file; only king moves
        // off the file are legal, the pawn cannot move at all.
        let text = "[Size \"5x5\"]\n[4r/5/5/5/P3K:0:1:w]\n";
        let mut session = GameSession::from_notation(text).unwrap();

        let pawn = Coord::new(0, 0, 1, 0);
        assert_eq!(session.candidate_destinations(pawn).unwrap(), vec![]);
        assert!(!session.is_legal(&travel(0, 0, 1, 0, 0, 1, 1, 0)));
        assert!(!session.apply_move(&travel(0, 0, 1, 0, 0, 1, 1, 0)));

        // The standing threat is reported to the display layer.
        assert!(!session.get_current_checks().is_empty());

        // Only the king appears movable, and its escape works.
        let movable = session.get_movable_pieces();
        assert_eq!(movable, vec![Coord::new(4, 0, 1, 0)]);
        assert!(session.apply_move(&travel(4, 0, 1, 0, 3, 0, 1, 0)));
    }

    #[test]
    fn indicator_move_spawns_one_unplayable_timeline_with_ancestry() {
        let text = "\
[Size \"5x5\"]
[k4/5/5/5/1R2K:0:1:w]
[k4/5/5/5/R3K:0:1:b]
[1k3/5/5/5/R3K:0:2:w]
";
        let mut session = GameSession::from_notation(text).unwrap();
        assert_eq!(session.get_current_present(), (2, Side::White));

        let mv = travel(0, 0, 2, 0, 0, 0, 1, 0);
        assert!(session.apply_indicator_move(&mv));

        // Exactly one new timeline, spawned by white.
        assert_eq!(session.multiverse().timelines_range(), (0, 1));
        let spawned = session.multiverse().timeline(1).unwrap();
        assert_eq!(spawned.ancestry(), Some((0, Coord::new(0, 0, 1, 0))));

        // The branch is not playable until black's turn arrives there.
        let status = session.get_current_timeline_status();
        assert!(status.unplayable.contains(&1));
        assert!(!status.mandatory.contains(&1));

        // Branching into the past rewound the present.
        assert_eq!(session.get_current_present(), (1, Side::White));
        assert!(session.can_submit());
        assert!(session.submit());
        assert_eq!(session.get_current_present(), (1, Side::Black));
        assert_eq!(session.get_match_status(), MatchStatus::Playing);

        // Undo the submit and the branch: back to the original shape.
        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.multiverse().timelines_range(), (0, 0));
        assert_eq!(session.get_current_present(), (2, Side::White));
    }

    #[test]
    fn indicator_rejects_present_destinations_and_idle_branches() {
        let mut session = two_timeline_start();
        // A physical pawn push routed through the indicator path fails:
        // its destination board is the present.
        assert!(!session.apply_indicator_move(&travel(4, 1, 1, 0, 4, 3, 1, 0)));

        // A plain sideways hop between present boards is no indicator
        // move either.
        assert!(!session.apply_indicator_move(&travel(1, 0, 1, 0, 1, 2, 1, 1)));
    }

    #[test]
    fn royal_capture_ends_the_game_immediately() {
        // White rook may take the black king outright.
        let text = "[Size \"5x5\"]\n[k3R/5/5/5/K4:0:1:w]\n";
        let mut session = GameSession::from_notation(text).unwrap();
        assert!(session.apply_move(&travel(4, 4, 1, 0, 0, 4, 1, 0)));
        assert_eq!(session.get_match_status(), MatchStatus::WhiteWins);

        // Game over: no further moves or submits.
        assert!(!session.apply_move(&travel(0, 0, 1, 0, 0, 1, 1, 0)));
        assert!(!session.can_submit());

        // Undo revives the game.
        assert!(session.undo());
        assert_eq!(session.get_match_status(), MatchStatus::Playing);
    }

    #[test]
    fn checkmate_is_detected_at_turn_start() {
        // Back-rank mate one submit away: white plays the rook to the back
        // rank, black has no reply on the single board.
        let text = "[Size \"8x8\"]\n[6k1/5ppp/8/8/8/8/8/R5K1:0:1:w]\n";
        let mut session = GameSession::from_notation(text).unwrap();
        assert!(session.apply_move(&travel(0, 0, 1, 0, 0, 7, 1, 0)));
        assert!(session.submit());
        assert_eq!(session.get_match_status(), MatchStatus::WhiteWins);
    }

    #[test]
    fn stalemate_is_a_draw() {
        // After white's queen move, black's lone king has no legal move
        // but stands unattacked.
        let text = "[Size \"8x8\"]\n[k7/8/8/8/8/1Q6/8/7K:0:1:w]\n";
        let mut session = GameSession::from_notation(text).unwrap();
        assert!(session.apply_move(&travel(1, 2, 1, 0, 1, 5, 1, 0)));
        assert!(session.submit());
        assert_eq!(session.get_match_status(), MatchStatus::Draw);
    }

    #[test]
    fn queries_are_idempotent() {
        let session = two_timeline_start();
        assert_eq!(session.get_current_boards(), session.get_current_boards());
        assert_eq!(
            session.get_current_timeline_status(),
            session.get_current_timeline_status()
        );
        assert_eq!(session.get_movable_pieces(), session.get_movable_pieces());
        assert_eq!(session.get_current_checks(), session.get_current_checks());
        assert_eq!(session.get_current_present(), session.get_current_present());
        let origin = Coord::new(4, 1, 1, 0);
        assert_eq!(
            session.candidate_destinations(origin).unwrap(),
            session.candidate_destinations(origin).unwrap()
        );
    }

    #[test]
    fn out_of_bounds_coordinates_fail_loudly() {
        let session = GameSession::standard();
        let off = Coord::new(8, 0, 1, 0);
        assert_eq!(
            session.candidate_destinations(off).unwrap_err(),
            ChessErrors::OutOfBounds(off)
        );
        assert!(session.is_playable(off).is_err());
        // A coordinate on the grid but on a missing board is a quiet
        // non-move, not an error.
        let ghost = Coord::new(0, 0, 9, 0);
        assert_eq!(session.candidate_destinations(ghost).unwrap(), vec![]);
    }

    #[test]
    fn generator_and_legality_agree() {
        let session = two_timeline_start();
        for origin in session.get_movable_pieces() {
            for dest in session.candidate_destinations(origin).unwrap() {
                assert!(session.is_legal(&ChessMove::travel(origin, dest)));
            }
        }
        // And a known-illegal move is in neither set.
        let origin = Coord::new(4, 1, 1, 0);
        let silly = Coord::new(4, 5, 1, 0);
        assert!(!session
            .candidate_destinations(origin)
            .unwrap()
            .contains(&silly));
        assert!(!session.is_legal(&ChessMove::travel(origin, silly)));
    }

    #[test]
    fn notation_round_trip_preserves_position() {
        let mut session = two_timeline_start();
        assert!(session.apply_move(&travel(4, 1, 1, 0, 4, 3, 1, 0)));
        let serialized = session.to_notation();
        let reloaded = GameSession::from_notation(&serialized).unwrap();
        assert_eq!(reloaded.multiverse(), session.multiverse());
        assert_eq!(
            reloaded.get_current_boards(),
            session.get_current_boards()
        );
    }

    #[test]
    fn replayed_move_lists_reach_the_same_state() {
        let text = format!(
            "[Size \"8x8\"]\n[{fen}:0:1:w]\n(L0T1)e2>(L0T1)e4 submit (L0T1)e7>(L0T1)e5 submit\n",
            fen = START_FEN
        );
        let session = GameSession::from_notation(&text).unwrap();
        assert_eq!(session.get_current_present(), (2, Side::White));
        assert_eq!(session.multiverse().end_ply(0), Some(4));

        let bad = format!("[Size \"8x8\"]\n[{fen}:0:1:w]\n(L0T1)e2>(L0T1)e6\n", fen = START_FEN);
        assert!(matches!(
            GameSession::from_notation(&bad),
            Err(ChessErrors::IllegalReplayMove(_))
        ));
    }

    #[test]
    fn random_playouts_unwind_to_the_start() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        for seed in 0..4u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = GameSession::standard();
            let initial = session.clone();

            let mut applied = 0usize;
            let snapshots: Vec<_> = (0..12)
                .map_while(|_| {
                    if session.get_match_status().is_over() {
                        return None;
                    }
                    if session.can_submit() && rng.gen_bool(0.5) {
                        assert!(session.submit());
                        applied += 1;
                        return Some(session.multiverse().clone());
                    }
                    let movable = session.get_movable_pieces();
                    if movable.is_empty() {
                        if !session.can_submit() {
                            return None;
                        }
                        assert!(session.submit());
                        applied += 1;
                        return Some(session.multiverse().clone());
                    }
                    let origin = movable[rng.gen_range(0..movable.len())];
                    let dests = session.candidate_destinations(origin).unwrap();
                    let dest = dests[rng.gen_range(0..dests.len())];
                    assert!(session.apply_move(&ChessMove::travel(origin, dest)));
                    applied += 1;
                    Some(session.multiverse().clone())
                })
                .collect();

            // Unwinding restores the initial session exactly.
            for _ in 0..applied {
                assert!(session.undo());
            }
            assert!(!session.can_undo());
            assert_eq!(session.multiverse(), initial.multiverse());
            assert_eq!(session.get_current_present(), initial.get_current_present());
            assert_eq!(session.get_match_status(), initial.get_match_status());

            // Redo replays every step to the exact same snapshots.
            for snapshot in &snapshots {
                assert!(session.redo());
                assert_eq!(session.multiverse(), snapshot);
            }
            assert!(!session.can_redo());
        }
    }
}
