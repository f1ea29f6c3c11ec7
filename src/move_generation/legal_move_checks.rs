//! Playability, check scanning and full move legality.
//!
//! Check detection asks one question: can a royal piece of the defender be
//! captured? Two flavours exist:
//!
//! - the *legality* scan ([`is_in_check`]) only arms pieces standing on
//!   boards the attacker can actually play (end boards of the attacker's
//!   parity) — this is what move filtering and submit validation use,
//!   evaluated on the hypothetical post-move multiverse;
//! - the *display* scan ([`find_checks`]) additionally reports threats
//!   from hostile pieces standing on the defender's own present boards,
//!   which is what the front end highlights for the side about to move.
//!
//! Both walk every end board once and generate each hostile piece's
//! destinations once, so the cost stays proportional to the number of
//! timelines times board size.

use tracing::trace;

use crate::game_state::chess_types::Side;
use crate::game_state::multiverse::{ply_of, ply_parts, Multiverse};
use crate::move_generation::legal_move_apply::apply_travel;
use crate::move_generation::move_generator::raw_destinations;
use crate::moves::coordinate::Coord;

/// Classification of every timeline for the player to move.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimelineStatus {
    /// Timelines the player must move on before submitting.
    pub mandatory: Vec<i32>,
    /// Timelines the player may move on.
    pub optional: Vec<i32>,
    /// Timelines the player cannot place a move on.
    pub unplayable: Vec<i32>,
}

/// Classify all timelines against a stored present.
pub fn timeline_status(m: &Multiverse, present_turn: i32, player: Side) -> TimelineStatus {
    let present_ply = ply_of(present_turn, player);
    let mut status = TimelineStatus::default();
    for (l, timeline) in m.iter_timelines() {
        let end = timeline.end_ply();
        if m.is_active(l) && end == present_ply {
            status.mandatory.push(l);
        } else if ply_parts(end).1 == player {
            status.optional.push(l);
        } else {
            status.unplayable.push(l);
        }
    }
    status
}

/// True when `origin` names a piece of `player` standing on the end board
/// of a timeline the player may act on.
pub fn is_playable(m: &Multiverse, origin: Coord, player: Side) -> bool {
    let end = match m.end_ply(origin.timeline) {
        Some(end) => end,
        None => return false,
    };
    if ply_of(origin.turn, player) != end {
        return false;
    }
    match m.piece_at(origin, player) {
        Some(piece) => piece.side == player,
        None => false,
    }
}

/// Every piece of `player` standing on a board the player may act on.
pub fn playable_origins(m: &Multiverse, player: Side) -> Vec<Coord> {
    let mut out = Vec::new();
    for (l, timeline) in m.iter_timelines() {
        let end = timeline.end_ply();
        let (turn, side) = ply_parts(end);
        if side != player {
            continue;
        }
        for (file, rank, piece) in timeline.latest().pieces() {
            if piece.side == player {
                out.push(Coord::new(file, rank, turn, l));
            }
        }
    }
    out
}

/// All `(attacker, royal target)` pairs threatening `defender`'s royals,
/// including threats projected from the defender's own present boards.
pub fn find_checks(m: &Multiverse, defender: Side) -> Vec<(Coord, Coord)> {
    collect_checks(m, defender, false, false)
}

/// True when the attacker, moving from a board it can actually play, could
/// capture a royal piece of `defender`.
pub fn is_in_check(m: &Multiverse, defender: Side) -> bool {
    !collect_checks(m, defender, true, true).is_empty()
}

fn collect_checks(
    m: &Multiverse,
    defender: Side,
    playable_only: bool,
    stop_at_first: bool,
) -> Vec<(Coord, Coord)> {
    let attacker = defender.opposite();
    let mut pairs = Vec::new();
    for (l, timeline) in m.iter_timelines() {
        let end = timeline.end_ply();
        let (turn, parity) = ply_parts(end);
        if playable_only && parity != attacker {
            continue;
        }
        for (file, rank, piece) in timeline.latest().pieces() {
            if piece.side != attacker {
                continue;
            }
            let origin = Coord::new(file, rank, turn, l);
            for dest in raw_destinations(m, origin, parity) {
                let hit = matches!(
                    m.piece_at(dest, parity),
                    Some(target) if target.side == defender && target.kind.is_royal()
                );
                if hit {
                    trace!(%origin, %dest, "royal threat");
                    pairs.push((origin, dest));
                    if stop_at_first {
                        return pairs;
                    }
                }
            }
        }
    }
    pairs
}

/// True when applying the travel would leave the mover's own royals
/// attacked — unless the move captures a royal outright, which ends the
/// game before any reply.
pub fn leaves_self_check(m: &Multiverse, origin: Coord, dest: Coord, mover: Side) -> bool {
    let captures_royal = matches!(
        m.piece_at(dest, mover),
        Some(target) if target.side != mover && target.kind.is_royal()
    );
    if captures_royal {
        return false;
    }
    let mut scratch = m.clone();
    match apply_travel(&mut scratch, origin, dest, mover) {
        Ok(_) => is_in_check(&scratch, mover),
        Err(_) => true,
    }
}

/// Full travel legality: playable origin, pattern-reachable destination,
/// and no self-check left behind.
pub fn is_legal_travel(m: &Multiverse, origin: Coord, dest: Coord, mover: Side) -> bool {
    is_playable(m, origin, mover)
        && raw_destinations(m, origin, mover).contains(&dest)
        && !leaves_self_check(m, origin, dest, mover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::game_state::multiverse::{ActivationPolicy, BoardRecord};
    use crate::utils::fen_parser::parse_board_fen;

    fn multiverse(records: Vec<(i32, i32, Side, &str)>, width: u8, height: u8) -> Multiverse {
        let records = records
            .into_iter()
            .map(|(timeline, turn, side, fen)| BoardRecord {
                timeline,
                turn,
                side,
                board: parse_board_fen(fen, width, height).unwrap(),
            })
            .collect();
        Multiverse::assemble(
            records,
            width,
            height,
            BTreeMap::new(),
            ActivationPolicy::Balanced,
        )
        .unwrap()
    }

    #[test]
    fn timeline_classification_follows_the_present() {
        let m = multiverse(
            vec![
                (0, 1, Side::White, "4k3/8/8/8/8/8/8/4K3"),
                (1, 1, Side::White, "4k3/8/8/8/8/8/8/4K3"),
            ],
            8,
            8,
        );
        let status = timeline_status(&m, 1, Side::White);
        assert_eq!(status.mandatory, vec![0, 1]);
        assert!(status.optional.is_empty());
        assert!(status.unplayable.is_empty());
    }

    #[test]
    fn advanced_timeline_becomes_unplayable() {
        let m = multiverse(
            vec![
                (0, 1, Side::White, "4k3/8/8/8/8/8/8/4K3"),
                (0, 1, Side::Black, "4k3/8/8/8/8/8/8/4K3"),
                (1, 1, Side::White, "4k3/8/8/8/8/8/8/4K3"),
            ],
            8,
            8,
        );
        // Timeline 0 already advanced to black's half-turn.
        let status = timeline_status(&m, 1, Side::White);
        assert_eq!(status.mandatory, vec![1]);
        assert_eq!(status.unplayable, vec![0]);
    }

    #[test]
    fn legality_scan_needs_an_attacker_playable_board() {
        // Black's rook threatens the white king, but black has no playable
        // end board yet, so the legality scan stays quiet...
        let m = multiverse(vec![(0, 1, Side::White, "4r3/8/8/8/8/8/8/4K3")], 8, 8);
        assert!(!is_in_check(&m, Side::White));
        // ...while the display scan reports the standing threat.
        let checks = find_checks(&m, Side::White);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].0, Coord::new(4, 7, 1, 0));
        assert_eq!(checks[0].1, Coord::new(4, 0, 1, 0));
    }

    #[test]
    fn legality_scan_sees_playable_attackers() {
        let m = multiverse(
            vec![
                (0, 1, Side::White, "4r3/8/8/8/8/8/8/4K3"),
                (0, 1, Side::Black, "4r3/8/8/8/8/8/8/4K3"),
            ],
            8,
            8,
        );
        assert!(is_in_check(&m, Side::White));
        let checks = find_checks(&m, Side::White);
        assert!(checks.contains(&(Coord::new(4, 7, 1, 0), Coord::new(4, 0, 1, 0))));
    }

    #[test]
    fn moving_into_a_pin_is_self_check() {
        // White rook shields the king from the black rook on the e-file;
        // white to move on the single board.
        let m = multiverse(vec![(0, 1, Side::White, "4r3/8/8/8/4R3/8/8/4K3")], 8, 8);
        let origin = Coord::new(4, 4, 1, 0);
        // Sliding away along the rank exposes the king.
        assert!(leaves_self_check(
            &m,
            origin,
            Coord::new(0, 4, 1, 0),
            Side::White
        ));
        // Sliding up the file keeps the shield.
        assert!(!leaves_self_check(
            &m,
            origin,
            Coord::new(4, 6, 1, 0),
            Side::White
        ));
        assert!(is_legal_travel(&m, origin, Coord::new(4, 6, 1, 0), Side::White));
        assert!(!is_legal_travel(&m, origin, Coord::new(0, 4, 1, 0), Side::White));
    }

    #[test]
    fn playability_requires_the_end_board() {
        let m = multiverse(
            vec![
                (0, 1, Side::White, "4k3/8/8/8/8/8/8/4K3"),
                (0, 1, Side::Black, "4k3/8/8/8/8/8/8/4K3"),
                (0, 2, Side::White, "4k3/8/8/8/8/8/8/4K3"),
            ],
            8,
            8,
        );
        // The king on the old turn-1 board is not playable, only turn 2.
        assert!(!is_playable(&m, Coord::new(4, 0, 1, 0), Side::White));
        assert!(is_playable(&m, Coord::new(4, 0, 2, 0), Side::White));
        // Black has no playable board at all right now.
        assert!(!is_playable(&m, Coord::new(4, 7, 1, 0), Side::Black));
    }

    #[test]
    fn capturing_a_royal_is_never_self_check() {
        // The white rook may capture the black king even though doing so
        // exposes the white king on the e-file: a captured royal ends the
        // game first.
        let m = multiverse(vec![(0, 1, Side::White, "4k3/8/8/8/4R3/8/8/4K2r")], 8, 8);
        let origin = Coord::new(4, 4, 1, 0);
        assert!(!leaves_self_check(
            &m,
            origin,
            Coord::new(4, 7, 1, 0),
            Side::White
        ));
    }
}
