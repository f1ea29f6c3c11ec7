//! Search for one legal turn completion.
//!
//! A turn only ends through submit, and submit demands that every mandatory
//! timeline has been moved and no royal of the mover is left capturable. A
//! side is therefore mated exactly when no sequence of moves reaches a
//! submittable, check-free shape — which this module decides by depth-first
//! search over the side's playable moves, stopping at the first completion
//! found. The search is only run when a turn starts (after a submit), never
//! per candidate move.

use tracing::trace;

use crate::game_state::chess_types::Side;
use crate::game_state::multiverse::Multiverse;
use crate::move_generation::legal_move_apply::apply_travel;
use crate::move_generation::legal_move_checks::{is_in_check, playable_origins};
use crate::move_generation::move_generator::raw_destinations;

/// Bound on the number of moves tried within a single turn. Branching can
/// in principle stretch a turn indefinitely by reactivating past boards, so
/// the search carries a fixed guard.
pub const MAX_COMPLETION_DEPTH: usize = 12;

/// True when the multiverse shape allows a submit: the freshly computed
/// present has advanced past the stored one.
pub fn submit_shape_reached(m: &Multiverse, present_turn: i32, player: Side) -> bool {
    let (current_turn, current_side) = m.present();
    current_side != player || current_turn != present_turn
}

/// True when `player` has at least one legal way to finish the turn that
/// starts at `present_turn`.
pub fn has_legal_completion(m: &Multiverse, present_turn: i32, player: Side) -> bool {
    completion_dfs(m, present_turn, player, MAX_COMPLETION_DEPTH)
}

fn completion_dfs(m: &Multiverse, present_turn: i32, player: Side, depth: usize) -> bool {
    if submit_shape_reached(m, present_turn, player) && !is_in_check(m, player) {
        return true;
    }
    if depth == 0 {
        trace!(present_turn, %player, "completion search depth guard hit");
        return false;
    }

    for origin in playable_origins(m, player) {
        for dest in raw_destinations(m, origin, player) {
            let mut scratch = m.clone();
            let applied = match apply_travel(&mut scratch, origin, dest, player) {
                Ok(applied) => applied,
                Err(_) => continue,
            };
            // Capturing a royal wins outright, which certainly completes
            // the turn.
            if applied
                .captured
                .map_or(false, |piece| piece.kind.is_royal() && piece.side != player)
            {
                return true;
            }
            // Branching into the past can rewind the present.
            let next_present = present_turn.min(scratch.present().0);
            if completion_dfs(&scratch, next_present, player, depth - 1) {
                return true;
            }
        }
    }
    false
}
