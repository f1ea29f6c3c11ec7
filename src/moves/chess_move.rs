//! Move value objects and their coordinate notation.
//!
//! A move is either moving a piece from one coordinate to another, or the
//! action of submitting the turn. Branching is not a separate move shape:
//! whether a travel move extends a timeline or spawns a new one is decided
//! by where its destination board sits, so the same `Travel` value flows
//! through both `apply_move` and `apply_indicator_move`.

use std::fmt;

use crate::chess_errors::ChessErrors;
use crate::moves::coordinate::{file_index, Coord};

/// A player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChessMove {
    /// Move the piece standing at `origin` to `dest`.
    Travel { origin: Coord, dest: Coord },
    /// End the turn, handing the present to the opponent.
    Submit,
}

impl ChessMove {
    #[inline]
    pub const fn travel(origin: Coord, dest: Coord) -> Self {
        ChessMove::Travel { origin, dest }
    }

    /// Parse the coordinate notation used by replay lists:
    /// `(L0T1)e2>(L0T1)e4` for travel moves (a `>>` separator is accepted
    /// and means the same move routed through branching) and `submit`.
    pub fn from_notation(token: &str) -> Result<Self, ChessErrors> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("submit") {
            return Ok(ChessMove::Submit);
        }
        let (origin_text, dest_text) = match token.split_once(">>") {
            Some(parts) => parts,
            None => token
                .split_once('>')
                .ok_or_else(|| ChessErrors::InvalidMoveNotation(token.to_owned()))?,
        };
        let origin = parse_coord(origin_text)
            .ok_or_else(|| ChessErrors::InvalidMoveNotation(token.to_owned()))?;
        let dest = parse_coord(dest_text)
            .ok_or_else(|| ChessErrors::InvalidMoveNotation(token.to_owned()))?;
        Ok(ChessMove::Travel { origin, dest })
    }

    /// Render in the same notation `from_notation` accepts.
    pub fn to_notation(&self) -> String {
        match self {
            ChessMove::Travel { origin, dest } => format!("{}>{}", origin, dest),
            ChessMove::Submit => "submit".to_owned(),
        }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

/// Parse `(L{timeline}T{turn}){file}{rank}`, e.g. `(L-1T3)c4`.
fn parse_coord(text: &str) -> Option<Coord> {
    let text = text.trim();
    let rest = text.strip_prefix("(L")?;
    let (timeline_text, rest) = rest.split_once('T')?;
    let (turn_text, square_text) = rest.split_once(')')?;
    let timeline: i32 = timeline_text.parse().ok()?;
    let turn: i32 = turn_text.parse().ok()?;

    let mut chars = square_text.chars();
    let file = file_index(chars.next()?)?;
    let rank_text: String = chars.collect();
    let rank: i8 = rank_text.parse::<u8>().ok()?.checked_sub(1)? as i8;
    Some(Coord::new(file, rank, turn, timeline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_notation_round_trip() {
        let mv = ChessMove::travel(Coord::new(4, 1, 1, 0), Coord::new(4, 3, 1, 0));
        let text = mv.to_notation();
        assert_eq!(text, "(L0T1)e2>(L0T1)e4");
        assert_eq!(ChessMove::from_notation(&text).unwrap(), mv);
    }

    #[test]
    fn branch_separator_is_accepted() {
        let mv = ChessMove::from_notation("(L0T2)a1>>(L0T1)a1").unwrap();
        assert_eq!(
            mv,
            ChessMove::travel(Coord::new(0, 0, 2, 0), Coord::new(0, 0, 1, 0))
        );
    }

    #[test]
    fn negative_timelines_parse() {
        let mv = ChessMove::from_notation("(L-2T3)c4>(L-1T3)c4").unwrap();
        match mv {
            ChessMove::Travel { origin, dest } => {
                assert_eq!(origin.timeline, -2);
                assert_eq!(dest.timeline, -1);
                assert_eq!(origin.file, 2);
                assert_eq!(origin.rank, 3);
            }
            ChessMove::Submit => panic!("expected travel"),
        }
    }

    #[test]
    fn submit_parses() {
        assert_eq!(ChessMove::from_notation("submit").unwrap(), ChessMove::Submit);
        assert_eq!(ChessMove::from_notation("SUBMIT").unwrap(), ChessMove::Submit);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ChessMove::from_notation("e2e4").is_err());
        assert!(ChessMove::from_notation("(L0T1)e2-(L0T1)e4").is_err());
        assert!(ChessMove::from_notation("(L0T1)99>(L0T1)e4").is_err());
        assert!(ChessMove::from_notation("(LxT1)e2>(L0T1)e4").is_err());
    }
}
