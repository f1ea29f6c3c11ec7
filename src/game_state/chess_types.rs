//! Core piece and status types shared by every subsystem.

use std::fmt;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    White,
    Black,
}

impl Side {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// The letter used by board blocks in the position notation.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }

    #[inline]
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'w' | 'W' => Some(Side::White),
            'b' | 'B' => Some(Side::Black),
            _ => None,
        }
    }

    /// Rank direction this side's pawns advance in.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// Piece kind. The standard six are joined by the variant kinds the engine
/// understands: unicorns and dragons slide along three and four axes, brawns
/// are heavy pawns with extra captures, princesses combine rook and bishop,
/// royal queens are royal (check applies) and common kings move like kings
/// without being royal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Brawn,
    Knight,
    Bishop,
    Rook,
    Unicorn,
    Dragon,
    Princess,
    Queen,
    RoyalQueen,
    King,
    CommonKing,
}

impl PieceKind {
    /// Royal pieces are the ones check and checkmate protect.
    #[inline]
    pub const fn is_royal(self) -> bool {
        matches!(self, PieceKind::King | PieceKind::RoyalQueen)
    }

    /// Pawns and brawns share advance/capture/en-passant handling.
    #[inline]
    pub const fn is_pawn_like(self) -> bool {
        matches!(self, PieceKind::Pawn | PieceKind::Brawn)
    }

    /// Kinds whose unmoved state is meaningful enough to serialize
    /// (castling and double-step eligibility).
    #[inline]
    pub const fn tracks_unmoved(self) -> bool {
        matches!(
            self,
            PieceKind::Pawn | PieceKind::Brawn | PieceKind::Rook | PieceKind::King
        )
    }

    /// Uppercase FEN letter for this kind.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Brawn => 'W',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Unicorn => 'U',
            PieceKind::Dragon => 'D',
            PieceKind::Princess => 'S',
            PieceKind::Queen => 'Q',
            PieceKind::RoyalQueen => 'Y',
            PieceKind::King => 'K',
            PieceKind::CommonKing => 'C',
        }
    }

    #[inline]
    pub fn from_letter(c: char) -> Option<(PieceKind, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'W' => PieceKind::Brawn,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'U' => PieceKind::Unicorn,
            'D' => PieceKind::Dragon,
            'S' => PieceKind::Princess,
            'Q' => PieceKind::Queen,
            'Y' => PieceKind::RoyalQueen,
            'K' => PieceKind::King,
            'C' => PieceKind::CommonKing,
            _ => return None,
        };
        Some((kind, side))
    }
}

/// One piece on one board cell. `moved` starts false for pieces marked
/// unmoved in the position notation and flips permanently on the first move;
/// it gates castling, pawn double-steps and en-passant detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub moved: bool,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self {
            kind,
            side,
            moved: true,
        }
    }

    #[inline]
    pub const fn unmoved(kind: PieceKind, side: Side) -> Self {
        Self {
            kind,
            side,
            moved: false,
        }
    }

    /// FEN letter (case encodes the side).
    #[inline]
    pub fn letter(self) -> char {
        match self.side {
            Side::White => self.kind.letter(),
            Side::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }
}

/// Outcome of a match as observed by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Playing,
    WhiteWins,
    BlackWins,
    Draw,
}

impl MatchStatus {
    #[inline]
    pub const fn win_for(side: Side) -> Self {
        match side {
            Side::White => MatchStatus::WhiteWins,
            Side::Black => MatchStatus::BlackWins,
        }
    }

    #[inline]
    pub const fn is_over(self) -> bool {
        !matches!(self, MatchStatus::Playing)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Playing => write!(f, "playing"),
            MatchStatus::WhiteWins => write!(f, "white wins"),
            MatchStatus::BlackWins => write!(f, "black wins"),
            MatchStatus::Draw => write!(f, "draw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_letters_round_trip() {
        let kinds = [
            PieceKind::Pawn,
            PieceKind::Brawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Unicorn,
            PieceKind::Dragon,
            PieceKind::Princess,
            PieceKind::Queen,
            PieceKind::RoyalQueen,
            PieceKind::King,
            PieceKind::CommonKing,
        ];
        for kind in kinds {
            for side in [Side::White, Side::Black] {
                let piece = Piece::new(kind, side);
                assert_eq!(PieceKind::from_letter(piece.letter()), Some((kind, side)));
            }
        }
    }

    #[test]
    fn royal_classification() {
        assert!(PieceKind::King.is_royal());
        assert!(PieceKind::RoyalQueen.is_royal());
        assert!(!PieceKind::CommonKing.is_royal());
        assert!(!PieceKind::Queen.is_royal());
    }

    #[test]
    fn side_helpers() {
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::from_letter('B'), Some(Side::Black));
        assert_eq!(Side::from_letter('x'), None);
        assert_eq!(MatchStatus::win_for(Side::Black), MatchStatus::BlackWins);
    }
}
