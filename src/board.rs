use std::fmt;

/// A board square packed into a single byte.
///
/// The 64 squares are numbered `row * 8 + column`, row 0 being the first
/// rank. The extra value 64 ([`Square::DEAD`]) marks a captured piece slot;
/// it never appears for a king.
///
/// ```text
/// 56 57 58 59 60 61 62 63
/// 48 49 50 51 52 53 54 55
/// 40 41 42 43 44 45 46 47
/// 32 33 34 35 36 37 38 39
/// 24 25 26 27 28 29 30 31
/// 16 17 18 19 20 21 22 23
///  8  9 10 11 12 13 14 15
///  0  1  2  3  4  5  6  7
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

/// Number of real board squares.
pub const BOARD_SQUARES: u8 = 64;

impl Square {
    /// Sentinel for a captured piece.
    pub const DEAD: Square = Square(64);

    /// Construct from a raw value in `0..=64` (64 meaning captured).
    pub fn new(raw: u8) -> Option<Square> {
        if raw <= BOARD_SQUARES {
            Some(Square(raw))
        } else {
            None
        }
    }

    /// Construct from board coordinates; `None` when off the board.
    #[inline]
    pub fn from_row_col(row: i8, col: i8) -> Option<Square> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square((row as u8) * 8 + col as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_dead(self) -> bool {
        self.0 == BOARD_SQUARES
    }

    #[inline]
    pub fn row(self) -> i8 {
        debug_assert!(!self.is_dead());
        (self.0 / 8) as i8
    }

    #[inline]
    pub fn col(self) -> i8 {
        debug_assert!(!self.is_dead());
        (self.0 % 8) as i8
    }

    /// The square `dr` rows and `dc` columns away, if still on the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        debug_assert!(!self.is_dead());
        Square::from_row_col(self.row() + dr, self.col() + dc)
    }

    /// Chebyshev (king-move) distance between two live squares.
    #[inline]
    pub fn chebyshev(self, other: Square) -> i8 {
        debug_assert!(!self.is_dead() && !other.is_dead());
        let dr = (self.row() - other.row()).abs();
        let dc = (self.col() - other.col()).abs();
        dr.max(dc)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dead() {
            write!(f, "--")
        } else {
            let file = (b'a' + self.0 % 8) as char;
            let rank = (b'1' + self.0 / 8) as char;
            write!(f, "{file}{rank}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates_round_trip() {
        for raw in 0..BOARD_SQUARES {
            let sq = Square::new(raw).unwrap();
            assert_eq!(Square::from_row_col(sq.row(), sq.col()), Some(sq));
        }
        assert!(Square::new(64).unwrap().is_dead());
        assert_eq!(Square::new(65), None);
    }

    #[test]
    fn offsets_respect_board_edges() {
        let a1 = Square::new(0).unwrap();
        assert_eq!(a1.offset(-1, 0), None);
        assert_eq!(a1.offset(0, -1), None);
        assert_eq!(a1.offset(1, 1), Square::new(9));

        let h8 = Square::new(63).unwrap();
        assert_eq!(h8.offset(1, 0), None);
        assert_eq!(h8.offset(-1, -1), Square::new(54));
    }

    #[test]
    fn chebyshev_distance() {
        let a1 = Square::new(0).unwrap();
        let c2 = Square::new(10).unwrap();
        assert_eq!(a1.chebyshev(c2), 2);
        assert_eq!(c2.chebyshev(a1), 2);
        assert_eq!(a1.chebyshev(a1), 0);
    }

    #[test]
    fn display_names() {
        assert_eq!(Square::new(0).unwrap().to_string(), "a1");
        assert_eq!(Square::new(63).unwrap().to_string(), "h8");
        assert_eq!(Square::DEAD.to_string(), "--");
    }
}
