//! Pure chess movement rules for slot-based piece sets.
//!
//! [`attacks`] answers "does this piece attack the enemy king"; [`movegen`]
//! enumerates legal successors. Both operate on [`crate::codec::Position`]
//! values and know nothing about the table arrays beyond the
//! [`movegen::Legality`] seam.

pub mod attacks;
pub mod movegen;

/// Rook movement directions as `(row, column)` steps.
pub const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Bishop movement directions.
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Queen movement directions; also the eight king steps.
pub const QUEEN_DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// The eight knight jumps.
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];
