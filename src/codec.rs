use std::fmt;

use crate::board::Square;
use crate::pieces::{Color, MAX_SLOTS};
use crate::table::TableError;

/// Radix of the two king slots (kings are always on the board).
pub const KING_RADIX: u64 = 64;
/// Radix of the remaining slots (64 squares plus the captured sentinel).
pub const OTHER_RADIX: u64 = 65;

/// A concrete placement: side to move plus one square per slot.
///
/// Slot squares follow the owning [`crate::pieces::PieceSet`]: slot 0 is the
/// black king, slot 1 the white king, the rest may be [`Square::DEAD`]. The
/// type is a plain value and carries no legality information; that is the
/// status classifier's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    turn: Color,
    squares: [Square; MAX_SLOTS],
    count: u8,
}

impl Position {
    /// Build from explicit squares. Kings must be live.
    pub fn new(turn: Color, squares: &[Square]) -> Position {
        assert!(
            (2..=MAX_SLOTS).contains(&squares.len()),
            "position needs 2..={MAX_SLOTS} slots"
        );
        assert!(
            !squares[0].is_dead() && !squares[1].is_dead(),
            "kings cannot be captured"
        );
        let mut buf = [Square::DEAD; MAX_SLOTS];
        buf[..squares.len()].copy_from_slice(squares);
        Position {
            turn,
            squares: buf,
            count: squares.len() as u8,
        }
    }

    /// Parse the external query format: `[turn, square, square, ...]` with
    /// turn 0 = White / 1 = Black, king squares in `0..64` and other squares
    /// in `0..=64` (64 meaning captured).
    pub fn from_raw(raw: &[u8]) -> Option<Position> {
        if raw.len() < 3 || raw.len() > MAX_SLOTS + 1 {
            return None;
        }
        let turn = Color::from_raw(raw[0])?;
        let mut squares = [Square::DEAD; MAX_SLOTS];
        for (i, &value) in raw[1..].iter().enumerate() {
            let sq = Square::new(value)?;
            if i < 2 && sq.is_dead() {
                return None;
            }
            squares[i] = sq;
        }
        Some(Position {
            turn,
            squares,
            count: (raw.len() - 1) as u8,
        })
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.count as usize
    }

    #[inline]
    pub fn square(&self, slot: usize) -> Square {
        debug_assert!(slot < self.slot_count());
        self.squares[slot]
    }

    #[inline]
    pub fn set_square(&mut self, slot: usize, sq: Square) {
        debug_assert!(slot < self.slot_count());
        debug_assert!(slot >= 2 || !sq.is_dead(), "kings cannot be captured");
        self.squares[slot] = sq;
    }

    #[inline]
    pub fn squares(&self) -> &[Square] {
        &self.squares[..self.slot_count()]
    }

    #[inline]
    pub fn flip_turn(&mut self) {
        self.turn = self.turn.opponent();
    }

    /// True iff some live slot occupies `sq`.
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.squares().iter().any(|&s| !s.is_dead() && s == sq)
    }

    /// The live slot occupying `sq`, if any.
    pub fn occupant(&self, sq: Square) -> Option<usize> {
        self.squares()
            .iter()
            .position(|&s| !s.is_dead() && s == sq)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.turn)?;
        for &sq in self.squares() {
            write!(f, " {sq}")?;
        }
        Ok(())
    }
}

/// The bijection between positions and dense table indices.
///
/// A position is read as a mixed-radix number with the turn most
/// significant, then one digit per slot: radix 64 for the kings, radix 65
/// for the rest. The total index space is `2 * 64 * 64 * 65^(k-2)`.
///
/// The codec is a plain value with no board knowledge, so a canonicalising
/// variant (symmetry reduction) can replace it without touching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCodec {
    slot_count: usize,
    total: u64,
}

impl IndexCodec {
    pub fn new(slot_count: usize) -> Result<IndexCodec, TableError> {
        if !(2..=MAX_SLOTS).contains(&slot_count) {
            return Err(TableError::InvalidConfig {
                reason: format!("codec needs 2..={MAX_SLOTS} slots, got {slot_count}"),
            });
        }
        let mut total: u64 = 2 * KING_RADIX * KING_RADIX;
        for _ in 2..slot_count {
            total *= OTHER_RADIX;
        }
        if total > u32::MAX as u64 {
            return Err(TableError::InvalidConfig {
                reason: format!("{slot_count} slots need {total} indices, which exceeds u32"),
            });
        }
        Ok(IndexCodec { slot_count, total })
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    #[inline]
    pub fn total_positions(&self) -> u32 {
        self.total as u32
    }

    #[inline]
    fn radix(&self, slot: usize) -> u64 {
        if slot < 2 {
            KING_RADIX
        } else {
            OTHER_RADIX
        }
    }

    pub fn to_index(&self, pos: &Position) -> u32 {
        debug_assert_eq!(pos.slot_count(), self.slot_count);
        let mut index = pos.turn().raw() as u64;
        for slot in 0..self.slot_count {
            index = index * self.radix(slot) + pos.square(slot).raw() as u64;
        }
        debug_assert!(index < self.total);
        index as u32
    }

    pub fn from_index(&self, index: u32) -> Position {
        debug_assert!((index as u64) < self.total);
        let mut rest = index as u64;
        let mut squares = [Square::DEAD; MAX_SLOTS];
        for slot in (0..self.slot_count).rev() {
            let radix = self.radix(slot);
            squares[slot] = Square::new((rest % radix) as u8).expect("digit in radix range");
            rest /= radix;
        }
        let turn = Color::from_raw(rest as u8).expect("turn digit is 0 or 1");
        Position {
            turn,
            squares,
            count: self.slot_count as u8,
        }
    }

    /// Side to move of an index, without a full decode.
    #[inline]
    pub fn turn_of(&self, index: u32) -> Color {
        if (index as u64) < self.total / 2 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Walk the whole index space asserting `to_index(from_index(i)) == i`.
    ///
    /// A failure is a programming error in the codec, so this panics rather
    /// than returning an error.
    pub fn verify_round_trip(&self) {
        for index in 0..self.total_positions() {
            let pos = self.from_index(index);
            let back = self.to_index(&pos);
            assert_eq!(index, back, "codec round trip failed at {index}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_match_the_mixed_radix() {
        assert_eq!(IndexCodec::new(2).unwrap().total_positions(), 2 * 64 * 64);
        assert_eq!(
            IndexCodec::new(3).unwrap().total_positions(),
            2 * 64 * 64 * 65
        );
        assert_eq!(
            IndexCodec::new(4).unwrap().total_positions(),
            2 * 64 * 64 * 65 * 65
        );
        assert!(IndexCodec::new(1).is_err());
        assert!(IndexCodec::new(MAX_SLOTS + 1).is_err());
    }

    #[test]
    fn index_layout_is_turn_major() {
        let codec = IndexCodec::new(3).unwrap();
        let zero = codec.from_index(0);
        assert_eq!(zero.turn(), Color::White);
        assert_eq!(zero.squares(), &[Square::new(0).unwrap(); 3][..]);

        // The least significant digit is the last slot.
        let one = codec.from_index(1);
        assert_eq!(one.square(2), Square::new(1).unwrap());

        let black_half = codec.from_index(codec.total_positions() / 2);
        assert_eq!(black_half.turn(), Color::Black);
        assert_eq!(codec.turn_of(codec.total_positions() / 2), Color::Black);
        assert_eq!(codec.turn_of(codec.total_positions() / 2 - 1), Color::White);
    }

    #[test]
    fn three_slot_codec_is_a_bijection() {
        IndexCodec::new(3).unwrap().verify_round_trip();
    }

    #[test]
    fn positions_encode_and_decode() {
        let codec = IndexCodec::new(4).unwrap();
        let pos = Position::from_raw(&[1, 56, 42, 41, 64]).unwrap();
        assert_eq!(pos.turn(), Color::Black);
        assert!(pos.square(3).is_dead());

        let index = codec.to_index(&pos);
        assert_eq!(codec.from_index(index), pos);
    }

    #[test]
    fn raw_positions_are_validated() {
        assert!(Position::from_raw(&[2, 0, 8]).is_none());
        assert!(Position::from_raw(&[0, 64, 8]).is_none());
        assert!(Position::from_raw(&[0, 0, 8, 65]).is_none());
        assert!(Position::from_raw(&[0, 0]).is_none());
        assert!(Position::from_raw(&[0, 0, 8, 16, 24, 32, 40]).is_none());
    }

    #[test]
    fn occupancy_ignores_dead_slots() {
        let pos = Position::from_raw(&[0, 0, 8, 64]).unwrap();
        assert!(pos.is_occupied(Square::new(8).unwrap()));
        assert_eq!(pos.occupant(Square::new(8).unwrap()), Some(1));
        assert!(!pos.is_occupied(Square::DEAD));
        assert_eq!(pos.occupant(Square::new(20).unwrap()), None);
    }
}
