use std::fmt;

use crate::table::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Turn encoding used by the position codec: 0 = White, 1 = Black.
    #[inline]
    pub fn raw(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub fn from_raw(raw: u8) -> Option<Color> {
        match raw {
            0 => Some(Color::White),
            1 => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// One-letter code; the knight uses `N`.
    pub fn code(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    pub fn from_code(c: char) -> Option<PieceKind> {
        match c {
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'P' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { color, kind }
    }

    /// Two-character code, e.g. `WQ` or `BN`.
    pub fn code(self) -> String {
        let side = match self.color {
            Color::White => 'W',
            Color::Black => 'B',
        };
        format!("{side}{}", self.kind.code())
    }

    /// Parse a two-character code as produced by [`Piece::code`].
    pub fn from_code(code: &str) -> Option<Piece> {
        let mut chars = code.chars();
        let side = chars.next()?;
        let kind = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let color = match side {
            'W' => Color::White,
            'B' => Color::Black,
            _ => return None,
        };
        Some(Piece::new(color, PieceKind::from_code(kind)?))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Maximum number of piece slots (kings included) a table can hold.
///
/// The index space must fit in `u32` successor entries, which admits up to
/// three non-king slots.
pub const MAX_SLOTS: usize = 5;

/// A validated, ordered slot layout.
///
/// Slot 0 is always the black king and slot 1 the white king; slots 2.. hold
/// arbitrary non-king pieces of either colour. The slot order is fixed for
/// the lifetime of a table: it determines both the index encoding and the
/// on-disk file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSet {
    slots: Vec<Piece>,
}

impl PieceSet {
    /// Build a set from the non-king pieces; the kings are implied.
    pub fn with_others(others: &[Piece]) -> Result<PieceSet, TableError> {
        let mut slots = Vec::with_capacity(2 + others.len());
        slots.push(Piece::new(Color::Black, PieceKind::King));
        slots.push(Piece::new(Color::White, PieceKind::King));
        slots.extend_from_slice(others);
        PieceSet::from_slots(slots)
    }

    /// Build a set from the full slot list, checking the slot invariants.
    pub fn from_slots(slots: Vec<Piece>) -> Result<PieceSet, TableError> {
        if slots.len() < 2 || slots.len() > MAX_SLOTS {
            return Err(TableError::InvalidConfig {
                reason: format!(
                    "piece set must have 2..={MAX_SLOTS} slots, got {}",
                    slots.len()
                ),
            });
        }
        if slots[0] != Piece::new(Color::Black, PieceKind::King)
            || slots[1] != Piece::new(Color::White, PieceKind::King)
        {
            return Err(TableError::InvalidConfig {
                reason: "slot 0 must be the black king and slot 1 the white king".to_string(),
            });
        }
        for (i, piece) in slots.iter().enumerate().skip(2) {
            if piece.kind == PieceKind::King {
                return Err(TableError::InvalidConfig {
                    reason: format!("slot {i} holds a third king"),
                });
            }
        }
        Ok(PieceSet { slots })
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn piece(&self, slot: usize) -> Piece {
        self.slots[slot]
    }

    #[inline]
    pub fn slots(&self) -> &[Piece] {
        &self.slots
    }

    /// Table identifier: the concatenated codes of the non-king slots.
    ///
    /// A bare-kings set has no non-king slots and is named `KK`.
    pub fn id(&self) -> String {
        if self.slots.len() == 2 {
            return "KK".to_string();
        }
        self.slots[2..].iter().map(|p| p.code()).collect()
    }

    /// The piece set this one promotes into for the given colour: the first
    /// pawn of that colour replaced by a queen. `None` when the colour has
    /// no pawn.
    pub fn promotion_companion(&self, color: Color) -> Option<PieceSet> {
        let pawn = Piece::new(color, PieceKind::Pawn);
        let slot = self.slots.iter().position(|&p| p == pawn)?;
        let mut slots = self.slots.clone();
        slots[slot] = Piece::new(color, PieceKind::Queen);
        Some(PieceSet { slots })
    }

    /// Slots holding a pawn of the given colour.
    pub fn pawn_slots(&self, color: Color) -> impl Iterator<Item = usize> + '_ {
        let pawn = Piece::new(color, PieceKind::Pawn);
        self.slots
            .iter()
            .enumerate()
            .filter(move |(_, &p)| p == pawn)
            .map(|(i, _)| i)
    }
}

impl fmt::Display for PieceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
