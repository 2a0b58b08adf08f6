use std::fmt;

use crate::board::Square;
use crate::codec::{IndexCodec, Position};
use crate::pieces::{Color, PieceKind, PieceSet};
use crate::rules::{BISHOP_DIRS, KNIGHT_JUMPS, QUEEN_DIRS, ROOK_DIRS};

/// Upper bound on legal moves from one position.
///
/// The worst case for four pieces is a king plus two queens against a bare
/// king: 8 + 27 + 25 = 60 moves.
pub const MAX_MOVES: usize = 64;

/// Legality of an encoded position, as seen by the move generator.
///
/// During a build this is answered from the status array; at query time it
/// is answered from whichever arrays the table was loaded with.
pub trait Legality {
    fn is_legal(&self, index: u32) -> bool;
}

/// A capture rider on a [`Move`]: the slot that dies and the square it
/// died on (always the mover's destination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub slot: usize,
    pub from: Square,
}

/// One legal move: `slot` travels `from -> to`, possibly capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub slot: usize,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Capture>,
}

impl Move {
    const NONE: Move = Move {
        slot: 0,
        from: Square::DEAD,
        to: Square::DEAD,
        captured: None,
    };
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if self.captured.is_some() {
            write!(f, "x")?;
        }
        Ok(())
    }
}

/// Fixed-capacity move buffer.
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[inline]
    pub const fn new() -> MoveList {
        MoveList {
            moves: [Move::NONE; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        assert!(self.len < MAX_MOVES, "move buffer overflow");
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves[..self.len].iter()
    }

    #[inline]
    pub fn at(&self, i: usize) -> Move {
        debug_assert!(i < self.len);
        self.moves[i]
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

/// What a candidate destination square held before the move.
enum Target {
    Empty,
    Own,
    Enemy,
}

/// The legal-move generator for one piece set.
///
/// A candidate move is legal iff the resulting position (mover placed,
/// capture applied, turn flipped) is not of an illegal kind; moving into
/// check is caught because the mover's king would then be attacked with the
/// opponent to move.
pub struct MoveGen<'a> {
    set: &'a PieceSet,
    codec: &'a IndexCodec,
    oracle: &'a dyn Legality,
}

impl<'a> MoveGen<'a> {
    pub fn new(set: &'a PieceSet, codec: &'a IndexCodec, oracle: &'a dyn Legality) -> MoveGen<'a> {
        assert_eq!(set.slot_count(), codec.slot_count());
        MoveGen { set, codec, oracle }
    }

    /// Invoke `f` with every legal move and the successor's encoded index.
    ///
    /// Produces nothing when the position itself is illegal.
    pub fn for_each_legal(&self, pos: &Position, mut f: impl FnMut(Move, u32)) {
        if !self.oracle.is_legal(self.codec.to_index(pos)) {
            return;
        }

        let turn = pos.turn();
        for slot in 0..self.set.slot_count() {
            let piece = self.set.piece(slot);
            if piece.color != turn || pos.square(slot).is_dead() {
                continue;
            }
            match piece.kind {
                PieceKind::King => self.gen_steps(pos, slot, &QUEEN_DIRS, &mut f),
                PieceKind::Knight => self.gen_steps(pos, slot, &KNIGHT_JUMPS, &mut f),
                PieceKind::Rook => self.gen_rider(pos, slot, &ROOK_DIRS, &mut f),
                PieceKind::Bishop => self.gen_rider(pos, slot, &BISHOP_DIRS, &mut f),
                PieceKind::Queen => self.gen_rider(pos, slot, &QUEEN_DIRS, &mut f),
                PieceKind::Pawn => self.gen_pawn(pos, slot, &mut f),
            }
        }
    }

    /// All legal moves of `pos` as a buffer.
    pub fn legal_moves(&self, pos: &Position) -> MoveList {
        let mut out = MoveList::new();
        self.for_each_legal(pos, |mv, _| out.push(mv));
        out
    }

    /// The position after a legal move: mover placed, captured slot marked
    /// dead, turn flipped. The result must be legal.
    pub fn successor(&self, pos: &Position, mv: &Move) -> Position {
        let mut next = *pos;
        next.set_square(mv.slot, mv.to);
        if let Some(capture) = mv.captured {
            next.set_square(capture.slot, Square::DEAD);
        }
        next.flip_turn();
        assert!(
            self.oracle.is_legal(self.codec.to_index(&next)),
            "applied move {mv} leads to an illegal position"
        );
        next
    }

    fn gen_steps(
        &self,
        pos: &Position,
        slot: usize,
        steps: &[(i8, i8)],
        f: &mut impl FnMut(Move, u32),
    ) {
        let from = pos.square(slot);
        for &(dr, dc) in steps {
            if let Some(to) = from.offset(dr, dc) {
                self.probe(pos, slot, to, f);
            }
        }
    }

    fn gen_rider(
        &self,
        pos: &Position,
        slot: usize,
        dirs: &[(i8, i8)],
        f: &mut impl FnMut(Move, u32),
    ) {
        let from = pos.square(slot);
        for &(dr, dc) in dirs {
            let mut cur = from;
            while let Some(to) = cur.offset(dr, dc) {
                match self.probe(pos, slot, to, f) {
                    Target::Empty => cur = to,
                    Target::Own | Target::Enemy => break,
                }
            }
        }
    }

    fn gen_pawn(&self, pos: &Position, slot: usize, f: &mut impl FnMut(Move, u32)) {
        let color = self.set.piece(slot).color;
        let (forward, start_row): (i8, i8) = match color {
            Color::White => (1, 1),
            Color::Black => (-1, 6),
        };
        let from = pos.square(slot);

        // Single push, and the double push only through an empty square.
        if let Some(one) = from.offset(forward, 0) {
            if pos.occupant(one).is_none() {
                self.push_if_legal(pos, slot, one, None, f);
                if from.row() == start_row {
                    if let Some(two) = from.offset(2 * forward, 0) {
                        if pos.occupant(two).is_none() {
                            self.push_if_legal(pos, slot, two, None, f);
                        }
                    }
                }
            }
        }

        // Diagonal moves are captures only.
        for dc in [-1, 1] {
            if let Some(to) = from.offset(forward, dc) {
                if let Some(occupant) = pos.occupant(to) {
                    if self.set.piece(occupant).color != color {
                        self.push_if_legal(pos, slot, to, Some(occupant), f);
                    }
                }
            }
        }
    }

    /// Try a non-pawn move to `to`, reporting what occupied the square. Own
    /// pieces block; enemy pieces are captured.
    fn probe(
        &self,
        pos: &Position,
        slot: usize,
        to: Square,
        f: &mut impl FnMut(Move, u32),
    ) -> Target {
        match pos.occupant(to) {
            Some(occupant) if self.set.piece(occupant).color == self.set.piece(slot).color => {
                Target::Own
            }
            Some(occupant) => {
                self.push_if_legal(pos, slot, to, Some(occupant), f);
                Target::Enemy
            }
            None => {
                self.push_if_legal(pos, slot, to, None, f);
                Target::Empty
            }
        }
    }

    fn push_if_legal(
        &self,
        pos: &Position,
        slot: usize,
        to: Square,
        captured_slot: Option<usize>,
        f: &mut impl FnMut(Move, u32),
    ) {
        let mut next = *pos;
        next.set_square(slot, to);
        if let Some(captured) = captured_slot {
            next.set_square(captured, Square::DEAD);
        }
        next.flip_turn();

        let index = self.codec.to_index(&next);
        if self.oracle.is_legal(index) {
            f(
                Move {
                    slot,
                    from: pos.square(slot),
                    to,
                    captured: captured_slot.map(|slot| Capture { slot, from: to }),
                },
                index,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::Piece;
    use crate::table::classify_for_tests;

    fn context(others: &[Piece]) -> (PieceSet, IndexCodec, Vec<u8>) {
        let set = PieceSet::with_others(others).unwrap();
        let codec = IndexCodec::new(set.slot_count()).unwrap();
        let status = classify_for_tests(&set, &codec);
        (set, codec, status)
    }

    struct Oracle<'a>(&'a [u8]);
    impl Legality for Oracle<'_> {
        fn is_legal(&self, index: u32) -> bool {
            use crate::table::Status;
            Status::from_bits(self.0[index as usize]).is_legal()
        }
    }

    fn moves_of(
        set: &PieceSet,
        codec: &IndexCodec,
        status: &[u8],
        raw: &[u8],
    ) -> Vec<Move> {
        let oracle = Oracle(status);
        let gen = MoveGen::new(set, codec, &oracle);
        let pos = Position::from_raw(raw).unwrap();
        gen.legal_moves(&pos).iter().copied().collect()
    }

    #[test]
    fn cornered_king_has_three_moves() {
        let (set, codec, status) = context(&[]);
        // Kings a1 and h8, far apart.
        let moves = moves_of(&set, &codec, &status, &[0, 63, 0]);
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|m| m.slot == 1 && m.captured.is_none()));
    }

    #[test]
    fn king_moves_avoid_the_enemy_king() {
        let (set, codec, status) = context(&[]);
        // White king a1 with the black king on c1: b1 and b2 are out.
        let moves = moves_of(&set, &codec, &status, &[0, 2, 0]);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to.raw(), 8);
    }

    #[test]
    fn king_captures_an_unprotected_piece() {
        let (set, codec, status) =
            context(&[Piece::new(Color::Black, PieceKind::Rook)]);
        // White king a1 in check from the rook on a2; the black king is on
        // a8, too far to protect it.
        let moves = moves_of(&set, &codec, &status, &[0, 56, 0, 8]);
        assert_eq!(moves.len(), 2);

        let capture = moves.iter().find(|m| m.captured.is_some()).unwrap();
        assert_eq!(capture.to.raw(), 8);
        assert_eq!(
            capture.captured,
            Some(Capture {
                slot: 2,
                from: Square::new(8).unwrap()
            })
        );
        // The other escape is b1; b2 stays covered by the rook.
        assert!(moves.iter().any(|m| m.to.raw() == 1));
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let (set, codec, status) =
            context(&[Piece::new(Color::White, PieceKind::Rook)]);
        // Rook a2, its own king on a1 behind it, black king on h8: six
        // squares up the file plus seven along the rank.
        let moves = moves_of(&set, &codec, &status, &[0, 63, 0, 8]);
        let rook_moves: Vec<_> = moves.iter().filter(|m| m.slot == 2).collect();
        assert_eq!(rook_moves.len(), 13);
        // Never onto its own king's square.
        assert!(rook_moves.iter().all(|m| m.to.raw() != 0));
    }

    #[test]
    fn pawn_pushes_single_and_double_from_its_start_rank() {
        let (set, codec, status) =
            context(&[Piece::new(Color::White, PieceKind::Pawn)]);

        // Pawn b2, kings far away: single and double push.
        let moves = moves_of(&set, &codec, &status, &[0, 63, 0, 9]);
        let pawn: Vec<_> = moves.iter().filter(|m| m.slot == 2).collect();
        assert_eq!(pawn.len(), 2);
        assert!(pawn.iter().any(|m| m.to.raw() == 17));
        assert!(pawn.iter().any(|m| m.to.raw() == 25));

        // The black king on b4 blocks the double push.
        let moves = moves_of(&set, &codec, &status, &[0, 25, 0, 9]);
        let pawn: Vec<_> = moves.iter().filter(|m| m.slot == 2).collect();
        assert_eq!(pawn.len(), 1);
        assert_eq!(pawn[0].to.raw(), 17);

        // Off the start rank only the single push remains.
        let moves = moves_of(&set, &codec, &status, &[0, 63, 0, 17]);
        let pawn: Vec<_> = moves.iter().filter(|m| m.slot == 2).collect();
        assert_eq!(pawn.len(), 1);
        assert_eq!(pawn[0].to.raw(), 25);
    }

    #[test]
    fn applying_a_move_flips_the_turn_and_buries_captures() {
        let (set, codec, status) =
            context(&[Piece::new(Color::Black, PieceKind::Rook)]);
        let oracle = Oracle(&status);
        let gen = MoveGen::new(&set, &codec, &oracle);

        let pos = Position::from_raw(&[0, 56, 0, 8]).unwrap();
        let capture = gen
            .legal_moves(&pos)
            .iter()
            .copied()
            .find(|m| m.captured.is_some())
            .unwrap();
        let next = gen.successor(&pos, &capture);

        assert_eq!(next.turn(), Color::Black);
        assert_eq!(next.square(1).raw(), 8);
        assert!(next.square(2).is_dead());
    }
}
