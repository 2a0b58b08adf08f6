//! The read-only probing surface.
//!
//! Front ends see the table arrays only through these operations: the value
//! and status of a position, the expected winner, the legal moves (computed
//! on demand; the move cache is a build-time structure and is never
//! persisted), and move application.
//!
//! Queries never fail: an out-of-range or illegal position yields
//! [`ILLEGAL`](crate::table::ILLEGAL) / `None` / an empty move list.

use crate::codec::Position;
use crate::pieces::Color;
use crate::rules::movegen::{Move, MoveGen, MoveList};
use crate::table::{Status, Tablebase, ILLEGAL, UNFORCEABLE, UNKNOWN};

/// A legal move annotated with the successor's table verdict.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedMove {
    pub mv: Move,
    pub value: i8,
    pub winner: Option<Color>,
}

impl Tablebase {
    #[inline]
    fn index_of(&self, pos: &Position) -> Option<u32> {
        if pos.slot_count() != self.codec().slot_count() {
            return None;
        }
        Some(self.codec().to_index(pos))
    }

    /// The stored game value of `pos`; [`ILLEGAL`] when the position does
    /// not belong to this table.
    pub fn value(&self, pos: &Position) -> i8 {
        match self.index_of(pos) {
            Some(index) => self.values()[index as usize],
            None => ILLEGAL,
        }
    }

    /// The status bits of `pos`, when the status array is loaded.
    pub fn position_status(&self, pos: &Position) -> Option<Status> {
        let index = self.index_of(pos)?;
        self.status_array()
            .map(|status| Status::from_bits(status[index as usize]))
    }

    /// Who wins `pos` under optimal play; `None` for illegal and drawn
    /// positions. A value of 0 means the side to move is checkmated, so the
    /// winner is its opponent.
    pub fn expected_winner(&self, pos: &Position) -> Option<Color> {
        let index = self.index_of(pos)?;
        if !self.is_legal_index(index) {
            return None;
        }
        if let Some(status) = self.status_array() {
            let s = Status::from_bits(status[index as usize]);
            if s.intersects(Status::IN_STALE_MATE | Status::INSUFFICIENT_MATERIAL) {
                return None;
            }
        }

        match self.values()[index as usize] {
            UNKNOWN | UNFORCEABLE => None,
            0 => Some(pos.turn().opponent()),
            v if v > 0 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    /// The legal moves of `pos`, generated on demand.
    pub fn legal_moves(&self, pos: &Position) -> MoveList {
        if self.index_of(pos).is_none() {
            return MoveList::new();
        }
        MoveGen::new(self.set(), self.codec(), self).legal_moves(pos)
    }

    /// The legal moves of `pos`, each annotated with the successor's value
    /// and expected winner.
    pub fn annotated_moves(&self, pos: &Position) -> Vec<AnnotatedMove> {
        let moves = self.legal_moves(pos);
        let mut out = Vec::with_capacity(moves.len());
        for &mv in moves.iter() {
            let next = self.apply(pos, &mv);
            out.push(AnnotatedMove {
                mv,
                value: self.value(&next),
                winner: self.expected_winner(&next),
            });
        }
        out
    }

    /// Apply a legal move, producing the successor position (captures
    /// included). Asserts that the result is legal.
    pub fn apply(&self, pos: &Position, mv: &Move) -> Position {
        MoveGen::new(self.set(), self.codec(), self).successor(pos, mv)
    }
}
