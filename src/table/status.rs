//! Status classification passes.
//!
//! Each pass sweeps the whole index space once and may read the bits left
//! by earlier passes; a position receives at most one illegal bit. The
//! terminal passes (stalemate, checkmate) additionally need the move cache
//! for per-position move counts.

use crate::board::Square;
use crate::codec::IndexCodec;
use crate::pieces::{Color, PieceKind, PieceSet, MAX_SLOTS};
use crate::rules::attacks::attacks_enemy_king;
use crate::rules::movegen::Legality;
use crate::table::{MoveCache, Status};

/// Legality oracle over the status array, used while building.
pub(crate) struct StatusOracle<'a>(pub(crate) &'a [u8]);

impl Legality for StatusOracle<'_> {
    #[inline]
    fn is_legal(&self, index: u32) -> bool {
        Status::from_bits(self.0[index as usize]).is_legal()
    }
}

#[inline]
fn is_legal(status: &[u8], p: usize) -> bool {
    Status::from_bits(status[p]).is_legal()
}

/// Mark positions whose kings are within Chebyshev distance 1.
pub(crate) fn mark_kings_adjacent(codec: &IndexCodec, status: &mut [u8]) -> u64 {
    let mut count = 0;
    for p in 0..status.len() {
        let pos = codec.from_index(p as u32);
        if pos.square(0).chebyshev(pos.square(1)) <= 1 {
            status[p] |= Status::KINGS_ADJACENT.bits();
            count += 1;
        }
    }
    count
}

/// Mark positions where two live pieces share a square.
pub(crate) fn mark_on_top(codec: &IndexCodec, status: &mut [u8]) -> u64 {
    let mut count = 0;
    for p in 0..status.len() {
        if !is_legal(status, p) {
            continue;
        }
        let pos = codec.from_index(p as u32);

        let mut live = [0u8; MAX_SLOTS];
        let mut live_len = 0;
        for &sq in pos.squares() {
            if !sq.is_dead() {
                live[live_len] = sq.raw();
                live_len += 1;
            }
        }
        live[..live_len].sort_unstable();

        if live[..live_len].windows(2).any(|w| w[0] == w[1]) {
            status[p] |= Status::ON_TOP.bits();
            count += 1;
        }
    }
    count
}

/// Mark positions with a pawn on its pre-initial rank (white on row 0,
/// black on row 7).
pub(crate) fn mark_bad_pawns(set: &PieceSet, codec: &IndexCodec, status: &mut [u8]) -> u64 {
    let pawn_slots: Vec<(usize, i8)> = set
        .slots()
        .iter()
        .enumerate()
        .skip(2)
        .filter(|(_, p)| p.kind == PieceKind::Pawn)
        .map(|(slot, p)| {
            let bad_row = match p.color {
                Color::White => 0,
                Color::Black => 7,
            };
            (slot, bad_row)
        })
        .collect();
    if pawn_slots.is_empty() {
        return 0;
    }

    let mut count = 0;
    for p in 0..status.len() {
        if !is_legal(status, p) {
            continue;
        }
        let pos = codec.from_index(p as u32);
        for &(slot, bad_row) in &pawn_slots {
            let sq = pos.square(slot);
            if !sq.is_dead() && sq.row() == bad_row {
                status[p] |= Status::BAD_PAWN.bits();
                count += 1;
                break;
            }
        }
    }
    count
}

/// Run the attack predicates for every non-king piece: an attack on the
/// side-to-move's king is IN_CHECK, an attack on the idle side's king is
/// BAD_CHECK. Returns `(in_check, bad_check)` marking counts.
pub(crate) fn mark_checks(set: &PieceSet, codec: &IndexCodec, status: &mut [u8]) -> (u64, u64) {
    let mut in_check = 0;
    let mut bad_check = 0;
    for p in 0..status.len() {
        if !is_legal(status, p) {
            continue;
        }
        let pos = codec.from_index(p as u32);
        for slot in 2..set.slot_count() {
            if !attacks_enemy_king(set, &pos, slot) {
                continue;
            }
            let defender = set.piece(slot).color.opponent();
            if defender == pos.turn() {
                status[p] |= Status::IN_CHECK.bits();
                in_check += 1;
            } else {
                status[p] |= Status::BAD_CHECK.bits();
                bad_check += 1;
            }
        }
    }
    (in_check, bad_check)
}

/// Mark the base insufficient-material positions: no live non-king piece,
/// or the only one is a bishop or knight. Their value is an immediate draw.
pub(crate) fn mark_insufficient_material(
    set: &PieceSet,
    codec: &IndexCodec,
    status: &mut [u8],
    values: &mut [i8],
) -> u64 {
    let mut count = 0;
    for p in 0..status.len() {
        if !is_legal(status, p) {
            continue;
        }
        let pos = codec.from_index(p as u32);

        let mut live = 0;
        let mut mating_material = 0;
        for slot in 2..set.slot_count() {
            if pos.square(slot).is_dead() {
                continue;
            }
            live += 1;
            match set.piece(slot).kind {
                PieceKind::Bishop | PieceKind::Knight => {}
                _ => mating_material += 1,
            }
        }

        if live <= 1 && mating_material == 0 {
            status[p] |= Status::INSUFFICIENT_MATERIAL.bits();
            values[p] = 0;
            count += 1;
        }
    }
    count
}

/// Mark legal positions with zero legal moves: checkmates when
/// `in_check_required`, stalemates otherwise. Either way the value is 0.
pub(crate) fn mark_terminal(
    cache: &MoveCache,
    status: &mut [u8],
    values: &mut [i8],
    in_check_required: bool,
) -> u64 {
    let bit = if in_check_required {
        Status::IN_CHECK_MATE
    } else {
        Status::IN_STALE_MATE
    };

    let mut count = 0;
    for p in 0..status.len() {
        let s = Status::from_bits(status[p]);
        if !s.is_legal() || s.contains(Status::IN_CHECK) != in_check_required {
            continue;
        }
        if cache.move_count(p as u32) == 0 {
            status[p] |= bit.bits();
            values[p] = 0;
            count += 1;
        }
    }
    count
}

#[inline]
pub(crate) fn promotion_row(color: Color) -> i8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// True iff any live pawn of `slots` stands on `row`.
pub(crate) fn pawn_on_row(squares: &[Square], slots: &[usize], row: i8) -> bool {
    slots.iter().any(|&slot| {
        let sq = squares[slot];
        !sq.is_dead() && sq.row() == row
    })
}
