//! Dense CSR store of legal successor indices.
//!
//! `offsets` has one entry per position plus a terminator; the successor
//! indices of position `p` occupy `arena[offsets[p]..offsets[p + 1]]`.
//! Illegal positions contribute an empty range. The arena is pre-sized from
//! [`crate::table::BuildLimits::moves_per_position`] and never grows.

use crate::codec::IndexCodec;
use crate::pieces::PieceSet;
use crate::rules::movegen::MoveGen;
use crate::table::resources::{try_reserve, ArenaBudget};
use crate::table::status::StatusOracle;
use crate::table::{BuildLimits, Status, TableError};

pub struct MoveCache {
    offsets: Vec<u64>,
    arena: Vec<u32>,
}

impl MoveCache {
    /// Generate and store the legal successors of every legal position.
    pub(crate) fn build(
        set: &PieceSet,
        codec: &IndexCodec,
        status: &[u8],
        limits: &BuildLimits,
    ) -> Result<MoveCache, TableError> {
        let total = codec.total_positions() as usize;
        let arena_limit = limits.moves_per_position * total as u64;

        let mut offsets: Vec<u64> = Vec::new();
        try_reserve("cache_alloc", "offsets", &mut offsets, total + 1)?;
        let mut arena: Vec<u32> = Vec::new();
        try_reserve("cache_alloc", "successor_arena", &mut arena, arena_limit as usize)?;
        let mut budget = ArenaBudget::new(arena_limit);

        let oracle = StatusOracle(status);
        let gen = MoveGen::new(set, codec, &oracle);

        for p in 0..total {
            offsets.push(arena.len() as u64);
            if !Status::from_bits(status[p]).is_legal() {
                continue;
            }
            let pos = codec.from_index(p as u32);
            let mut overflow = None;
            gen.for_each_legal(&pos, |_, successor| {
                if overflow.is_some() {
                    return;
                }
                match budget.bump("cache_fill", 1) {
                    Ok(()) => arena.push(successor),
                    Err(err) => overflow = Some(err),
                }
            });
            if let Some(err) = overflow {
                return Err(err);
            }
        }
        offsets.push(arena.len() as u64);

        debug_assert_eq!(offsets.len(), total + 1);
        debug_assert_eq!(budget.used(), arena.len() as u64);
        Ok(MoveCache { offsets, arena })
    }

    /// The legal successor indices of position `p`.
    #[inline]
    pub fn successors(&self, p: u32) -> &[u32] {
        let lo = self.offsets[p as usize] as usize;
        let hi = self.offsets[p as usize + 1] as usize;
        &self.arena[lo..hi]
    }

    #[inline]
    pub fn move_count(&self, p: u32) -> usize {
        (self.offsets[p as usize + 1] - self.offsets[p as usize]) as usize
    }

    /// Total successor entries across all positions.
    #[inline]
    pub fn successor_count(&self) -> u64 {
        self.arena.len() as u64
    }
}
