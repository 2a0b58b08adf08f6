//! The tablebase engine: status classification, the move cache, the
//! retrograde solver, the promotion bridge and persistence, glued together
//! by [`Tablebase`].
//!
//! A build allocates two dense byte arrays over the whole index space (the
//! value array **V** and the status array **S**) plus the CSR move cache,
//! sweeps them to a fixed point, rewrites the sentinels and saves the raw
//! arrays to disk. A load maps the files back; the move cache is never
//! persisted (queries regenerate moves on demand).

use std::fmt;
use std::ops::BitOr;
use std::path::Path;

use log::{debug, info};

use crate::codec::IndexCodec;
use crate::pieces::PieceSet;
use crate::rules::movegen::Legality;

mod cache;
mod promote;
mod resources;
mod solve;
pub mod stats;
mod status;
pub mod store;

pub use cache::MoveCache;

/// Value sentinel: not yet determined. Rewritten before save.
pub const UNKNOWN: i8 = -128;
/// Value sentinel after rewrite: the position is illegal.
pub const ILLEGAL: i8 = -127;
/// Value sentinel after rewrite: reachable but drawn.
pub const UNFORCEABLE: i8 = -126;

/// One byte of status bits per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const NONE: Status = Status(0);
    /// Illegal: the kings are within Chebyshev distance 1.
    pub const KINGS_ADJACENT: Status = Status(1);
    /// Illegal: two live pieces share a square.
    pub const ON_TOP: Status = Status(2);
    /// Illegal: the side **not** to move is in check.
    pub const BAD_CHECK: Status = Status(4);
    /// Illegal: a pawn sits on its pre-initial rank.
    pub const BAD_PAWN: Status = Status(8);
    /// The side to move is in check.
    pub const IN_CHECK: Status = Status(16);
    /// In check with no legal moves.
    pub const IN_CHECK_MATE: Status = Status(32);
    /// Not in check, no legal moves.
    pub const IN_STALE_MATE: Status = Status(64);
    /// Draw by insufficient material, immediate or forced.
    pub const INSUFFICIENT_MATERIAL: Status = Status(128);

    const ILLEGAL_MASK: u8 = 1 | 2 | 4 | 8;

    #[inline]
    pub fn from_bits(bits: u8) -> Status {
        Status(bits)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: Status) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(self, other: Status) -> bool {
        self.0 & other.0 != 0
    }

    /// True iff none of the four illegal bits is set.
    #[inline]
    pub fn is_legal(self) -> bool {
        self.0 & Self::ILLEGAL_MASK == 0
    }
}

impl BitOr for Status {
    type Output = Status;

    #[inline]
    fn bitor(self, rhs: Status) -> Status {
        Status(self.0 | rhs.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Status, &str); 8] = [
            (Status::KINGS_ADJACENT, "KINGS_ADJACENT"),
            (Status::ON_TOP, "ON_TOP"),
            (Status::BAD_CHECK, "BAD_CHECK"),
            (Status::BAD_PAWN, "BAD_PAWN"),
            (Status::IN_CHECK, "IN_CHECK"),
            (Status::IN_CHECK_MATE, "IN_CHECK_MATE"),
            (Status::IN_STALE_MATE, "IN_STALE_MATE"),
            (Status::INSUFFICIENT_MATERIAL, "INSUFFICIENT_MATERIAL"),
        ];
        let mut first = true;
        for (bit, name) in NAMES {
            if self.contains(bit) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        Ok(())
    }
}

/// Engine errors. Internal invariant violations panic instead; everything
/// the caller can provoke or recover from is reported here.
#[derive(Debug)]
pub enum TableError {
    InvalidConfig {
        reason: String,
    },
    LimitExceeded {
        stage: &'static str,
        metric: &'static str,
        limit: u64,
        observed: u64,
    },
    AllocationFailed {
        stage: &'static str,
        structure: &'static str,
    },
    Io {
        stage: &'static str,
        path: String,
        error: String,
    },
    /// A table file is absent; the caller may fall back to building it.
    MissingTable {
        path: String,
    },
    /// The post-promotion companion table is not on disk. Tables must be
    /// built in dependency order.
    MissingCompanion {
        path: String,
    },
    /// A table file exists but has the wrong length for its piece set.
    BadTableFile {
        path: String,
        expected_len: u64,
        actual_len: u64,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
            TableError::LimitExceeded {
                stage,
                metric,
                limit,
                observed,
            } => write!(
                f,
                "limit exceeded at {stage}: {metric} (limit={limit}, observed={observed})"
            ),
            TableError::AllocationFailed { stage, structure } => {
                write!(f, "allocation failed at {stage} for {structure}")
            }
            TableError::Io { stage, path, error } => {
                write!(f, "io error at {stage} for {path}: {error}")
            }
            TableError::MissingTable { path } => write!(f, "table file {path} not found"),
            TableError::MissingCompanion { path } => write!(
                f,
                "promotion companion table {path} not found; build it first"
            ),
            TableError::BadTableFile {
                path,
                expected_len,
                actual_len,
            } => write!(
                f,
                "table file {path} has {actual_len} bytes, expected {expected_len}"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Build-time resource configuration.
#[derive(Debug, Clone, Copy)]
pub struct BuildLimits {
    /// The successor arena is pre-sized to this many entries per position
    /// and never grows past it.
    pub moves_per_position: u64,
    /// Verify the codec bijection over the whole index space before
    /// building.
    pub verify_codec: bool,
}

impl Default for BuildLimits {
    fn default() -> Self {
        Self {
            moves_per_position: 15,
            verify_codec: true,
        }
    }
}

/// A built or loaded tablebase: the value array, optionally the status
/// array, and the piece set and codec they are indexed by.
///
/// The arrays are owned exclusively by this struct; external collaborators
/// read them only through the query surface in [`crate::query`].
#[derive(Debug)]
pub struct Tablebase {
    set: PieceSet,
    codec: IndexCodec,
    values: Vec<i8>,
    status: Option<Vec<u8>>,
}

impl Tablebase {
    /// Build the table for `set`, save it under `dir` and return it.
    ///
    /// If the set contains pawns, the post-promotion companion tables must
    /// already be on disk under `dir`.
    pub fn build(set: PieceSet, dir: &Path, limits: &BuildLimits) -> Result<Tablebase, TableError> {
        let codec = IndexCodec::new(set.slot_count())?;
        let total = codec.total_positions() as usize;
        info!("building table {} over {total} positions", set.id());

        if limits.verify_codec {
            codec.verify_round_trip();
            debug!("codec round trip verified over {total} indices");
        }

        let mut values: Vec<i8> = Vec::new();
        resources::try_reserve("build_alloc", "values", &mut values, total)?;
        values.resize(total, UNKNOWN);

        let mut status: Vec<u8> = Vec::new();
        resources::try_reserve("build_alloc", "status", &mut status, total)?;
        status.resize(total, 0);

        let kings = status::mark_kings_adjacent(&codec, &mut status);
        info!("{kings} positions with adjacent kings");
        let stacked = status::mark_on_top(&codec, &mut status);
        info!("{stacked} positions with stacked pieces");
        let bad_pawns = status::mark_bad_pawns(&set, &codec, &mut status);
        info!("{bad_pawns} positions with a pawn on its pre-initial rank");
        let (checks, bad_checks) = status::mark_checks(&set, &codec, &mut status);
        info!("{checks} positions in check, {bad_checks} with the idle side in check");

        let cache = MoveCache::build(&set, &codec, &status, limits)?;
        info!("move cache holds {} successor indices", cache.successor_count());

        let insufficient = status::mark_insufficient_material(&set, &codec, &mut status, &mut values);
        info!("{insufficient} positions with insufficient material");
        let stalemates = status::mark_terminal(&cache, &mut status, &mut values, false);
        info!("{stalemates} stalemates");
        let checkmates = status::mark_terminal(&cache, &mut status, &mut values, true);
        info!("{checkmates} checkmates");

        let bridged = promote::bridge_promotions(&set, &codec, dir, &mut values, &mut status)?;
        if bridged > 0 {
            info!("{bridged} positions inherit values across a promotion");
        }

        solve::run(&codec, &cache, &mut values, &mut status);
        solve::rewrite(&mut values, &status);

        store::save(dir, &set, &values, &status)?;

        let table = Tablebase {
            set,
            codec,
            values,
            status: Some(status),
        };
        let evaluation = stats::evaluate(&table.codec, &table.values, table.status_array().unwrap());
        store::write_summary(dir, &table.set, &evaluation)?;
        Ok(table)
    }

    /// Load a previously built table from `dir`.
    ///
    /// The status array is optional; without it, legality checks fall back
    /// to the rewritten value sentinels.
    pub fn load(set: PieceSet, dir: &Path, with_status: bool) -> Result<Tablebase, TableError> {
        let codec = IndexCodec::new(set.slot_count())?;
        let total = codec.total_positions() as u64;
        let values = store::load_values(dir, &set, total)?;
        let status = if with_status {
            Some(store::load_status(dir, &set, total)?)
        } else {
            None
        };
        info!("loaded table {} ({total} positions)", set.id());
        Ok(Tablebase {
            set,
            codec,
            values,
            status,
        })
    }

    #[inline]
    pub fn set(&self) -> &PieceSet {
        &self.set
    }

    #[inline]
    pub fn codec(&self) -> &IndexCodec {
        &self.codec
    }

    #[inline]
    pub fn values(&self) -> &[i8] {
        &self.values
    }

    #[inline]
    pub fn status_array(&self) -> Option<&[u8]> {
        self.status.as_deref()
    }

    /// Legality of an encoded index: from the status bits when present,
    /// otherwise from the rewritten value sentinel.
    #[inline]
    pub fn is_legal_index(&self, index: u32) -> bool {
        match &self.status {
            Some(status) => Status::from_bits(status[index as usize]).is_legal(),
            None => self.values[index as usize] != ILLEGAL,
        }
    }

    /// Evaluation statistics; needs the status array.
    pub fn evaluation(&self) -> Option<stats::Evaluation> {
        self.status_array()
            .map(|status| stats::evaluate(&self.codec, &self.values, status))
    }
}

impl Legality for Tablebase {
    #[inline]
    fn is_legal(&self, index: u32) -> bool {
        self.is_legal_index(index)
    }
}

/// Status array with the illegal-kind and check passes applied, for move
/// generation in unit tests.
#[cfg(test)]
pub(crate) fn classify_for_tests(set: &PieceSet, codec: &IndexCodec) -> Vec<u8> {
    let mut bits = vec![0u8; codec.total_positions() as usize];
    status::mark_kings_adjacent(codec, &mut bits);
    status::mark_on_top(codec, &mut bits);
    status::mark_bad_pawns(set, codec, &mut bits);
    status::mark_checks(set, codec, &mut bits);
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bits_match_the_wire_layout() {
        assert_eq!(Status::KINGS_ADJACENT.bits(), 1);
        assert_eq!(Status::ON_TOP.bits(), 2);
        assert_eq!(Status::BAD_CHECK.bits(), 4);
        assert_eq!(Status::BAD_PAWN.bits(), 8);
        assert_eq!(Status::IN_CHECK.bits(), 16);
        assert_eq!(Status::IN_CHECK_MATE.bits(), 32);
        assert_eq!(Status::IN_STALE_MATE.bits(), 64);
        assert_eq!(Status::INSUFFICIENT_MATERIAL.bits(), 128);
    }

    #[test]
    fn legality_ignores_non_illegal_bits() {
        assert!(Status::NONE.is_legal());
        assert!((Status::IN_CHECK | Status::IN_CHECK_MATE).is_legal());
        assert!(!(Status::IN_CHECK | Status::BAD_PAWN).is_legal());
        assert!(!Status::KINGS_ADJACENT.is_legal());
    }

    #[test]
    fn status_renders_bit_names() {
        assert_eq!(Status::NONE.to_string(), "NONE");
        assert_eq!(
            (Status::IN_CHECK | Status::IN_CHECK_MATE).to_string(),
            "IN_CHECK|IN_CHECK_MATE"
        );
    }
}
