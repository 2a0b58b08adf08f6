//! The promotion bridge.
//!
//! A pawn on its promotion rank stands for the promoted position, which
//! belongs to a different piece set (the pawn replaced by a queen). That
//! companion table shares this table's index space slot for slot, so the
//! bridge simply overwrites V and S at the same index, making every
//! promotion-reachable position terminal here with the inherited value.
//!
//! The companion must already be on disk: tables form a DAG and are built
//! in dependency order.

use std::path::Path;

use log::info;

use crate::codec::IndexCodec;
use crate::pieces::{Color, PieceSet};
use crate::table::status::{pawn_on_row, promotion_row};
use crate::table::{store, Status, TableError};

/// Overwrite V/S of every legal position with a pawn on its promotion rank
/// from the colour's companion table. Returns the number of positions
/// bridged.
pub(crate) fn bridge_promotions(
    set: &PieceSet,
    codec: &IndexCodec,
    dir: &Path,
    values: &mut [i8],
    status: &mut [u8],
) -> Result<u64, TableError> {
    let mut bridged = 0;
    for color in [Color::White, Color::Black] {
        let Some(companion) = set.promotion_companion(color) else {
            continue;
        };

        let total = codec.total_positions() as u64;
        let companion_values =
            store::load_values(dir, &companion, total).map_err(companion_error)?;
        let companion_status =
            store::load_status(dir, &companion, total).map_err(companion_error)?;

        let pawn_slots: Vec<usize> = set.pawn_slots(color).collect();
        let row = promotion_row(color);

        let mut count = 0;
        for p in 0..values.len() {
            if !Status::from_bits(status[p]).is_legal() {
                continue;
            }
            let pos = codec.from_index(p as u32);
            if pawn_on_row(pos.squares(), &pawn_slots, row) {
                values[p] = companion_values[p];
                status[p] = companion_status[p];
                count += 1;
            }
        }
        info!(
            "bridged {count} positions for {color} pawns into table {}",
            companion.id()
        );
        bridged += count;
    }
    Ok(bridged)
}

fn companion_error(err: TableError) -> TableError {
    match err {
        TableError::MissingTable { path } => TableError::MissingCompanion { path },
        other => other,
    }
}
