//! Evaluation statistics over the finished arrays.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::codec::IndexCodec;
use crate::pieces::Color;
use crate::table::{Status, UNFORCEABLE, UNKNOWN};

/// Per-category position counts for one table.
///
/// Mate histograms are keyed by distance: `mate_in` counts positions with
/// the winner to move, `response_mate_in` those with the loser to move.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Evaluation {
    pub total: u64,
    pub illegal: u64,
    pub checkmated_white: u64,
    pub checkmated_black: u64,
    pub white_wins: u64,
    pub black_wins: u64,
    pub longest_mate: u32,
    pub mate_in: BTreeMap<u32, u64>,
    pub response_mate_in: BTreeMap<u32, u64>,
    pub stalemates: u64,
    pub insufficient_material: u64,
    pub unforceable: u64,
    pub unknown: u64,
}

/// Gather statistics from the value and status arrays.
pub fn evaluate(codec: &IndexCodec, values: &[i8], status: &[u8]) -> Evaluation {
    let mut eval = Evaluation::default();

    for p in 0..values.len() {
        eval.total += 1;
        let s = Status::from_bits(status[p]);
        if !s.is_legal() {
            eval.illegal += 1;
            continue;
        }
        if s.contains(Status::INSUFFICIENT_MATERIAL) {
            eval.insufficient_material += 1;
            continue;
        }
        if s.contains(Status::IN_STALE_MATE) {
            eval.stalemates += 1;
            continue;
        }

        match values[p] {
            UNKNOWN => eval.unknown += 1,
            UNFORCEABLE => eval.unforceable += 1,
            0 => match codec.turn_of(p as u32) {
                Color::White => eval.checkmated_white += 1,
                Color::Black => eval.checkmated_black += 1,
            },
            v => {
                let winner = if v > 0 { Color::White } else { Color::Black };
                match winner {
                    Color::White => eval.white_wins += 1,
                    Color::Black => eval.black_wins += 1,
                }
                let distance = v.unsigned_abs() as u32;
                eval.longest_mate = eval.longest_mate.max(distance);
                let bucket = if codec.turn_of(p as u32) == winner {
                    &mut eval.mate_in
                } else {
                    &mut eval.response_mate_in
                };
                *bucket.entry(distance).or_insert(0) += 1;
            }
        }
    }

    eval
}
