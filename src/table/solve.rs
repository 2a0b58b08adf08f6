//! The retrograde fixed point.
//!
//! Four sweeps run per depth `n`: positions where the side to move can
//! force mate in `n`, positions where every reply loses in at most `n`,
//! and the same pair for forced insufficient-material draws. The outer
//! loop alternates the two families so each can unblock the other, and
//! stops once a full iteration labels nothing new.
//!
//! Sign convention: positive values are wins for White, negative for
//! Black, regardless of whose turn it is. Terminal positions (checkmate,
//! stalemate, immediate insufficient material) hold 0.

use log::{info, warn};

use crate::codec::IndexCodec;
use crate::pieces::Color;
use crate::table::{MoveCache, Status, ILLEGAL, UNFORCEABLE, UNKNOWN};

/// Value magnitudes above this would collide with the sentinel encodings.
const MAX_DEPTH: i32 = 120;

pub(crate) fn run(codec: &IndexCodec, cache: &MoveCache, values: &mut [i8], status: &mut [u8]) {
    // Promotion bridging seeds arbitrary magnitudes before the first sweep,
    // so an empty iteration below the largest seed must not end the loop.
    let seed = values
        .iter()
        .filter(|&&v| v > UNFORCEABLE)
        .map(|&v| (v as i32).abs())
        .max()
        .unwrap_or(0);

    let mut n: i32 = 1;
    loop {
        let mates = mate_in(n, codec, cache, values, status);
        let replies = response_mate_in(n, codec, cache, values, status);
        let draws = insufficient_in(n, codec, cache, values, status);
        let draw_replies = response_insufficient_in(n, codec, cache, values, status);
        info!(
            "depth {n}: {mates} mates, {replies} forced replies, \
             {draws} material draws, {draw_replies} forced drawing replies"
        );

        if mates + replies + draws + draw_replies == 0 && n > seed {
            break;
        }
        if n >= MAX_DEPTH {
            warn!("stopping at depth {n}: value magnitude limit");
            break;
        }
        n += 1;
    }
}

/// Label positions where the side to move has a move into a position
/// already known lost for the opponent in `n - 1`.
fn mate_in(
    n: i32,
    codec: &IndexCodec,
    cache: &MoveCache,
    values: &mut [i8],
    status: &[u8],
) -> u64 {
    let mut count = 0;
    for p in 0..values.len() {
        if values[p] != UNKNOWN || !Status::from_bits(status[p]).is_legal() {
            continue;
        }
        let turn = codec.turn_of(p as u32);
        let target = match turn {
            Color::White => n - 1,
            Color::Black => -(n - 1),
        };

        let mut winning = false;
        for &q in cache.successors(p as u32) {
            let s2 = Status::from_bits(status[q as usize]);
            if n == 1 {
                if s2.contains(Status::IN_CHECK_MATE) {
                    winning = true;
                    break;
                }
            } else {
                if values[q as usize] == UNKNOWN
                    || s2.intersects(Status::IN_STALE_MATE | Status::INSUFFICIENT_MATERIAL)
                {
                    continue;
                }
                if values[q as usize] as i32 == target {
                    winning = true;
                    break;
                }
            }
        }

        if winning {
            values[p] = match turn {
                Color::White => n as i8,
                Color::Black => -n as i8,
            };
            count += 1;
        }
    }
    count
}

/// Label positions where the side to move is lost: every legal reply is
/// already known lost for it within `n`, with no drawing escape.
fn response_mate_in(
    n: i32,
    codec: &IndexCodec,
    cache: &MoveCache,
    values: &mut [i8],
    status: &[u8],
) -> u64 {
    let mut count = 0;
    for p in 0..values.len() {
        if values[p] != UNKNOWN || !Status::from_bits(status[p]).is_legal() {
            continue;
        }
        // The mover is losing, so the win is signed for the opponent.
        let signed = match codec.turn_of(p as u32) {
            Color::White => -n,
            Color::Black => n,
        };

        let successors = cache.successors(p as u32);
        if successors.is_empty() {
            continue;
        }

        let mut conclusive = true;
        for &q in successors {
            let v2 = values[q as usize];
            if v2 == UNKNOWN || v2 == UNFORCEABLE {
                conclusive = false;
                break;
            }
            let s2 = Status::from_bits(status[q as usize]);
            // A stalemate or material-draw reply escapes the mate.
            if s2.intersects(Status::IN_STALE_MATE | Status::INSUFFICIENT_MATERIAL) {
                conclusive = false;
                break;
            }
            let v2 = v2 as i32;
            if v2.abs() > n || signed * v2 < 0 {
                conclusive = false;
                break;
            }
        }

        if conclusive {
            values[p] = signed as i8;
            count += 1;
        }
    }
    count
}

/// Label positions where the side to move can force insufficient material:
/// some reply is already tagged insufficient with the matching depth.
fn insufficient_in(
    n: i32,
    codec: &IndexCodec,
    cache: &MoveCache,
    values: &mut [i8],
    status: &mut [u8],
) -> u64 {
    let mut count = 0;
    for p in 0..values.len() {
        if values[p] != UNKNOWN || !Status::from_bits(status[p]).is_legal() {
            continue;
        }
        let turn = codec.turn_of(p as u32);
        let target = match turn {
            Color::White => n - 1,
            Color::Black => -(n - 1),
        };

        let mut drawing = false;
        for &q in cache.successors(p as u32) {
            let s2 = Status::from_bits(status[q as usize]);
            if n == 1 {
                if s2.contains(Status::INSUFFICIENT_MATERIAL) {
                    drawing = true;
                    break;
                }
            } else {
                if values[q as usize] == UNKNOWN || !s2.contains(Status::INSUFFICIENT_MATERIAL) {
                    continue;
                }
                if values[q as usize] as i32 == target {
                    drawing = true;
                    break;
                }
            }
        }

        if drawing {
            status[p] |= Status::INSUFFICIENT_MATERIAL.bits();
            values[p] = match turn {
                Color::White => n as i8,
                Color::Black => -n as i8,
            };
            count += 1;
        }
    }
    count
}

/// Label positions where every legal reply heads into a stalemate or an
/// insufficient-material draw within `n`.
fn response_insufficient_in(
    n: i32,
    codec: &IndexCodec,
    cache: &MoveCache,
    values: &mut [i8],
    status: &mut [u8],
) -> u64 {
    let mut count = 0;
    for p in 0..values.len() {
        if values[p] != UNKNOWN || !Status::from_bits(status[p]).is_legal() {
            continue;
        }
        let signed = match codec.turn_of(p as u32) {
            Color::White => -n,
            Color::Black => n,
        };

        let successors = cache.successors(p as u32);
        if successors.is_empty() {
            continue;
        }

        let mut conclusive = true;
        for &q in successors {
            let v2 = values[q as usize];
            if v2 == UNKNOWN || v2 == UNFORCEABLE {
                conclusive = false;
                break;
            }
            let s2 = Status::from_bits(status[q as usize]);
            let v2 = v2 as i32;
            if v2.abs() > n
                || !s2.intersects(Status::IN_STALE_MATE | Status::INSUFFICIENT_MATERIAL)
                || signed * v2 < 0
            {
                conclusive = false;
                break;
            }
        }

        if conclusive {
            status[p] |= Status::INSUFFICIENT_MATERIAL.bits();
            values[p] = signed as i8;
            count += 1;
        }
    }
    count
}

/// Rewrite the sentinels before persistence: illegal positions become
/// [`ILLEGAL`]; stalemate, insufficient-material and still-unknown
/// positions become [`UNFORCEABLE`]. Only mate distances survive.
pub(crate) fn rewrite(values: &mut [i8], status: &[u8]) {
    for p in 0..values.len() {
        let s = Status::from_bits(status[p]);
        if !s.is_legal() {
            values[p] = ILLEGAL;
        }
        if s.intersects(Status::IN_STALE_MATE | Status::INSUFFICIENT_MATERIAL)
            || values[p] == UNKNOWN
        {
            values[p] = UNFORCEABLE;
        }
    }
}
