use crate::board::Square;
use crate::codec::Position;
use crate::pieces::{Color, PieceKind, PieceSet};
use crate::rules::{BISHOP_DIRS, KNIGHT_JUMPS, QUEEN_DIRS, ROOK_DIRS};

/// True iff the piece in `slot` attacks the **enemy** king, regardless of
/// whose turn it is. Dead pieces attack nothing.
pub fn attacks_enemy_king(set: &PieceSet, pos: &Position, slot: usize) -> bool {
    let piece = set.piece(slot);
    let from = pos.square(slot);
    if from.is_dead() {
        return false;
    }

    // Slot 0 is the black king, slot 1 the white king.
    let king_slot = match piece.color {
        Color::White => 0,
        Color::Black => 1,
    };
    let target = pos.square(king_slot);

    match piece.kind {
        PieceKind::King => from.chebyshev(target) == 1,
        PieceKind::Knight => {
            let dr = target.row() - from.row();
            let dc = target.col() - from.col();
            KNIGHT_JUMPS.contains(&(dr, dc))
        }
        PieceKind::Pawn => {
            // Pawns attack diagonally one rank forward, never straight ahead.
            let forward: i8 = match piece.color {
                Color::White => 1,
                Color::Black => -1,
            };
            target.row() - from.row() == forward && (target.col() - from.col()).abs() == 1
        }
        PieceKind::Rook => rider_attacks(pos, from, target, &ROOK_DIRS),
        PieceKind::Bishop => rider_attacks(pos, from, target, &BISHOP_DIRS),
        PieceKind::Queen => rider_attacks(pos, from, target, &QUEEN_DIRS),
    }
}

/// Sliding attack along one of `dirs`: the target must be on a matching ray
/// and no live piece (either colour) may occupy a strictly intermediate
/// square.
fn rider_attacks(pos: &Position, from: Square, target: Square, dirs: &[(i8, i8)]) -> bool {
    let dr = target.row() - from.row();
    let dc = target.col() - from.col();
    if dr == 0 && dc == 0 {
        return false;
    }
    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return false;
    }

    let step = (dr.signum(), dc.signum());
    if !dirs.contains(&step) {
        return false;
    }

    let mut cur = from
        .offset(step.0, step.1)
        .expect("ray toward an on-board target stays on the board");
    while cur != target {
        if pos.is_occupied(cur) {
            return false;
        }
        cur = cur
            .offset(step.0, step.1)
            .expect("ray toward an on-board target stays on the board");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::Piece;

    fn set_with(others: &[Piece]) -> PieceSet {
        PieceSet::with_others(others).unwrap()
    }

    #[test]
    fn rook_attacks_along_open_lines_only() {
        let set = set_with(&[Piece::new(Color::White, PieceKind::Rook)]);

        // Rook h8, black king a8: same rank, open.
        let pos = Position::from_raw(&[0, 56, 0, 63]).unwrap();
        assert!(attacks_enemy_king(&set, &pos, 2));

        // White king d8 blocks the rank.
        let blocked = Position::from_raw(&[0, 56, 59, 63]).unwrap();
        assert!(!attacks_enemy_king(&set, &blocked, 2));

        // Off-line.
        let diag = Position::from_raw(&[0, 56, 0, 7]).unwrap();
        assert!(!attacks_enemy_king(&set, &diag, 2));
    }

    #[test]
    fn bishop_and_queen_share_diagonals() {
        let bishop_set = set_with(&[Piece::new(Color::White, PieceKind::Bishop)]);
        let queen_set = set_with(&[Piece::new(Color::White, PieceKind::Queen)]);

        // Piece b2, black king h8 along the long diagonal.
        let pos = Position::from_raw(&[0, 63, 0, 9]).unwrap();
        assert!(attacks_enemy_king(&bishop_set, &pos, 2));
        assert!(attacks_enemy_king(&queen_set, &pos, 2));

        // A bishop never attacks along a file; the queen does.
        let file = Position::from_raw(&[0, 58, 0, 10]).unwrap();
        assert!(!attacks_enemy_king(&bishop_set, &file, 2));
        assert!(attacks_enemy_king(&queen_set, &file, 2));
    }

    #[test]
    fn knight_uses_l_jumps() {
        let set = set_with(&[Piece::new(Color::Black, PieceKind::Knight)]);

        // Black knight b1 gives check to a white king on c3.
        let pos = Position::from_raw(&[0, 56, 18, 1]).unwrap();
        assert!(attacks_enemy_king(&set, &pos, 2));

        let off = Position::from_raw(&[0, 56, 19, 1]).unwrap();
        assert!(!attacks_enemy_king(&set, &off, 2));
    }

    #[test]
    fn pawns_attack_diagonally_forward_only() {
        let white = set_with(&[Piece::new(Color::White, PieceKind::Pawn)]);

        // White pawn b2 against a black king on a3 / c3 / b3.
        for (bk, hit) in [(16, true), (18, true), (17, false)] {
            let pos = Position::from_raw(&[0, bk, 63, 9]).unwrap();
            assert_eq!(attacks_enemy_king(&white, &pos, 2), hit, "bk={bk}");
        }

        // Black pawns attack toward row 0.
        let black = set_with(&[Piece::new(Color::Black, PieceKind::Pawn)]);
        let pos = Position::from_raw(&[1, 63, 8, 17]).unwrap();
        assert!(attacks_enemy_king(&black, &pos, 2));
    }

    #[test]
    fn dead_pieces_attack_nothing() {
        let set = set_with(&[Piece::new(Color::White, PieceKind::Queen)]);
        let pos = Position::from_raw(&[0, 56, 0, 64]).unwrap();
        assert!(!attacks_enemy_king(&set, &pos, 2));
    }
}
