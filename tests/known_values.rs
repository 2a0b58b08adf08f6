use std::sync::OnceLock;

use endgame_tables::codec::Position;
use endgame_tables::pieces::{Color, Piece, PieceKind, PieceSet};
use endgame_tables::table::{BuildLimits, Status, Tablebase, ILLEGAL, UNFORCEABLE};

fn build(others: &[Piece]) -> Tablebase {
    let set = PieceSet::with_others(others).unwrap();
    let dir = tempfile::tempdir().unwrap();
    Tablebase::build(set, dir.path(), &BuildLimits::default()).unwrap()
}

/// The rook ending is exercised by several tests; build it once.
fn rook_table() -> &'static Tablebase {
    static TABLE: OnceLock<Tablebase> = OnceLock::new();
    TABLE.get_or_init(|| build(&[Piece::new(Color::White, PieceKind::Rook)]))
}

#[test]
fn queen_endgame_has_the_known_mate_in_one() {
    let table = build(&[Piece::new(Color::White, PieceKind::Queen)]);

    // White to move: black king a8, white king c6, white queen b6.
    let pos = Position::from_raw(&[0, 56, 42, 41]).unwrap();
    assert_eq!(table.value(&pos), 1);
    assert_eq!(table.expected_winner(&pos), Some(Color::White));

    let status = table.position_status(&pos).unwrap();
    assert!(status.is_legal());
    assert!(!status.contains(Status::IN_CHECK));

    // Some reply of the annotated move list is the checkmate itself.
    let mates: Vec<_> = table
        .annotated_moves(&pos)
        .into_iter()
        .filter(|am| am.value == 0)
        .collect();
    assert!(!mates.is_empty());
    for mate in &mates {
        let after = table.apply(&pos, &mate.mv);
        let s = table.position_status(&after).unwrap();
        assert!(s.contains(Status::IN_CHECK_MATE));
        assert_eq!(table.expected_winner(&after), Some(Color::White));
    }
}

#[test]
fn rook_endgame_longest_mate_is_sixteen() {
    let table = rook_table();
    let evaluation = table.evaluation().unwrap();

    assert_eq!(evaluation.longest_mate, 16);
    assert!(evaluation.white_wins > 0);
    // A lone rook never delivers mate for Black.
    assert_eq!(evaluation.black_wins, 0);
    assert_eq!(evaluation.checkmated_white, 0);
    assert!(evaluation.checkmated_black > 0);
}

#[test]
fn rook_endgame_satisfies_the_mate_chain_law() {
    let table = rook_table();
    let codec = *table.codec();
    let values = table.values();

    // For every sampled winning position with the winner to move, some
    // reply is one step closer to the mate.
    let mut checked = 0;
    for index in (0..codec.total_positions()).step_by(97) {
        let v = values[index as usize];
        if v <= 0 || v == ILLEGAL {
            continue;
        }
        let pos = codec.from_index(index);
        if pos.turn() != Color::White {
            continue;
        }
        let target = v - 1;
        assert!(
            table
                .annotated_moves(&pos)
                .iter()
                .any(|am| am.value == target),
            "no step-down reply at {pos} (value {v})"
        );
        checked += 1;
    }
    assert!(checked > 100);

    // For sampled losing positions every reply stays lost within the bound.
    let mut checked = 0;
    for index in (0..codec.total_positions()).step_by(89) {
        let v = values[index as usize];
        if v <= 0 || v == ILLEGAL {
            continue;
        }
        let pos = codec.from_index(index);
        if pos.turn() != Color::Black {
            continue;
        }
        for am in table.annotated_moves(&pos) {
            assert!(
                (0..=v).contains(&am.value),
                "losing side escaped at {pos}: reply {} has value {}",
                am.mv,
                am.value
            );
        }
        checked += 1;
    }
    assert!(checked > 100);
}

#[test]
fn checkmate_bit_matches_check_and_zero_moves() {
    let table = rook_table();
    let codec = *table.codec();
    let status = table.status_array().unwrap();

    for index in (0..codec.total_positions()).step_by(61) {
        let s = Status::from_bits(status[index as usize]);
        if !s.is_legal() {
            continue;
        }
        let pos = codec.from_index(index);
        let moves = table.legal_moves(&pos);
        let expect_mate = s.contains(Status::IN_CHECK) && moves.is_empty();
        assert_eq!(
            s.contains(Status::IN_CHECK_MATE),
            expect_mate,
            "checkmate bit mismatch at {pos}"
        );
        let expect_stale = !s.contains(Status::IN_CHECK) && moves.is_empty();
        assert_eq!(s.contains(Status::IN_STALE_MATE), expect_stale);
    }
}

#[test]
fn idle_side_in_check_is_illegal() {
    let table = rook_table();

    // Rook h8 attacks the black king on a8 along the open back rank.
    // With Black to move that is an ordinary check; with White to move
    // the position cannot have arisen by legal play.
    let checked = Position::from_raw(&[1, 56, 0, 63]).unwrap();
    let status = table.position_status(&checked).unwrap();
    assert!(status.is_legal());
    assert!(status.contains(Status::IN_CHECK));
    assert_ne!(table.value(&checked), ILLEGAL);

    let impossible = Position::from_raw(&[0, 56, 0, 63]).unwrap();
    let status = table.position_status(&impossible).unwrap();
    assert!(status.contains(Status::BAD_CHECK));
    assert!(!status.is_legal());
    assert_eq!(table.value(&impossible), ILLEGAL);
    assert_eq!(table.expected_winner(&impossible), None);
    assert!(table.legal_moves(&impossible).is_empty());
}

#[test]
fn lone_bishop_cannot_force_anything() {
    let table = build(&[Piece::new(Color::White, PieceKind::Bishop)]);
    let codec = *table.codec();
    let status = table.status_array().unwrap();
    let values = table.values();

    for index in 0..codec.total_positions() {
        let s = Status::from_bits(status[index as usize]);
        if !s.is_legal() {
            assert_eq!(values[index as usize], ILLEGAL);
            continue;
        }
        assert!(
            s.contains(Status::INSUFFICIENT_MATERIAL),
            "legal position without the material-draw bit at index {index}"
        );
        assert_eq!(values[index as usize], UNFORCEABLE);
        assert_eq!(
            table.expected_winner(&codec.from_index(index)),
            None
        );
    }
}
