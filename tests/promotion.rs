use endgame_tables::codec::Position;
use endgame_tables::pieces::{Color, Piece, PieceKind, PieceSet};
use endgame_tables::table::{BuildLimits, TableError, Tablebase};

#[test]
fn pawn_advance_inherits_the_queen_table_value() {
    let dir = tempfile::tempdir().unwrap();
    let limits = BuildLimits::default();

    let kqk = PieceSet::with_others(&[Piece::new(Color::White, PieceKind::Queen)]).unwrap();
    let kqk = Tablebase::build(kqk, dir.path(), &limits).unwrap();

    let kpk = PieceSet::with_others(&[Piece::new(Color::White, PieceKind::Pawn)]).unwrap();
    let kpk = Tablebase::build(kpk, dir.path(), &limits).unwrap();

    // White to move: black king a1, white king a3, pawn a7 one step from
    // promotion.
    let pre = Position::from_raw(&[0, 0, 16, 48]).unwrap();
    let advance = kpk
        .legal_moves(&pre)
        .iter()
        .copied()
        .find(|mv| mv.slot == 2 && mv.to.raw() == 56)
        .expect("the pawn can promote");
    let after = kpk.apply(&pre, &advance);

    // The promoted position is terminal in the pawn table and carries the
    // queen table's verdict at the same index.
    let queen_view = Position::from_raw(&[1, 0, 16, 56]).unwrap();
    assert_eq!(kpk.value(&after), kqk.value(&queen_view));
    assert_eq!(
        kpk.position_status(&after).unwrap(),
        kqk.position_status(&queen_view).unwrap()
    );
    assert!(kpk.value(&after) > 0, "queening must be winning here");
    assert_eq!(kpk.expected_winner(&after), Some(Color::White));

    // The pre-promotion position itself is a forced White win.
    assert!(kpk.value(&pre) > 0);
}

#[test]
fn building_a_pawn_table_without_its_companion_fails() {
    let dir = tempfile::tempdir().unwrap();
    let set = PieceSet::with_others(&[Piece::new(Color::White, PieceKind::Pawn)]).unwrap();

    let err = Tablebase::build(set, dir.path(), &BuildLimits::default()).unwrap_err();
    assert!(
        matches!(err, TableError::MissingCompanion { .. }),
        "unexpected error: {err}"
    );
}
