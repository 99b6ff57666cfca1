use battleship_server::{BoardSnapshot, CellState, SnapshotError, SnapshotView};

#[test]
fn test_decode_errors() {
    let short = BoardSnapshot {
        width: 2,
        height: 2,
        cells: "012".into(),
    };
    assert_eq!(
        short.decode(),
        Err(SnapshotError::LengthMismatch {
            expected: 4,
            actual: 3
        })
    );

    let bad = BoardSnapshot {
        width: 2,
        height: 2,
        cells: "01x3".into(),
    };
    assert_eq!(
        bad.decode(),
        Err(SnapshotError::InvalidDigit {
            index: 2,
            found: 'x'
        })
    );
}

#[test]
fn test_from_cells_masks_for_opponent() {
    let cells = [
        CellState::Ship,
        CellState::Hit,
        CellState::Miss,
        CellState::Empty,
    ];
    let owner = BoardSnapshot::from_cells(2, 2, &cells, SnapshotView::Owner);
    assert_eq!(owner.cells, "1230");
    assert_eq!(owner.cell(1, 1), Some(CellState::Empty));
    assert_eq!(owner.cell(2, 0), None);

    let opponent = BoardSnapshot::from_cells(2, 2, &cells, SnapshotView::Opponent);
    assert_eq!(opponent.cells, "0230");
    assert_eq!(opponent.to_string(), "· X \no · ");
}
