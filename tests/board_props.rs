use battleship_server::{
    Board, BoardError, BoardSnapshot, CellState, Orientation, SnapshotView, BOARD_HEIGHT,
    BOARD_WIDTH, NUM_SHIPS, SHIPS,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const W: i32 = BOARD_WIDTH as i32;
const H: i32 = BOARD_HEIGHT as i32;

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    board.place_random_fleet(&mut rng).unwrap();
    let shots = rng.random_range(0..(W * H) as usize);
    for _ in 0..shots {
        let x = rng.random_range(0..W);
        let y = rng.random_range(0..H);
        let _ = board.shoot(x, y);
    }
    board
}

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

fn footprint(len: i32, x: i32, y: i32, o: Orientation) -> Vec<(i32, i32)> {
    (0..len)
        .map(|i| match o {
            Orientation::Horizontal => (x + i, y),
            Orientation::Vertical => (x, y + i),
        })
        .collect()
}

fn in_bounds(cells: &[(i32, i32)]) -> bool {
    cells
        .iter()
        .all(|&(x, y)| (0..W).contains(&x) && (0..H).contains(&y))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn second_placement_succeeds_iff_disjoint_and_in_bounds(
        a in 0..NUM_SHIPS as u8,
        b in 0..NUM_SHIPS as u8,
        ax in -2..W + 2, ay in -2..H + 2, ao in orientation(),
        bx in -2..W + 2, by in -2..H + 2, bo in orientation(),
    ) {
        prop_assume!(a != b);
        let fa = footprint(SHIPS[a as usize].length() as i32, ax, ay, ao);
        let fb = footprint(SHIPS[b as usize].length() as i32, bx, by, bo);

        let mut board = Board::new();
        let first = board.place(a, ax, ay, ao);
        prop_assert_eq!(first.is_ok(), in_bounds(&fa));
        prop_assume!(first.is_ok());

        let disjoint = fb.iter().all(|c| !fa.contains(c));
        let second = board.place(b, bx, by, bo);
        prop_assert_eq!(second.is_ok(), disjoint && in_bounds(&fb));
        if second.is_err() {
            prop_assert_eq!(board.placed_count(), 1);
        }
    }

    #[test]
    fn double_shot_is_rejected_without_change(seed in any::<u64>(), x in 0..W, y in 0..H) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        board.place_random_fleet(&mut rng).unwrap();

        let before = board.clone();
        board.shoot(x, y).unwrap();
        prop_assert_ne!(&board, &before);
        let after = board.clone();
        let err = board.shoot(x, y).unwrap_err();
        prop_assert_eq!(err, BoardError::AlreadyShot { x, y });
        prop_assert_eq!(&board, &after);
    }

    #[test]
    fn all_ships_sunk_only_after_every_segment(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        board.place_random_fleet(&mut rng).unwrap();

        let mut cells: Vec<(i32, i32)> = (0..H).flat_map(|y| (0..W).map(move |x| (x, y))).collect();
        // deterministic shuffle from the same seed
        for i in (1..cells.len()).rev() {
            let j = rng.random_range(0..=i);
            cells.swap(i, j);
        }
        let mut done = false;
        for (x, y) in cells {
            board.shoot(x, y).unwrap();
            let sunk = board.all_ships_sunk();
            prop_assert!(!done || sunk, "all_ships_sunk went back to false");
            prop_assert_eq!(sunk, board.afloat_cells() == 0);
            done = sunk;
        }
        prop_assert!(done);
    }

    #[test]
    fn snapshot_round_trip(seed in any::<u64>()) {
        let board = random_board(seed);
        let snap = board.snapshot(SnapshotView::Owner);
        prop_assert_eq!(snap.cells.len(), BOARD_WIDTH * BOARD_HEIGHT);
        prop_assert_eq!(snap.decode().unwrap(), board.cells());

        let masked = board.snapshot(SnapshotView::Opponent).decode().unwrap();
        for (cell, seen) in board.cells().into_iter().zip(masked) {
            let expected = if cell == CellState::Ship { CellState::Empty } else { cell };
            prop_assert_eq!(seen, expected);
        }
    }

    #[test]
    fn snapshot_rejects_bad_digits(seed in any::<u64>(), index in 0..BOARD_WIDTH * BOARD_HEIGHT) {
        let board = random_board(seed);
        let mut snap: BoardSnapshot = board.snapshot(SnapshotView::Owner);
        snap.cells.replace_range(index..index + 1, "7");
        prop_assert!(snap.decode().is_err());
    }
}
