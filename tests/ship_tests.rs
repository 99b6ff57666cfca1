use battleship_server::{BoardError, Orientation, Ship, ShipType};

type SmallShip = Ship<u32, 5, 5>;

#[test]
fn test_new_and_mask() -> Result<(), BoardError> {
    let def = ShipType::new("Test", 3);
    let ship = SmallShip::new(def, Orientation::Horizontal, 1, 2)?;
    for x in 1..4 {
        assert!(ship.mask().get(x, 2)?);
    }
    assert_eq!(ship.mask().count_ones(), 3);
    assert_eq!(ship.origin(), (1, 2));
    assert_eq!(ship.orientation(), Orientation::Horizontal);
    Ok(())
}

#[test]
fn test_cells_and_segments() -> Result<(), BoardError> {
    let def = ShipType::new("Test", 4);
    let ship = SmallShip::new(def, Orientation::Vertical, 0, 1)?;
    let cells: Vec<_> = ship.cells().collect();
    assert_eq!(cells, vec![(0, 1), (0, 2), (0, 3), (0, 4)]);
    assert_eq!(ship.segment_at(0, 1), Some(0));
    assert_eq!(ship.segment_at(0, 3), Some(2));
    assert_eq!(ship.segment_at(0, 0), None);
    assert_eq!(ship.segment_at(1, 2), None);
    Ok(())
}

#[test]
fn test_hit_and_sunk() -> Result<(), BoardError> {
    let def = ShipType::new("Test", 2);
    let mut ship = SmallShip::new(def, Orientation::Horizontal, 1, 1)?;
    assert!(!ship.is_sunk());
    assert!(ship.hit(1, 1));
    assert!(ship.is_segment_hit(0));
    assert!(!ship.is_sunk());
    // a repeated hit changes nothing
    assert!(ship.hit(1, 1));
    assert_eq!(ship.hits(), 1);
    assert!(ship.hit(2, 1));
    assert!(ship.is_sunk());
    assert!(!ship.hit(3, 1));
    Ok(())
}

#[test]
fn test_out_of_bounds_and_invalid_length() {
    let def = ShipType::new("Long", 4);
    assert_eq!(
        SmallShip::new(def, Orientation::Horizontal, 2, 0).unwrap_err(),
        BoardError::ShipOutOfBounds
    );
    assert_eq!(
        SmallShip::new(def, Orientation::Vertical, 0, 4).unwrap_err(),
        BoardError::ShipOutOfBounds
    );
    let empty = ShipType::new("Empty", 0);
    assert_eq!(
        SmallShip::new(empty, Orientation::Horizontal, 0, 0).unwrap_err(),
        BoardError::InvalidIndex
    );
}

#[test]
fn test_catalog_lookup() {
    use battleship_server::{ship_id_by_name, ship_type, NUM_SHIPS, SHIPS, TOTAL_SHIP_CELLS};

    assert_eq!(ship_type(0).map(|s| s.name()), Some("Carrier"));
    assert_eq!(ship_type(NUM_SHIPS), None);
    assert_eq!(ship_id_by_name("Destroyer"), Some(4));
    assert_eq!(ship_id_by_name("Rowboat"), None);
    let total: usize = SHIPS.iter().map(|s| s.length()).sum();
    assert_eq!(total, TOTAL_SHIP_CELLS);
}
