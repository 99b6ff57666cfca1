//! Game board state, built on `BitBoard` occupancy masks and `Ship` segments.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use crate::bitboard::BitBoard;
use crate::common::{BoardError, CellState, ShipId, ShotOutcome};
use crate::config::{BOARD_HEIGHT, BOARD_WIDTH, NUM_SHIPS, SHIPS};
use crate::ship::{Orientation, Ship};
use crate::snapshot::{BoardSnapshot, SnapshotView};

type BB = BitBoard<u128, BOARD_WIDTH, BOARD_HEIGHT>;

/// A ship sized for the standard board.
pub type PlacedShip = Ship<u128, BOARD_WIDTH, BOARD_HEIGHT>;

const _: () = assert!(BOARD_WIDTH * BOARD_HEIGHT <= u128::BITS as usize);

/// A placement choice: origin and orientation for one catalog ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub ship: ShipId,
    pub x: i32,
    pub y: i32,
    pub orientation: Orientation,
}

/// One player's grid: ship placements, hits and misses.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    ships: [Option<PlacedShip>; NUM_SHIPS],
    ship_map: BB,
    hits: BB,
    misses: BB,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        let empty = BB::new();
        Board {
            ships: [None; NUM_SHIPS],
            ship_map: empty,
            hits: empty,
            misses: empty,
        }
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// Board coordinates for a signed pair, or `None` when off the board.
    fn in_bounds(x: i32, y: i32) -> Option<(usize, usize)> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < BOARD_WIDTH && y < BOARD_HEIGHT).then_some((x, y))
    }

    /// Place catalog ship `ship` with its origin at (x, y).
    ///
    /// Nothing is mutated unless every covered cell is on the board and free.
    pub fn place(
        &mut self,
        ship: ShipId,
        x: i32,
        y: i32,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let idx = ship as usize;
        let def = *SHIPS.get(idx).ok_or(BoardError::InvalidIndex)?;
        if self.ships[idx].is_some() {
            return Err(BoardError::ShipAlreadyPlaced);
        }
        let (x, y) = Self::in_bounds(x, y).ok_or(BoardError::ShipOutOfBounds)?;
        let placed = PlacedShip::new(def, orientation, x, y)?;
        let mask = placed.mask();
        if !(self.ship_map & mask).is_empty() {
            return Err(BoardError::ShipOverlaps);
        }
        self.ship_map |= mask;
        self.ships[idx] = Some(placed);
        Ok(())
    }

    /// Returns a random in-bounds, non-overlapping placement for `ship`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        ship: ShipId,
    ) -> Result<Placement, BoardError> {
        let def = *SHIPS.get(ship as usize).ok_or(BoardError::InvalidIndex)?;
        for _ in 0..100 {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_x, max_y) = match orientation {
                Orientation::Horizontal => (BOARD_WIDTH - def.length(), BOARD_HEIGHT - 1),
                Orientation::Vertical => (BOARD_WIDTH - 1, BOARD_HEIGHT - def.length()),
            };
            let x = rng.random_range(0..=max_x);
            let y = rng.random_range(0..=max_y);
            // build a temp ship and check overlap
            let candidate = PlacedShip::new(def, orientation, x, y)?;
            if (self.ship_map & candidate.mask()).is_empty() {
                return Ok(Placement {
                    ship,
                    x: x as i32,
                    y: y as i32,
                    orientation,
                });
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }

    /// Place every ship that is not placed yet at a random position.
    pub fn place_random_fleet<R: Rng>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        for id in 0..NUM_SHIPS as ShipId {
            if self.ships[id as usize].is_some() {
                continue;
            }
            let p = self.random_placement(rng, id)?;
            self.place(p.ship, p.x, p.y, p.orientation)?;
        }
        Ok(())
    }

    /// Resolve a shot at (x, y).
    ///
    /// Off-board and already-resolved targets are rejected and leave the board untouched.
    pub fn shoot(&mut self, x: i32, y: i32) -> Result<ShotOutcome, BoardError> {
        let (cx, cy) = Self::in_bounds(x, y).ok_or(BoardError::OutOfBounds { x, y })?;
        if self.hits.get(cx, cy)? || self.misses.get(cx, cy)? {
            return Err(BoardError::AlreadyShot { x, y });
        }
        if !self.ship_map.get(cx, cy)? {
            self.misses.set(cx, cy)?;
            return Ok(ShotOutcome::Miss);
        }
        let (id, ship) = self
            .ships
            .iter_mut()
            .enumerate()
            .find_map(|(i, slot)| match slot {
                Some(s) if s.segment_at(cx, cy).is_some() => Some((i, s)),
                _ => None,
            })
            .ok_or(BoardError::UnknownShipHit)?;
        ship.hit(cx, cy);
        self.hits.set(cx, cy)?;
        if ship.is_sunk() {
            Ok(ShotOutcome::Sunk(id as ShipId))
        } else {
            Ok(ShotOutcome::Hit)
        }
    }

    /// Returns `true` when every placed ship is sunk.
    ///
    /// A board with no ships is vacuously sunk; the match only asks once fleets are complete.
    pub fn all_ships_sunk(&self) -> bool {
        self.ships.iter().flatten().all(|s| s.is_sunk())
    }

    /// `true` once every catalog ship is on the board.
    pub fn is_fleet_complete(&self) -> bool {
        self.ships.iter().all(Option::is_some)
    }

    /// Number of catalog ships placed so far.
    pub fn placed_count(&self) -> usize {
        self.ships.iter().flatten().count()
    }

    /// Placed ship for catalog id `id`.
    pub fn ship(&self, id: ShipId) -> Option<&PlacedShip> {
        self.ships.get(id as usize).and_then(Option::as_ref)
    }

    /// Number of ship cells not yet hit.
    pub fn afloat_cells(&self) -> usize {
        (self.ship_map & !self.hits).count_ones()
    }

    /// Board occupancy mask of all ships.
    pub fn ship_map(&self) -> BB {
        self.ship_map
    }

    /// State of cell (x, y), or `None` off the board.
    pub fn cell(&self, x: i32, y: i32) -> Option<CellState> {
        let (x, y) = Self::in_bounds(x, y)?;
        Some(self.cell_at(x, y))
    }

    fn cell_at(&self, x: usize, y: usize) -> CellState {
        let bit = |bb: &BB| bb.get(x, y).unwrap_or(false);
        if bit(&self.hits) {
            CellState::Hit
        } else if bit(&self.misses) {
            CellState::Miss
        } else if bit(&self.ship_map) {
            CellState::Ship
        } else {
            CellState::Empty
        }
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> Vec<CellState> {
        let mut cells = vec![CellState::Empty; BOARD_WIDTH * BOARD_HEIGHT];
        // later layers win: a hit cell is also in the ship map
        let layers = [
            (&self.ship_map, CellState::Ship),
            (&self.misses, CellState::Miss),
            (&self.hits, CellState::Hit),
        ];
        for (bits, state) in layers {
            for (x, y) in bits.iter_set_bits() {
                cells[y * BOARD_WIDTH + x] = state;
            }
        }
        cells
    }

    /// Serialize the board as seen by its owner or by the opponent.
    pub fn snapshot(&self, view: SnapshotView) -> BoardSnapshot {
        BoardSnapshot::from_cells(BOARD_WIDTH, BOARD_HEIGHT, &self.cells(), view)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  ship_map: {:?},\n  hits: {:?},\n  misses: {:?},\n  ships: {:?}\n}}",
            self.ship_map, self.hits, self.misses, self.ships
        )
    }
}
