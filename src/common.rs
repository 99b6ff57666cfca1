//! Common types for the match engine: board errors, shot outcomes and cell states.

use crate::bitboard::BitBoardError;

/// Identifier of a ship: its index into the fleet catalog.
pub type ShipId = u8;

/// Result of an accepted shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Shot hit a ship segment that leaves the ship afloat.
    Hit,
    /// Shot landed in open water.
    Miss,
    /// Shot hit the last intact segment of a ship, carrying its catalog id.
    Sunk(ShipId),
}

impl ShotOutcome {
    /// `true` for `Hit` and `Sunk`.
    pub fn is_hit(&self) -> bool {
        !matches!(self, ShotOutcome::Miss)
    }

    /// The ship sunk by this shot, if any.
    pub fn sunk_ship(&self) -> Option<ShipId> {
        match self {
            ShotOutcome::Sunk(id) => Some(*id),
            _ => None,
        }
    }
}

/// Visible state of one board cell.
///
/// The discriminants are the wire ordinals used by board snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    Empty = 0,
    Ship = 1,
    Hit = 2,
    Miss = 3,
}

impl CellState {
    /// Snapshot digit for this state.
    pub fn digit(self) -> char {
        match self {
            CellState::Empty => '0',
            CellState::Ship => '1',
            CellState::Hit => '2',
            CellState::Miss => '3',
        }
    }

    /// Parse a snapshot digit.
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(CellState::Empty),
            '1' => Some(CellState::Ship),
            '2' => Some(CellState::Hit),
            '3' => Some(CellState::Miss),
            _ => None,
        }
    }

    /// `true` once a shot has resolved this cell.
    pub fn is_resolved(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss)
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitboard error (e.g., invalid size or index).
    BitBoardError(BitBoardError),
    /// Ship id is not an entry of the fleet catalog.
    InvalidIndex,
    /// Attempted to place a ship that is already placed.
    ShipAlreadyPlaced,
    /// Ship placement overlaps another ship.
    ShipOverlaps,
    /// Ship would extend past the board edge.
    ShipOutOfBounds,
    /// Shot coordinates fall outside the board.
    OutOfBounds { x: i32, y: i32 },
    /// The targeted cell was already resolved by an earlier shot.
    AlreadyShot { x: i32, y: i32 },
    /// Random placement gave up after too many attempts.
    UnableToPlaceShip,
    /// The ship map and the placed ships disagree about a cell.
    UnknownShipHit,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoardError(err)
    }
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            BoardError::InvalidIndex => write!(f, "Ship id is not part of the fleet"),
            BoardError::ShipAlreadyPlaced => write!(f, "Ship is already placed on the board"),
            BoardError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::ShipOutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::OutOfBounds { x, y } => write!(f, "Shot ({}, {}) is off the board", x, y),
            BoardError::AlreadyShot { x, y } => {
                write!(f, "Cell ({}, {}) was already targeted", x, y)
            }
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::UnknownShipHit => write!(f, "Hit cell does not belong to any ship"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
