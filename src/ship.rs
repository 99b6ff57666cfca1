//! Ship definitions and placement logic using our `BitBoard`.

use core::fmt;
use num_traits::{PrimInt, Unsigned, Zero};

use crate::bitboard::BitBoard;
use crate::common::BoardError;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Segments extend towards increasing x.
    Horizontal,
    /// Segments extend towards increasing y.
    Vertical,
}

impl Orientation {
    /// Cell covered by segment `i` of a ship whose origin is `(x, y)`.
    fn step(self, x: usize, y: usize, i: usize) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (x + i, y),
            Orientation::Vertical => (x, y + i),
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// Longest ship the segment bitset can track.
pub const MAX_SHIP_LENGTH: usize = 8;

/// A ship placed on a W×H board.
///
/// Occupancy is kept as a `BitBoard` for overlap checks; damage is kept as an
/// ordered bitset where bit `i` is the segment `i` cells from the origin.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship<T, const W: usize, const H: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    ship_type: ShipType,
    orientation: Orientation,
    x: usize,
    y: usize,
    mask: BitBoard<T, W, H>,
    segments: u8,
}

impl<T, const W: usize, const H: usize> Ship<T, W, H>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Place a ship with its origin at (`x`, `y`) facing `orientation`.
    /// Returns the newly constructed ship.
    pub fn new(
        ship_type: ShipType,
        orientation: Orientation,
        x: usize,
        y: usize,
    ) -> Result<Self, BoardError> {
        let len = ship_type.length();
        if len == 0 || len > MAX_SHIP_LENGTH {
            return Err(BoardError::InvalidIndex);
        }
        // Ensure placement fits within W×H
        let fits = match orientation {
            Orientation::Horizontal => x + len <= W && y < H,
            Orientation::Vertical => y + len <= H && x < W,
        };
        if !fits {
            return Err(BoardError::ShipOutOfBounds);
        }

        let mask = BitBoard::<T, W, H>::from_iter((0..len).map(|i| orientation.step(x, y, i)))?;
        Ok(Ship {
            ship_type,
            orientation,
            x,
            y,
            mask,
            segments: 0,
        })
    }

    /// Segment index covering (`x`, `y`), or `None` when the cell is not part of the ship.
    pub fn segment_at(&self, x: usize, y: usize) -> Option<usize> {
        let offset = match self.orientation {
            Orientation::Horizontal if y == self.y && x >= self.x => x - self.x,
            Orientation::Vertical if x == self.x && y >= self.y => y - self.y,
            _ => return None,
        };
        (offset < self.ship_type.length()).then_some(offset)
    }

    /// Register a hit at (`x`, `y`).
    /// Returns `true` if the cell belongs to this ship and records it.
    pub fn hit(&mut self, x: usize, y: usize) -> bool {
        match self.segment_at(x, y) {
            Some(i) => {
                self.segments |= 1 << i;
                true
            }
            None => false,
        }
    }

    /// Whether segment `i` has been hit.
    pub fn is_segment_hit(&self, i: usize) -> bool {
        i < self.ship_type.length() && self.segments & (1 << i) != 0
    }

    /// Number of damaged segments.
    pub fn hits(&self) -> usize {
        self.segments.count_ones() as usize
    }

    /// Check if the ship is sunk (all segments hit).
    pub fn is_sunk(&self) -> bool {
        self.hits() == self.ship_type.length()
    }

    /// Cells covered by the ship, from the origin outwards.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.ship_type.length()).map(move |i| self.orientation.step(self.x, self.y, i))
    }

    /// Ship's type.
    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    /// Origin of the ship (x, y).
    pub fn origin(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Orientation of the ship.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupancy mask of the ship on the board.
    pub fn mask(&self) -> BitBoard<T, W, H> {
        self.mask
    }
}

impl<T, const W: usize, const H: usize> fmt::Debug for Ship<T, W, H>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ name: \"{}\", origin: ({}, {}), orientation: {:?}, segments: {:0width$b} }}",
            self.ship_type.name(),
            self.x,
            self.y,
            self.orientation,
            self.segments,
            width = self.ship_type.length(),
        )
    }
}
