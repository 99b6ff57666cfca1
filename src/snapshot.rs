//! Digit-string board snapshots.
//!
//! A snapshot is one digit per cell in row-major order, each digit being the
//! `CellState` ordinal. Snapshots of an opponent's board mask un-hit ship
//! cells as empty so fleet positions never leak before they are hit.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::common::CellState;

/// Whose eyes a snapshot is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotView {
    /// The board's owner sees everything.
    Owner,
    /// The opponent sees only hits, misses and open water.
    Opponent,
}

/// Errors raised when decoding a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Cell count does not equal width × height.
    LengthMismatch { expected: usize, actual: usize },
    /// A character is not a known cell ordinal.
    InvalidDigit { index: usize, found: char },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::LengthMismatch { expected, actual } => {
                write!(f, "snapshot has {} cells, expected {}", actual, expected)
            }
            SnapshotError::InvalidDigit { index, found } => {
                write!(f, "invalid cell digit {:?} at index {}", found, index)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SnapshotError {}

/// Serialized view of one board.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub cells: String,
}

impl BoardSnapshot {
    /// Encode a row-major cell grid, masking ships for the opponent view.
    pub fn from_cells(width: usize, height: usize, cells: &[CellState], view: SnapshotView) -> Self {
        let cells = cells
            .iter()
            .map(|&c| match (view, c) {
                (SnapshotView::Opponent, CellState::Ship) => CellState::Empty,
                _ => c,
            })
            .map(CellState::digit)
            .collect();
        BoardSnapshot {
            width: width as u8,
            height: height as u8,
            cells,
        }
    }

    /// Decode back into a row-major cell grid.
    pub fn decode(&self) -> Result<Vec<CellState>, SnapshotError> {
        let expected = self.width as usize * self.height as usize;
        let actual = self.cells.chars().count();
        if actual != expected {
            return Err(SnapshotError::LengthMismatch { expected, actual });
        }
        self.cells
            .chars()
            .enumerate()
            .map(|(index, found)| {
                CellState::from_digit(found).ok_or(SnapshotError::InvalidDigit { index, found })
            })
            .collect()
    }

    /// State of cell (x, y) without decoding the whole grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        self.cells
            .as_bytes()
            .get(y * self.width as usize + x)
            .and_then(|&b| CellState::from_digit(b as char))
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.width as usize).max(1);
        for (i, row) in self.cells.as_bytes().chunks(width).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for &b in row {
                let glyph = match CellState::from_digit(b as char) {
                    Some(CellState::Empty) => '·',
                    Some(CellState::Ship) => '■',
                    Some(CellState::Hit) => 'X',
                    Some(CellState::Miss) => 'o',
                    None => '?',
                };
                write!(f, "{} ", glyph)?;
            }
        }
        Ok(())
    }
}
