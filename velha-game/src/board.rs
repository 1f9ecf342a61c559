//! Board model and win-line scanning
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// The eight winning triples in canonical order: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Inline list of cell indexes, sized to hold a full board without spilling.
pub type CellIndexes = SmallVec<[usize; BOARD_CELLS]>;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The mark on the other side of the board.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 3x3 board stored row-major. Serializes as a 9-element array of
/// `null` or a mark string, the shape the storage layer persists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Mark>; BOARD_CELLS],
}

impl Board {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [None; BOARD_CELLS],
        }
    }

    #[must_use]
    pub const fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    /// Occupant of the given cell, `None` when empty or out of range.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    #[must_use]
    pub const fn cells(&self) -> &[Option<Mark>; BOARD_CELLS] {
        &self.cells
    }

    /// Place a mark into an empty cell. Returns false without touching the
    /// board when the cell is occupied or the index is out of range.
    pub fn place(&mut self, index: usize, mark: Mark) -> bool {
        let Some(slot) = self.cells.get_mut(index) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(mark);
        true
    }

    /// The mark completing the first matching winning triple, if any.
    /// Unreachable positions are not rejected; a board where the same mark
    /// fills several triples still reports that mark once.
    #[must_use]
    pub fn winner(&self) -> Option<Mark> {
        for [a, b, c] in WIN_LINES {
            if let Some(mark) = self.cells[a]
                && self.cells[b] == Some(mark)
                && self.cells[c] == Some(mark)
            {
                return Some(mark);
            }
        }
        None
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Indexes of all empty cells, in ascending order.
    #[must_use]
    pub fn empty_cells(&self) -> CellIndexes {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.is_none().then_some(i))
            .collect()
    }

    /// Lowest-indexed empty cell, if any.
    #[must_use]
    pub fn first_empty(&self) -> Option<usize> {
        self.cells.iter().position(Option::is_none)
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..3 {
                if col > 0 {
                    write!(f, " ")?;
                }
                match self.cells[row * 3 + col] {
                    Some(mark) => write!(f, "{}", mark.as_str())?,
                    None => write!(f, ".")?,
                }
            }
        }
        Ok(())
    }
}
