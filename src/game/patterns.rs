use std::collections::HashSet;
use strum::IntoEnumIterator;

use super::variant::{BoardLayout, WinPattern};

/// Read-only view of one player's board and marks as the evaluator sees it.
pub struct BoardView<'a> {
    cells: &'a [u8],
    marks: &'a HashSet<u8>,
    layout: BoardLayout,
}

impl<'a> BoardView<'a> {
    pub fn new(cells: &'a [u8], marks: &'a HashSet<u8>, layout: BoardLayout) -> Self {
        Self {
            cells,
            marks,
            layout,
        }
    }

    /// The centre of an odd grid with a free space counts as marked.
    fn is_marked(&self, index: usize) -> bool {
        if let BoardLayout::Grid {
            size,
            free_center: true,
        } = self.layout
        {
            if index == (size * size) / 2 {
                return true;
            }
        }
        self.cells
            .get(index)
            .is_some_and(|value| self.marks.contains(value))
    }

    pub fn satisfies(&self, pattern: WinPattern) -> bool {
        match self.layout {
            BoardLayout::Grid { size, .. } => {
                if size == 0 || self.cells.len() != size * size {
                    return false;
                }
                self.grid_satisfies(pattern, size)
            }
            BoardLayout::Strip => match pattern {
                WinPattern::FullHouse => {
                    !self.cells.is_empty() && (0..self.cells.len()).all(|i| self.is_marked(i))
                }
                _ => false,
            },
        }
    }

    fn grid_satisfies(&self, pattern: WinPattern, size: usize) -> bool {
        let at = |row: usize, col: usize| self.is_marked(row * size + col);
        let last = size - 1;

        match pattern {
            WinPattern::Row => (0..size).any(|row| (0..size).all(|col| at(row, col))),
            WinPattern::Column => (0..size).any(|col| (0..size).all(|row| at(row, col))),
            WinPattern::Diagonal => {
                (0..size).all(|i| at(i, i)) || (0..size).all(|i| at(i, last - i))
            }
            WinPattern::FourCorners => {
                at(0, 0) && at(0, last) && at(last, 0) && at(last, last)
            }
            WinPattern::FullHouse => (0..size * size).all(|i| self.is_marked(i)),
        }
    }

    /// First enabled pattern that holds, walking the fixed priority order.
    pub fn first_winning_pattern(&self, enabled: &[WinPattern]) -> Option<WinPattern> {
        WinPattern::iter()
            .filter(|pattern| enabled.contains(pattern))
            .find(|pattern| self.satisfies(*pattern))
    }
}
