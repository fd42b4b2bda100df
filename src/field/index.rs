use std::collections::HashMap;

use crate::math::Cell;

/// Dense, first-touch numbering of grid cells.
///
/// Each cell gets exactly one id the first time it is referenced; ids are
/// contiguous from 0. The inverse table is kept for scattering solved values
/// back onto the grid. Scoped to a single solve.
#[derive(Debug, Default)]
pub struct VariableIndex {
    ids: HashMap<Cell, usize>,
    cells: Vec<Cell>,
}

impl VariableIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `cell`, allocating the next free id on first use.
    pub fn id(&mut self, cell: Cell) -> usize {
        *self.ids.entry(cell).or_insert_with(|| {
            self.cells.push(cell);
            self.cells.len() - 1
        })
    }

    /// Returns the id of `cell` without allocating.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<usize> {
        self.ids.get(&cell).copied()
    }

    /// Returns the cell that owns `id`.
    #[must_use]
    pub fn cell(&self, id: usize) -> Option<Cell> {
        self.cells.get(id).copied()
    }

    /// Number of allocated ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no ids have been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over `(id, cell)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Cell)> + '_ {
        self.cells.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_first_touch_order() {
        let mut index = VariableIndex::new();
        assert_eq!(index.id(Cell::new(4, 1)), 0);
        assert_eq!(index.id(Cell::new(0, 0)), 1);
        assert_eq!(index.id(Cell::new(4, 1)), 0);
        assert_eq!(index.id(Cell::new(2, 7)), 2);
        assert_eq!(index.len(), 3);
        assert_eq!(index.cell(1), Some(Cell::new(0, 0)));
        assert_eq!(index.cell(3), None);
    }

    #[test]
    fn mapping_is_a_dense_bijection() {
        let mut index = VariableIndex::new();
        let queries = [(3, 3), (1, 2), (3, 3), (0, 0), (1, 2), (5, 9), (0, 0)];
        for &(x, y) in &queries {
            index.id(Cell::new(x, y));
        }
        assert_eq!(index.len(), 4);
        for (id, cell) in index.iter() {
            assert!(id < index.len());
            assert_eq!(index.get(cell), Some(id));
        }
        assert_eq!(index.get(Cell::new(8, 8)), None);
    }
}
