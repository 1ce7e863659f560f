use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Board position as `(row, col)`.
pub type Cell = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Cell {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Iterates the up-to-8 cells adjacent to `cell`, clipped to `bounds`.
/// The cell itself is never yielded.
pub fn neighbors(cell: Cell, bounds: Cell) -> impl Iterator<Item = Cell> {
    DISPLACEMENTS.iter().filter_map(move |&(dr, dc)| {
        let row = cell.0.checked_add_signed(dr)?;
        let col = cell.1.checked_add_signed(dc)?;
        (row < bounds.0 && col < bounds.1).then_some((row, col))
    })
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell>;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> {
        let dim = self.dim();
        let bounds = (
            dim.0.try_into().unwrap_or(Coord::MAX),
            dim.1.try_into().unwrap_or(Coord::MAX),
        );
        neighbors(cell, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn center_cell_has_eight_neighbors() {
        let found: Vec<Cell> = neighbors((1, 1), (3, 3)).collect();

        assert_eq!(found.len(), 8);
        assert!(!found.contains(&(1, 1)));
    }

    #[test]
    fn corner_cell_is_clipped_to_three_neighbors() {
        let found: Vec<Cell> = neighbors((0, 0), (3, 3)).collect();

        assert_eq!(found.len(), 3);
        assert!(found.contains(&(0, 1)));
        assert!(found.contains(&(1, 0)));
        assert!(found.contains(&(1, 1)));
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert_eq!(neighbors((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn array_extension_uses_array_bounds() {
        let grid: Array2<u8> = Array2::default([2, 2]);

        let found: Vec<Cell> = grid.iter_neighbors((1, 1)).collect();

        assert_eq!(found.len(), 3);
    }
}
