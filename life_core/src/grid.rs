// grid.rs - Grid types for Conway's Game of Life

use std::fmt;

use rand::Rng;

use crate::error::GridError;

// Reference board size (50x50 playing area)
pub const DEFAULT_ROWS: usize = 50;
pub const DEFAULT_COLS: usize = 50;

// Reference chance of a cell coming up alive when the board is randomized
pub const DEFAULT_LIVE_PROBABILITY: f64 = 0.2;

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }

    #[inline]
    pub fn toggled(self) -> Cell {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }
}

/// A bounded board of cells, stored row-major.
///
/// Every operation that "changes" the board returns a fresh `Grid` and leaves
/// `self` untouched, so older generations stay valid for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-dead grid of the given size.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Dead; rows * cols],
        })
    }

    /// Grid where exactly the listed coordinates are alive.
    pub fn from_live_cells(
        rows: usize,
        cols: usize,
        live: &[(usize, usize)],
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(rows, cols)?;
        for &(row, col) in live {
            let idx = grid.index(row, col)?;
            grid.cells[idx] = Cell::Alive;
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).ok().map(|idx| self.cells[idx])
    }

    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Cell::is_alive)
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Coordinates of every live cell, row by row.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(move |(idx, _)| (idx / cols, idx % cols))
    }

    /// Number of live cells among the (up to) 8 neighbours of `(row, col)`.
    /// Positions off the edge of the board count as dead; there is no wraparound.
    pub fn count_live_neighbors(&self, row: usize, col: usize) -> Result<u8, GridError> {
        self.index(row, col)?;
        Ok(self.live_neighbors(row, col))
    }

    /// Next generation under the classic B3/S23 rules.
    pub fn step(&self) -> Grid {
        let cells = (0..self.rows).flat_map(|row| self.next_row(row)).collect();
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Fresh grid where each cell is independently alive with `live_probability`.
    /// One draw per cell in row-major order, so a seeded `rng` gives a reproducible board.
    pub fn randomize<R: Rng>(&self, live_probability: f64, rng: &mut R) -> Grid {
        let cells = (0..self.cells.len())
            .map(|_| {
                if rng.random::<f64>() < live_probability {
                    Cell::Alive
                } else {
                    Cell::Dead
                }
            })
            .collect();
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    pub fn clear(&self) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: vec![Cell::Dead; self.cells.len()],
        }
    }

    pub fn toggle_cell(&self, row: usize, col: usize) -> Result<Grid, GridError> {
        let idx = self.index(row, col)?;
        let mut next = self.clone();
        next.cells[idx] = next.cells[idx].toggled();
        Ok(next)
    }

    /// Computes one row of the next generation, reading only `self`.
    fn next_row(&self, row: usize) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cols).map(move |col| {
            let current = self.cells[row * self.cols + col];
            let count = self.live_neighbors(row, col);

            // Death is checked before birth; everything else keeps its state.
            if count < 2 || count > 3 {
                Cell::Dead
            } else if current == Cell::Dead && count == 3 {
                Cell::Alive
            } else {
                current
            }
        })
    }

    fn live_neighbors(&self, row: usize, col: usize) -> u8 {
        let mut count = 0;
        for &(dr, dc) in &NEIGHBOR_OFFSETS {
            let (Some(nr), Some(nc)) = (row.checked_add_signed(dr), col.checked_add_signed(dc))
            else {
                continue;
            };
            if nr < self.rows && nc < self.cols && self.cells[nr * self.cols + nc].is_alive() {
                count += 1;
            }
        }
        count
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for cell in row {
                f.write_str(if cell.is_alive() { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn blinker() -> Grid {
        Grid::from_live_cells(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap()
    }

    #[test]
    fn new_grid_is_all_dead() {
        let grid = Grid::new(3, 4).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (3, 4));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert_eq!(
            Grid::new(0, 5),
            Err(GridError::InvalidDimensions { rows: 0, cols: 5 })
        );
        assert_eq!(
            Grid::new(5, 0),
            Err(GridError::InvalidDimensions { rows: 5, cols: 0 })
        );
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let start = blinker();

        let first = start.step();
        assert_eq!(first.live_cells().collect::<Vec<_>>(), vec![(1, 2), (2, 2), (3, 2)]);

        let second = first.step();
        assert_eq!(second, start);
    }

    #[test]
    fn step_keeps_dimensions_and_leaves_input_alone() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = Grid::new(7, 11).unwrap().randomize(0.4, &mut rng);
        let before = grid.clone();

        let next = grid.step();

        assert_eq!((next.rows(), next.cols()), (7, 11));
        assert_eq!(grid, before);
    }

    #[test]
    fn corner_cell_has_no_wraparound_neighbours() {
        let grid = Grid::from_live_cells(3, 3, &[(0, 0)]).unwrap();
        assert_eq!(grid.count_live_neighbors(0, 0), Ok(0));
        assert_eq!(grid.count_live_neighbors(2, 2), Ok(0));
        assert_eq!(grid.count_live_neighbors(1, 1), Ok(1));
        assert_eq!(grid.step().population(), 0);
    }

    #[test]
    fn neighbour_count_outside_grid_is_an_error() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(
            grid.count_live_neighbors(3, 0),
            Err(GridError::OutOfBounds { row: 3, col: 0, rows: 3, cols: 3 })
        );
    }

    // Every 3x3 neighbourhood, checked against the rule table for the centre cell.
    #[test]
    fn centre_cell_follows_rules_for_every_neighbourhood() {
        for mask in 0u16..512 {
            let live: Vec<_> = (0..9)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| (bit / 3, bit % 3))
                .collect();
            let grid = Grid::from_live_cells(3, 3, &live).unwrap();
            let alive = grid.is_alive(1, 1);
            let n = grid.count_live_neighbors(1, 1).unwrap();

            let expected = match (alive, n) {
                (true, 2) | (true, 3) => true,
                (false, 3) => true,
                _ => false,
            };
            assert_eq!(grid.step().is_alive(1, 1), expected, "mask {mask:#011b}\n{grid}");
        }
    }

    #[test]
    fn cleared_grid_is_a_fixed_point() {
        let mut rng = StdRng::seed_from_u64(3);
        let cleared = Grid::new(6, 6).unwrap().randomize(0.5, &mut rng).clear();
        assert_eq!(cleared.population(), 0);
        assert_eq!(cleared.step(), cleared);
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let grid = blinker();
        let once = grid.toggle_cell(0, 4).unwrap();
        assert!(once.is_alive(0, 4));
        assert!(!grid.is_alive(0, 4));
        assert_eq!(once.toggle_cell(0, 4).unwrap(), grid);
    }

    #[test]
    fn toggle_outside_grid_is_rejected() {
        let grid = blinker();
        assert_eq!(
            grid.toggle_cell(2, 5),
            Err(GridError::OutOfBounds { row: 2, col: 5, rows: 5, cols: 5 })
        );
    }

    #[test]
    fn seeded_randomize_is_reproducible() {
        let grid = Grid::new(20, 20).unwrap();
        let a = grid.randomize(DEFAULT_LIVE_PROBABILITY, &mut StdRng::seed_from_u64(42));
        let b = grid.randomize(DEFAULT_LIVE_PROBABILITY, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.population() > 0 && a.population() < 400);
    }

    #[test]
    fn randomize_extremes() {
        let grid = Grid::new(4, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(grid.randomize(0.0, &mut rng).population(), 0);
        assert_eq!(grid.randomize(1.0, &mut rng).population(), 16);
    }

    #[test]
    fn display_uses_hash_and_dot() {
        let grid = Grid::from_live_cells(2, 3, &[(0, 1), (1, 2)]).unwrap();
        assert_eq!(grid.to_string(), ".#.\n..#\n");
    }
}
