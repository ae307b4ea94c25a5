use rand::Rng;

use crate::{
    core::{Point, Rgba8},
    geometry::GridGeometry,
};

/// One grid cell. Created at grid initialization and mutated in place by the
/// schedulers; cells are never destroyed individually, only the whole grid is
/// rebuilt on reconfiguration or resize.
#[derive(Clone, Debug)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    /// Top-left pixel of the cell's pitch box.
    pub anchor: Point,
    pub symbol: char,
    pub glow: f64,
    pub color: Rgba8,
}

/// Rectangular rows x columns cell store, row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    geometry: GridGeometry,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate all cells, each assigned a symbol drawn uniformly at random
    /// from the candidate set.
    pub fn initialize<R: Rng>(
        geometry: GridGeometry,
        symbols: &[char],
        steady_color: Rgba8,
        rng: &mut R,
    ) -> Self {
        let mut cells = Vec::with_capacity(geometry.cell_count());
        for row in 0..geometry.rows {
            for col in 0..geometry.columns {
                cells.push(Cell {
                    row,
                    col,
                    anchor: geometry.cell_anchor(row, col),
                    symbol: pick_symbol(symbols, rng),
                    glow: 0.0,
                    color: steady_color,
                });
            }
        }
        Self { geometry, cells }
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.geometry.rows || col >= self.geometry.columns {
            return None;
        }
        Some(row as usize * self.geometry.columns as usize + col as usize)
    }

    /// Uniformly random cell index; `None` only when the grid has zero cells.
    /// Callers skip the cycle on `None` rather than erroring.
    pub fn pick_random_cell<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }
        Some(rng.gen_range(0..self.cells.len()))
    }

    pub fn set_symbol(&mut self, index: usize, symbol: char) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.symbol = symbol;
        }
    }

    pub fn set_color(&mut self, index: usize, color: Rgba8) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.color = color;
        }
    }

    pub fn set_glow(&mut self, index: usize, glow: f64) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.glow = glow;
        }
    }
}

/// Uniform draw from the candidate set. The set is validated non-empty at
/// configuration time.
pub fn pick_symbol<R: Rng>(symbols: &[char], rng: &mut R) -> char {
    symbols[rng.gen_range(0..symbols.len())]
}
