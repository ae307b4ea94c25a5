use crate::core::{Point, Rect, SurfaceSize};

/// Grid placement derived from the surface extent and the per-symbol size and
/// spacing. Cells start at the top-left origin; the grid is never centered or
/// padded, and always fits the surface without clipping (floor division).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridGeometry {
    pub columns: u32,
    pub rows: u32,
    pub cell_pitch: u32,
    pub used_width: u32,
    pub used_height: u32,
}

impl GridGeometry {
    /// `cell_pitch = floor(symbol_size * (spacing + 1))`, then floor-divide
    /// the surface into whole cells. A pitch larger than either dimension
    /// yields an empty grid, which is a valid state, not an error.
    pub fn compute(size: SurfaceSize, symbol_size: u32, spacing: f64) -> Self {
        let pitch_f = (f64::from(symbol_size) * (spacing + 1.0)).floor();
        let cell_pitch = pitch_f.clamp(1.0, f64::from(u32::MAX)) as u32;

        let columns = size.width / cell_pitch;
        let rows = size.height / cell_pitch;

        Self {
            columns,
            rows,
            cell_pitch,
            used_width: cell_pitch * columns,
            used_height: cell_pitch * rows,
        }
    }

    pub fn cell_count(self) -> usize {
        self.rows as usize * self.columns as usize
    }

    pub fn is_empty(self) -> bool {
        self.rows == 0 || self.columns == 0
    }

    /// Top-left pixel of a cell; the anchor the growth animation fills from.
    pub fn cell_anchor(self, row: u32, col: u32) -> Point {
        Point::new(
            f64::from(col) * f64::from(self.cell_pitch),
            f64::from(row) * f64::from(self.cell_pitch),
        )
    }

    /// Center of a cell's pitch box; glyphs are painted centered here.
    pub fn cell_center(self, row: u32, col: u32) -> Point {
        let half = f64::from(self.cell_pitch) / 2.0;
        let anchor = self.cell_anchor(row, col);
        Point::new(anchor.x + half, anchor.y + half)
    }

    /// The full pitch box of a cell.
    pub fn cell_rect(self, row: u32, col: u32) -> Rect {
        let anchor = self.cell_anchor(row, col);
        let pitch = f64::from(self.cell_pitch);
        Rect::new(anchor.x, anchor.y, anchor.x + pitch, anchor.y + pitch)
    }

    /// Nearest-cell mapping from a surface pixel, for pointer tracking.
    /// Rounds `position / pitch`, so it snaps to the nearest cell origin
    /// rather than hit-testing exact bounds.
    pub fn cell_index_from_pixel(self, x: f64, y: f64) -> Option<(u32, u32)> {
        if self.is_empty() {
            return None;
        }
        let col = (x / f64::from(self.cell_pitch)).round();
        let row = (y / f64::from(self.cell_pitch)).round();
        if col < 0.0 || row < 0.0 || col >= f64::from(self.columns) || row >= f64::from(self.rows)
        {
            return None;
        }
        Some((col as u32, row as u32))
    }
}
