use std::time::Duration;

use crate::{
    config::GridConfig,
    grid::Grid,
    surface::{CellSurface, padded_glyph_rect},
};

/// Traversal order for the one-time materialization sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RevealOrder {
    /// Anti-diagonal wave from the top-left corner (groups keyed by
    /// `row + col`).
    Diagonal,
    /// Square wave expanding from an origin cell (groups keyed by Chebyshev
    /// ring distance).
    WaveFrom { col: u32, row: u32 },
}

/// Group all `(row, col)` pairs by their anti-diagonal index `row + col`,
/// producing `rows + columns - 1` groups, each ordered by increasing row.
pub fn diagonal_groups(rows: u32, columns: u32) -> Vec<Vec<(u32, u32)>> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }
    let group_count = rows + columns - 1;
    let mut groups = Vec::with_capacity(group_count as usize);
    for k in 0..group_count {
        let row_lo = k.saturating_sub(columns - 1);
        let row_hi = k.min(rows - 1);
        let mut group = Vec::with_capacity((row_hi - row_lo + 1) as usize);
        for row in row_lo..=row_hi {
            group.push((row, k - row));
        }
        groups.push(group);
    }
    groups
}

/// Group all `(row, col)` pairs by Chebyshev distance from an origin cell,
/// producing square rings expanding outward. The origin is clamped into the
/// grid. Each group is ordered by increasing row, then column.
pub fn wave_groups_from(rows: u32, columns: u32, origin_col: u32, origin_row: u32) -> Vec<Vec<(u32, u32)>> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }
    let oc = origin_col.min(columns - 1);
    let or = origin_row.min(rows - 1);
    let max_ring = or
        .max(rows - 1 - or)
        .max(oc.max(columns - 1 - oc));

    let mut groups = vec![Vec::new(); (max_ring + 1) as usize];
    for row in 0..rows {
        for col in 0..columns {
            let ring = row.abs_diff(or).max(col.abs_diff(oc));
            groups[ring as usize].push((row, col));
        }
    }
    groups
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GrowthState {
    Pending,
    Growing,
    Done,
}

#[derive(Clone, Copy, Debug)]
struct Growth {
    cell: usize,
    start: Duration,
    state: GrowthState,
}

/// Drives the staged "grow a filled square" materialization, wave by wave.
/// Group `k` starts `k * step_delay` after reveal start; each cell then grows
/// a filled square from side 0 to the full symbol size and settles into its
/// steady-state glyph.
pub struct RevealScheduler {
    growths: Vec<Growth>,
    growth_duration: Duration,
    total: Duration,
}

impl RevealScheduler {
    pub fn new(grid: &Grid, order: RevealOrder, step_delay: Duration, growth: Duration) -> Self {
        let geometry = grid.geometry();
        let groups = match order {
            RevealOrder::Diagonal => diagonal_groups(geometry.rows, geometry.columns),
            RevealOrder::WaveFrom { col, row } => {
                wave_groups_from(geometry.rows, geometry.columns, col, row)
            }
        };

        let mut growths = Vec::with_capacity(grid.len());
        for (k, group) in groups.iter().enumerate() {
            for &(row, col) in group {
                let Some(cell) = grid.index_of(row, col) else {
                    continue;
                };
                growths.push(Growth {
                    cell,
                    start: step_delay * k as u32,
                    state: GrowthState::Pending,
                });
            }
        }

        let total = if groups.is_empty() {
            Duration::ZERO
        } else {
            step_delay * (groups.len() - 1) as u32 + growth
        };

        Self {
            growths,
            growth_duration: growth,
            total,
        }
    }

    /// Time after which every group has been dispatched plus one full growth
    /// animation; the facade's handoff point to the flash phase. Zero for an
    /// empty grid.
    pub fn total_duration(&self) -> Duration {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.growths.iter().all(|g| g.state == GrowthState::Done)
    }

    /// Advance every in-window growth to time `t` (relative to reveal start).
    /// A failed draw abandons that cell's animation and is logged, never
    /// propagated into the scheduler.
    pub fn tick(
        &mut self,
        t: Duration,
        grid: &mut Grid,
        surface: &mut dyn CellSurface,
        config: &GridConfig,
    ) {
        let geometry = grid.geometry();
        for g in &mut self.growths {
            if g.state == GrowthState::Done || t < g.start {
                continue;
            }

            let Some(cell) = grid.cell(g.cell) else {
                g.state = GrowthState::Done;
                continue;
            };
            let (row, col, anchor, symbol) = (cell.row, cell.col, cell.anchor, cell.symbol);

            let elapsed = t - g.start;
            let progress = elapsed.as_secs_f64() / self.growth_duration.as_secs_f64();

            let result = if progress < 1.0 {
                g.state = GrowthState::Growing;
                let side = progress * f64::from(config.symbol_size);
                surface.fill_square(anchor, side, config.symbol_color)
            } else {
                g.state = GrowthState::Done;
                let center = geometry.cell_center(row, col);
                grid.set_color(g.cell, config.symbol_color);
                grid.set_glow(g.cell, config.normal_glow_intensity);
                surface
                    .clear_rect(
                        padded_glyph_rect(center, config.symbol_size),
                        config.background_color,
                    )
                    .and_then(|_| {
                        surface.draw_glyph(
                            symbol,
                            center,
                            config.symbol_size as f32,
                            crate::surface::GlyphStyle {
                                fill: config.symbol_color,
                                glow_color: config.glow_color,
                                glow_radius: config.normal_glow_intensity,
                            },
                        )
                    })
            };

            if let Err(err) = result {
                tracing::warn!(cell = g.cell, %err, "reveal draw failed; abandoning cell");
                g.state = GrowthState::Done;
            }
        }
    }
}
