use std::time::Duration;

use rand::Rng;

use crate::{
    config::GridConfig,
    grid::{Grid, pick_symbol},
    surface::{CellSurface, GlyphStyle, padded_glyph_rect},
};

/// Upper bound on picks replayed in a single tick after the host stalls.
/// Past it the deadline jumps forward instead of flooding the grid.
const MAX_CATCHUP_PICKS: usize = 32;

#[derive(Clone, Copy, Debug)]
struct FlashAnim {
    cell: usize,
    start: Duration,
}

/// Ambient phase driver: on every elapsed interval, pick a random cell, swap
/// its symbol, and ramp its glow linearly over the flash duration before
/// settling it back to steady state. Picks are anchored to scheduled times,
/// independent of ramp length, so a duration longer than the interval yields
/// overlapping in-flight ramps; that overlap is intentional and preserved.
pub struct FlashScheduler {
    next_pick_at: Duration,
    active: Vec<FlashAnim>,
}

impl FlashScheduler {
    pub fn new(first_pick_at: Duration) -> Self {
        Self {
            next_pick_at: first_pick_at,
            active: Vec::new(),
        }
    }

    /// Number of glow ramps currently in flight.
    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    /// Advance to time `t` (relative to engine start): schedule any due
    /// picks, then redraw every in-flight ramp. Interval and duration are
    /// read from the live config so timing updates apply to subsequent
    /// cycles without retiming ramps already in flight.
    pub fn tick<R: Rng>(
        &mut self,
        t: Duration,
        grid: &mut Grid,
        surface: &mut dyn CellSurface,
        config: &GridConfig,
        rng: &mut R,
    ) {
        let interval = Duration::from_millis(config.flash_interval_ms);
        let duration = Duration::from_millis(config.flash_duration_ms);

        let mut picks = 0usize;
        while t >= self.next_pick_at {
            if picks >= MAX_CATCHUP_PICKS {
                tracing::debug!(skipped_until = ?t, "flash scheduler fast-forwarding after stall");
                self.next_pick_at = t + interval;
                break;
            }
            let scheduled = self.next_pick_at;
            self.next_pick_at += interval;
            picks += 1;

            // Empty grid: the deadline still advances, so this neither
            // errors nor spins.
            let Some(index) = grid.pick_random_cell(rng) else {
                continue;
            };
            let symbol = pick_symbol(&config.symbols, rng);
            grid.set_symbol(index, symbol);
            self.active.push(FlashAnim {
                cell: index,
                start: scheduled,
            });
        }

        let mut i = 0;
        while i < self.active.len() {
            let flash = self.active[i];
            match self.advance_ramp(flash, t, duration, grid, surface, config) {
                Ok(true) => i += 1,
                Ok(false) => {
                    self.active.swap_remove(i);
                }
                Err(err) => {
                    tracing::warn!(cell = flash.cell, %err, "flash draw failed; aborting cycle");
                    self.active.swap_remove(i);
                }
            }
        }
    }

    /// Returns Ok(true) while the ramp stays in flight.
    fn advance_ramp(
        &self,
        flash: FlashAnim,
        t: Duration,
        duration: Duration,
        grid: &mut Grid,
        surface: &mut dyn CellSurface,
        config: &GridConfig,
    ) -> crate::error::GridResult<bool> {
        let Some(cell) = grid.cell(flash.cell) else {
            return Ok(false);
        };
        let (row, col, symbol) = (cell.row, cell.col, cell.symbol);
        let center = grid.geometry().cell_center(row, col);

        let progress =
            t.saturating_sub(flash.start).as_secs_f64() / duration.as_secs_f64();

        // Erase the previous frame, glow halo included.
        surface.clear_rect(
            padded_glyph_rect(center, config.symbol_size),
            config.background_color,
        )?;

        if progress < 1.0 {
            let glow = config.flash_glow_intensity * progress;
            grid.set_color(flash.cell, config.flash_color);
            grid.set_glow(flash.cell, glow);
            surface.draw_glyph(
                symbol,
                center,
                config.symbol_size as f32,
                GlyphStyle {
                    fill: config.flash_color,
                    glow_color: config.glow_color,
                    glow_radius: glow,
                },
            )?;
            Ok(true)
        } else {
            grid.set_color(flash.cell, config.symbol_color);
            grid.set_glow(flash.cell, config.normal_glow_intensity);
            surface.draw_glyph(
                symbol,
                center,
                config.symbol_size as f32,
                GlyphStyle {
                    fill: config.symbol_color,
                    glow_color: config.glow_color,
                    glow_radius: config.normal_glow_intensity,
                },
            )?;
            Ok(false)
        }
    }
}
