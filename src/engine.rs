use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::{GridConfig, GridPatch},
    core::SurfaceSize,
    error::GridResult,
    flash::FlashScheduler,
    geometry::GridGeometry,
    grid::Grid,
    reveal::RevealScheduler,
    surface::CellSurface,
};

enum Phase {
    Revealing(RevealScheduler),
    Flashing(FlashScheduler),
}

/// The engine facade: owns the configuration, the grid, and both schedulers,
/// and advances them from a single host-driven `tick`.
///
/// All animation runs cooperatively on the caller's thread; one `tick` per
/// display refresh plus the timestamps it carries replace frame callbacks and
/// timers. The engine is the only writer of its surface.
pub struct Engine {
    config: GridConfig,
    size: SurfaceSize,
    geometry: GridGeometry,
    grid: Grid,
    phase: Phase,
    rng: StdRng,
    /// Time of the first tick; all scheduling is relative to it.
    epoch: Option<Duration>,
    background_painted: bool,
    disposed: bool,
}

impl Engine {
    /// Validate the configuration and build the grid. Fails fast on a bad
    /// configuration with no partial construction. A surface too small for
    /// one cell (or with zero extent) yields a valid empty engine whose ticks
    /// are no-ops.
    pub fn new(size: SurfaceSize, config: GridConfig) -> GridResult<Self> {
        Self::with_rng(size, config, StdRng::from_entropy())
    }

    /// Deterministic construction for tests and reproducible renders.
    pub fn with_seed(size: SurfaceSize, config: GridConfig, seed: u64) -> GridResult<Self> {
        Self::with_rng(size, config, StdRng::seed_from_u64(seed))
    }

    #[tracing::instrument(skip_all, fields(width = size.width, height = size.height))]
    pub fn with_rng(size: SurfaceSize, config: GridConfig, mut rng: StdRng) -> GridResult<Self> {
        config.validate()?;

        let geometry = GridGeometry::compute(size, config.symbol_size, config.symbol_spacing);
        let grid = Grid::initialize(geometry, &config.symbols, config.symbol_color, &mut rng);
        let reveal = Self::build_reveal(&grid, &config);
        tracing::debug!(
            columns = geometry.columns,
            rows = geometry.rows,
            cell_pitch = geometry.cell_pitch,
            "grid initialized"
        );

        Ok(Self {
            config,
            size,
            geometry,
            grid,
            phase: Phase::Revealing(reveal),
            rng,
            epoch: None,
            background_painted: false,
            disposed: false,
        })
    }

    fn build_reveal(grid: &Grid, config: &GridConfig) -> RevealScheduler {
        RevealScheduler::new(
            grid,
            config.reveal_order,
            Duration::from_millis(config.reveal_step_delay_ms),
            Duration::from_millis(config.reveal_growth_ms),
        )
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// True once the reveal sweep has handed over to ambient flashing.
    pub fn is_flashing(&self) -> bool {
        matches!(self.phase, Phase::Flashing(_))
    }

    /// Nearest cell under a surface pixel, for pointer tracking.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        self.geometry.cell_index_from_pixel(x, y)
    }

    /// Advance the animation to `now` (monotonic, host-defined origin) and
    /// draw onto `surface`. The first tick anchors the timeline and paints
    /// the background; the reveal runs once, then flashing takes over
    /// indefinitely. After `dispose` this is a no-op.
    pub fn tick(&mut self, now: Duration, surface: &mut dyn CellSurface) -> GridResult<()> {
        if self.disposed {
            return Ok(());
        }

        let epoch = *self.epoch.get_or_insert(now);
        let t = now.saturating_sub(epoch);

        if !self.background_painted {
            surface.clear_rect(self.size.bounds(), self.config.background_color)?;
            self.background_painted = true;
        }

        match &mut self.phase {
            Phase::Revealing(reveal) => {
                reveal.tick(t, &mut self.grid, surface, &self.config);
                let total = reveal.total_duration();
                if t >= total && reveal.is_complete() {
                    tracing::debug!(elapsed = ?t, "reveal complete; starting flash phase");
                    let first_pick =
                        total + Duration::from_millis(self.config.flash_interval_ms);
                    self.phase = Phase::Flashing(FlashScheduler::new(first_pick));
                }
            }
            Phase::Flashing(flash) => {
                flash.tick(t, &mut self.grid, surface, &self.config, &mut self.rng);
            }
        }
        Ok(())
    }

    /// Merge a partial configuration. A geometry-affecting change (symbol
    /// size, spacing, reveal order) rebuilds the grid and restarts the
    /// reveal/flash sequencing from scratch; any other change applies to
    /// subsequent draws without resetting in-flight animations. The merged
    /// configuration is validated before any of it takes effect.
    pub fn update_options(&mut self, patch: &GridPatch) -> GridResult<()> {
        let mut merged = self.config.clone();
        let geometry_changed = merged.apply(patch);
        merged.validate()?;

        self.config = merged;
        if geometry_changed {
            self.rebuild();
        }
        Ok(())
    }

    /// Adopt a new surface extent: rebuild the grid and restart the reveal.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.geometry =
            GridGeometry::compute(self.size, self.config.symbol_size, self.config.symbol_spacing);
        self.grid = Grid::initialize(
            self.geometry,
            &self.config.symbols,
            self.config.symbol_color,
            &mut self.rng,
        );
        self.phase = Phase::Revealing(Self::build_reveal(&self.grid, &self.config));
        self.epoch = None;
        self.background_painted = false;
        tracing::debug!(
            columns = self.geometry.columns,
            rows = self.geometry.rows,
            "grid rebuilt"
        );
    }

    /// Stop all animation permanently. Idempotent; every later `tick` is a
    /// no-op, so a torn-down surface is never drawn to again.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Point, Rect, Rgba8},
        error::GridResult,
        surface::{CellSurface, GlyphStyle},
    };

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Clear(Rgba8),
        Square,
        Glyph(Rgba8),
    }

    #[derive(Default)]
    struct EventLog {
        events: Vec<Event>,
    }

    impl CellSurface for EventLog {
        fn size(&self) -> SurfaceSize {
            SurfaceSize::new(400, 400)
        }
        fn clear_rect(&mut self, _rect: Rect, color: Rgba8) -> GridResult<()> {
            self.events.push(Event::Clear(color));
            Ok(())
        }
        fn fill_square(&mut self, _origin: Point, _side: f64, _color: Rgba8) -> GridResult<()> {
            self.events.push(Event::Square);
            Ok(())
        }
        fn draw_glyph(
            &mut self,
            _glyph: char,
            _center: Point,
            _size_px: f32,
            style: GlyphStyle,
        ) -> GridResult<()> {
            self.events.push(Event::Glyph(style.fill));
            Ok(())
        }
    }

    fn test_config() -> GridConfig {
        GridConfig {
            symbol_size: 50,
            symbol_spacing: 1.0,
            reveal_step_delay_ms: 10,
            reveal_growth_ms: 100,
            flash_duration_ms: 150,
            flash_interval_ms: 500,
            ..GridConfig::default()
        }
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = GridConfig {
            symbols: vec![],
            ..test_config()
        };
        assert!(Engine::with_seed(SurfaceSize::new(400, 400), config, 1).is_err());
    }

    #[test]
    fn flashing_starts_only_after_reveal_total_duration() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 9).unwrap();
        let mut surface = EventLog::default();
        // 4x4 grid: reveal total = 6*10 + 100 = 160ms
        for ms in [0u64, 50, 100, 159] {
            engine.tick(Duration::from_millis(ms), &mut surface).unwrap();
            assert!(!engine.is_flashing(), "flashing at {ms}ms");
        }
        engine
            .tick(Duration::from_millis(160), &mut surface)
            .unwrap();
        assert!(engine.is_flashing());

        // first flash draw appears only after one interval past the handoff
        let flash_color = engine.config().flash_color;
        let before = surface.events.len();
        engine
            .tick(Duration::from_millis(600), &mut surface)
            .unwrap();
        engine
            .tick(Duration::from_millis(661), &mut surface)
            .unwrap();
        assert!(
            surface.events[before..]
                .iter()
                .any(|e| *e == Event::Glyph(flash_color)),
            "no flash draw after interval elapsed"
        );
    }

    #[test]
    fn empty_surface_runs_without_side_effects() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(40, 40), test_config(), 2).unwrap();
        assert!(engine.geometry().is_empty());

        let mut surface = EventLog::default();
        for ms in [0u64, 100, 5_000] {
            engine.tick(Duration::from_millis(ms), &mut surface).unwrap();
        }
        // only the one-time background paint; no squares, no glyphs
        assert_eq!(surface.events.len(), 1);
        assert!(matches!(surface.events[0], Event::Clear(_)));
        assert!(engine.is_flashing());
    }

    #[test]
    fn color_only_update_keeps_grid_and_phase() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 3).unwrap();
        let mut surface = EventLog::default();
        engine
            .tick(Duration::from_millis(500), &mut surface)
            .unwrap();
        assert!(engine.is_flashing());

        let before = engine.geometry();
        engine
            .update_options(&GridPatch {
                symbol_color: Some(Rgba8::rgb(9, 9, 9)),
                flash_interval_ms: Some(250),
                ..GridPatch::default()
            })
            .unwrap();
        assert_eq!(engine.geometry(), before);
        assert!(engine.is_flashing(), "color update must not restart reveal");
    }

    #[test]
    fn geometry_update_rebuilds_and_restarts_reveal() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 4).unwrap();
        let mut surface = EventLog::default();
        engine
            .tick(Duration::from_millis(500), &mut surface)
            .unwrap();
        assert!(engine.is_flashing());

        engine
            .update_options(&GridPatch {
                symbol_size: Some(100),
                ..GridPatch::default()
            })
            .unwrap();
        assert!(!engine.is_flashing());
        assert_eq!(engine.geometry().cell_pitch, 200);
        assert_eq!(engine.geometry().columns, 2);
    }

    #[test]
    fn invalid_update_leaves_config_untouched() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 5).unwrap();
        let err = engine.update_options(&GridPatch {
            symbols: Some(vec![]),
            ..GridPatch::default()
        });
        assert!(err.is_err());
        assert_eq!(engine.config().symbols, GridConfig::default().symbols);
    }

    #[test]
    fn disposed_engine_never_draws() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 6).unwrap();
        engine.dispose();
        let mut surface = EventLog::default();
        engine.tick(Duration::ZERO, &mut surface).unwrap();
        engine
            .tick(Duration::from_millis(1000), &mut surface)
            .unwrap();
        assert!(surface.events.is_empty());
    }

    #[test]
    fn resize_to_zero_extent_is_a_valid_empty_state() {
        let mut engine =
            Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 7).unwrap();
        engine.resize(SurfaceSize::new(0, 0));
        assert!(engine.geometry().is_empty());

        let mut surface = EventLog::default();
        engine
            .tick(Duration::from_millis(100), &mut surface)
            .unwrap();
        assert!(surface.events.len() <= 1); // background paint only
    }

    #[test]
    fn pointer_mapping_uses_live_geometry() {
        let engine = Engine::with_seed(SurfaceSize::new(400, 400), test_config(), 8).unwrap();
        assert_eq!(engine.cell_at(10.0, 10.0), Some((0, 0)));
        assert_eq!(engine.cell_at(-5.0, 10.0), None);
    }
}
