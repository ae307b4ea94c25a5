use crate::{
    core::Rgba8,
    error::{GlyphGridError, GridResult},
    reveal::RevealOrder,
};

/// Full engine configuration. Immutable between reconfigurations; the engine
/// replaces it wholesale when a patch is applied.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridConfig {
    pub background_color: Rgba8,
    pub symbol_color: Rgba8,
    pub flash_color: Rgba8,
    pub glow_color: Rgba8,
    pub symbol_size: u32,
    pub symbol_spacing: f64, // multiplier of symbol_size added between cells
    pub symbols: Vec<char>,
    pub normal_glow_intensity: f64,
    pub flash_glow_intensity: f64,
    pub flash_duration_ms: u64,
    pub flash_interval_ms: u64,
    pub reveal_step_delay_ms: u64,
    pub reveal_growth_ms: u64,
    pub reveal_order: RevealOrder,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            background_color: Rgba8::rgb(0x00, 0x00, 0x00),
            symbol_color: Rgba8::rgb(0x00, 0xff, 0x00),
            flash_color: Rgba8::rgb(0xff, 0xff, 0xff),
            glow_color: Rgba8::rgb(0x00, 0xff, 0x00),
            symbol_size: 48,
            symbol_spacing: 1.5,
            symbols: vec!['き'],
            normal_glow_intensity: 0.0,
            flash_glow_intensity: 30.0,
            flash_duration_ms: 150,
            flash_interval_ms: 2000,
            reveal_step_delay_ms: 10,
            reveal_growth_ms: 100,
            reveal_order: RevealOrder::Diagonal,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> GridResult<()> {
        if self.symbol_size == 0 {
            return Err(GlyphGridError::config("symbol_size must be > 0"));
        }
        if !self.symbol_spacing.is_finite() || self.symbol_spacing < 0.0 {
            return Err(GlyphGridError::config(
                "symbol_spacing must be finite and >= 0",
            ));
        }
        if self.symbols.is_empty() {
            return Err(GlyphGridError::config(
                "candidate symbol set must be non-empty",
            ));
        }
        for glow in [self.normal_glow_intensity, self.flash_glow_intensity] {
            if !glow.is_finite() || glow < 0.0 {
                return Err(GlyphGridError::config(
                    "glow intensity must be finite and >= 0",
                ));
            }
        }
        if self.flash_duration_ms == 0 {
            return Err(GlyphGridError::config("flash_duration_ms must be > 0"));
        }
        if self.flash_interval_ms == 0 {
            return Err(GlyphGridError::config("flash_interval_ms must be > 0"));
        }
        if self.reveal_growth_ms == 0 {
            return Err(GlyphGridError::config("reveal_growth_ms must be > 0"));
        }
        Ok(())
    }

    /// Shallow-merge a patch. Returns true when a geometry-affecting field
    /// (symbol size, spacing, reveal order) actually changed value, in which
    /// case the caller must rebuild the grid and restart the reveal sweep.
    pub fn apply(&mut self, patch: &GridPatch) -> bool {
        let mut geometry_changed = false;

        if let Some(v) = patch.background_color {
            self.background_color = v;
        }
        if let Some(v) = patch.symbol_color {
            self.symbol_color = v;
        }
        if let Some(v) = patch.flash_color {
            self.flash_color = v;
        }
        if let Some(v) = patch.glow_color {
            self.glow_color = v;
        }
        if let Some(v) = patch.symbol_size {
            geometry_changed |= v != self.symbol_size;
            self.symbol_size = v;
        }
        if let Some(v) = patch.symbol_spacing {
            geometry_changed |= v != self.symbol_spacing;
            self.symbol_spacing = v;
        }
        // `symbols` wins over the single-glyph `symbol` shorthand when both
        // are present, matching the options object the engine accepts.
        if let Some(ref v) = patch.symbols {
            self.symbols = v.clone();
        } else if let Some(v) = patch.symbol {
            self.symbols = vec![v];
        }
        if let Some(v) = patch.normal_glow_intensity {
            self.normal_glow_intensity = v;
        }
        if let Some(v) = patch.flash_glow_intensity {
            self.flash_glow_intensity = v;
        }
        if let Some(v) = patch.flash_duration_ms {
            self.flash_duration_ms = v;
        }
        if let Some(v) = patch.flash_interval_ms {
            self.flash_interval_ms = v;
        }
        if let Some(v) = patch.reveal_step_delay_ms {
            self.reveal_step_delay_ms = v;
        }
        if let Some(v) = patch.reveal_growth_ms {
            self.reveal_growth_ms = v;
        }
        if let Some(v) = patch.reveal_order {
            geometry_changed |= v != self.reveal_order;
            self.reveal_order = v;
        }

        geometry_changed
    }
}

/// Partial configuration for live updates. Every field is optional; omitted
/// fields keep their current value.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridPatch {
    pub background_color: Option<Rgba8>,
    pub symbol_color: Option<Rgba8>,
    pub flash_color: Option<Rgba8>,
    pub glow_color: Option<Rgba8>,
    pub symbol_size: Option<u32>,
    pub symbol_spacing: Option<f64>,
    pub symbol: Option<char>,
    pub symbols: Option<Vec<char>>,
    pub normal_glow_intensity: Option<f64>,
    pub flash_glow_intensity: Option<f64>,
    pub flash_duration_ms: Option<u64>,
    pub flash_interval_ms: Option<u64>,
    pub reveal_step_delay_ms: Option<u64>,
    pub reveal_growth_ms: Option<u64>,
    pub reveal_order: Option<RevealOrder>,
}
