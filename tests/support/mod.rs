use glyphgrid::{CellSurface, GlyphStyle, GridResult, Point, Rect, Rgba8, SurfaceSize};

/// One recorded draw call, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawEvent {
    Clear {
        rect: Rect,
        color: Rgba8,
    },
    Square {
        origin: Point,
        side: f64,
        color: Rgba8,
    },
    Glyph {
        glyph: char,
        center: Point,
        size_px: f32,
        fill: Rgba8,
        glow: f64,
    },
}

/// Mock surface that records every draw call instead of rasterizing.
pub struct RecordingSurface {
    size: SurfaceSize,
    pub events: Vec<DrawEvent>,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            events: Vec::new(),
        }
    }

    pub fn glyphs_with_fill(&self, fill: Rgba8) -> Vec<&DrawEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, DrawEvent::Glyph { fill: f, .. } if *f == fill))
            .collect()
    }
}

impl CellSurface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear_rect(&mut self, rect: Rect, color: Rgba8) -> GridResult<()> {
        self.events.push(DrawEvent::Clear { rect, color });
        Ok(())
    }

    fn fill_square(&mut self, origin: Point, side: f64, color: Rgba8) -> GridResult<()> {
        self.events.push(DrawEvent::Square {
            origin,
            side,
            color,
        });
        Ok(())
    }

    fn draw_glyph(
        &mut self,
        glyph: char,
        center: Point,
        size_px: f32,
        style: GlyphStyle,
    ) -> GridResult<()> {
        self.events.push(DrawEvent::Glyph {
            glyph,
            center,
            size_px,
            fill: style.fill,
            glow: style.glow_radius,
        });
        Ok(())
    }
}
