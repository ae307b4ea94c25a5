use crate::{
    core::{Point, Rect, Rgba8, SurfaceSize},
    error::GridResult,
};

/// Margin added around a glyph's box when clearing before a redraw. Glow blur
/// extends past the glyph bounds; clearing the padded region avoids visible
/// trails. Approximate on purpose: a very large glow can still exceed it.
pub const CLEAR_MARGIN: f64 = 10.0;

/// Fill and glow parameters for a single glyph draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphStyle {
    pub fill: Rgba8,
    pub glow_color: Rgba8,
    /// Blur radius in pixels; 0 disables the halo.
    pub glow_radius: f64,
}

/// The drawing seam between the schedulers and a concrete pixel backend.
///
/// Implementations retain no animation state; every call is complete in
/// itself. The engine owns the surface and is the only writer.
pub trait CellSurface {
    fn size(&self) -> SurfaceSize;

    /// Overwrite a region with a solid color (used with the background color
    /// to erase a cell's previous frame, including its glow halo).
    fn clear_rect(&mut self, rect: Rect, color: Rgba8) -> GridResult<()>;

    /// Paint an axis-aligned filled square with its top-left at `origin`.
    fn fill_square(&mut self, origin: Point, side: f64, color: Rgba8) -> GridResult<()>;

    /// Paint one glyph centered at `center`, sized to `size_px`, with an
    /// optional glow halo behind it.
    fn draw_glyph(
        &mut self,
        glyph: char,
        center: Point,
        size_px: f32,
        style: GlyphStyle,
    ) -> GridResult<()>;
}

/// Clear region for a cell: the glyph box centered in the cell, inflated by
/// [`CLEAR_MARGIN`] on all sides.
pub fn padded_glyph_rect(center: Point, symbol_size: u32) -> Rect {
    let half = f64::from(symbol_size) / 2.0;
    Rect::new(
        center.x - half,
        center.y - half,
        center.x + half,
        center.y + half,
    )
    .inflate(CLEAR_MARGIN, CLEAR_MARGIN)
}
