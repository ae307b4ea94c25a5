use std::collections::HashMap;

use crate::{
    core::{Point, Rect, Rgba8, SurfaceSize},
    error::{GlyphGridError, GridResult},
    glow::{MAX_GLOW_RADIUS, blur_halo, over_region},
    surface::{CellSurface, GlyphStyle},
};

/// Brush parameter for Parley layouts. Fill color is decided at draw time via
/// the paint, so layouts are cacheable across color changes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct GlyphBrush;

/// Stateful helper shaping single glyphs with Parley from raw font bytes.
struct GlyphLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl GlyphLayoutEngine {
    fn new(font_bytes: Vec<u8>) -> GridResult<Self> {
        let mut font_ctx = parley::FontContext::default();

        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            GlyphGridError::surface("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| GlyphGridError::surface("registered font family has no name"))?
            .to_string();

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    fn layout_glyph(
        &mut self,
        glyph: char,
        size_px: f32,
    ) -> GridResult<parley::Layout<GlyphBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(GlyphGridError::render("glyph size_px must be finite and > 0"));
        }

        let text = glyph.to_string();
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(&text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// CPU pixel surface: a persistent premultiplied RGBA8 pixmap that draw calls
/// composite onto. Nothing clears between frames except explicit
/// `clear_rect` calls, so cells keep their last-drawn state.
pub struct PixmapSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    glyphs: GlyphLayoutEngine,
    layout_cache: HashMap<(char, u32), parley::Layout<GlyphBrush>>,
}

impl PixmapSurface {
    pub fn new(size: SurfaceSize, font_bytes: Vec<u8>) -> GridResult<Self> {
        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| GlyphGridError::surface("surface width exceeds u16"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| GlyphGridError::surface("surface height exceeds u16"))?;

        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            glyphs: GlyphLayoutEngine::new(font_bytes)?,
            layout_cache: HashMap::new(),
        })
    }

    /// Premultiplied RGBA8 pixel bytes, row-major. With an opaque background
    /// every pixel is opaque, so the bytes are also valid straight RGBA8.
    pub fn pixels_rgba8(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    fn ensure_layout(&mut self, glyph: char, size_px: f32) -> GridResult<()> {
        let key = (glyph, size_px.to_bits());
        if !self.layout_cache.contains_key(&key) {
            let layout = self.glyphs.layout_glyph(glyph, size_px)?;
            self.layout_cache.insert(key, layout);
        }
        Ok(())
    }
}

fn paint_color(color: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn emit_glyph_runs(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<GlyphBrush>,
    font: &vello_cpu::peniko::FontData,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

impl CellSurface for PixmapSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(u32::from(self.width), u32::from(self.height))
    }

    fn clear_rect(&mut self, rect: Rect, color: Rgba8) -> GridResult<()> {
        let px = color.to_premul();
        let w = usize::from(self.width);
        let h = usize::from(self.height);

        let x0 = rect.x0.floor().clamp(0.0, w as f64) as usize;
        let x1 = rect.x1.ceil().clamp(0.0, w as f64) as usize;
        let y0 = rect.y0.floor().clamp(0.0, h as f64) as usize;
        let y1 = rect.y1.ceil().clamp(0.0, h as f64) as usize;
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        let data = self.pixmap.data_as_u8_slice_mut();
        for y in y0..y1 {
            let row = &mut data[(y * w + x0) * 4..(y * w + x1) * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
        Ok(())
    }

    fn fill_square(&mut self, origin: Point, side: f64, color: Rgba8) -> GridResult<()> {
        if side <= 0.0 || self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint_color(color));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            origin.x,
            origin.y,
            origin.x + side,
            origin.y + side,
        ));
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    fn draw_glyph(
        &mut self,
        glyph: char,
        center: Point,
        size_px: f32,
        style: GlyphStyle,
    ) -> GridResult<()> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        self.ensure_layout(glyph, size_px)?;
        let layout = &self.layout_cache[&(glyph, size_px.to_bits())];
        let layout_w = f64::from(layout.width());
        let layout_h = f64::from(layout.height());
        let origin = Point::new(center.x - layout_w / 2.0, center.y - layout_h / 2.0);

        if style.glow_radius >= 0.5 {
            let radius = (style.glow_radius.round() as u32).clamp(1, MAX_GLOW_RADIUS);
            let pad = f64::from(radius) + 2.0;
            let scratch_w = (layout_w + 2.0 * pad).ceil() as u32;
            let scratch_h = (layout_h + 2.0 * pad).ceil() as u32;
            let sw: u16 = scratch_w
                .try_into()
                .map_err(|_| GlyphGridError::render("glow halo exceeds u16 extent"))?;
            let sh: u16 = scratch_h
                .try_into()
                .map_err(|_| GlyphGridError::render("glow halo exceeds u16 extent"))?;

            let mut scratch = vello_cpu::Pixmap::new(sw, sh);
            let mut ctx = vello_cpu::RenderContext::new(sw, sh);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((pad, pad)));
            ctx.set_paint(paint_color(style.glow_color));
            emit_glyph_runs(&mut ctx, layout, &self.glyphs.font);
            ctx.flush();
            ctx.render_to_pixmap(&mut scratch);

            let blurred = blur_halo(
                scratch.data_as_u8_slice(),
                scratch_w,
                scratch_h,
                radius,
                radius as f32 / 2.0,
            )?;
            let (dst_w, dst_h) = (u32::from(self.width), u32::from(self.height));
            over_region(
                self.pixmap.data_as_u8_slice_mut(),
                dst_w,
                dst_h,
                &blurred,
                scratch_w,
                scratch_h,
                (origin.x - pad).round() as i64,
                (origin.y - pad).round() as i64,
            )?;
        }

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        ctx.set_paint(paint_color(style.fill));
        emit_glyph_runs(&mut ctx, layout, &self.glyphs.font);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_surface_is_rejected() {
        assert!(PixmapSurface::new(SurfaceSize::new(70_000, 10), vec![]).is_err());
    }

    #[test]
    fn empty_font_bytes_are_rejected() {
        assert!(PixmapSurface::new(SurfaceSize::new(16, 16), vec![]).is_err());
    }
}
