//! CPU glow-halo support: a separable Gaussian blur over a premultiplied
//! RGBA8 glyph mask, and clipped `over` compositing of the blurred halo onto
//! the surface pixels.

use crate::error::{GlyphGridError, GridResult};

/// Largest halo blur radius honored; intensities above this are clamped so a
/// runaway configuration cannot allocate giant kernels.
pub const MAX_GLOW_RADIUS: u32 = 100;

/// Blur a premultiplied RGBA8 buffer with a Gaussian of the given radius.
/// `sigma` defaults to `radius / 2` when not finite or not positive.
pub fn blur_halo(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> GridResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| GlyphGridError::render("halo buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(GlyphGridError::render(
            "blur_halo expects src matching width*height*4",
        ));
    }
    let radius = radius.min(MAX_GLOW_RADIUS);
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let sigma = if sigma.is_finite() && sigma > 0.0 {
        sigma
    } else {
        radius as f32 / 2.0
    };
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Fixed-point (q16) normalized Gaussian kernel of length `2*radius + 1`.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> GridResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(GlyphGridError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push rounding residue into the center tap so the kernel sums to 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}

/// Source-over of one premultiplied pixel onto another.
pub fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Composite a premultiplied RGBA8 tile over a destination buffer at signed
/// offset `(dx, dy)`, clipping to the destination bounds.
pub fn over_region(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    dx: i64,
    dy: i64,
) -> GridResult<()> {
    if dst.len() != (dst_width as usize) * (dst_height as usize) * 4
        || src.len() != (src_width as usize) * (src_height as usize) * 4
    {
        return Err(GlyphGridError::render(
            "over_region expects rgba8 buffers matching their extents",
        ));
    }

    for sy in 0..src_height as i64 {
        let ty = dy + sy;
        if ty < 0 || ty >= i64::from(dst_height) {
            continue;
        }
        for sx in 0..src_width as i64 {
            let tx = dx + sx;
            if tx < 0 || tx >= i64::from(dst_width) {
                continue;
            }
            let si = ((sy as usize) * (src_width as usize) + (sx as usize)) * 4;
            let di = ((ty as usize) * (dst_width as usize) + (tx as usize)) * 4;
            let blended = over(
                [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]],
                [src[si], src[si + 1], src[si + 2], src[si + 3]],
            );
            dst[di..di + 4].copy_from_slice(&blended);
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_radius_0_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let out = blur_halo(&src, 1, 2, 0, 1.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn blur_constant_image_is_identity() {
        let (w, h) = (4u32, 3u32);
        let px = [10u8, 20u8, 30u8, 40u8];
        let src = px.repeat((w * h) as usize);
        let out = blur_halo(&src, w, h, 3, 2.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn blur_spreads_energy_from_single_pixel() {
        let (w, h) = (5u32, 5u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        let center = ((2 * w + 2) * 4) as usize;
        src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = blur_halo(&src, w, h, 2, 1.2).unwrap();

        let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(nonzero > 1);

        let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
        assert!((sum_a as i32 - 255).abs() <= 4);
    }

    #[test]
    fn blur_rejects_mismatched_buffer() {
        assert!(blur_halo(&[0u8; 7], 1, 2, 1, 1.0).is_err());
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        assert_eq!(over(dst, [255, 255, 255, 0]), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
    }

    #[test]
    fn over_region_clips_at_borders() {
        let mut dst = vec![0u8; 2 * 2 * 4];
        let src = vec![255u8; 2 * 2 * 4];
        // offset so only the bottom-right source pixel lands on dst (0,0)
        over_region(&mut dst, 2, 2, &src, 2, 2, -1, -1).unwrap();
        assert_eq!(&dst[0..4], &[255, 255, 255, 255]);
        assert_eq!(&dst[4..8], &[0, 0, 0, 0]);
    }
}
