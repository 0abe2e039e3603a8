use crate::{
    foundation::math::{mul_div255_u16, mul_div255_u8},
    text::raster::TextSprite,
};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Opacity scaled to 0..=255.
pub(crate) fn opacity_u8(opacity: f64) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Premultiplied source-over with an extra opacity factor (0..=255).
pub fn over(dst: PremulRgba8, src: PremulRgba8, op: u16) -> PremulRgba8 {
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - sa;

    let mut out = [0u8; 4];
    out[3] = (sa + mul_div255_u16(u16::from(dst[3]), inv)).min(255) as u8;
    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = (sc + dc).min(255) as u8;
    }
    out
}

/// Composite `sprite` onto a `dst_w`-wide RGBA8 buffer with its top-left
/// corner at `(x, y)`. Parts outside the destination are clipped.
pub fn blit_over(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    sprite: &TextSprite,
    x: i64,
    y: i64,
    opacity: f64,
) {
    let op = opacity_u8(opacity);
    if op == 0 {
        return;
    }

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(sprite.width)).min(i64::from(dst_w));
    let y1 = (y + i64::from(sprite.height)).min(i64::from(dst_h));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let src_row = sy * sprite.width as usize * 4;
        let dst_row = dy as usize * dst_w as usize * 4;
        for dx in x0..x1 {
            let sx = (dx - x) as usize;
            let s = &sprite.rgba8_premul[src_row + sx * 4..src_row + sx * 4 + 4];
            if s[3] == 0 {
                continue;
            }
            let o = dst_row + dx as usize * 4;
            let d = &mut dst[o..o + 4];
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], op);
            d.copy_from_slice(&out);
        }
    }
}

/// Composite premultiplied RGBA8 onto an opaque colour, producing straight
/// opaque RGBA8 for encoders that ignore alpha.
pub fn flatten_to_opaque_rgba8(dst: &mut Vec<u8>, src_premul: &[u8], bg: PremulRgba8) {
    dst.clear();
    dst.reserve(src_premul.len());
    for px in src_premul.chunks_exact(4) {
        let inv = 255u16 - u16::from(px[3]);
        dst.extend_from_slice(&[
            px[0].saturating_add(mul_div255_u8(u16::from(bg[0]), inv)),
            px[1].saturating_add(mul_div255_u8(u16::from(bg[1]), inv)),
            px[2].saturating_add(mul_div255_u8(u16::from(bg[2]), inv)),
            255,
        ]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
