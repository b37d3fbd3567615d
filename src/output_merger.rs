//! Output merging: alpha blending in the pixel format of the color buffer.
//!
//! Blending computes `src · S + dst · D` per channel, where the factors are drawn from
//! [`BlendFactor`]. All arithmetic is byte-wise fixed point with a divide-by-256, so results may
//! differ from exact /255 blending by one least significant bit. The two combinations that
//! dominate real content — `(src_alpha, one_minus_src_alpha)` and `(zero, src_color)` — keep
//! dedicated branch-free whole-pixel forms for the ARGB8888 layout.

use crate::pixel::{PixelFormat, PixelFormatConverter};
use crate::states::BlendFactor;

/// Fast alpha blending for ARGB8888: `src · src_alpha + dst · (1 − src_alpha)`.
fn argb8888_srcalpha_oneminussrcalpha(dest: u32, src: u32) -> u32 {
    let a = src >> 24;

    if a == 0 {
        return dest;
    }
    if a == 0xff {
        return src;
    }

    let red_blue = (((src & 0x00ff_00ff) * a) + ((dest & 0x00ff_00ff) * (0xff - a))) & 0xff00_ff00;
    let green = (((src & 0x0000_ff00) * a) + ((dest & 0x0000_ff00) * (0xff - a))) & 0x00ff_0000;
    let alpha = ((((src & 0xff00_0000) >> 8) * a + ((dest & 0xff00_0000) >> 8) * (0xff - a))
        & 0x00ff_0000)
        << 8;

    alpha | ((red_blue | green) >> 8)
}

/// Fast modulation for ARGB8888: `dst · src` per channel.
fn argb8888_zero_srccolor(dest: u32, src: u32) -> u32 {
    let c1 = (((src & 0x0000_00ff) * (dest & 0x0000_00ff)) >> 8) & 0x0000_00ff;
    let c2 = (((src & 0x0000_ff00) >> 8) * ((dest & 0x0000_ff00) >> 8)) & 0x0000_ff00;
    let c3 = ((((src & 0x00ff_0000) >> 16) * ((dest & 0x00ff_0000) >> 16)) << 8) & 0x00ff_0000;
    let c4 = ((((src & 0xff00_0000) >> 24) * ((dest & 0xff00_0000) >> 24)) << 16) & 0xff00_0000;

    c1 | c2 | c3 | c4
}

/// Maps a byte in `[0, 255]` to a factor in `[0, 256]`, so that `255` acts as exactly one.
#[inline]
fn expand(byte: u32) -> u32 {
    byte + (byte >> 7)
}

/// Per-channel blend factors on the `[0, 256]` scale. All supported factors derive from the
/// source pixel.
#[inline]
fn channel_factors(factor: BlendFactor, src: [u32; 4]) -> [u32; 4] {
    match factor {
        BlendFactor::Zero => [0; 4],
        BlendFactor::One => [256; 4],
        BlendFactor::SrcAlpha => [expand(src[3]); 4],
        BlendFactor::SrcColor => [expand(src[0]), expand(src[1]), expand(src[2]), expand(src[3])],
        BlendFactor::OneMinusSrcAlpha => [256 - expand(src[3]); 4],
    }
}

fn unpack(conv: &PixelFormatConverter, pixel: u32) -> [u32; 4] {
    let d = &conv.descriptor;
    [
        (pixel >> d.red_shift) & 0xff,
        (pixel >> d.green_shift) & 0xff,
        (pixel >> d.blue_shift) & 0xff,
        (pixel >> d.alpha_shift) & 0xff,
    ]
}

fn pack(conv: &PixelFormatConverter, rgba: [u32; 4]) -> u32 {
    let d = &conv.descriptor;
    (rgba[0] << d.red_shift)
        | (rgba[1] << d.green_shift)
        | (rgba[2] << d.blue_shift)
        | (rgba[3] << d.alpha_shift)
}

/// The general byte-wise path covering every factor combination and pixel format.
fn blend_general(
    conv: &PixelFormatConverter,
    src_factor: BlendFactor,
    dst_factor: BlendFactor,
    dest: u32,
    src: u32,
) -> u32 {
    let s = unpack(conv, src);
    let d = unpack(conv, dest);
    let sf = channel_factors(src_factor, s);
    let df = channel_factors(dst_factor, s);

    let mut out = [0u32; 4];
    for i in 0..4 {
        out[i] = ((s[i] * sf[i] + d[i] * df[i]) >> 8).min(0xff);
    }
    pack(conv, out)
}

/// Blends a source pixel over a destination pixel in the buffer's pixel format.
pub fn blend(
    conv: &PixelFormatConverter,
    src_factor: BlendFactor,
    dst_factor: BlendFactor,
    dest: u32,
    src: u32,
) -> u32 {
    // Combinations that do not depend on the pixel format.
    match (src_factor, dst_factor) {
        (BlendFactor::One, BlendFactor::Zero) => return src,
        (BlendFactor::Zero, BlendFactor::One) => return dest,
        (BlendFactor::Zero, BlendFactor::Zero) => return 0,
        _ => {}
    }

    if conv.name() == PixelFormat::Argb8888 {
        match (src_factor, dst_factor) {
            (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha) => {
                return argb8888_srcalpha_oneminussrcalpha(dest, src);
            }
            (BlendFactor::Zero, BlendFactor::SrcColor) => {
                return argb8888_zero_srccolor(dest, src);
            }
            _ => {}
        }
    }

    blend_general(conv, src_factor, dst_factor, dest, src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argb() -> PixelFormatConverter {
        PixelFormatConverter::named(PixelFormat::Argb8888)
    }

    #[test]
    fn trivial_factor_combinations() {
        let conv = argb();
        let dest = 0xff11_2233;
        let src = 0xff44_5566;

        assert_eq!(blend(&conv, BlendFactor::One, BlendFactor::Zero, dest, src), src);
        assert_eq!(blend(&conv, BlendFactor::Zero, BlendFactor::One, dest, src), dest);
        assert_eq!(blend(&conv, BlendFactor::Zero, BlendFactor::Zero, dest, src), 0);
    }

    #[test]
    fn alpha_blend_endpoints() {
        let conv = argb();
        let dest = 0xffff_0000; // opaque red
        let transparent = 0x00ff_ffff;
        let opaque = 0xffff_ffff;

        let over = |src| blend(&conv, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha, dest, src);
        assert_eq!(over(transparent), dest);
        assert_eq!(over(opaque), opaque);
    }

    #[test]
    fn half_alpha_white_over_red_averages_the_channels() {
        let conv = argb();
        let dest = conv.to_pixel(glimmer_math::Vec4::new(1.0, 0.0, 0.0, 1.0));
        let src = 0x80ff_ffff; // 50% alpha white

        let result = blend(&conv, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha, dest, src);
        let color = conv.to_color(result);

        // 0.5 · white + 0.5 · red.
        assert!((color.x - 1.0).abs() <= 2.0 / 255.0, "red {}", color.x);
        assert!((color.y - 0.5).abs() <= 2.0 / 255.0, "green {}", color.y);
        assert!((color.z - 0.5).abs() <= 2.0 / 255.0, "blue {}", color.z);
    }

    #[test]
    fn modulation_multiplies_channels() {
        let conv = argb();
        let dest = 0xffff_ffff;
        let src = 0xff80_4020;

        let result = blend(&conv, BlendFactor::Zero, BlendFactor::SrcColor, dest, src);
        let [r, g, b, _a] = super::unpack(&conv, result);

        // dst is all-ones, so the result is src scaled by 255/256 per channel.
        assert!((r as i32 - 0x80).abs() <= 1);
        assert!((g as i32 - 0x40).abs() <= 1);
        assert!((b as i32 - 0x20).abs() <= 1);
    }

    #[test]
    fn general_path_matches_fast_path_within_one_lsb() {
        let rgba = PixelFormatConverter::named(PixelFormat::Rgba8888);
        let argb = argb();

        // The same logical colors in two formats must blend to the same logical result.
        let dest_color = glimmer_math::Vec4::new(0.8, 0.2, 0.4, 1.0);
        let src_color = glimmer_math::Vec4::new(0.1, 0.9, 0.5, 0.5);

        for (sf, df) in [
            (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            (BlendFactor::Zero, BlendFactor::SrcColor),
            (BlendFactor::SrcAlpha, BlendFactor::One),
            (BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
        ] {
            let via_argb = argb.to_color(blend(
                &argb,
                sf,
                df,
                argb.to_pixel(dest_color),
                argb.to_pixel(src_color),
            ));
            let via_rgba = rgba.to_color(blend(
                &rgba,
                sf,
                df,
                rgba.to_pixel(dest_color),
                rgba.to_pixel(src_color),
            ));

            for c in 0..4 {
                assert!(
                    (via_argb[c] - via_rgba[c]).abs() <= 2.0 / 255.0,
                    "factors {sf:?}/{df:?}, channel {c}: {via_argb:?} vs {via_rgba:?}"
                );
            }
        }
    }
}
