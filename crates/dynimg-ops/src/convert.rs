//! Layout conversions.
//!
//! Conversions are total: every one of the ten layouts converts to every
//! other. Rules:
//!
//! | From -> To | Rule |
//! |------------|------|
//! | integer -> float | `v / MAX` |
//! | float -> integer | `round(clamp(v, 0, 1) * MAX)` |
//! | 8 -> 16 bit | `v * 257` |
//! | 16 -> 8 bit | `round(v / 257)` |
//! | float -> float | identity |
//! | RGB -> luma | Rec.709 on normalized values |
//! | luma -> RGB | replicate |
//! | no alpha -> alpha | opaque maximum |
//!
//! # Example
//!
//! ```rust
//! use dynimg_core::{ColorModel, PixelBuffer};
//! use dynimg_ops::convert::convert;
//!
//! let src = PixelBuffer::from_raw_u8(1, 1, ColorModel::L8, vec![2]).unwrap();
//! let dst = convert(&src, ColorModel::Rgba16);
//! assert_eq!(dst.color_model(), ColorModel::Rgba16);
//! assert_eq!(dst.rgba_at(0, 0).channels(), [2, 2, 2, 255]);
//! ```

use dynimg_core::{dynamic_map, luminance_rec709, ColorModel, PixelBuffer, Sample, SampleBuffer};
use tracing::trace;

/// Normalized pixel: RGB plus optional alpha, and whether it came from luma.
#[derive(Clone, Copy)]
struct Normalized {
    rgb: [f32; 3],
    alpha: Option<f32>,
    grey: bool,
}

#[inline]
fn read<S: Sample>(px: &[S]) -> Normalized {
    match *px {
        [l] => {
            let l = l.to_f32();
            Normalized { rgb: [l; 3], alpha: None, grey: true }
        }
        [l, a] => {
            let l = l.to_f32();
            Normalized { rgb: [l; 3], alpha: Some(a.to_f32()), grey: true }
        }
        [r, g, b] => Normalized {
            rgb: [r.to_f32(), g.to_f32(), b.to_f32()],
            alpha: None,
            grey: false,
        },
        [r, g, b, a, ..] => Normalized {
            rgb: [r.to_f32(), g.to_f32(), b.to_f32()],
            alpha: Some(a.to_f32()),
            grey: false,
        },
        [] => Normalized { rgb: [0.0; 3], alpha: None, grey: true },
    }
}

#[inline]
fn write<D: Sample>(px: Normalized, out: &mut [D]) {
    let luma = || {
        if px.grey {
            px.rgb[0]
        } else {
            luminance_rec709(px.rgb[0], px.rgb[1], px.rgb[2])
        }
    };
    let alpha = || px.alpha.map_or_else(D::max_value, D::from_f32);
    match out.len() {
        1 => out[0] = D::from_f32(luma()),
        2 => {
            out[0] = D::from_f32(luma());
            out[1] = alpha();
        }
        3 => {
            for (o, v) in out.iter_mut().zip(px.rgb) {
                *o = D::from_f32(v);
            }
        }
        _ => {
            for (o, v) in out.iter_mut().zip(px.rgb) {
                *o = D::from_f32(v);
            }
            out[3] = alpha();
        }
    }
}

/// Converts samples to another type and channel count.
pub fn convert_samples<S: Sample, D: Sample>(src: &SampleBuffer<S>, channels: u8) -> SampleBuffer<D> {
    let mut dst = SampleBuffer::new(src.width(), src.height(), channels);
    let sc = src.channels() as usize;
    for (s, d) in src
        .as_slice()
        .chunks_exact(sc)
        .zip(dst.as_mut_slice().chunks_exact_mut(channels as usize))
    {
        write(read(s), d);
    }
    dst
}

/// Converts `src` into `target`, copying when the layout already matches.
pub fn convert(src: &PixelBuffer, target: ColorModel) -> PixelBuffer {
    if src.color_model() == target {
        return src.clone();
    }
    trace!(from = %src.color_model(), to = %target, "convert");
    let c = target.channel_count();
    match target {
        ColorModel::L8 => PixelBuffer::L8(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::La8 => PixelBuffer::La8(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::Rgb8 => PixelBuffer::Rgb8(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::Rgba8 => PixelBuffer::Rgba8(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::L16 => PixelBuffer::L16(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::La16 => PixelBuffer::La16(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::Rgb16 => PixelBuffer::Rgb16(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::Rgba16 => PixelBuffer::Rgba16(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::Rgb32F => PixelBuffer::Rgb32F(dynamic_map!(src, b -> convert_samples(b, c))),
        ColorModel::Rgba32F => PixelBuffer::Rgba32F(dynamic_map!(src, b -> convert_samples(b, c))),
    }
}

/// Owning variant of [`convert`]; returns `src` untouched when the layout
/// already matches.
pub fn convert_into(src: PixelBuffer, target: ColorModel) -> PixelBuffer {
    if src.color_model() == target {
        src
    } else {
        convert(&src, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totality() {
        for from in ColorModel::ALL {
            let src = PixelBuffer::new(3, 2, from);
            for to in ColorModel::ALL {
                let dst = convert(&src, to);
                assert_eq!(dst.color_model(), to);
                assert_eq!(dst.dimensions(), (3, 2));
                assert_eq!(dst.as_bytes().len(), 6 * to.bytes_per_pixel() as usize);
            }
        }
    }

    #[test]
    fn test_widen_and_narrow() {
        let src = PixelBuffer::from_raw_u8(4, 1, ColorModel::L8, vec![0, 1, 128, 255]).unwrap();
        let wide = convert(&src, ColorModel::L16);
        let PixelBuffer::L16(b) = &wide else { panic!("layout") };
        assert_eq!(b.as_slice(), &[0, 257, 128 * 257, 65535]);
        assert_eq!(convert(&wide, ColorModel::L8), src);
    }

    #[test]
    fn test_narrow_rounds() {
        let src = PixelBuffer::from_raw_u16(2, 1, ColorModel::L16, vec![128, 385]).unwrap();
        let PixelBuffer::L8(b) = convert(&src, ColorModel::L8) else { panic!("layout") };
        // 128 / 257 = 0.498, 385 / 257 = 1.498
        assert_eq!(b.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_float_identity_no_clamp() {
        let src = PixelBuffer::from_raw_f32(1, 1, ColorModel::Rgb32F, vec![2.5, -1.0, 0.5]).unwrap();
        let PixelBuffer::Rgba32F(b) = convert(&src, ColorModel::Rgba32F) else { panic!("layout") };
        assert_eq!(b.as_slice(), &[2.5, -1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_float_to_int_clamps() {
        let src = PixelBuffer::from_raw_f32(1, 1, ColorModel::Rgb32F, vec![2.5, -1.0, 0.5]).unwrap();
        let PixelBuffer::Rgb8(b) = convert(&src, ColorModel::Rgb8) else { panic!("layout") };
        assert_eq!(b.as_slice(), &[255, 0, 128]);
    }

    #[test]
    fn test_alpha_fill_and_drop() {
        let src = PixelBuffer::from_raw_u8(1, 1, ColorModel::Rgb8, vec![1, 2, 3]).unwrap();
        let PixelBuffer::Rgba16(b) = convert(&src, ColorModel::Rgba16) else { panic!("layout") };
        assert_eq!(b.as_slice(), &[257, 514, 771, 65535]);

        let src = PixelBuffer::from_raw_u8(1, 1, ColorModel::La8, vec![9, 0]).unwrap();
        let PixelBuffer::Rgb8(b) = convert(&src, ColorModel::Rgb8) else { panic!("layout") };
        assert_eq!(b.as_slice(), &[9, 9, 9]);
    }

    #[test]
    fn test_rgb_to_luma() {
        let src = PixelBuffer::from_raw_u8(1, 1, ColorModel::Rgba8, vec![255, 0, 0, 40]).unwrap();
        let PixelBuffer::La8(b) = convert(&src, ColorModel::La8) else { panic!("layout") };
        assert_eq!(b.as_slice(), &[(0.2126f32 * 255.0).round() as u8, 40]);
    }

    #[test]
    fn test_convert_into_same_layout_moves() {
        let src = PixelBuffer::new(2, 2, ColorModel::Rgb16);
        let dst = convert_into(src.clone(), ColorModel::Rgb16);
        assert_eq!(dst, src);
    }
}
