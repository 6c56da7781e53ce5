//! Radiance HDR (RGBE) format support.
//!
//! Reads flat and RLE-compressed RGBE scanlines into `Rgb32F`. Writes any
//! layout: the buffer is converted to `Rgb32F` first, negative values clamp
//! to zero and alpha is dropped.
//!
//! Only the standard `-Y h +X w` orientation is written; on read, any axis
//! order is accepted and pixels are taken in file order.

use std::io::{BufRead, Cursor, Read, Write};

use dynimg_core::{ColorModel, Error, ImageFormat, Limits, PixelBuffer, Result};
use dynimg_ops::convert::convert;
use tracing::trace;

const FORMAT: Option<ImageFormat> = Some(ImageFormat::Hdr);
const HDR_MAGIC: &str = "#?";

fn malformed(message: impl Into<String>) -> Error {
    Error::decoding(FORMAT, message)
}

fn truncated(err: std::io::Error) -> Error {
    malformed(format!("truncated data: {err}"))
}

/// Decodes a Radiance HDR image from memory into `Rgb32F`.
pub fn decode(bytes: &[u8], limits: &Limits) -> Result<PixelBuffer> {
    let mut reader = Cursor::new(bytes);
    let (width, height) = read_header(&mut reader)?;
    limits.check_image(width, height, ColorModel::Rgb32F.bytes_per_pixel())?;
    trace!(width, height, "hdr header");

    let data = read_pixels(&mut reader, width as usize, height as usize)?;
    PixelBuffer::from_raw_f32(width, height, ColorModel::Rgb32F, data).map_err(|e| malformed(e.to_string()))
}

/// Encodes `buffer` as RLE RGBE into `writer`.
pub fn encode<W: Write>(buffer: &PixelBuffer, mut writer: W) -> Result<()> {
    let rgb = convert(buffer, ColorModel::Rgb32F);
    let PixelBuffer::Rgb32F(rgb) = rgb else {
        return Err(Error::encoding(FORMAT, "conversion to Rgb32F failed"));
    };
    let (width, height) = rgb.dimensions();

    writeln!(writer, "{HDR_MAGIC}RADIANCE")?;
    writeln!(writer, "FORMAT=32-bit_rle_rgbe")?;
    writeln!(writer)?;
    writeln!(writer, "-Y {height} +X {width}")?;

    let width = width as usize;
    let use_rle = (8..=0x7fff).contains(&width);
    let mut scanline = vec![0u8; width * 4];
    for y in 0..height {
        for (out, px) in scanline.chunks_exact_mut(4).zip(rgb.row(y).chunks_exact(3)) {
            out.copy_from_slice(&f32_to_rgbe(px[0], px[1], px[2]));
        }
        if use_rle {
            writer.write_all(&[2, 2, (width >> 8) as u8, (width & 0xFF) as u8])?;
            encode_rle_scanline(&mut writer, &scanline)?;
        } else {
            writer.write_all(&scanline)?;
        }
    }
    Ok(())
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<(u32, u32)> {
    let mut line = String::new();
    reader.read_line(&mut line).map_err(truncated)?;
    if !line.starts_with(HDR_MAGIC) {
        return Err(malformed("HDR magic not found"));
    }

    loop {
        line.clear();
        if reader.read_line(&mut line).map_err(truncated)? == 0 {
            return Err(malformed("missing HDR resolution line"));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('+') || line.starts_with('-') {
            return parse_resolution(line).ok_or_else(|| malformed("invalid HDR resolution line"));
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim().eq_ignore_ascii_case("FORMAT") {
                let value = value.trim();
                if value != "32-bit_rle_rgbe" {
                    return Err(Error::Unsupported(format!("HDR pixel format {value}")));
                }
            }
        }
    }
}

fn parse_resolution(line: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return None;
    }

    let mut width = None;
    let mut height = None;
    for pair in parts.chunks_exact(2) {
        let value: u32 = pair[1].parse().ok()?;
        match pair[0] {
            "+X" | "-X" => width = Some(value),
            "+Y" | "-Y" => height = Some(value),
            _ => return None,
        }
    }
    Some((width?, height?))
}

fn read_pixels<R: Read>(reader: &mut R, width: usize, height: usize) -> Result<Vec<f32>> {
    let mut data = Vec::with_capacity(width * height * 3);
    if width == 0 || height == 0 {
        return Ok(data);
    }

    let mut scanline = vec![0u8; width * 4];
    for _ in 0..height {
        let mut first = [0u8; 4];
        reader.read_exact(&mut first).map_err(truncated)?;

        let rle = (8..=0x7fff).contains(&width)
            && first[0] == 2
            && first[1] == 2
            && first[2] & 0x80 == 0;
        if rle {
            let encoded = ((first[2] as usize) << 8) | first[3] as usize;
            if encoded != width {
                return Err(malformed("HDR RLE width mismatch"));
            }
            decode_rle_scanline(reader, &mut scanline)?;
        } else {
            // Flat scanline; the first pixel is already read.
            scanline[..4].copy_from_slice(&first);
            reader.read_exact(&mut scanline[4..]).map_err(truncated)?;
        }

        for px in scanline.chunks_exact(4) {
            let (r, g, b) = rgbe_to_f32(px[0], px[1], px[2], px[3]);
            data.extend_from_slice(&[r, g, b]);
        }
    }
    Ok(data)
}

fn decode_rle_scanline<R: Read>(reader: &mut R, out: &mut [u8]) -> Result<()> {
    let width = out.len() / 4;
    let mut channel = vec![0u8; width];
    for c in 0..4 {
        let mut idx = 0usize;
        while idx < width {
            let mut byte = [0u8; 1];
            reader.read_exact(&mut byte).map_err(truncated)?;
            let count = byte[0] as usize;
            if count > 128 {
                let run = count - 128;
                if idx + run > width {
                    return Err(malformed("HDR RLE run overflows scanline"));
                }
                reader.read_exact(&mut byte).map_err(truncated)?;
                channel[idx..idx + run].fill(byte[0]);
                idx += run;
            } else {
                if count == 0 || idx + count > width {
                    return Err(malformed("HDR RLE literal overflows scanline"));
                }
                reader.read_exact(&mut channel[idx..idx + count]).map_err(truncated)?;
                idx += count;
            }
        }
        for (x, v) in channel.iter().enumerate() {
            out[x * 4 + c] = *v;
        }
    }
    Ok(())
}

fn encode_rle_scanline<W: Write>(writer: &mut W, scanline: &[u8]) -> Result<()> {
    let width = scanline.len() / 4;
    let mut channel = vec![0u8; width];
    for c in 0..4 {
        for (x, v) in channel.iter_mut().enumerate() {
            *v = scanline[x * 4 + c];
        }
        writer.write_all(&encode_rle_channel(&channel))?;
    }
    Ok(())
}

fn run_length(data: &[u8], i: usize) -> usize {
    let mut run = 1;
    while i + run < data.len() && run < 127 && data[i] == data[i + run] {
        run += 1;
    }
    run
}

fn encode_rle_channel(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0usize;
    while i < data.len() {
        let run = run_length(data, i);
        if run >= 4 {
            out.push((128 + run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < data.len() && i - start < 128 && run_length(data, i) < 4 {
            i += 1;
        }
        out.push((i - start) as u8);
        out.extend_from_slice(&data[start..i]);
    }
    out
}

fn f32_to_rgbe(r: f32, g: f32, b: f32) -> [u8; 4] {
    let r = r.max(0.0);
    let g = g.max(0.0);
    let b = b.max(0.0);
    let max = r.max(g).max(b);
    if !max.is_finite() || max < 1.0e-32 {
        return [0, 0, 0, 0];
    }

    let (m, e) = frexp(max);
    if e + 128 > 255 {
        return [255, 255, 255, 255];
    }
    let scale = m * 256.0 / max;
    [
        (r * scale).clamp(0.0, 255.0) as u8,
        (g * scale).clamp(0.0, 255.0) as u8,
        (b * scale).clamp(0.0, 255.0) as u8,
        (e + 128) as u8,
    ]
}

fn rgbe_to_f32(r: u8, g: u8, b: u8, e: u8) -> (f32, f32, f32) {
    if e == 0 {
        return (0.0, 0.0, 0.0);
    }
    let f = 2.0_f32.powi(e as i32 - 136);
    (r as f32 * f, g as f32 * f, b as f32 * f)
}

/// `x = m * 2^e` with `m` in `[0.5, 1)`.
fn frexp(x: f32) -> (f32, i32) {
    let mut e = x.log2().floor() as i32 + 1;
    let mut m = x / 2.0_f32.powi(e);
    // log2 rounding can land one off at exact powers of two.
    if m >= 1.0 {
        m /= 2.0;
        e += 1;
    } else if m < 0.5 {
        m *= 2.0;
        e -= 1;
    }
    (m, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dynimg_core::ErrorKind;

    fn encode_vec(buffer: &PixelBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        encode(buffer, &mut out).unwrap();
        out
    }

    fn floats(buffer: &PixelBuffer) -> Vec<f32> {
        match buffer {
            PixelBuffer::Rgb32F(b) => b.as_slice().to_vec(),
            other => panic!("unexpected layout {}", other.color_model()),
        }
    }

    #[test]
    fn test_parse_resolution_line() {
        assert_eq!(parse_resolution("-Y 2 +X 3"), Some((3, 2)));
        assert_eq!(parse_resolution("+X 4 -Y 5"), Some((4, 5)));
        assert_eq!(parse_resolution("-Y 2 +Z 3"), None);
        assert_eq!(parse_resolution("-Y 2"), None);
    }

    #[test]
    fn test_frexp() {
        assert_eq!(frexp(1.0), (0.5, 1));
        assert_eq!(frexp(0.5), (0.5, 0));
        assert_eq!(frexp(3.0), (0.75, 2));
    }

    #[test]
    fn test_roundtrip_rle_and_flat() {
        for width in [4u32, 16] {
            let n = (width * 2 * 3) as usize;
            let data: Vec<f32> = (0..n).map(|i| i as f32 / 10.0).collect();
            let buf = PixelBuffer::from_raw_f32(width, 2, ColorModel::Rgb32F, data.clone()).unwrap();
            let back = decode(&encode_vec(&buf), &Limits::default()).unwrap();
            assert_eq!(back.dimensions(), (width, 2));
            for (a, b) in floats(&back).iter().zip(&data) {
                // Shared exponent: error is relative to the brightest channel.
                assert!((a - b).abs() <= b.max(0.1) * 0.02 + 0.01, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_exact_powers_of_two() {
        let buf = PixelBuffer::from_raw_f32(1, 1, ColorModel::Rgb32F, vec![0.5, 0.25, 1.0]).unwrap();
        let back = decode(&encode_vec(&buf), &Limits::default()).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn test_encode_from_integer_layout() {
        let buf = PixelBuffer::from_raw_u8(1, 1, ColorModel::La8, vec![255, 0]).unwrap();
        let back = decode(&encode_vec(&buf), &Limits::default()).unwrap();
        let px = floats(&back);
        assert_relative_eq!(px[0], 1.0);
        assert_relative_eq!(px[2], 1.0);
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(f32_to_rgbe(-1.0, -2.0, 0.0), [0, 0, 0, 0]);
        assert_eq!(f32_to_rgbe(f32::NAN, 0.0, 0.0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_rle_channel_encoding() {
        let data = [5u8; 10];
        assert_eq!(encode_rle_channel(&data), vec![138, 5]);
        let data = [1u8, 2, 3];
        assert_eq!(encode_rle_channel(&data), vec![3, 1, 2, 3]);
    }

    #[test]
    fn test_corrupt_rle_is_error() {
        let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 8\n".to_vec();
        // Header, then a run of 100 in an 8-wide scanline.
        bytes.extend_from_slice(&[2, 2, 0, 8, 228, 1]);
        let err = decode(&bytes, &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[test]
    fn test_truncated_is_error() {
        let buf = PixelBuffer::new(16, 4, ColorModel::Rgb32F);
        let bytes = encode_vec(&buf);
        let err = decode(&bytes[..bytes.len() - 3], &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[test]
    fn test_missing_resolution() {
        let err = decode(b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n", &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[test]
    fn test_xyze_unsupported() {
        let err = decode(b"#?RADIANCE\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 1\n", &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOther);
    }
}
