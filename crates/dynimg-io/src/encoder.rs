//! Custom encoder escape hatch.

use dynimg_core::{ExtendedColorType, PixelBuffer, Result};
use tracing::debug;

/// A caller-supplied encoder.
///
/// [`encode_with`] calls [`write_image`](Self::write_image) exactly once
/// with the buffer's native-endian sample bytes.
///
/// Any `FnMut(&[u8], u32, u32, ExtendedColorType) -> Result<()>` closure is a
/// `CustomEncoder`.
pub trait CustomEncoder {
    /// Receives `width * height` pixels of `color` packed in `bytes`.
    fn write_image(&mut self, bytes: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<()>;
}

impl<F> CustomEncoder for F
where
    F: FnMut(&[u8], u32, u32, ExtendedColorType) -> Result<()>,
{
    fn write_image(&mut self, bytes: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<()> {
        self(bytes, width, height, color)
    }
}

/// Hands `buffer` to `encoder`.
///
/// # Example
///
/// ```rust
/// use dynimg_core::{ColorModel, ExtendedColorType, PixelBuffer, Result};
///
/// let buf = PixelBuffer::new(2, 2, ColorModel::Rgb8);
/// let mut total = 0;
/// dynimg_io::encode_with(&buf, &mut |bytes: &[u8], _w: u32, _h: u32, _c: ExtendedColorType| -> Result<()> {
///     total += bytes.len();
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(total, 12);
/// ```
pub fn encode_with<E: CustomEncoder + ?Sized>(buffer: &PixelBuffer, encoder: &mut E) -> Result<()> {
    let (width, height) = buffer.dimensions();
    let color = buffer.extended_color_type();
    debug!(width, height, ?color, "custom encode");
    encoder.write_image(buffer.as_bytes(), width, height, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynimg_core::{ColorModel, Error, ErrorKind};

    struct Collect(Vec<(usize, ExtendedColorType)>);

    impl CustomEncoder for Collect {
        fn write_image(&mut self, bytes: &[u8], _w: u32, _h: u32, color: ExtendedColorType) -> Result<()> {
            self.0.push((bytes.len(), color));
            Ok(())
        }
    }

    #[test]
    fn test_struct_encoder_called_once() {
        let buf = PixelBuffer::new(3, 2, ColorModel::Rgba32F);
        let mut enc = Collect(Vec::new());
        encode_with(&buf, &mut enc).unwrap();
        assert_eq!(enc.0, vec![(3 * 2 * 16, ExtendedColorType::Rgba32F)]);
    }

    #[test]
    fn test_error_propagates() {
        let buf = PixelBuffer::new(1, 1, ColorModel::L8);
        let mut failing = |_: &[u8], _: u32, _: u32, _: ExtendedColorType| -> Result<()> {
            Err(Error::encoding(None, "sink full"))
        };
        let err = encode_with(&buf, &mut failing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn test_dyn_encoder() {
        let buf = PixelBuffer::new(1, 1, ColorModel::L16);
        let mut enc = Collect(Vec::new());
        let dyn_enc: &mut dyn CustomEncoder = &mut enc;
        encode_with(&buf, dyn_enc).unwrap();
        assert_eq!(enc.0[0], (2, ExtendedColorType::L16));
    }
}
