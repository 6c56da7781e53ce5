//! The [`DynamicImage`] value.
//!
//! A `DynamicImage` owns exactly one [`PixelBuffer`]. Every operation keeps
//! the layout unless it says otherwise, and every `&self` operation returns
//! a fresh image and leaves the input as it was.

use std::io::{Seek, Write};
use std::path::Path;

use dynimg_core::{dynamic_map, ColorModel, EncodeOptions, Error, ImageFormat, PixelBuffer, Result, Rgba};
use dynimg_io::CustomEncoder;
use dynimg_ops::{color, convert, filter, resize, transform, FilterKind};
use tracing::{debug, trace, warn};

use crate::iter::{ExternalIterator, PixelCoords};

/// Pixel item yielded by [`DynamicImage::pixels`]: `(x, y, pixel)`.
pub type PixelItem = (u32, u32, Rgba);

/// Decoded image in one of the ten in-memory layouts.
///
/// # Example
///
/// ```rust
/// use dynimg::{ColorModel, DynamicImage, FilterKind};
///
/// let img = DynamicImage::new(64, 48, ColorModel::Rgb8);
/// let small = img.resize(16, 16, FilterKind::Triangle);
/// assert_eq!(small.dimensions(), (16, 12));
/// assert_eq!(small.color_model(), ColorModel::Rgb8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicImage {
    buffer: PixelBuffer,
}

impl TryFrom<PixelBuffer> for DynamicImage {
    type Error = Error;

    fn try_from(buffer: PixelBuffer) -> Result<Self> {
        Self::from_buffer(buffer)
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        image.buffer
    }
}

/// Generates the consuming `into_*` and borrowing `to_*` conversion pairs.
macro_rules! conversions {
    ($($into:ident, $to:ident => $model:ident, $doc:literal;)*) => {
        $(
            #[doc = concat!("Converts to ", $doc, ", consuming the image.")]
            pub fn $into(self) -> Self {
                self.into_color(ColorModel::$model)
            }

            #[doc = concat!("Copy converted to ", $doc, ".")]
            pub fn $to(&self) -> Self {
                self.to_color(ColorModel::$model)
            }
        )*
    };
}

impl DynamicImage {
    /// Zero-filled image of the given size and layout.
    pub fn new(width: u32, height: u32, model: ColorModel) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height, model),
        }
    }

    /// Wraps an existing buffer.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ParameterDimensionMismatch`](dynimg_core::ErrorKind::ParameterDimensionMismatch)
    /// if the buffer's channel count does not match its layout tag.
    pub fn from_buffer(buffer: PixelBuffer) -> Result<Self> {
        buffer.check_layout()?;
        Ok(Self { buffer })
    }

    /// Typed view of the pixel storage.
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Unwraps the pixel storage.
    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// Native-endian sample bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Consumes the image and returns its native-endian sample bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_bytes()
    }

    /// Frees the image. Same as dropping it; the value cannot be used after.
    pub fn release(self) {
        trace!(dimensions = ?self.dimensions(), layout = %self.color_model(), "image released");
    }

    fn with_buffer(&self, buffer: PixelBuffer) -> Self {
        Self { buffer }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Storage layout.
    #[inline]
    pub fn color_model(&self) -> ColorModel {
        self.buffer.color_model()
    }

    /// Returns `true` if `(x, y)` addresses a pixel.
    #[inline]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        self.buffer.in_bounds(x, y)
    }

    /// The pixel at `(x, y)` as 8-bit RGBA.
    ///
    /// Luma expands to grey, a missing alpha reads as 255, and 16-bit or
    /// float samples are narrowed to 8 bits.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba {
        let (w, h) = self.dimensions();
        assert!(
            x < w && y < h,
            "pixel ({x}, {y}) out of bounds for {w}x{h} image"
        );
        self.buffer.rgba_at(x, y)
    }

    /// Lazy row-major walk over every pixel.
    ///
    /// ```rust
    /// use dynimg::{ColorModel, DynamicImage};
    ///
    /// let img = DynamicImage::new(3, 2, ColorModel::L8);
    /// let coords = img.pixels().map(|(x, y, _)| (x, y)).collect();
    /// assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    /// ```
    pub fn pixels(&self) -> ExternalIterator<'_, PixelItem> {
        let (w, h) = self.dimensions();
        let buffer = &self.buffer;
        ExternalIterator::new(PixelCoords::new(w, h).map(move |(x, y)| (x, y, buffer.rgba_at(x, y))))
    }

    /// Owning variant of [`pixels`](Self::pixels).
    pub fn into_pixels(self) -> ExternalIterator<'static, PixelItem> {
        let (w, h) = self.dimensions();
        let buffer = self.buffer;
        ExternalIterator::new(PixelCoords::new(w, h).map(move |(x, y)| (x, y, buffer.rgba_at(x, y))))
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Copies the region `[x, x + width) x [y, y + height)`, clipped to the
    /// image. An origin outside the image gives a zero-area image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => transform::crop(b, x, y, width, height)))
    }

    /// Same as [`crop`](Self::crop).
    pub fn crop_copy(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.crop(x, y, width, height)
    }

    /// Mirrors left to right.
    pub fn flip_horizontal(&self) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => transform::flip_h(b)))
    }

    /// Mirrors top to bottom.
    pub fn flip_vertical(&self) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => transform::flip_v(b)))
    }

    /// Quarter turn clockwise.
    pub fn rotate_90(&self) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => transform::rotate_90_cw(b)))
    }

    /// Half turn.
    pub fn rotate_180(&self) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => transform::rotate_180(b)))
    }

    /// Quarter turn counter-clockwise.
    pub fn rotate_270(&self) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => transform::rotate_90_ccw(b)))
    }

    // ------------------------------------------------------------------
    // Resampling
    // ------------------------------------------------------------------

    /// Resizes to fit within `width x height`, keeping the aspect ratio.
    ///
    /// A zero target axis gives a 0x0 image.
    pub fn resize(&self, width: u32, height: u32, filter: FilterKind) -> Self {
        let (w, h) = resize::fit_dimensions(self.width(), self.height(), width, height);
        self.resize_exact(w, h, filter)
    }

    /// Resizes to exactly `width x height`.
    ///
    /// A zero target axis gives a zero-area image of that shape.
    pub fn resize_exact(&self, width: u32, height: u32, filter: FilterKind) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => resize::resize(b, width, height, filter)))
    }

    /// Scales to cover `width x height`, then crops the center to exactly
    /// that size.
    pub fn resize_to_fill(&self, width: u32, height: u32, filter: FilterKind) -> Self {
        let (w, h) = resize::fill_dimensions(self.width(), self.height(), width, height);
        if w == 0 || h == 0 {
            return Self::new(0, 0, self.color_model());
        }
        let scaled = self.resize_exact(w, h, filter);
        scaled.crop((w - width) / 2, (h - height) / 2, width, height)
    }

    /// Downscales to fit within `width x height`. Never enlarges.
    pub fn thumbnail(&self, width: u32, height: u32) -> Self {
        let (w, h) = resize::thumbnail_dimensions(self.width(), self.height(), width, height);
        self.resize_exact(w, h, FilterKind::Triangle)
    }

    /// Downscales to exactly `width x height`, each axis capped at the
    /// source size.
    pub fn thumbnail_exact(&self, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::new(0, 0, self.color_model());
        }
        let w = width.min(self.width());
        let h = height.min(self.height());
        self.resize_exact(w, h, FilterKind::Triangle)
    }

    // ------------------------------------------------------------------
    // Color and filters
    // ------------------------------------------------------------------

    /// Contrast adjustment. Positive `contrast` increases it, `-100` flattens
    /// everything to mid grey.
    pub fn adjust_contrast(&self, contrast: f32) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => color::contrast(b, contrast)))
    }

    /// Adds `delta` (in 8-bit units) to every color channel, saturating.
    pub fn brighten(&self, delta: i32) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => color::brighten(b, delta)))
    }

    /// Inverts color channels in place; alpha is kept.
    pub fn invert(&mut self) {
        dynamic_map!(&mut self.buffer, b -> color::invert(b))
    }

    /// Rotates hue by `degrees`. No effect on luma layouts.
    pub fn huerotate(&self, degrees: i32) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => color::huerotate(b, degrees)))
    }

    /// Rec.709 grayscale.
    ///
    /// | From | To |
    /// |------|----|
    /// | RGB8 / RGB16 | L8 / L16 |
    /// | RGBA8 / RGBA16 | LA8 / LA16 |
    /// | RGB32F / RGBA32F | same layout, luma in every color channel |
    /// | luma layouts | unchanged copy |
    pub fn grayscale(&self) -> Self {
        let buffer = match &self.buffer {
            PixelBuffer::Rgb8(b) => PixelBuffer::L8(color::grayscale(b)),
            PixelBuffer::Rgba8(b) => PixelBuffer::La8(color::grayscale(b)),
            PixelBuffer::Rgb16(b) => PixelBuffer::L16(color::grayscale(b)),
            PixelBuffer::Rgba16(b) => PixelBuffer::La16(color::grayscale(b)),
            PixelBuffer::Rgb32F(b) => PixelBuffer::Rgb32F(convert::convert_samples(&color::grayscale(b), 3)),
            PixelBuffer::Rgba32F(b) => PixelBuffer::Rgba32F(convert::convert_samples(&color::grayscale(b), 4)),
            other => other.clone(),
        };
        self.with_buffer(buffer)
    }

    /// Gaussian blur. `sigma <= 0` returns an unchanged copy.
    pub fn blur(&self, sigma: f32) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => filter::blur(b, sigma)))
    }

    /// Unsharp mask; `threshold` is in 8-bit units.
    pub fn unsharpen(&self, sigma: f32, threshold: i32) -> Self {
        self.with_buffer(dynamic_map!(&self.buffer, b => filter::unsharpen(b, sigma, threshold)))
    }

    /// Convolves every channel with a 3x3 kernel (row-major, 9 values).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ParameterMalformed`](dynimg_core::ErrorKind::ParameterMalformed)
    /// unless `kernel` has exactly 9 values.
    pub fn filter_3x3(&self, kernel: &[f32]) -> Result<Self> {
        if kernel.len() != 9 {
            warn!(len = kernel.len(), "3x3 kernel needs 9 coefficients");
            return Err(Error::malformed(format!(
                "3x3 kernel needs 9 coefficients, got {}",
                kernel.len()
            )));
        }
        let buffer = dynamic_map!(&self.buffer, b => filter::filter3x3(b, kernel)?);
        Ok(self.with_buffer(buffer))
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// Converts to `model`, consuming the image. A no-op if the layout
    /// already matches.
    pub fn into_color(self, model: ColorModel) -> Self {
        Self {
            buffer: convert::convert_into(self.buffer, model),
        }
    }

    /// Copy converted to `model`.
    pub fn to_color(&self, model: ColorModel) -> Self {
        self.with_buffer(convert::convert(&self.buffer, model))
    }

    conversions! {
        into_luma8, to_luma8 => L8, "8-bit luma";
        into_luma_alpha8, to_luma_alpha8 => La8, "8-bit luma with alpha";
        into_rgb8, to_rgb8 => Rgb8, "8-bit RGB";
        into_rgba8, to_rgba8 => Rgba8, "8-bit RGBA";
        into_luma16, to_luma16 => L16, "16-bit luma";
        into_luma_alpha16, to_luma_alpha16 => La16, "16-bit luma with alpha";
        into_rgb16, to_rgb16 => Rgb16, "16-bit RGB";
        into_rgba16, to_rgba16 => Rgba16, "16-bit RGBA";
        into_rgb32f, to_rgb32f => Rgb32F, "float RGB";
        into_rgba32f, to_rgba32f => Rgba32F, "float RGBA";
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Encodes to `format` in memory.
    pub fn encode(&self, format: ImageFormat, options: &EncodeOptions) -> Result<Vec<u8>> {
        dynimg_io::encode(&self.buffer, format, options)
    }

    /// Encodes to `format` into a seekable sink.
    pub fn write_to<W: Write + Seek>(
        &self,
        writer: &mut W,
        format: ImageFormat,
        options: &EncodeOptions,
    ) -> Result<()> {
        dynimg_io::write_to(&self.buffer, writer, format, options)
    }

    /// Hands the raw samples to `encoder` once.
    pub fn write_with_encoder<E: CustomEncoder + ?Sized>(&self, encoder: &mut E) -> Result<()> {
        dynimg_io::encode_with(&self.buffer, encoder)
    }

    /// Writes a file, picking the format from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: &EncodeOptions) -> Result<()> {
        debug!(path = %path.as_ref().display(), "save");
        dynimg_io::save(&self.buffer, path, options)
    }

    /// Writes a file as `format`, whatever its extension.
    pub fn save_with_format<P: AsRef<Path>>(
        &self,
        path: P,
        format: ImageFormat,
        options: &EncodeOptions,
    ) -> Result<()> {
        dynimg_io::save_with_format(&self.buffer, path, format, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dynimg_core::{ErrorKind, SampleBuffer};

    const ALL_MODELS: [ColorModel; 10] = [
        ColorModel::L8,
        ColorModel::La8,
        ColorModel::Rgb8,
        ColorModel::Rgba8,
        ColorModel::L16,
        ColorModel::La16,
        ColorModel::Rgb16,
        ColorModel::Rgba16,
        ColorModel::Rgb32F,
        ColorModel::Rgba32F,
    ];

    /// Image with varied samples, converted from 8-bit RGBA.
    fn numbered(w: u32, h: u32, model: ColorModel) -> DynamicImage {
        let n = (w * h) as usize * 4;
        let data = (0..n).map(|i| (i * 7 % 256) as u8).collect();
        let rgba = PixelBuffer::from_raw_u8(w, h, ColorModel::Rgba8, data).unwrap();
        DynamicImage::from_buffer(rgba).unwrap().into_color(model)
    }

    fn rgb8(w: u32, h: u32, data: Vec<u8>) -> DynamicImage {
        DynamicImage::from_buffer(PixelBuffer::from_raw_u8(w, h, ColorModel::Rgb8, data).unwrap()).unwrap()
    }

    #[test]
    fn test_crop_clamps() {
        let img = DynamicImage::new(10, 10, ColorModel::Rgb8);
        assert_eq!(img.crop(9, 0, 10, 1).dimensions(), (1, 1));
        assert_eq!(img.crop(20, 3, 4, 4).dimensions(), (0, 4));
        assert_eq!(img.crop_copy(2, 2, 3, 3).dimensions(), (3, 3));
    }

    #[test]
    fn test_crop_content() {
        let img = numbered(4, 4, ColorModel::Rgba8);
        let part = img.crop(1, 2, 2, 1);
        assert_eq!(part.get_pixel(0, 0), img.get_pixel(1, 2));
        assert_eq!(part.get_pixel(1, 0), img.get_pixel(2, 2));
    }

    #[test]
    fn test_involutions() {
        for model in ALL_MODELS {
            let img = numbered(5, 3, model);
            assert_eq!(img.flip_horizontal().flip_horizontal(), img, "{model}");
            assert_eq!(img.flip_vertical().flip_vertical(), img, "{model}");
            assert_eq!(img.rotate_180().rotate_180(), img, "{model}");
            assert_eq!(img.rotate_90().rotate_90().rotate_90().rotate_90(), img, "{model}");
            assert_eq!(img.rotate_90().rotate_270(), img, "{model}");
        }
    }

    #[test]
    fn test_rotate_90_moves_pixels() {
        let img = numbered(3, 2, ColorModel::Rgb8);
        let rot = img.rotate_90();
        assert_eq!(rot.dimensions(), (2, 3));
        // Bottom-left corner becomes top-left.
        assert_eq!(rot.get_pixel(0, 0), img.get_pixel(0, 1));
        assert_eq!(rot.get_pixel(1, 0), img.get_pixel(0, 0));
    }

    #[test]
    fn test_resize_variants() {
        let img = DynamicImage::new(200, 100, ColorModel::Rgba16);
        assert_eq!(img.resize(50, 50, FilterKind::Lanczos3).dimensions(), (50, 25));
        assert_eq!(img.resize_exact(7, 9, FilterKind::CatmullRom).dimensions(), (7, 9));
        let filled = img.resize_to_fill(40, 40, FilterKind::Triangle);
        assert_eq!(filled.dimensions(), (40, 40));
        assert_eq!(filled.color_model(), ColorModel::Rgba16);
    }

    #[test]
    fn test_degenerate_resize() {
        let img = numbered(6, 4, ColorModel::Rgb8);
        let a = img.resize_exact(0, 4, FilterKind::Nearest);
        assert_eq!(a.dimensions(), (0, 4));
        assert!(a.as_bytes().is_empty());
        let b = img.resize_exact(6, 0, FilterKind::Nearest);
        assert_eq!(b.dimensions(), (6, 0));
        assert_eq!(img.resize(0, 10, FilterKind::Nearest).dimensions(), (0, 0));
        assert_eq!(img.resize_to_fill(10, 0, FilterKind::Nearest).dimensions(), (0, 0));
        assert_eq!(img.thumbnail(0, 3).dimensions(), (0, 0));
        assert_eq!(img.thumbnail_exact(3, 0).dimensions(), (0, 0));
    }

    #[test]
    fn test_resize_to_fill_centers() {
        // Left half black, right half white; filling a square keeps the seam.
        let mut data = Vec::new();
        for _y in 0..10 {
            for x in 0..40 {
                let v = if x < 20 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let img = rgb8(40, 10, data);
        let sq = img.resize_to_fill(10, 10, FilterKind::Nearest);
        assert_eq!(sq.dimensions(), (10, 10));
        assert_eq!(sq.get_pixel(0, 5).r(), 0);
        assert_eq!(sq.get_pixel(9, 5).r(), 255);
    }

    #[test]
    fn test_thumbnail_never_upscales() {
        let img = DynamicImage::new(30, 20, ColorModel::L8);
        assert_eq!(img.thumbnail(100, 100).dimensions(), (30, 20));
        assert_eq!(img.thumbnail(15, 15).dimensions(), (15, 10));
        assert_eq!(img.thumbnail_exact(100, 5).dimensions(), (30, 5));
    }

    #[test]
    fn test_brighten_saturates() {
        let img = rgb8(2, 1, vec![0, 128, 255, 10, 20, 30]);
        assert!(img.brighten(1000).as_bytes().iter().all(|&v| v == 255));
        assert!(img.brighten(-1000).as_bytes().iter().all(|&v| v == 0));
        assert_eq!(img.brighten(10).as_bytes(), &[10, 138, 255, 20, 30, 40]);
    }

    #[test]
    fn test_brighten_sixteen_bit_scale() {
        let img = DynamicImage::new(1, 1, ColorModel::L16).brighten(1);
        assert_eq!(img.buffer(), &PixelBuffer::from_raw_u16(1, 1, ColorModel::L16, vec![257]).unwrap());
    }

    #[test]
    fn test_invert_in_place_keeps_alpha() {
        let mut img = DynamicImage::from_buffer(
            PixelBuffer::from_raw_u8(1, 1, ColorModel::Rgba8, vec![0, 100, 255, 77]).unwrap(),
        )
        .unwrap();
        img.invert();
        assert_eq!(img.get_pixel(0, 0), Rgba::new(255, 155, 0, 77));
    }

    #[test]
    fn test_contrast_flattens() {
        let img = rgb8(2, 1, vec![0, 50, 100, 150, 200, 255]);
        let flat = img.adjust_contrast(-100.0);
        assert!(flat.as_bytes().iter().all(|&v| v == 128));
        assert_eq!(img.adjust_contrast(0.0), img);
    }

    #[test]
    fn test_huerotate_luma_untouched() {
        let img = numbered(3, 3, ColorModel::La16);
        assert_eq!(img.huerotate(120), img);
        let rgb = rgb8(1, 1, vec![255, 0, 0]);
        assert_eq!(rgb.huerotate(360), rgb);
    }

    #[test]
    fn test_grayscale_layouts() {
        let cases = [
            (ColorModel::Rgb8, ColorModel::L8),
            (ColorModel::Rgba8, ColorModel::La8),
            (ColorModel::Rgb16, ColorModel::L16),
            (ColorModel::Rgba16, ColorModel::La16),
            (ColorModel::Rgb32F, ColorModel::Rgb32F),
            (ColorModel::Rgba32F, ColorModel::Rgba32F),
            (ColorModel::L8, ColorModel::L8),
            (ColorModel::La16, ColorModel::La16),
        ];
        for (from, to) in cases {
            let gray = numbered(3, 2, from).grayscale();
            assert_eq!(gray.color_model(), to, "{from}");
            assert_eq!(gray.dimensions(), (3, 2));
        }
    }

    #[test]
    fn test_grayscale_float_replicates_luma() {
        let buf = PixelBuffer::from_raw_f32(1, 1, ColorModel::Rgba32F, vec![1.0, 0.0, 0.0, 0.5]).unwrap();
        let gray = DynamicImage::from_buffer(buf).unwrap().grayscale();
        let PixelBuffer::Rgba32F(b) = gray.buffer() else {
            panic!("layout changed");
        };
        let px = b.pixel(0, 0);
        assert_relative_eq!(px[0], 0.2126, epsilon = 1e-6);
        assert_relative_eq!(px[1], px[0]);
        assert_relative_eq!(px[2], px[0]);
        assert_relative_eq!(px[3], 0.5);
    }

    #[test]
    fn test_blur_and_unsharpen_keep_shape() {
        let img = numbered(8, 6, ColorModel::Rgb16);
        assert_eq!(img.blur(0.0), img);
        assert_eq!(img.blur(-3.0), img);
        let blurred = img.blur(1.5);
        assert_eq!(blurred.dimensions(), (8, 6));
        assert_eq!(blurred.color_model(), ColorModel::Rgb16);
        assert_eq!(img.unsharpen(1.0, 255).dimensions(), (8, 6));
    }

    #[test]
    fn test_filter_3x3() {
        let img = numbered(4, 4, ColorModel::Rgb8);
        let identity = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(img.filter_3x3(&identity).unwrap(), img);

        let err = img.filter_3x3(&[1.0; 8]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterMalformed);
        let err = img.filter_3x3(&[1.0; 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterMalformed);
        let err = DynamicImage::new(0, 0, ColorModel::L8).filter_3x3(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterMalformed);
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn test_conversion_totality() {
        for from in ALL_MODELS {
            let img = numbered(3, 5, from);
            for to in ALL_MODELS {
                let out = img.to_color(to);
                assert_eq!(out.color_model(), to);
                assert_eq!(out.as_bytes().len(), 3 * 5 * to.bytes_per_pixel() as usize, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_named_conversions() {
        let img = rgb8(1, 1, vec![10, 20, 30]);
        assert_eq!(img.to_rgba8().get_pixel(0, 0), Rgba::new(10, 20, 30, 255));
        assert_eq!(img.to_luma_alpha8().color_model(), ColorModel::La8);
        assert_eq!(img.to_rgb16().as_bytes().len(), 6);
        assert_eq!(img.clone().into_rgba32f().color_model(), ColorModel::Rgba32F);
        assert_eq!(img.clone().into_luma16().color_model(), ColorModel::L16);
        assert_eq!(img.clone().into_rgb8(), img);
        assert_eq!(img.clone().into_rgb16().into_rgb8(), img);
    }

    #[test]
    fn test_from_buffer_checks_layout() {
        let wrong = PixelBuffer::Rgb8(SampleBuffer::new(2, 2, 1));
        let err = DynamicImage::from_buffer(wrong.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterDimensionMismatch);
        assert!(DynamicImage::try_from(wrong).is_err());

        let ok = PixelBuffer::Rgb8(SampleBuffer::new(2, 2, 3));
        let img = DynamicImage::try_from(ok).unwrap();
        assert_eq!(img.as_bytes().len(), 12);
        assert_eq!(img.to_rgba8().dimensions(), (2, 2));
    }

    #[test]
    fn test_get_pixel() {
        let img = DynamicImage::from_buffer(PixelBuffer::from_raw_u8(2, 1, ColorModel::La8, vec![9, 8, 7, 6]).unwrap()).unwrap();
        assert_eq!(img.get_pixel(1, 0), Rgba::new(7, 7, 7, 6));
        assert!(img.in_bounds(1, 0));
        assert!(!img.in_bounds(2, 0));
    }

    #[test]
    #[should_panic(expected = "pixel (3, 0) out of bounds for 3x2 image")]
    fn test_get_pixel_out_of_bounds_panics() {
        DynamicImage::new(3, 2, ColorModel::Rgb8).get_pixel(3, 0);
    }

    #[test]
    fn test_pixels_row_major() {
        let img = numbered(3, 2, ColorModel::Rgba8);
        let it = img.pixels();
        assert!(it.size_hint().is_exact());
        assert_eq!(it.size_hint().lower, 6);
        assert_eq!(img.pixels().count(), 6);

        let items = img.pixels().collect();
        let coords: Vec<_> = items.iter().map(|&(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        for (x, y, px) in items {
            assert_eq!(px, img.get_pixel(x, y));
        }
    }

    #[test]
    fn test_into_pixels_outlives_image() {
        let it = {
            let img = rgb8(2, 1, vec![1, 2, 3, 4, 5, 6]);
            img.into_pixels()
        };
        let last = it.last().unwrap();
        assert_eq!(last, (1, 0, Rgba::new(4, 5, 6, 255)));
    }

    #[test]
    fn test_empty_image_has_no_pixels() {
        let img = DynamicImage::new(0, 7, ColorModel::L8);
        assert_eq!(img.pixels().count(), 0);
        assert!(img.pixels().size_hint().is_exact());
    }

    #[test]
    fn test_encode_png_roundtrip() {
        let img = numbered(5, 4, ColorModel::Rgba16);
        let bytes = img.encode(ImageFormat::Png, &EncodeOptions::default()).unwrap();
        let back = crate::load(&bytes, &dynimg_core::Limits::default()).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_write_with_encoder() {
        let img = numbered(2, 2, ColorModel::La8);
        let mut seen = Vec::new();
        let mut enc = |bytes: &[u8], w: u32, h: u32, color: dynimg_core::ExtendedColorType| -> Result<()> {
            seen.push((bytes.len(), w, h, color));
            Ok(())
        };
        img.write_with_encoder(&mut enc).unwrap();
        assert_eq!(seen, vec![(8, 2, 2, dynimg_core::ExtendedColorType::La8)]);
    }

    #[test]
    fn test_write_to_memory_sink() {
        let img = numbered(3, 3, ColorModel::Rgb8);
        let mut sink = dynimg_io::MemorySink::new();
        img.write_to(&mut sink, ImageFormat::Bmp, &EncodeOptions::default()).unwrap();
        assert_eq!(&sink.get_ref()[..2], b"BM");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let img = numbered(4, 3, ColorModel::L16);
        let path = dir.path().join("gray.tiff");
        img.save(&path, &EncodeOptions::default()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(crate::load(&bytes, &dynimg_core::Limits::default()).unwrap(), img);

        let other = dir.path().join("gray.bin");
        img.save_with_format(&other, ImageFormat::Png, &EncodeOptions::default()).unwrap();
        assert_eq!(ImageFormat::from_bytes(&std::fs::read(&other).unwrap()), Some(ImageFormat::Png));
    }

    #[test]
    fn test_release_and_thread_bounds() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DynamicImage>();
        DynamicImage::new(4, 4, ColorModel::Rgba32F).release();
    }
}
