//! # dynimg-capi
//!
//! C ABI for the dynimg image engine.
//!
//! Images cross the boundary as opaque `DynimgImage *` handles. Every
//! operation that produces an image returns a new handle and leaves its
//! input alone, except [`dynimg_invert`] which works in place. Handles are
//! released with [`dynimg_free`], which ignores null.
//!
//! Fallible calls return a [`DynimgStatus`]; [`DynimgStatus::None`] is
//! success. Functions taking a null image handle return null, zero or
//! [`DynimgStatus::ParameterMalformed`].
//!
//! [`dynimg_get_pixel`] out of bounds is a contract violation: the panic
//! cannot unwind through `extern "C"` and aborts the process.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod pixels;
mod status;
mod types;
mod writer;

pub use pixels::{
    dynimg_pixel_array_free, dynimg_pixel_pairs_free, dynimg_pixel_pairs_next, dynimg_pixels, dynimg_pixels_all,
    dynimg_pixels_any, dynimg_pixels_chain, dynimg_pixels_collect, dynimg_pixels_count, dynimg_pixels_eq,
    dynimg_pixels_filter, dynimg_pixels_filter_map, dynimg_pixels_find, dynimg_pixels_fold, dynimg_pixels_for_each,
    dynimg_pixels_free, dynimg_pixels_last, dynimg_pixels_map, dynimg_pixels_next, dynimg_pixels_nth,
    dynimg_pixels_position, dynimg_pixels_size_hint, dynimg_pixels_skip, dynimg_pixels_skip_while,
    dynimg_pixels_step_by, dynimg_pixels_take, dynimg_pixels_take_while, dynimg_pixels_zip, DynimgPixel,
    DynimgPixelFilterMap, DynimgPixelFold, DynimgPixelMap, DynimgPixelPairs, DynimgPixelPredicate, DynimgPixelVisitor,
    DynimgPixels, DynimgSizeHint,
};
pub use status::{dynimg_status_message, DynimgStatus};
pub use types::{DynimgColorModel, DynimgDimensions, DynimgFilter, DynimgFormat, DynimgLimits, DynimgRgba};
pub use writer::{DynimgEncoder, DynimgWhence, DynimgWriter};

use std::ffi::{c_char, CStr};
use std::ptr;

use dynimg::{DynamicImage, EncodeOptions, Error, ImageFormat, Limits, Result};

use crate::status::{status_of, write_message};

/// Opaque image handle.
pub struct DynimgImage(DynamicImage);

fn into_handle(image: DynamicImage) -> *mut DynimgImage {
    Box::into_raw(Box::new(DynimgImage(image)))
}

/// Generates `extern "C"` wrappers for operations that map one image to a
/// new one.
macro_rules! image_op {
    ($($(#[$doc:meta])* $name:ident($($arg:ident: $ty:ty),*) => |$img:ident| $body:expr;)*) => {
        $(
            $(#[$doc])*
            ///
            /// Returns null if `image` is null.
            ///
            /// # Safety
            ///
            /// `image` must be null or a live image handle.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $name(image: *const DynimgImage $(, $arg: $ty)*) -> *mut DynimgImage {
                // SAFETY: caller contract.
                match unsafe { image.as_ref() } {
                    Some(DynimgImage($img)) => into_handle($body),
                    None => ptr::null_mut(),
                }
            }
        )*
    };
}

// ----------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------

/// Decodes `len` bytes at `bytes` into `*out`.
///
/// `limits` may be null for the default limits. On failure `*out` is set
/// to null.
///
/// # Safety
///
/// `bytes` must be valid for `len` reads, `limits` null or valid, `out`
/// valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_load(
    bytes: *const u8,
    len: usize,
    limits: *const DynimgLimits,
    out: *mut *mut DynimgImage,
) -> DynimgStatus {
    // SAFETY: caller contract.
    let Some(out) = (unsafe { out.as_mut() }) else {
        return DynimgStatus::ParameterMalformed;
    };
    *out = ptr::null_mut();
    if bytes.is_null() {
        return DynimgStatus::ParameterMalformed;
    }
    // SAFETY: caller contract.
    let data = unsafe { std::slice::from_raw_parts(bytes, len) };
    // SAFETY: caller contract.
    let limits = unsafe { limits.as_ref() }.map_or_else(Limits::default, |l| Limits::from(*l));
    let result = dynimg::load(data, &limits);
    let status = status_of(&result);
    if let Ok(image) = result {
        *out = into_handle(image);
    }
    status
}

/// Zero-filled image.
#[unsafe(no_mangle)]
pub extern "C" fn dynimg_new(width: u32, height: u32, model: DynimgColorModel) -> *mut DynimgImage {
    into_handle(DynamicImage::new(width, height, model.into()))
}

/// Releases an image handle. Null is ignored.
///
/// # Safety
///
/// `image` must be null or a live image handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_free(image: *mut DynimgImage) {
    if !image.is_null() {
        // SAFETY: non-null handles come from `into_handle`.
        unsafe { Box::from_raw(image) }.0.release();
    }
}

// ----------------------------------------------------------------------
// Inspection
// ----------------------------------------------------------------------

/// Width and height; zero for null.
///
/// # Safety
///
/// `image` must be null or a live image handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_dimensions(image: *const DynimgImage) -> DynimgDimensions {
    // SAFETY: caller contract.
    unsafe { image.as_ref() }.map_or_else(DynimgDimensions::default, |DynimgImage(img)| {
        let (width, height) = img.dimensions();
        DynimgDimensions { width, height }
    })
}

/// Storage layout. `L8` for null.
///
/// # Safety
///
/// `image` must be null or a live image handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_color_model(image: *const DynimgImage) -> DynimgColorModel {
    // SAFETY: caller contract.
    unsafe { image.as_ref() }.map_or(DynimgColorModel::L8, |DynimgImage(img)| img.color_model().into())
}

/// Returns `true` if `(x, y)` addresses a pixel.
///
/// # Safety
///
/// `image` must be null or a live image handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_in_bounds(image: *const DynimgImage, x: u32, y: u32) -> bool {
    // SAFETY: caller contract.
    unsafe { image.as_ref() }.is_some_and(|DynimgImage(img)| img.in_bounds(x, y))
}

/// The pixel at `(x, y)` as 8-bit RGBA.
///
/// Out of bounds aborts the process.
///
/// # Safety
///
/// `image` must be a live image handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_get_pixel(image: *const DynimgImage, x: u32, y: u32) -> DynimgRgba {
    // SAFETY: caller contract.
    let Some(DynimgImage(img)) = (unsafe { image.as_ref() }) else {
        return DynimgRgba::default();
    };
    img.get_pixel(x, y).into()
}

/// Borrows the native-endian sample bytes; their length goes to `*len`.
///
/// The pointer stays valid until the image is mutated or freed. Null for a
/// null image.
///
/// # Safety
///
/// `image` must be null or a live image handle; `len` null or valid for one
/// write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_as_bytes(image: *const DynimgImage, len: *mut usize) -> *const u8 {
    // SAFETY: caller contract.
    let bytes = unsafe { image.as_ref() }.map_or(&[][..], |DynimgImage(img)| img.as_bytes());
    // SAFETY: caller contract.
    if let Some(len) = unsafe { len.as_mut() } {
        *len = bytes.len();
    }
    if image.is_null() { ptr::null() } else { bytes.as_ptr() }
}

// ----------------------------------------------------------------------
// Operations
// ----------------------------------------------------------------------

image_op! {
    /// Deep copy.
    dynimg_clone() => |img| img.clone();
    /// Clipped copy of a region.
    dynimg_crop(x: u32, y: u32, width: u32, height: u32) => |img| img.crop(x, y, width, height);
    /// Mirrors left to right.
    dynimg_flip_horizontal() => |img| img.flip_horizontal();
    /// Mirrors top to bottom.
    dynimg_flip_vertical() => |img| img.flip_vertical();
    /// Quarter turn clockwise.
    dynimg_rotate_90() => |img| img.rotate_90();
    /// Half turn.
    dynimg_rotate_180() => |img| img.rotate_180();
    /// Quarter turn counter-clockwise.
    dynimg_rotate_270() => |img| img.rotate_270();
    /// Aspect-preserving fit.
    dynimg_resize(width: u32, height: u32, filter: DynimgFilter) => |img| img.resize(width, height, filter.into());
    /// Exact resize.
    dynimg_resize_exact(width: u32, height: u32, filter: DynimgFilter) => |img| img.resize_exact(width, height, filter.into());
    /// Cover, then center crop.
    dynimg_resize_to_fill(width: u32, height: u32, filter: DynimgFilter) => |img| img.resize_to_fill(width, height, filter.into());
    /// Downscale-only fit.
    dynimg_thumbnail(width: u32, height: u32) => |img| img.thumbnail(width, height);
    /// Downscale-only exact resize.
    dynimg_thumbnail_exact(width: u32, height: u32) => |img| img.thumbnail_exact(width, height);
    /// Contrast adjustment.
    dynimg_adjust_contrast(contrast: f32) => |img| img.adjust_contrast(contrast);
    /// Brightness offset in 8-bit units.
    dynimg_brighten(delta: i32) => |img| img.brighten(delta);
    /// Hue rotation in degrees.
    dynimg_huerotate(degrees: i32) => |img| img.huerotate(degrees);
    /// Rec.709 grayscale.
    dynimg_grayscale() => |img| img.grayscale();
    /// Gaussian blur.
    dynimg_blur(sigma: f32) => |img| img.blur(sigma);
    /// Unsharp mask.
    dynimg_unsharpen(sigma: f32, threshold: i32) => |img| img.unsharpen(sigma, threshold);
    /// Layout conversion.
    dynimg_convert(model: DynimgColorModel) => |img| img.to_color(model.into());
}

/// Inverts color channels in place.
///
/// # Safety
///
/// `image` must be null or a live image handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_invert(image: *mut DynimgImage) {
    // SAFETY: caller contract.
    if let Some(DynimgImage(img)) = unsafe { image.as_mut() } {
        img.invert();
    }
}

/// 3x3 convolution. `kernel` must hold exactly 9 values.
///
/// # Safety
///
/// `image` must be null or a live image handle, `kernel` valid for `len`
/// reads, `out` valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_filter_3x3(
    image: *const DynimgImage,
    kernel: *const f32,
    len: usize,
    out: *mut *mut DynimgImage,
) -> DynimgStatus {
    // SAFETY: caller contract.
    let (Some(DynimgImage(img)), Some(out)) = (unsafe { image.as_ref() }, unsafe { out.as_mut() }) else {
        return DynimgStatus::ParameterMalformed;
    };
    *out = ptr::null_mut();
    let kernel = if kernel.is_null() {
        &[][..]
    } else {
        // SAFETY: caller contract.
        unsafe { std::slice::from_raw_parts(kernel, len) }
    };
    let result = img.filter_3x3(kernel);
    let status = status_of(&result);
    if let Ok(filtered) = result {
        *out = into_handle(filtered);
    }
    status
}

// ----------------------------------------------------------------------
// Encoding
// ----------------------------------------------------------------------

/// Encodes into a callback sink with default options.
///
/// # Safety
///
/// `image` and `writer` must be null or valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_write_to(
    image: *const DynimgImage,
    writer: *mut DynimgWriter,
    format: DynimgFormat,
) -> DynimgStatus {
    // SAFETY: caller contract.
    let (Some(DynimgImage(img)), Some(writer)) = (unsafe { image.as_ref() }, unsafe { writer.as_mut() }) else {
        return DynimgStatus::ParameterMalformed;
    };
    status_of(&img.write_to(writer, format.into(), &EncodeOptions::default()))
}

/// Hands the raw samples to a callback encoder.
///
/// # Safety
///
/// `image` and `encoder` must be null or valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_write_with_encoder(
    image: *const DynimgImage,
    encoder: *mut DynimgEncoder,
) -> DynimgStatus {
    // SAFETY: caller contract.
    let (Some(DynimgImage(img)), Some(encoder)) = (unsafe { image.as_ref() }, unsafe { encoder.as_mut() }) else {
        return DynimgStatus::ParameterMalformed;
    };
    status_of(&img.write_with_encoder(encoder))
}

/// Resolves a C path and saves through `save`.
///
/// # Safety
///
/// Same as [`dynimg_save`].
unsafe fn save_impl(
    image: *const DynimgImage,
    path: *const c_char,
    message: *mut c_char,
    message_len: usize,
    save: impl FnOnce(&DynamicImage, &str) -> Result<()>,
) -> DynimgStatus {
    // SAFETY: caller contract.
    let result = match unsafe { image.as_ref() } {
        None => Err(Error::malformed("null image handle")),
        Some(_) if path.is_null() => Err(Error::malformed("null path")),
        Some(DynimgImage(img)) => {
            // SAFETY: caller contract; checked non-null above.
            match unsafe { CStr::from_ptr(path) }.to_str() {
                Ok(path) => save(img, path),
                Err(e) => Err(Error::malformed(format!("path is not UTF-8: {e}"))),
            }
        }
    };
    let status = status_of(&result);
    let text = match &result {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    };
    // SAFETY: caller contract.
    unsafe { write_message(message, message_len, &text) };
    status
}

/// Saves to `path`, picking the format from the extension.
///
/// On failure the error text is written to `message` (at most
/// `message_len` bytes, NUL-terminated); on success it becomes empty.
/// `message` may be null.
///
/// # Safety
///
/// `image` must be null or a live image handle, `path` null or a
/// NUL-terminated string, `message` null or valid for `message_len` writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_save(
    image: *const DynimgImage,
    path: *const c_char,
    message: *mut c_char,
    message_len: usize,
) -> DynimgStatus {
    // SAFETY: forwarded caller contract.
    unsafe {
        save_impl(image, path, message, message_len, |img, path| {
            img.save(path, &EncodeOptions::default())
        })
    }
}

/// Saves to `path` as `format`, whatever the extension.
///
/// # Safety
///
/// Same as [`dynimg_save`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_save_with_format(
    image: *const DynimgImage,
    path: *const c_char,
    format: DynimgFormat,
    message: *mut c_char,
    message_len: usize,
) -> DynimgStatus {
    let format = ImageFormat::from(format);
    // SAFETY: forwarded caller contract.
    unsafe {
        save_impl(image, path, message, message_len, |img, path| {
            img.save_with_format(path, format, &EncodeOptions::default())
        })
    }
}
