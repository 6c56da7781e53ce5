//! Pixel iterator handles.
//!
//! A [`DynimgPixels`] handle owns its own copy of the image, so it stays
//! valid after the source image is freed. Combinators consume the handle
//! they are given and return a new one.
//!
//! Callback-driven calls take an `Option` of a C function pointer plus a
//! `user_data` pointer that is passed back untouched. A null callback
//! releases the input and yields null, `false` or zero. Lazy adapters
//! (`filter`, `map`, ...) hold on to `user_data` until the returned handle
//! is drained or freed, and call back on whichever thread drives it.

use std::ffi::c_void;
use std::ptr;

use dynimg::{ExternalIterator, PixelItem};

use crate::DynimgImage;
use crate::types::DynimgRgba;

/// Opaque pixel iterator.
pub struct DynimgPixels(ExternalIterator<'static, PixelItem>);

/// One pixel with its coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct DynimgPixel {
    pub x: u32,
    pub y: u32,
    pub color: DynimgRgba,
}

impl From<PixelItem> for DynimgPixel {
    fn from((x, y, px): PixelItem) -> Self {
        Self { x, y, color: px.into() }
    }
}

impl DynimgPixel {
    fn into_item(self) -> PixelItem {
        (self.x, self.y, self.color.into())
    }
}

/// Opaque iterator over pixel pairs, from [`dynimg_pixels_zip`].
pub struct DynimgPixelPairs(ExternalIterator<'static, (PixelItem, PixelItem)>);

/// Tests one pixel.
pub type DynimgPixelPredicate = extern "C" fn(user_data: *mut c_void, pixel: DynimgPixel) -> bool;

/// Receives one pixel.
pub type DynimgPixelVisitor = extern "C" fn(user_data: *mut c_void, pixel: DynimgPixel);

/// Rewrites one pixel.
pub type DynimgPixelMap = extern "C" fn(user_data: *mut c_void, pixel: DynimgPixel) -> DynimgPixel;

/// Rewrites one pixel into `out`; `false` drops it.
pub type DynimgPixelFilterMap =
    extern "C" fn(user_data: *mut c_void, pixel: DynimgPixel, out: *mut DynimgPixel) -> bool;

/// Folds one pixel into the accumulator and returns the new one.
pub type DynimgPixelFold = extern "C" fn(user_data: *mut c_void, acc: *mut c_void, pixel: DynimgPixel) -> *mut c_void;

/// Caller state carried into lazy adapters.
#[derive(Clone, Copy)]
struct UserData(*mut c_void);

// SAFETY: callers of the adapter functions agree that `user_data` may be
// used from the thread that drives the returned handle.
unsafe impl Send for UserData {}

impl UserData {
    fn get(self) -> *mut c_void {
        self.0
    }
}

/// Remaining-length bounds. `upper` is meaningful only when `has_upper`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct DynimgSizeHint {
    pub lower: usize,
    pub upper: usize,
    pub has_upper: bool,
}

fn into_handle(it: ExternalIterator<'static, PixelItem>) -> *mut DynimgPixels {
    Box::into_raw(Box::new(DynimgPixels(it)))
}

/// Takes ownership of a handle, or `None` for null.
///
/// # Safety
///
/// `it` must be null or a live handle; it is dead afterwards.
unsafe fn take(it: *mut DynimgPixels) -> Option<ExternalIterator<'static, PixelItem>> {
    if it.is_null() {
        None
    } else {
        // SAFETY: non-null handles come from `into_handle`.
        Some(unsafe { Box::from_raw(it) }.0)
    }
}

/// Row-major iterator over a copy of `image`. Null for a null image.
///
/// # Safety
///
/// `image` must be null or a live image handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels(image: *const DynimgImage) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    match unsafe { image.as_ref() } {
        Some(DynimgImage(img)) => into_handle(img.clone().into_pixels()),
        None => ptr::null_mut(),
    }
}

/// Pulls the next pixel into `out`. Returns `false` when exhausted or when
/// either pointer is null.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; `out` must be null or
/// valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_next(it: *mut DynimgPixels, out: *mut DynimgPixel) -> bool {
    // SAFETY: caller contract.
    let (Some(DynimgPixels(it)), Some(out)) = (unsafe { it.as_mut() }, unsafe { out.as_mut() }) else {
        return false;
    };
    match it.next() {
        Some(item) => {
            *out = item.into();
            true
        }
        None => false,
    }
}

/// Skips `n` pixels in place and pulls the next one into `out`. Returns
/// `false` when the handle runs out first or either pointer is null.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; `out` must be null or
/// valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_nth(it: *mut DynimgPixels, n: usize, out: *mut DynimgPixel) -> bool {
    // SAFETY: caller contract.
    let (Some(DynimgPixels(it)), Some(out)) = (unsafe { it.as_mut() }, unsafe { out.as_mut() }) else {
        return false;
    };
    match it.nth(n) {
        Some(item) => {
            *out = item.into();
            true
        }
        None => false,
    }
}

/// Bounds on the remaining length. All zero for a null handle.
///
/// # Safety
///
/// `it` must be null or a live iterator handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_size_hint(it: *const DynimgPixels) -> DynimgSizeHint {
    // SAFETY: caller contract.
    let Some(DynimgPixels(it)) = (unsafe { it.as_ref() }) else {
        return DynimgSizeHint::default();
    };
    let hint = it.size_hint();
    DynimgSizeHint {
        lower: hint.lower,
        upper: hint.upper.unwrap_or(0),
        has_upper: hint.upper.is_some(),
    }
}

/// Counts the remaining pixels, consuming the handle.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_count(it: *mut DynimgPixels) -> usize {
    // SAFETY: caller contract.
    unsafe { take(it) }.map_or(0, ExternalIterator::count)
}

/// Pulls the final pixel into `out`, consuming `it`. Returns `false` for an
/// empty handle or a null pointer.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `out` must be null or valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_last(it: *mut DynimgPixels, out: *mut DynimgPixel) -> bool {
    // SAFETY: caller contract.
    let (Some(it), Some(out)) = (unsafe { take(it) }, unsafe { out.as_mut() }) else {
        return false;
    };
    match it.last() {
        Some(item) => {
            *out = item.into();
            true
        }
        None => false,
    }
}

/// Drains `it` into an owned array and stores its length in `*len`.
///
/// Returns null for an empty result. Release the array with
/// [`dynimg_pixel_array_free`] and the same length.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `len` must be null or valid for one write; a null `len` releases `it`
/// and returns null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_collect(it: *mut DynimgPixels, len: *mut usize) -> *mut DynimgPixel {
    // SAFETY: caller contract.
    let (it, len) = (unsafe { take(it) }, unsafe { len.as_mut() });
    let Some(len) = len else {
        return ptr::null_mut();
    };
    *len = 0;
    let Some(it) = it else {
        return ptr::null_mut();
    };
    let pixels = it.map(DynimgPixel::from).collect().into_boxed_slice();
    if pixels.is_empty() {
        return ptr::null_mut();
    }
    *len = pixels.len();
    Box::into_raw(pixels).cast()
}

/// Releases an array from [`dynimg_pixels_collect`]. Null is ignored.
///
/// # Safety
///
/// `pixels` must be null or an array from [`dynimg_pixels_collect`] with
/// the `len` it reported; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixel_array_free(pixels: *mut DynimgPixel, len: usize) {
    if !pixels.is_null() {
        // SAFETY: non-null arrays are boxed slices of exactly `len` pixels.
        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(pixels, len)) });
    }
}

/// Calls `f` on every remaining pixel, consuming `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_for_each(
    it: *mut DynimgPixels,
    f: Option<DynimgPixelVisitor>,
    user_data: *mut c_void,
) {
    // SAFETY: caller contract.
    if let (Some(it), Some(f)) = (unsafe { take(it) }, f) {
        it.for_each(|item| f(user_data, item.into()));
    }
}

/// Left fold from `init`, consuming `it`. Returns `init` when the handle or
/// the callback is null.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_fold(
    it: *mut DynimgPixels,
    init: *mut c_void,
    f: Option<DynimgPixelFold>,
    user_data: *mut c_void,
) -> *mut c_void {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, f) else {
        return init;
    };
    it.fold(init, |acc, item| f(user_data, acc, item.into()))
}

/// `true` if `predicate` holds for every pixel, consuming `it`. An empty
/// handle is `true`; a null handle or callback is `false`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_all(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
) -> bool {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, predicate) else {
        return false;
    };
    it.all(|item| f(user_data, item.into()))
}

/// `true` if `predicate` holds for some pixel, consuming `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_any(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
) -> bool {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, predicate) else {
        return false;
    };
    it.any(|item| f(user_data, item.into()))
}

/// First pixel matching `predicate`, written to `out`. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `out` must be null or valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_find(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
    out: *mut DynimgPixel,
) -> bool {
    // SAFETY: caller contract.
    let (Some(it), Some(f), Some(out)) = (unsafe { take(it) }, predicate, unsafe { out.as_mut() }) else {
        return false;
    };
    match it.find(|item| f(user_data, (*item).into())) {
        Some(item) => {
            *out = item.into();
            true
        }
        None => false,
    }
}

/// Index of the first pixel matching `predicate`, written to `out`.
/// Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `out` must be null or valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_position(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
    out: *mut usize,
) -> bool {
    // SAFETY: caller contract.
    let (Some(it), Some(f), Some(out)) = (unsafe { take(it) }, predicate, unsafe { out.as_mut() }) else {
        return false;
    };
    match it.position(|item| f(user_data, item.into())) {
        Some(index) => {
            *out = index;
            true
        }
        None => false,
    }
}

/// `true` if `a` and `b` yield the same pixels, consuming both.
///
/// # Safety
///
/// `a` and `b` must each be null or a live iterator handle; both are dead
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_eq(a: *mut DynimgPixels, b: *mut DynimgPixels) -> bool {
    // SAFETY: caller contract.
    match (unsafe { take(a) }, unsafe { take(b) }) {
        (Some(a), Some(b)) => a.eq(b),
        _ => false,
    }
}

/// Skips `n` pixels. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_skip(it: *mut DynimgPixels, n: usize) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    unsafe { take(it) }.map_or(ptr::null_mut(), |it| into_handle(it.skip(n)))
}

/// Keeps at most `n` pixels. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_take(it: *mut DynimgPixels, n: usize) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    unsafe { take(it) }.map_or(ptr::null_mut(), |it| into_handle(it.take(n)))
}

/// Yields the first pixel and then every `step`-th. Consumes `it`.
///
/// A zero `step` releases `it` and returns null.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_step_by(it: *mut DynimgPixels, step: usize) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    let Some(it) = (unsafe { take(it) }) else {
        return ptr::null_mut();
    };
    if step == 0 {
        tracing::warn!("step_by called with a zero step");
        it.release();
        return ptr::null_mut();
    }
    into_handle(it.step_by(step))
}

/// Keeps pixels matching `predicate`. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `user_data` must stay valid until the returned handle is freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_filter(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, predicate) else {
        return ptr::null_mut();
    };
    let data = UserData(user_data);
    into_handle(it.filter(move |item| f(data.get(), (*item).into())))
}

/// Replaces each pixel with the callback's result. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `user_data` must stay valid until the returned handle is freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_map(
    it: *mut DynimgPixels,
    f: Option<DynimgPixelMap>,
    user_data: *mut c_void,
) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, f) else {
        return ptr::null_mut();
    };
    let data = UserData(user_data);
    into_handle(it.map(move |item| f(data.get(), item.into()).into_item()))
}

/// Rewrites pixels and drops those the callback rejects. `out` starts as a
/// copy of the input pixel. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `user_data` must stay valid until the returned handle is freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_filter_map(
    it: *mut DynimgPixels,
    f: Option<DynimgPixelFilterMap>,
    user_data: *mut c_void,
) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, f) else {
        return ptr::null_mut();
    };
    let data = UserData(user_data);
    into_handle(it.filter_map(move |item| {
        let pixel = DynimgPixel::from(item);
        let mut out = pixel;
        f(data.get(), pixel, &mut out).then(|| out.into_item())
    }))
}

/// Drops pixels while `predicate` holds. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `user_data` must stay valid until the returned handle is freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_skip_while(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, predicate) else {
        return ptr::null_mut();
    };
    let data = UserData(user_data);
    into_handle(it.skip_while(move |item| f(data.get(), (*item).into())))
}

/// Keeps pixels while `predicate` holds, then stops. Consumes `it`.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
/// `user_data` must stay valid until the returned handle is freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_take_while(
    it: *mut DynimgPixels,
    predicate: Option<DynimgPixelPredicate>,
    user_data: *mut c_void,
) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    let (Some(it), Some(f)) = (unsafe { take(it) }, predicate) else {
        return ptr::null_mut();
    };
    let data = UserData(user_data);
    into_handle(it.take_while(move |item| f(data.get(), (*item).into())))
}

/// Pixels of `a`, then pixels of `b`. Consumes both; null if either is
/// null.
///
/// # Safety
///
/// `a` and `b` must each be null or a live iterator handle; both are dead
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_chain(a: *mut DynimgPixels, b: *mut DynimgPixels) -> *mut DynimgPixels {
    // SAFETY: caller contract.
    match (unsafe { take(a) }, unsafe { take(b) }) {
        (Some(a), Some(b)) => into_handle(a.chain(b)),
        _ => ptr::null_mut(),
    }
}

/// Pairs pixels of `a` and `b` until either runs out. Consumes both; null
/// if either is null.
///
/// # Safety
///
/// `a` and `b` must each be null or a live iterator handle; both are dead
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_zip(a: *mut DynimgPixels, b: *mut DynimgPixels) -> *mut DynimgPixelPairs {
    // SAFETY: caller contract.
    match (unsafe { take(a) }, unsafe { take(b) }) {
        (Some(a), Some(b)) => Box::into_raw(Box::new(DynimgPixelPairs(a.zip(b)))),
        _ => ptr::null_mut(),
    }
}

/// Pulls the next pair into `a` and `b`. Returns `false` when exhausted or
/// when any pointer is null.
///
/// # Safety
///
/// `it` must be null or a live pair handle; `a` and `b` must be null or
/// valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixel_pairs_next(
    it: *mut DynimgPixelPairs,
    a: *mut DynimgPixel,
    b: *mut DynimgPixel,
) -> bool {
    // SAFETY: caller contract.
    let (Some(DynimgPixelPairs(it)), Some(a), Some(b)) =
        (unsafe { it.as_mut() }, unsafe { a.as_mut() }, unsafe { b.as_mut() })
    else {
        return false;
    };
    match it.next() {
        Some((first, second)) => {
            *a = first.into();
            *b = second.into();
            true
        }
        None => false,
    }
}

/// Releases a pair handle. Null is ignored.
///
/// # Safety
///
/// `it` must be null or a live pair handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixel_pairs_free(it: *mut DynimgPixelPairs) {
    if !it.is_null() {
        // SAFETY: non-null pair handles come from `dynimg_pixels_zip`.
        unsafe { Box::from_raw(it) }.0.release();
    }
}

/// Releases an iterator handle. Null is ignored.
///
/// # Safety
///
/// `it` must be null or a live iterator handle; it is dead afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_pixels_free(it: *mut DynimgPixels) {
    // SAFETY: caller contract.
    if let Some(it) = unsafe { take(it) } {
        it.release();
    }
}
