//! Row dispatch.
//!
//! Kernels write their output one row at a time through [`for_each_row`].
//! With the `parallel` feature (default) rows are spread over the rayon
//! pool; without it they run in order on the calling thread. Either way the
//! call returns only when every row is written.
//!
//! # Example
//!
//! ```rust
//! use dynimg_ops::parallel::for_each_row;
//!
//! let mut dst = vec![0.0f32; 4 * 3];
//! for_each_row(&mut dst, 4, |y, row| row.fill(y as f32));
//! assert_eq!(dst[8], 2.0);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(y, row)` for every `row_len`-sized chunk of `data`.
///
/// A trailing partial chunk is passed as is. `row_len == 0` is a no-op.
pub fn for_each_row<T, F>(data: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    data.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Returns `true` when rows are processed on the rayon pool.
#[inline]
pub const fn is_parallel() -> bool {
    cfg!(feature = "parallel")
}
