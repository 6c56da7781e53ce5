//! External iterators.
//!
//! [`ExternalIterator`] is a pull-based handle around one boxed
//! `Iterator`. It carries the full adapter and consumer vocabulary as
//! inherent methods, so handles can be chained without naming concrete
//! iterator types, and can be moved across threads (`Send`) but never
//! shared (`!Sync`).
//!
//! Every adapter consumes the handle and returns a new one. Consumers take
//! the handle by value. Dropping a handle releases whatever it still owns.
//!
//! # Example
//!
//! ```rust
//! use dynimg::iter::ExternalIterator;
//!
//! let evens = ExternalIterator::new(0..10)
//!     .filter(|v| v % 2 == 0)
//!     .map(|v| v * 10)
//!     .collect();
//! assert_eq!(evens, vec![0, 20, 40, 60, 80]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::{FusedIterator, Sum};

use tracing::trace;

/// `(lower, upper)` bound on the remaining item count.
///
/// The hint is exact when `upper == Some(lower)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeHint {
    /// Items guaranteed to remain.
    pub lower: usize,
    /// Upper bound, if known.
    pub upper: Option<usize>,
}

impl SizeHint {
    /// Returns `true` if the remaining count is known exactly.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.upper == Some(self.lower)
    }
}

impl From<(usize, Option<usize>)> for SizeHint {
    fn from((lower, upper): (usize, Option<usize>)) -> Self {
        Self { lower, upper }
    }
}

type BoxedIter<'a, T> = Box<dyn Iterator<Item = T> + Send + 'a>;

/// Owning, lazily evaluated iterator handle.
pub struct ExternalIterator<'a, T> {
    inner: BoxedIter<'a, T>,
}

impl<T> fmt::Debug for ExternalIterator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalIterator")
            .field("size_hint", &self.inner.size_hint())
            .finish()
    }
}

impl<'a, T: Send + 'a> ExternalIterator<'a, T> {
    /// Wraps any `Send` iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'a,
    {
        Self {
            inner: Box::new(iter.into_iter()),
        }
    }

    /// Handle that yields nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    // ------------------------------------------------------------------
    // Advance
    // ------------------------------------------------------------------

    /// Pulls the next item.
    #[inline]
    pub fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    /// Bounds on the remaining length.
    #[inline]
    pub fn size_hint(&self) -> SizeHint {
        self.inner.size_hint().into()
    }

    /// Skips `n` items and pulls the next.
    #[inline]
    pub fn nth(&mut self, n: usize) -> Option<T> {
        self.inner.nth(n)
    }

    /// Borrows the handle; items pulled through the borrow are gone from
    /// `self` too.
    ///
    /// ```rust
    /// use dynimg::iter::ExternalIterator;
    ///
    /// let mut it = ExternalIterator::new(1..=5);
    /// let head = it.by_ref().take(2).collect();
    /// assert_eq!(head, vec![1, 2]);
    /// assert_eq!(it.collect(), vec![3, 4, 5]);
    /// ```
    pub fn by_ref(&mut self) -> ExternalIterator<'_, T> {
        ExternalIterator::new(&mut self.inner)
    }

    /// Releases the handle. Equivalent to dropping it.
    pub fn release(self) {
        trace!(remaining = ?self.inner.size_hint(), "iterator released");
    }

    // ------------------------------------------------------------------
    // Bulk consumers
    // ------------------------------------------------------------------

    /// Number of remaining items.
    pub fn count(self) -> usize {
        self.inner.count()
    }

    /// Last remaining item.
    pub fn last(self) -> Option<T> {
        self.inner.last()
    }

    /// Remaining items, in order.
    pub fn collect(self) -> Vec<T> {
        self.inner.collect()
    }

    /// Left fold.
    pub fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.inner.fold(init, f)
    }

    /// Sum of the remaining items; the additive identity if empty.
    ///
    /// ```rust
    /// use dynimg::iter::ExternalIterator;
    ///
    /// let total: u64 = ExternalIterator::new(1..=4u64).sum();
    /// assert_eq!(total, 10);
    /// ```
    pub fn sum<S>(self) -> S
    where
        S: Sum<T>,
    {
        self.inner.sum()
    }

    /// Left fold seeded with the first item; `None` if empty.
    pub fn reduce<F>(self, f: F) -> Option<T>
    where
        F: FnMut(T, T) -> T,
    {
        self.inner.reduce(f)
    }

    /// Calls `f` on every remaining item.
    pub fn for_each<F>(self, f: F)
    where
        F: FnMut(T),
    {
        self.inner.for_each(f)
    }

    // ------------------------------------------------------------------
    // Short-circuiting predicates
    // ------------------------------------------------------------------

    /// `true` if `f` holds for every item (and for an empty handle).
    pub fn all<F>(mut self, f: F) -> bool
    where
        F: FnMut(T) -> bool,
    {
        self.inner.all(f)
    }

    /// `true` if `f` holds for some item.
    pub fn any<F>(mut self, f: F) -> bool
    where
        F: FnMut(T) -> bool,
    {
        self.inner.any(f)
    }

    /// First item matching `predicate`.
    pub fn find<P>(mut self, predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.inner.find(predicate)
    }

    /// First `Some` produced by `f`.
    pub fn find_map<B, F>(mut self, f: F) -> Option<B>
    where
        F: FnMut(T) -> Option<B>,
    {
        self.inner.find_map(f)
    }

    /// Index of the first item matching `predicate`.
    pub fn position<P>(mut self, predicate: P) -> Option<usize>
    where
        P: FnMut(T) -> bool,
    {
        self.inner.position(predicate)
    }

    // ------------------------------------------------------------------
    // Extremes
    // ------------------------------------------------------------------

    /// Maximum item; the last one wins ties.
    pub fn max(self) -> Option<T>
    where
        T: Ord,
    {
        self.inner.max()
    }

    /// Minimum item; the first one wins ties.
    pub fn min(self) -> Option<T>
    where
        T: Ord,
    {
        self.inner.min()
    }

    /// Maximum by comparator.
    pub fn max_by<F>(self, compare: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.inner.max_by(compare)
    }

    /// Minimum by comparator.
    pub fn min_by<F>(self, compare: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.inner.min_by(compare)
    }

    /// Maximum by key.
    pub fn max_by_key<B: Ord, F>(self, f: F) -> Option<T>
    where
        F: FnMut(&T) -> B,
    {
        self.inner.max_by_key(f)
    }

    /// Minimum by key.
    pub fn min_by_key<B: Ord, F>(self, f: F) -> Option<T>
    where
        F: FnMut(&T) -> B,
    {
        self.inner.min_by_key(f)
    }

    // ------------------------------------------------------------------
    // Windowing
    // ------------------------------------------------------------------

    /// Drops the first `n` items.
    pub fn skip(self, n: usize) -> Self {
        Self::new(self.inner.skip(n))
    }

    /// Keeps at most `n` items.
    pub fn take(self, n: usize) -> Self {
        Self::new(self.inner.take(n))
    }

    /// Drops items while `predicate` holds.
    pub fn skip_while<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + Send + 'a,
    {
        Self::new(self.inner.skip_while(predicate))
    }

    /// Keeps items while `predicate` holds, then stops.
    pub fn take_while<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + Send + 'a,
    {
        Self::new(self.inner.take_while(predicate))
    }

    /// Yields the first item and then every `step`-th.
    ///
    /// # Panics
    ///
    /// Panics if `step` is 0.
    pub fn step_by(self, step: usize) -> Self {
        assert!(step != 0, "step_by: step must be non-zero");
        Self::new(self.inner.step_by(step))
    }

    // ------------------------------------------------------------------
    // Combination
    // ------------------------------------------------------------------

    /// Items of `self`, then items of `other`.
    pub fn chain(self, other: ExternalIterator<'a, T>) -> Self {
        Self::new(self.inner.chain(other.inner))
    }

    /// Pairs items until either side runs out.
    pub fn zip<U: Send + 'a>(self, other: ExternalIterator<'a, U>) -> ExternalIterator<'a, (T, U)> {
        ExternalIterator::new(self.inner.zip(other.inner))
    }

    /// Maps each item to an iterable and flattens.
    pub fn flat_map<U, I, F>(self, f: F) -> ExternalIterator<'a, U>
    where
        U: Send + 'a,
        I: IntoIterator<Item = U> + 'a,
        I::IntoIter: Send + 'a,
        F: FnMut(T) -> I + Send + 'a,
    {
        ExternalIterator::new(self.inner.flat_map(f))
    }

    // ------------------------------------------------------------------
    // Transformation
    // ------------------------------------------------------------------

    /// Applies `f` to each item.
    pub fn map<U, F>(self, f: F) -> ExternalIterator<'a, U>
    where
        U: Send + 'a,
        F: FnMut(T) -> U + Send + 'a,
    {
        ExternalIterator::new(self.inner.map(f))
    }

    /// Keeps items matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + Send + 'a,
    {
        Self::new(self.inner.filter(predicate))
    }

    /// Maps and keeps the `Some` results.
    pub fn filter_map<U, F>(self, f: F) -> ExternalIterator<'a, U>
    where
        U: Send + 'a,
        F: FnMut(T) -> Option<U> + Send + 'a,
    {
        ExternalIterator::new(self.inner.filter_map(f))
    }

    /// Maps until `f` returns `None`.
    pub fn map_while<U, F>(self, f: F) -> ExternalIterator<'a, U>
    where
        U: Send + 'a,
        F: FnMut(T) -> Option<U> + Send + 'a,
    {
        ExternalIterator::new(self.inner.map_while(f))
    }

    /// Stateful map; stops when `f` returns `None`.
    pub fn scan<St, U, F>(self, initial_state: St, f: F) -> ExternalIterator<'a, U>
    where
        St: Send + 'a,
        U: Send + 'a,
        F: FnMut(&mut St, T) -> Option<U> + Send + 'a,
    {
        ExternalIterator::new(self.inner.scan(initial_state, f))
    }

    /// Calls `f` on each item as it passes through.
    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnMut(&T) + Send + 'a,
    {
        Self::new(self.inner.inspect(f))
    }

    /// Pairs each item with its index.
    pub fn enumerate(self) -> ExternalIterator<'a, (usize, T)> {
        ExternalIterator::new(self.inner.enumerate())
    }

    /// Handle with one item of lookahead.
    pub fn peekable(self) -> Peekable<'a, T> {
        Peekable {
            inner: self.inner.peekable(),
        }
    }

    /// Handle that keeps returning `None` once exhausted.
    pub fn fuse(self) -> Self {
        Self::new(self.inner.fuse())
    }

    // ------------------------------------------------------------------
    // Lexicographic comparison
    // ------------------------------------------------------------------

    /// Total order against `other`.
    pub fn cmp(self, other: ExternalIterator<'_, T>) -> Ordering
    where
        T: Ord,
    {
        self.inner.cmp(other.inner)
    }

    /// Partial order against `other`.
    pub fn partial_cmp(self, other: ExternalIterator<'_, T>) -> Option<Ordering>
    where
        T: PartialOrd,
    {
        self.inner.partial_cmp(other.inner)
    }

    /// `true` if both yield equal items of equal length.
    pub fn eq(self, other: ExternalIterator<'_, T>) -> bool
    where
        T: PartialEq,
    {
        self.inner.eq(other.inner)
    }

    /// Negation of [`eq`](Self::eq).
    pub fn ne(self, other: ExternalIterator<'_, T>) -> bool
    where
        T: PartialEq,
    {
        self.inner.ne(other.inner)
    }

    /// Lexicographically less than `other`.
    pub fn lt(self, other: ExternalIterator<'_, T>) -> bool
    where
        T: PartialOrd,
    {
        self.inner.lt(other.inner)
    }

    /// Lexicographically less than or equal to `other`.
    pub fn le(self, other: ExternalIterator<'_, T>) -> bool
    where
        T: PartialOrd,
    {
        self.inner.le(other.inner)
    }

    /// Lexicographically greater than `other`.
    pub fn gt(self, other: ExternalIterator<'_, T>) -> bool
    where
        T: PartialOrd,
    {
        self.inner.gt(other.inner)
    }

    /// Lexicographically greater than or equal to `other`.
    pub fn ge(self, other: ExternalIterator<'_, T>) -> bool
    where
        T: PartialOrd,
    {
        self.inner.ge(other.inner)
    }
}

impl<'a, T: 'a> IntoIterator for ExternalIterator<'a, T> {
    type Item = T;
    type IntoIter = Box<dyn Iterator<Item = T> + Send + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
    }
}

/// [`ExternalIterator`] with one item of lookahead.
pub struct Peekable<'a, T> {
    inner: std::iter::Peekable<BoxedIter<'a, T>>,
}

impl<T: fmt::Debug> fmt::Debug for Peekable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peekable")
            .field("size_hint", &self.inner.size_hint())
            .finish()
    }
}

impl<'a, T: Send + 'a> Peekable<'a, T> {
    /// Pulls the next item.
    #[inline]
    pub fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    /// Borrows the next item without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Option<&T> {
        self.inner.peek()
    }

    /// Mutably borrows the next item without consuming it.
    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.inner.peek_mut()
    }

    /// Pulls the next item only if `f` accepts it.
    pub fn next_if(&mut self, f: impl FnOnce(&T) -> bool) -> Option<T> {
        self.inner.next_if(f)
    }

    /// Pulls the next item only if it equals `expected`.
    pub fn next_if_eq(&mut self, expected: &T) -> Option<T>
    where
        T: PartialEq,
    {
        self.inner.next_if_eq(expected)
    }

    /// Bounds on the remaining length, peeked item included.
    #[inline]
    pub fn size_hint(&self) -> SizeHint {
        self.inner.size_hint().into()
    }

    /// Drops the lookahead wrapper, keeping any peeked item.
    pub fn into_external(self) -> ExternalIterator<'a, T> {
        ExternalIterator::new(self.inner)
    }

    /// Releases the handle.
    pub fn release(self) {}
}

impl<'a, T: 'a> IntoIterator for Peekable<'a, T> {
    type Item = T;
    type IntoIter = std::iter::Peekable<BoxedIter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
    }
}

/// Row-major `(x, y)` coordinates of a `width x height` grid.
#[derive(Debug, Clone)]
pub struct PixelCoords {
    width: u32,
    next: u64,
    end: u64,
}

impl PixelCoords {
    /// Coordinates of every pixel of a `width x height` image.
    pub fn new(width: u32, height: u32) -> Self {
        let end = if width == 0 { 0 } else { width as u64 * height as u64 };
        Self { width, next: 0, end }
    }

    #[inline]
    fn remaining(&self) -> usize {
        usize::try_from(self.end - self.next).unwrap_or(usize::MAX)
    }
}

impl Iterator for PixelCoords {
    type Item = (u32, u32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let w = self.width as u64;
        let result = ((self.next % w) as u32, (self.next / w) as u32);
        self.next += 1;
        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n as u64).min(self.end);
        self.next()
    }

    fn count(self) -> usize {
        self.remaining()
    }
}

impl ExactSizeIterator for PixelCoords {}

impl FusedIterator for PixelCoords {}
