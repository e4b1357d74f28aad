use alloc::vec::Vec;
use core::fmt;
use core::ops::{Deref, Index};

use smallvec::SmallVec;

use crate::{Error, Result};

/// A scalar that can serve as one coordinate of a [`Point`].
///
/// Squared distances are computed in a wider [`Distance`](Self::Distance) type so
/// that they neither overflow nor lose the ordering needed by nearest-neighbour
/// search. Integer distances saturate instead of wrapping.
pub trait Coordinate: Copy + PartialOrd + fmt::Debug {
    /// Type of squared distances between coordinates.
    type Distance: Copy + PartialOrd + fmt::Debug;

    /// The distance between a point and itself.
    const ZERO: Self::Distance;

    /// `(self - other)²` along one axis.
    fn squared_gap(self, other: Self) -> Self::Distance;

    /// Adds one axis' squared gap into a running total.
    fn accumulate(total: Self::Distance, term: Self::Distance) -> Self::Distance;
}

macro_rules! impl_integer_coordinate {
    ($($t:ty => $wide:ty),* $(,)?) => {$(
        impl Coordinate for $t {
            type Distance = $wide;

            const ZERO: $wide = 0;

            #[inline]
            fn squared_gap(self, other: Self) -> $wide {
                let gap = <$wide>::from(self.abs_diff(other));
                gap.saturating_mul(gap)
            }

            #[inline]
            fn accumulate(total: $wide, term: $wide) -> $wide {
                total.saturating_add(term)
            }
        }
    )*};
}

impl_integer_coordinate! {
    i8 => u32,
    i16 => u64,
    i32 => u64,
    i64 => u128,
    u8 => u32,
    u16 => u64,
    u32 => u64,
    u64 => u128,
}

macro_rules! impl_float_coordinate {
    ($($t:ty),* $(,)?) => {$(
        impl Coordinate for $t {
            type Distance = f64;

            const ZERO: f64 = 0.0;

            #[inline]
            fn squared_gap(self, other: Self) -> f64 {
                let gap = f64::from(self) - f64::from(other);
                gap * gap
            }

            #[inline]
            fn accumulate(total: f64, term: f64) -> f64 {
                total + term
            }
        }
    )*};
}

impl_float_coordinate!(f32, f64);

/// A point with one coordinate per dimension.
///
/// Two coordinates are stored inline; higher-dimensional points spill to the heap.
///
/// # Examples
///
/// ```
/// use search_forest::Point;
///
/// let p = Point::<i32>::from([2, 3]);
/// assert_eq!(p.dimensions(), 2);
/// assert_eq!(p[1], 3);
/// assert_eq!(p, Point::from((2, 3)));
/// assert_eq!(p.squared_distance(&[5, 7]), Ok(25u64));
/// assert!(p.squared_distance(&[5]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Point<T>(SmallVec<[T; 2]>);

impl<T> Point<T> {
    /// Number of coordinates.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// The coordinates in axis order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: Coordinate> Point<T> {
    /// Squared Euclidean distance to `other`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `other` has a different number of coordinates.
    pub fn squared_distance(&self, other: &[T]) -> Result<T::Distance> {
        if other.len() != self.dimensions() {
            return Err(Error::DimensionMismatch { expected: self.dimensions(), found: other.len() });
        }
        Ok(squared_distance(&self.0, other))
    }
}

/// Callers have already checked that `a` and `b` have the same length.
pub(crate) fn squared_distance<T: Coordinate>(a: &[T], b: &[T]) -> T::Distance {
    debug_assert_eq!(a.len(), b.len(), "`squared_distance()` - dimension mismatch!");
    a.iter()
        .zip(b)
        .fold(T::ZERO, |total, (&x, &y)| T::accumulate(total, x.squared_gap(y)))
}

impl<T> Deref for Point<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> AsRef<[T]> for Point<T> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T> Index<usize> for Point<T> {
    type Output = T;

    fn index(&self, axis: usize) -> &T {
        &self.0[axis]
    }
}

impl<T, const N: usize> From<[T; N]> for Point<T> {
    fn from(coordinates: [T; N]) -> Self {
        Point(coordinates.into_iter().collect())
    }
}

impl<T> From<(T, T)> for Point<T> {
    fn from((x, y): (T, T)) -> Self {
        Point(SmallVec::from_buf([x, y]))
    }
}

impl<T> From<Vec<T>> for Point<T> {
    fn from(coordinates: Vec<T>) -> Self {
        Point(SmallVec::from_vec(coordinates))
    }
}

impl<T> FromIterator<T> for Point<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Point(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("");
        for coordinate in &self.0 {
            tuple.field(coordinate);
        }
        tuple.finish()
    }
}
