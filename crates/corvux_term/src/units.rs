use num_traits::SaturatingSub;

/// A 2d vector. `x` is the column, `y` the row.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

/// A position or size on the terminal grid, in cells.
pub type OffsetU16 = Vec2<u16>;

/// A position or size in document space, in cells.
pub type OffsetUsize = Vec2<usize>;

impl OffsetU16 {
    pub const ZERO: Self = Self::new(0, 0);
}

impl<T: Copy> Vec2<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn saturating_sub(&self, rhs: Self) -> Self
    where
        T: SaturatingSub,
    {
        self.join(rhs, copying(T::saturating_sub))
    }

    #[inline]
    pub fn area(&self) -> usize
    where
        T: Into<usize>,
    {
        self.x.into() * self.y.into()
    }

    #[inline]
    pub fn ge(&self, rhs: Self) -> OffsetComparison
    where
        T: Ord,
    {
        self.cmp(rhs, T::ge)
    }

    #[inline]
    fn join<U>(self, rhs: Self, f: impl Fn(T, T) -> U) -> Vec2<U> {
        Vec2 {
            x: f(self.x, rhs.x),
            y: f(self.y, rhs.y),
        }
    }

    #[inline]
    fn cmp(self, rhs: Self, f: impl Fn(&T, &T) -> bool) -> OffsetComparison {
        OffsetComparison {
            x: f(&self.x, &rhs.x),
            y: f(&self.y, &rhs.y),
        }
    }
}

impl OffsetUsize {
    /// Narrow to terminal coordinates, saturating at `u16::MAX`.
    #[inline]
    pub fn saturating_into_u16(self) -> OffsetU16 {
        let narrow = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
        OffsetU16::new(narrow(self.x), narrow(self.y))
    }
}

impl From<OffsetU16> for OffsetUsize {
    #[inline]
    fn from(value: OffsetU16) -> Self {
        Self::new(value.x.into(), value.y.into())
    }
}

impl<T: Copy> From<[T; 2]> for Vec2<T> {
    #[inline]
    fn from(value: [T; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetComparison {
    pub x: bool,
    pub y: bool,
}

impl OffsetComparison {
    #[inline]
    pub fn either(&self) -> bool {
        self.x || self.y
    }
}

#[inline]
fn copying<T: Copy, U>(f: impl Fn(&T, &T) -> U) -> impl Fn(T, T) -> U {
    move |lhs, rhs| f(&lhs, &rhs)
}

#[cfg(test)]
mod tests {
    use super::{OffsetU16, OffsetUsize};

    #[test]
    fn out_of_bounds_on_either_axis() {
        let size = OffsetU16::new(80, 24);

        assert!(!OffsetU16::new(79, 23).ge(size).either());
        assert!(OffsetU16::new(80, 0).ge(size).either());
        assert!(OffsetU16::new(0, 24).ge(size).either());
    }

    #[test]
    fn narrowing_saturates() {
        let big = OffsetUsize::new(70_000, 3);
        assert_eq!(big.saturating_into_u16(), OffsetU16::new(u16::MAX, 3));
    }

    #[test]
    fn saturating_sub_clamps_each_axis() {
        let a = OffsetUsize::new(3, 10);
        let b = OffsetUsize::new(5, 4);
        assert_eq!(a.saturating_sub(b), OffsetUsize::new(0, 6));
    }
}
