//! Per-side values for the four edges of a rectangular domain.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Axis;

/// One of the four domain sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// x = x_min
    Left,
    /// x = x_max
    Right,
    /// y = y_min
    Bottom,
    /// y = y_max
    Top,
}

impl Side {
    /// All sides, counterclockwise from the bottom.
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// Axis normal to this side.
    pub fn normal_axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::X,
            Side::Bottom | Side::Top => Axis::Y,
        }
    }

    /// `true` for the side at the maximum coordinate along its normal axis.
    pub fn is_front(self) -> bool {
        matches!(self, Side::Right | Side::Top)
    }
}

/// Value per domain side with named fields.
///
/// ```
/// use ale_remap::types::{Side, Sides};
///
/// let sides = Sides::new(1, 2, 3, 4);
/// assert_eq!(*sides.get(Side::Bottom), 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides<T> {
    /// x = x_min
    pub left: T,
    /// x = x_max
    pub right: T,
    /// y = y_min
    pub bottom: T,
    /// y = y_max
    pub top: T,
}

impl<T> Sides<T> {
    /// Create from explicit values in left, right, bottom, top order.
    pub fn new(left: T, right: T, bottom: T, top: T) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    /// Same value on all sides.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            left: value.clone(),
            right: value.clone(),
            bottom: value.clone(),
            top: value,
        }
    }

    /// Value on a side.
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Top => &self.top,
        }
    }

    /// Mutable value on a side.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Top => &mut self.top,
        }
    }

    /// Map a function over all sides.
    pub fn map<U, F>(self, mut f: F) -> Sides<U>
    where
        F: FnMut(T) -> U,
    {
        Sides {
            left: f(self.left),
            right: f(self.right),
            bottom: f(self.bottom),
            top: f(self.top),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Sides<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L:{} R:{} B:{} T:{}",
            self.left, self.right, self.bottom, self.top
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_lookup() {
        let mut sides = Sides::new('l', 'r', 'b', 't');
        assert_eq!(*sides.get(Side::Right), 'r');
        *sides.get_mut(Side::Top) = 'x';
        assert_eq!(sides.top, 'x');
    }

    #[test]
    fn test_side_geometry() {
        assert_eq!(Side::Left.normal_axis(), Axis::X);
        assert_eq!(Side::Top.normal_axis(), Axis::Y);
        assert!(Side::Right.is_front());
        assert!(!Side::Bottom.is_front());
    }

    #[test]
    fn test_map() {
        let doubled = Sides::uniform(2).map(|v| v * 2);
        assert_eq!(doubled, Sides::uniform(4));
    }
}
