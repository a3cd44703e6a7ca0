//! Strongly-typed index newtypes.
//!
//! Cells, nodes and faces of the staggered mesh are all addressed by `usize`
//! in storage. Wrapping them keeps a node index from being used to read a
//! cell array.

use std::fmt;

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Iterate over `[0, n)`.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Cell (zone) index. Thermodynamic quantities live here.
    ///
    /// ```
    /// use ale_remap::types::CellIndex;
    ///
    /// let c = CellIndex::new(7);
    /// assert_eq!(c.get(), 7);
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// Mesh node index. Velocities and node masses live here.
    NodeIndex,
    "N"
);

define_index!(
    /// Face (edge) index.
    FaceIndex,
    "F"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_slices_and_vecs() {
        let mut data = vec![1.0, 2.0, 3.0];
        let c = CellIndex::new(1);
        assert_eq!(data[c], 2.0);
        data[c] = 5.0;
        assert_eq!(data.as_slice()[c], 5.0);
    }

    #[test]
    fn test_iter_and_display() {
        let nodes: Vec<_> = NodeIndex::iter(4).collect();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[3].get(), 3);
        assert_eq!(format!("{}", FaceIndex::new(12)), "F12");
        assert_eq!(format!("{}", CellIndex::new(0)), "C0");
    }

    #[test]
    fn test_conversions() {
        let c: CellIndex = 9.into();
        let raw: usize = c.into();
        assert_eq!(raw, 9);
    }
}
