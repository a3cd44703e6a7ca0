//! Two-level (`n` / `n+1`) field storage.

/// Pair of field sets for the current and the next time level.
///
/// Phases read `current` and write `next`; [`DoubleBuffer::swap`] exchanges
/// the two handles at the end of an accepted step without copying.
#[derive(Clone, Debug, Default)]
pub struct DoubleBuffer<T> {
    current: T,
    next: T,
}

impl<T> DoubleBuffer<T> {
    /// Both levels start from the same contents.
    pub fn new(initial: T) -> Self
    where
        T: Clone,
    {
        Self {
            next: initial.clone(),
            current: initial,
        }
    }

    /// Level `n`.
    #[inline]
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Level `n+1`.
    #[inline]
    pub fn next(&self) -> &T {
        &self.next
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    #[inline]
    pub fn next_mut(&mut self) -> &mut T {
        &mut self.next
    }

    /// Read `n` while writing `n+1`.
    #[inline]
    pub fn split(&mut self) -> (&T, &mut T) {
        (&self.current, &mut self.next)
    }

    /// Promote `n+1` to `n`.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}
