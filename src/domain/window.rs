//! Bounded FIFO buffer.

use std::collections::VecDeque;

/// Fixed-capacity ring buffer holding the most recent items in arrival order.
///
/// Pushing past capacity evicts the oldest item. A zero-capacity window
/// accepts nothing.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted one if the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// The last `n` items (or fewer), oldest to newest.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity() {
        let mut window = RollingWindow::new(3);
        for i in 0..10 {
            window.push(i);
            assert!(window.len() <= 3);
        }
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut window = RollingWindow::new(2);
        assert_eq!(window.push('a'), None);
        assert_eq!(window.push('b'), None);
        assert_eq!(window.push('c'), Some('a'));
        assert_eq!(window.latest(), Some(&'c'));
    }

    #[test]
    fn tail_is_clamped_to_len() {
        let mut window = RollingWindow::new(5);
        window.push(1);
        window.push(2);
        assert_eq!(window.tail(10).copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(window.tail(1).copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(window.tail(0).count(), 0);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.push(1), Some(1));
        assert!(window.is_empty());
    }
}
