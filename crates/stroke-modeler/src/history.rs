//! Fixed-capacity history buffer.

use std::collections::VecDeque;

/// Keeps the most recent `capacity` values, evicting the oldest on push.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// A capacity of zero is bumped to one so the newest value is always kept.
    /// Storage grows with use; `capacity` only bounds it.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(history.oldest(), Some(&2));
        assert_eq!(history.newest(), Some(&4));
    }

    #[test]
    fn test_zero_capacity_keeps_newest() {
        let mut history = History::new(0);
        history.push('a');
        history.push('b');
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.newest(), Some(&'b'));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_unbounded_capacity_allocates_on_push() {
        let mut history = History::new(usize::MAX);
        assert_eq!(history.capacity(), usize::MAX);
        for i in 0..100 {
            history.push(i);
        }
        assert_eq!(history.len(), 100);
        assert_eq!(history.oldest(), Some(&0));
        assert_eq!(history.newest(), Some(&99));
    }
}
