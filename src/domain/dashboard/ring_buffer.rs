//! Fixed-capacity most-recent-first feed.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Bounded feed ordered by arrival, newest first.
///
/// Pushing onto a full buffer evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends `item`, returning the evicted entry if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.front()
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

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for RingBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first() {
        let mut buf = RingBuffer::new(3);
        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.to_vec(), vec![3, 2, 1]);
        assert_eq!(buf.latest(), Some(&3));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut buf = RingBuffer::new(2);
        assert_eq!(buf.push('a'), None);
        assert_eq!(buf.push('b'), None);
        assert_eq!(buf.push('c'), Some('a'));
        assert_eq!(buf.to_vec(), vec!['c', 'b']);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let mut buf = RingBuffer::new(0);
        assert_eq!(buf.push(5), Some(5));
        assert!(buf.is_empty());
    }

    #[test]
    fn serializes_as_sequence() {
        let mut buf = RingBuffer::new(4);
        buf.push(1);
        buf.push(2);
        assert_eq!(serde_json::to_string(&buf).unwrap(), "[2,1]");
    }
}
