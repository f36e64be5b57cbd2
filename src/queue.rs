use crate::error::{HuffmanError, Result};
use derivative::Derivative;

#[derive(Debug, Clone, Derivative)]
#[derivative(
    PartialEq(bound = "K: PartialEq"),
    Eq(bound = "K: Eq"),
    PartialOrd(bound = "K: PartialOrd"),
    Ord(bound = "K: Ord")
)]
struct Entry<K, T> {
    key: K,

    // insertion counter, breaks ties between equal keys
    seq: u64,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    item: T,
}

/// Array-backed binary min-heap.
///
/// Items are ordered by the key given at insertion. Items with equal keys
/// come out in the order they went in, so extraction order is fully
/// determined by the sequence of operations.
#[derive(Debug, Clone)]
pub struct PriorityQueue<K, T> {
    heap: Vec<Entry<K, T>>,
    next_seq: u64,
}

impl<K: Ord, T> PriorityQueue<K, T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Key of the item `extract_min` would return next.
    pub fn peek_key(&self) -> Option<&K> {
        self.heap.first().map(|e| &e.key)
    }

    pub fn insert(&mut self, key: K, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.heap.push(Entry { key, seq, item });
        self.sift_up(self.heap.len() - 1);
    }

    pub fn extract_min(&mut self) -> Result<T> {
        if self.heap.is_empty() {
            return Err(HuffmanError::EmptyQueue);
        }

        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let min = self.heap.pop().ok_or(HuffmanError::EmptyQueue)?;
        self.sift_down(0);

        Ok(min.item)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[parent] <= self.heap[i] {
                break;
            }
            self.heap.swap(parent, i);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            if left >= n {
                break;
            }

            let smaller = if right < n && self.heap[right] < self.heap[left] {
                right
            } else {
                left
            };

            if self.heap[i] <= self.heap[smaller] {
                break;
            }
            self.heap.swap(i, smaller);
            i = smaller;
        }
    }
}

impl<K: Ord, T> Default for PriorityQueue<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, T> Extend<(K, T)> for PriorityQueue<K, T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, item) in iter {
            self.insert(key, item);
        }
    }
}

impl<K: Ord, T> FromIterator<(K, T)> for PriorityQueue<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut queue = Self::with_capacity(iter.size_hint().0);
        queue.extend(iter);
        queue
    }
}
