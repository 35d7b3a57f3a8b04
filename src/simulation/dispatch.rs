//! Priority dispatch heap
//!
//! Binary max-heap over intersection handles. Priorities are never stored:
//! every operation takes a scoring function that reads the live state of
//! the entry, so a changed intersection only needs an `update` to move.
//!
//! A reverse index (key -> heap slot) is kept in step with every swap, which
//! makes `remove` and `update` O(log n) instead of a linear scan.

use std::collections::HashMap;
use std::hash::Hash;

/// Max-heap of unique keys ordered by an external score
#[derive(Debug, Clone)]
pub struct DispatchHeap<K> {
    heap: Vec<K>,
    slots: HashMap<K, usize>,
}

impl<K> Default for DispatchHeap<K> {
    fn default() -> Self {
        Self {
            heap: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

fn parent(index: usize) -> usize {
    (index - 1) / 2
}

fn left_child(index: usize) -> usize {
    2 * index + 1
}

impl<K: Clone + Eq + Hash> DispatchHeap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Highest priority key without removing it
    pub fn peek(&self) -> Option<&K> {
        self.heap.first()
    }

    /// Keys in heap-array order
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.heap.iter()
    }

    /// Add a key. A key that is already present is repositioned instead.
    pub fn insert(&mut self, key: K, score: impl Fn(&K) -> u64) {
        if self.contains(&key) {
            self.remove(&key, &score);
        }
        self.slots.insert(key.clone(), self.heap.len());
        self.heap.push(key);
        self.sift_up(self.heap.len() - 1, &score);
    }

    /// Remove and return the key with the highest score, `None` when empty
    pub fn extract_max(&mut self, score: impl Fn(&K) -> u64) -> Option<K> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let max = self.heap.pop()?;
        self.slots.remove(&max);
        if !self.heap.is_empty() {
            self.sift_down(0, &score);
        }
        Some(max)
    }

    /// Remove `key` wherever it sits. Returns false if it was not present.
    pub fn remove(&mut self, key: &K, score: impl Fn(&K) -> u64) -> bool {
        let Some(index) = self.slots.get(key).copied() else {
            return false;
        };

        let last = self.heap.len() - 1;
        if index != last {
            self.swap(index, last);
        }
        if let Some(removed) = self.heap.pop() {
            self.slots.remove(&removed);
        }
        if index == last {
            return true;
        }

        // The element moved into `index` may belong above or below it.
        if index > 0 && score(&self.heap[index]) > score(&self.heap[parent(index)]) {
            self.sift_up(index, &score);
        } else {
            self.sift_down(index, &score);
        }
        true
    }

    /// Re-seat `key` after its score changed, inserting it if absent
    pub fn update(&mut self, key: K, score: impl Fn(&K) -> u64) {
        self.remove(&key, &score);
        self.insert(key, &score);
    }

    /// True when every entry scores no higher than its parent
    pub fn is_valid(&self, score: impl Fn(&K) -> u64) -> bool {
        (1..self.heap.len()).all(|i| score(&self.heap[i]) <= score(&self.heap[parent(i)]))
            && self
                .heap
                .iter()
                .enumerate()
                .all(|(i, key)| self.slots.get(key) == Some(&i))
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].clone(), a);
        self.slots.insert(self.heap[b].clone(), b);
    }

    fn sift_up(&mut self, mut index: usize, score: &impl Fn(&K) -> u64) {
        while index > 0 {
            let up = parent(index);
            if score(&self.heap[up]) < score(&self.heap[index]) {
                self.swap(up, index);
                index = up;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize, score: &impl Fn(&K) -> u64) {
        loop {
            let left = left_child(index);
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let mut larger = left;
            if right < self.heap.len() && score(&self.heap[right]) > score(&self.heap[left]) {
                larger = right;
            }
            if score(&self.heap[index]) < score(&self.heap[larger]) {
                self.swap(index, larger);
                index = larger;
            } else {
                break;
            }
        }
    }
}
