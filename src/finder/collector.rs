use std::{cmp::Ordering, collections::BinaryHeap};

use crate::result::RankedResult;

/// Keeps the `capacity` closest results seen so far.
///
/// Entries are ordered by distance, then store name, then position in the
/// dataset, so the outcome does not depend on the order results arrive in.
pub struct Nearest {
    capacity: usize,
    // max-heap: the worst kept entry sits on top
    heap: BinaryHeap<Entry>,
}

impl Nearest {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1).min(1024)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, index: usize, result: RankedResult) {
        if self.capacity == 0 {
            return;
        }

        let entry = Entry { index, result };
        if self.heap.len() < self.capacity {
            self.heap.push(entry);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if entry < *worst {
                *worst = entry;
            }
        }
    }

    /// The kept results, closest first.
    pub fn into_sorted_vec(self) -> Vec<RankedResult> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|x| x.result)
            .collect()
    }
}

struct Entry {
    index: usize,
    result: RankedResult,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.result
            .distance()
            .total_cmp(&other.result.distance())
            .then_with(|| self.result.store().name.cmp(&other.result.store().name))
            .then_with(|| self.index.cmp(&other.index))
    }
}
