//! Bounded top-K selection.
//!
//! Keeps a min-heap of at most `k` candidates and replaces the smallest one
//! whenever a larger entry shows up, so selecting from `N` entries costs
//! O(N log k) time and O(k) extra space instead of a full sort.
//!
//! Ordering: greater value first; equal values fall back to ascending key
//! order, so results never depend on hash map iteration order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap candidate ranked by value, then by key (smaller key ranks higher)
struct Ranked<'a, K> {
    value: u64,
    key: &'a K,
}

impl<K: Ord> Ord for Ranked<'_, K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| other.key.cmp(self.key))
    }
}

impl<K: Ord> PartialOrd for Ranked<'_, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> PartialEq for Ranked<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Ranked<'_, K> {}

/// Select the `k` entries with the greatest values, descending.
///
/// Returns every entry when fewer than `k` exist and nothing when `k == 0`.
/// Only the selected keys are cloned; the source table is read, never
/// mutated.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// let table = HashMap::from([("a", 5u64), ("b", 9), ("c", 5)]);
/// let top = aggregator::top_k(&table, 2);
/// assert_eq!(top, vec![("b", 9), ("a", 5)]);
/// ```
pub fn top_k<'a, K, I>(entries: I, k: usize) -> Vec<(K, u64)>
where
    K: Ord + Clone + 'a,
    I: IntoIterator<Item = (&'a K, &'a u64)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked<'a, K>>> = BinaryHeap::new();
    for (key, &value) in entries {
        let candidate = Ranked { value, key };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(mut smallest) = heap.peek_mut() {
            if candidate > smallest.0 {
                *smallest = Reverse(candidate);
            }
        }
    }

    // Ascending by Reverse is descending by rank.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| (ranked.key.clone(), ranked.value))
        .collect()
}
