//! Bottom-up merge sort tuned for histograms that are often nearly sorted.
//!
//! Best case O(n) (sorted input, or sorted runs laid end to end), worst
//! case O(n log n). Inputs of up to `STACK_SCRATCH` elements never allocate.

use std::cmp::Ordering;

const STACK_SCRATCH: usize = 32;

/// A histogram position ranked by its strength.
///
/// Equality and ordering only look at `strength`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RankedEntry {
    pub index: usize,
    pub strength: f32,
}

impl RankedEntry {
    pub fn new(index: usize, strength: f32) -> Self {
        Self { index, strength }
    }
}

impl PartialEq for RankedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.strength == other.strength
    }
}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.strength.partial_cmp(&other.strength)
    }
}

/// Sort ascending in place.
pub fn adaptive_sort<T: Copy + Default + PartialOrd>(data: &mut [T]) {
    adaptive_sort_by(data, |a, b| a > b);
}

/// Sort in place so that `greater(a, b)` never holds for `a` placed before `b`.
pub fn adaptive_sort_by<T, F>(data: &mut [T], mut greater: F)
where
    T: Copy + Default,
    F: FnMut(&T, &T) -> bool,
{
    let len = data.len();

    // Runs of two for free
    for pair in data.chunks_exact_mut(2) {
        if greater(&pair[0], &pair[1]) {
            pair.swap(0, 1);
        }
    }

    if len < 3 {
        return;
    }

    let mut stack = [T::default(); STACK_SCRATCH];
    let mut heap: Vec<T> = if len > STACK_SCRATCH {
        vec![T::default(); len]
    } else {
        Vec::new()
    };

    let mut width = 2;
    while width < len {
        let scratch: &mut [T] = if width <= STACK_SCRATCH {
            &mut stack[..]
        } else {
            &mut heap[..]
        };

        // A tail shorter than `width` stays put and becomes the right run
        // of a later, wider merge.
        let mut start = 0;
        while start + width < len {
            let mid = start + width;
            let end = (mid + width).min(len);
            merge(data, scratch, start, mid, end, &mut greater);
            start = end;
        }

        width *= 2;
    }
}

/// Merge the sorted runs `data[start..mid]` and `data[mid..end]`.
fn merge<T, F>(data: &mut [T], scratch: &mut [T], start: usize, mid: usize, end: usize, greater: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> bool,
{
    if !greater(&data[mid - 1], &data[mid]) {
        return;
    }

    // Left elements not above the first right element are already in place.
    let mut first = start;
    while !greater(&data[first], &data[mid]) {
        first += 1;
    }

    let left_len = mid - first;
    scratch[..left_len].copy_from_slice(&data[first..mid]);

    let (mut l, mut r, mut out) = (0, mid, first);
    while l < left_len && r < end {
        if greater(&scratch[l], &data[r]) {
            data[out] = data[r];
            r += 1;
        } else {
            data[out] = scratch[l];
            l += 1;
        }
        out += 1;
    }

    // Leftover right elements already sit at the end.
    data[out..out + left_len - l].copy_from_slice(&scratch[l..left_len]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_sorted(data: &[i64]) -> bool {
        data.windows(2).all(|w| w[0] <= w[1])
    }

    fn pseudo_random(len: usize, seed: u64) -> Vec<i64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) % 1000) as i64
            })
            .collect()
    }

    fn check(mut data: Vec<i64>) {
        let mut expected = data.clone();
        expected.sort();
        adaptive_sort(&mut data);
        assert!(is_sorted(&data));
        assert_eq!(data, expected);
    }

    #[test]
    fn sorts_every_small_length() {
        for len in 0..100 {
            check(pseudo_random(len, len as u64 + 1));
        }
    }

    #[test]
    fn sorts_large_random_inputs() {
        for (len, seed) in [(1000, 7), (1023, 11), (4097, 13), (10_000, 17)] {
            check(pseudo_random(len, seed));
        }
    }

    #[test]
    fn sorted_and_reversed_inputs() {
        for len in [1, 2, 3, 1000, 1001, 5000] {
            check((0..len).collect());
            check((0..len).rev().collect());
        }
    }

    #[test]
    fn concatenated_sorted_runs() {
        let mut data: Vec<i64> = (0..500).collect();
        data.extend(0..500);
        data.extend(250..300);
        check(data);
    }

    #[test]
    fn duplicates_are_kept() {
        check(vec![3, 1, 3, 1, 3, 1, 2, 2, 2]);
        check(vec![5; 77]);
    }

    #[test]
    fn ranked_entries_sort_by_strength() {
        let mut entries: Vec<RankedEntry> = [0.3, 0.9, 0.1, 0.5, 0.7]
            .iter()
            .enumerate()
            .map(|(i, &s)| RankedEntry::new(i, s))
            .collect();
        adaptive_sort(&mut entries);
        let order: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(order, vec![2, 0, 3, 4, 1]);
    }

    #[test]
    fn custom_ordering() {
        let mut data = pseudo_random(300, 5);
        adaptive_sort_by(&mut data, |a, b| a < b);
        assert!(data.windows(2).all(|w| w[0] >= w[1]));
    }
}
