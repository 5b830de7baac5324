//! Bounded worker pool over index-range partitions.
//!
//! Training, testing, and throughput benchmarking all fan work out the same
//! way: the sample index range `0..n` is split into one contiguous chunk per
//! worker and each worker runs over its chunk on a scoped thread. Results
//! come back in worker order, so callers that care about input order can
//! simply flatten.

use std::ops::Range;
use std::thread;

/// Default worker count for training and bulk testing.
pub const DEFAULT_WORKERS: usize = 8;

/// Split `0..n_items` into `n_workers` contiguous ranges using the
/// `i * n / w` boundary arithmetic, so sizes differ by at most one.
/// Trailing ranges may be empty when `n_items < n_workers`.
pub fn split_ranges(n_items: usize, n_workers: usize) -> Vec<Range<usize>> {
    assert!(n_workers > 0);
    (0..n_workers)
        .map(|i| (n_items * i / n_workers)..(n_items * (i + 1) / n_workers))
        .collect()
}

/// Run `f` once per non-empty range on its own scoped thread and collect the
/// results in range (= input) order. With one worker, runs inline.
pub fn parallel_map_ranges<T, F>(n_items: usize, n_workers: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(Range<usize>) -> T + Sync,
{
    let ranges: Vec<Range<usize>> = split_ranges(n_items, n_workers)
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect();

    if ranges.len() <= 1 {
        return ranges.into_iter().map(&f).collect();
    }

    thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|range| {
                let f = &f;
                scope.spawn(move || f(range))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(v) => v,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_covers_everything_in_order() {
        let ranges = split_ranges(100, 8);
        assert_eq!(ranges.len(), 8);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[7].end, 100);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_split_fewer_items_than_workers() {
        let ranges = split_ranges(3, 8);
        let total: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_split_balanced() {
        let ranges = split_ranges(101, 4);
        for r in &ranges {
            assert!(r.len() == 25 || r.len() == 26);
        }
    }

    #[test]
    fn test_map_preserves_input_order() {
        let chunks = parallel_map_ranges(1000, 8, |range| range.collect::<Vec<_>>());
        let flat: Vec<usize> = chunks.into_iter().flatten().collect();
        assert_eq!(flat, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_map_single_worker_inline() {
        let sums = parallel_map_ranges(10, 1, |range| range.sum::<usize>());
        assert_eq!(sums, vec![45]);
    }

    #[test]
    fn test_map_empty_input() {
        let out: Vec<usize> = parallel_map_ranges(0, 4, |range| range.len());
        assert!(out.is_empty());
    }
}
