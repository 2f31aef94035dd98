//! Row-slice scheduling using Rayon.
//!
//! A frame's rows are split into contiguous, non-overlapping slices of
//! near-equal size, one per worker:
//!
//! ```text
//! start(i) = rows * i / workers
//! end(i)   = rows * (i + 1) / workers
//! ```
//!
//! Each slice is handed its own disjoint `&mut` window of the output
//! buffer, so slices run concurrently without locks. [`SliceScheduler::run_rows`]
//! returns only after every slice has finished.
//!
//! # Example
//!
//! ```rust
//! use levels_ops::parallel::SliceScheduler;
//!
//! let ranges = SliceScheduler::partition(10, 3);
//! assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
//!
//! let mut rows = vec![0u8; 10 * 4];
//! SliceScheduler::new(3).run_rows(&mut rows, 4, |range, slice| {
//!     slice.fill(range.start as u8);
//! });
//! assert_eq!(rows[4 * 9], 6);
//! ```

use rayon::prelude::*;
use std::ops::Range;

/// Splits row work across a bounded number of workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceScheduler {
    max_workers: usize,
}

impl SliceScheduler {
    /// Scheduler using at most `max_workers` slices per frame (minimum 1).
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Configured upper bound on slices.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Number of slices for a frame of `total_rows` rows.
    ///
    /// Never more slices than rows.
    pub fn worker_count(&self, total_rows: usize) -> usize {
        self.max_workers.min(total_rows)
    }

    /// Partitions `[0, total_rows)` into `workers` contiguous ranges.
    ///
    /// Ranges cover every row exactly once, in order. With more workers
    /// than rows some ranges are empty.
    pub fn partition(total_rows: usize, workers: usize) -> Vec<Range<usize>> {
        if workers == 0 {
            return Vec::new();
        }
        (0..workers)
            .map(|i| total_rows * i / workers..total_rows * (i + 1) / workers)
            .collect()
    }

    /// Runs `task` once per slice with that slice's rows of `buf`.
    ///
    /// `buf` holds `stride`-sample rows; the number of rows is
    /// `buf.len() / stride`. Each invocation receives its row range and
    /// the matching mutable window, disjoint from every other window.
    pub fn run_rows<T, F>(&self, buf: &mut [T], stride: usize, task: F)
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync + Send,
    {
        if stride == 0 {
            return;
        }
        let total_rows = buf.len() / stride;
        let ranges = Self::partition(total_rows, self.worker_count(total_rows));

        let mut slices = Vec::with_capacity(ranges.len());
        let mut rest = &mut buf[..total_rows * stride];
        for range in ranges {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * stride);
            slices.push((range, head));
            rest = tail;
        }

        slices
            .into_par_iter()
            .for_each(|(range, rows)| task(range, rows));
    }
}

impl Default for SliceScheduler {
    /// One slice per Rayon worker thread.
    fn default() -> Self {
        Self::new(rayon::current_num_threads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_partition_covers_every_row_once() {
        for total in 1..40 {
            for workers in 1..=total {
                let ranges = SliceScheduler::partition(total, workers);
                assert_eq!(ranges.len(), workers);
                let mut next = 0;
                for r in &ranges {
                    assert_eq!(r.start, next, "gap or overlap at {total}/{workers}");
                    assert!(r.end >= r.start);
                    next = r.end;
                }
                assert_eq!(next, total);
            }
        }
    }

    #[test]
    fn test_partition_is_near_equal() {
        let ranges = SliceScheduler::partition(1080, 7);
        let lens: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        let min = *lens.iter().min().unwrap();
        let max = *lens.iter().max().unwrap();
        assert!(max - min <= 1, "{lens:?}");
    }

    #[test]
    fn test_worker_count_capped_by_rows() {
        let s = SliceScheduler::new(16);
        assert_eq!(s.worker_count(3), 3);
        assert_eq!(s.worker_count(100), 16);
        assert_eq!(SliceScheduler::new(0).max_workers(), 1);
    }

    #[test]
    fn test_run_rows_invokes_once_per_slice() {
        let calls = AtomicUsize::new(0);
        let mut buf = vec![0u8; 50 * 3];
        SliceScheduler::new(8).run_rows(&mut buf, 3, |_, _| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 8);

        // fewer rows than workers: one slice per row
        calls.store(0, Ordering::Relaxed);
        SliceScheduler::new(8).run_rows(&mut buf[..2 * 3], 3, |range, rows| {
            assert_eq!(range.len(), 1);
            assert_eq!(rows.len(), 3);
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_run_rows_windows_are_disjoint() {
        let stride = 5;
        let mut buf = vec![0usize; 13 * stride];
        SliceScheduler::new(4).run_rows(&mut buf, stride, |range, rows| {
            assert_eq!(rows.len(), range.len() * stride);
            for (i, row) in rows.chunks_mut(stride).enumerate() {
                row.fill(range.start + i);
            }
        });
        for (y, row) in buf.chunks(stride).enumerate() {
            assert!(row.iter().all(|&v| v == y));
        }
    }
}
