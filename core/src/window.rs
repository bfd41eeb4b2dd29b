//! Per-client chronological partitions and the two-pointer time window.
//!
//! RULE: every windowed detector reads a client's history only through
//! its ClientPartition. Partitions share nothing, so they are processed
//! in parallel and the results are scattered back by row index.

use crate::{
    transaction::Transaction,
    types::{ClientId, RowIndex},
};
use chrono::{Duration, NaiveDateTime};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::Range;

/// One client's rows, ordered by `date_time` (ties keep input order).
#[derive(Debug, Clone)]
pub struct ClientPartition {
    pub client_id: ClientId,
    pub rows:      Vec<RowIndex>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientPartitions {
    partitions: Vec<ClientPartition>,
}

impl ClientPartitions {
    /// Group rows by client (first-appearance order) and stable-sort each
    /// group chronologically.
    pub fn build(rows: &[Transaction]) -> Self {
        let mut slot_of: HashMap<&str, usize> = HashMap::new();
        let mut partitions: Vec<ClientPartition> = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let slot = *slot_of.entry(row.client_id.as_str()).or_insert_with(|| {
                partitions.push(ClientPartition {
                    client_id: row.client_id.clone(),
                    rows:      Vec::new(),
                });
                partitions.len() - 1
            });
            partitions[slot].rows.push(idx);
        }

        for partition in &mut partitions {
            // sort_by_key is stable: equal timestamps keep input order.
            partition.rows.sort_by_key(|&idx| rows[idx].date_time);
        }

        Self { partitions }
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientPartition> {
        self.partitions.iter()
    }

    /// Run `f` on every partition in parallel. Output order follows
    /// partition order regardless of scheduling.
    pub fn map_partitions<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&ClientPartition) -> T + Sync + Send,
    {
        self.partitions.par_iter().map(f).collect()
    }

    /// Run a per-partition flag computation in parallel and scatter the
    /// `(row, flag)` pairs into a column of `n_rows` entries. Rows no
    /// partition reports stay `false`.
    pub fn flag_column<F>(&self, n_rows: usize, f: F) -> Vec<bool>
    where
        F: Fn(&ClientPartition) -> Vec<(RowIndex, bool)> + Sync + Send,
    {
        scatter(n_rows, self.map_partitions(f))
    }
}

/// Write per-partition `(row, flag)` results into a dense column.
pub fn scatter(n_rows: usize, parts: Vec<Vec<(RowIndex, bool)>>) -> Vec<bool> {
    let mut column = vec![false; n_rows];
    for (idx, flag) in parts.into_iter().flatten() {
        column[idx] = flag;
    }
    column
}

/// Window length for a `window_minutes` parameter, saturating instead of
/// panicking on values beyond the representable range.
pub fn span_minutes(minutes: i64) -> Duration {
    Duration::try_minutes(minutes).unwrap_or(Duration::MAX)
}

/// Two-pointer sliding window over non-decreasing timestamps.
///
/// For each position `i` yields the range of positions whose time lies in
/// `[times[i] - span, times[i]]`. Later positions that share `times[i]`
/// are inside the range. Both pointers only move forward, so a full pass
/// is linear in `times.len()`.
pub struct TimeWindows<'a> {
    times: &'a [NaiveDateTime],
    span:  Duration,
    pos:   usize,
    left:  usize,
    right: usize,
}

impl<'a> TimeWindows<'a> {
    pub fn new(times: &'a [NaiveDateTime], span: Duration) -> Self {
        debug_assert!(times.windows(2).all(|w| w[0] <= w[1]), "times must be sorted");
        Self { times, span, pos: 0, left: 0, right: 0 }
    }
}

impl Iterator for TimeWindows<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let now = *self.times.get(self.pos)?;

        while self.right < self.times.len() && self.times[self.right] <= now {
            self.right += 1;
        }
        // A start before the earliest representable time keeps every row.
        if let Some(start) = now.checked_sub_signed(self.span) {
            while self.times[self.left] < start {
                self.left += 1;
            }
        }

        self.pos += 1;
        Some(self.left..self.right)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.times.len() - self.pos;
        (rest, Some(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| t + Duration::minutes(minute))
            .expect("valid fixture time")
    }

    #[test]
    fn window_includes_exact_start_boundary() {
        let times = [at(0), at(60)];
        let ranges: Vec<_> = TimeWindows::new(&times, Duration::minutes(60)).collect();
        assert_eq!(ranges, vec![0..1, 0..2]);
    }

    #[test]
    fn window_excludes_one_minute_beyond() {
        let times = [at(0), at(61)];
        let ranges: Vec<_> = TimeWindows::new(&times, Duration::minutes(60)).collect();
        assert_eq!(ranges, vec![0..1, 1..2]);
    }

    #[test]
    fn equal_timestamps_share_the_same_window() {
        let times = [at(5), at(10), at(10), at(10)];
        let ranges: Vec<_> = TimeWindows::new(&times, Duration::minutes(3)).collect();
        assert_eq!(ranges, vec![0..1, 1..4, 1..4, 1..4]);
    }

    #[test]
    fn unbounded_span_covers_whole_history() {
        let times = [NaiveDateTime::MIN, at(0), at(10_000_000)];
        let ranges: Vec<_> = TimeWindows::new(&times, span_minutes(i64::MAX)).collect();
        assert_eq!(ranges, vec![0..1, 0..2, 0..3]);
    }

    #[test]
    fn empty_sequence_yields_nothing() {
        assert_eq!(TimeWindows::new(&[], Duration::minutes(5)).count(), 0);
    }

    #[test]
    fn scatter_leaves_unreported_rows_false() {
        let column = scatter(4, vec![vec![(0, true)], vec![(2, false), (3, true)]]);
        assert_eq!(column, vec![true, false, false, true]);
    }
}
