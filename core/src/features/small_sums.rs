use super::{Detection, FeatureDetector};
use crate::{
    batch::TransactionBatch,
    config::SmallSumParams,
    transaction::columns,
    types::RowIndex,
    window::{span_minutes, TimeWindows},
};
use chrono::NaiveDateTime;

/// Structuring: the client's small transactions inside the trailing window
/// add up to more than `total_threshold`. Only small transactions are ever
/// flagged.
pub struct SmallSumDetector {
    params: SmallSumParams,
}

impl SmallSumDetector {
    pub fn new(params: SmallSumParams) -> Self {
        Self { params }
    }

    fn is_small(&self, amount: f64) -> bool {
        amount >= self.params.min_amount && amount <= self.params.max_amount
    }
}

/// Amounts are summed in integer cents so window totals are exact. The
/// band is capped at validation; prefix sums saturate beyond that.
fn to_minor_units(amount: f64) -> i128 {
    (amount * 100.0).round() as i128
}

impl FeatureDetector for SmallSumDetector {
    fn column(&self) -> &'static str {
        columns::SMALL_SUM
    }

    fn detect(&self, batch: &TransactionBatch) -> Detection {
        let rows = batch.rows();
        let span = span_minutes(self.params.window_minutes);
        let threshold = self.params.total_threshold;

        let flags = batch.partitions().flag_column(rows.len(), |partition| {
            let small: Vec<RowIndex> = partition
                .rows
                .iter()
                .copied()
                .filter(|&idx| self.is_small(rows[idx].amount))
                .collect();
            let times: Vec<NaiveDateTime> = small.iter().map(|&idx| rows[idx].date_time).collect();

            // prefix[k] = total of the first k small amounts
            let mut prefix = Vec::with_capacity(small.len() + 1);
            prefix.push(0i128);
            for &idx in &small {
                let last = prefix[prefix.len() - 1];
                prefix.push(last.saturating_add(to_minor_units(rows[idx].amount)));
            }

            TimeWindows::new(&times, span)
                .zip(&small)
                .map(|(window, &idx)| {
                    let cents = prefix[window.end] - prefix[window.start];
                    (idx, cents as f64 / 100.0 > threshold)
                })
                .collect()
        });
        Detection::flags(flags)
    }
}
