use super::{Detection, FeatureDetector};
use crate::{
    batch::TransactionBatch,
    config::OperationRateParams,
    transaction::columns,
    window::{span_minutes, TimeWindows},
};

/// Velocity: more than `n_threshold` operations by one client within the
/// trailing window (the current operation included).
pub struct OperationRateDetector {
    params: OperationRateParams,
}

impl OperationRateDetector {
    pub fn new(params: OperationRateParams) -> Self {
        Self { params }
    }
}

impl FeatureDetector for OperationRateDetector {
    fn column(&self) -> &'static str {
        columns::OPER_RATE
    }

    fn detect(&self, batch: &TransactionBatch) -> Detection {
        let span = span_minutes(self.params.window_minutes);
        let flags = batch.partitions().flag_column(batch.len(), |partition| {
            let times = batch.times(partition);
            TimeWindows::new(&times, span)
                .zip(&partition.rows)
                .map(|(window, &idx)| (idx, window.len() > self.params.n_threshold))
                .collect()
        });
        Detection::flags(flags)
    }
}
