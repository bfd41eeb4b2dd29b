use super::{Detection, FeatureDetector};
use crate::{batch::TransactionBatch, config::LargeAmountParams, transaction::columns};

pub struct LargeAmountDetector {
    params: LargeAmountParams,
}

impl LargeAmountDetector {
    pub fn new(params: LargeAmountParams) -> Self {
        Self { params }
    }
}

impl FeatureDetector for LargeAmountDetector {
    fn column(&self) -> &'static str {
        columns::BIG_SUM
    }

    fn detect(&self, batch: &TransactionBatch) -> Detection {
        Detection::flags(
            batch
                .rows()
                .iter()
                .map(|row| row.amount > self.params.threshold)
                .collect(),
        )
    }
}
