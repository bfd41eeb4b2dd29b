use super::{Detection, FeatureDetector};
use crate::{batch::TransactionBatch, config::NightTimeParams, transaction::columns};
use chrono::Timelike;

pub struct NightTimeDetector {
    params: NightTimeParams,
}

impl NightTimeDetector {
    pub fn new(params: NightTimeParams) -> Self {
        Self { params }
    }
}

impl FeatureDetector for NightTimeDetector {
    fn column(&self) -> &'static str {
        columns::NIGHT_TIME
    }

    fn detect(&self, batch: &TransactionBatch) -> Detection {
        let hours = self.params.start_hour..=self.params.end_hour;
        Detection::flags(
            batch
                .rows()
                .iter()
                .map(|row| hours.contains(&row.date_time.hour()))
                .collect(),
        )
    }
}
