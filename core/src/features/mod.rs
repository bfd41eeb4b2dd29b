//! Feature detectors.
//!
//! RULE: every detector adds exactly one signal column and reads only the
//! raw transaction and the owning client's own history. Detectors never
//! read each other's output.
//!
//! Registration order (fixed, see FeaturePipeline::build):
//!   1. Large amount       risk_big_sum
//!   2. Night time         risk_night_time
//!   3. Geolocation jump   risk_geolocation_change
//!   4. Operation rate     oper_rate
//!   5. Small sums         small_sum
//!   6. Unknown type       none_type
//! Client age is an integer column and is computed alongside.

mod age;
mod geolocation;
mod large_amount;
mod night_time;
mod operation_rate;
mod small_sums;
mod unknown_type;

pub use age::{age_on, ClientAgeDetector};
pub use geolocation::GeolocationDetector;
pub use large_amount::LargeAmountDetector;
pub use night_time::NightTimeDetector;
pub use operation_rate::OperationRateDetector;
pub use small_sums::SmallSumDetector;
pub use unknown_type::{UnknownTypeDetector, UNKNOWN_TYPES};

use crate::{
    batch::TransactionBatch,
    types::{ClientId, TransactionId},
};
use serde::Serialize;

/// The contract every flag detector fulfils.
pub trait FeatureDetector: Send + Sync {
    /// Name of the column this detector produces.
    fn column(&self) -> &'static str;

    /// Compute the column for every row of the batch, in row order.
    fn detect(&self, batch: &TransactionBatch) -> Detection;
}

/// A detector's output column plus any recoverable data problems.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub flags:    Vec<bool>,
    pub warnings: Vec<DataQualityWarning>,
}

impl Detection {
    pub fn flags(flags: Vec<bool>) -> Self {
        Self { flags, warnings: Vec::new() }
    }

    pub fn raised(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// A row whose data could not be fully evaluated. The affected flag
/// defaults to 0 and the batch continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityWarning {
    pub transaction_id: TransactionId,
    pub client_id:      ClientId,
    pub column:         &'static str,
    pub message:        String,
}
