use super::{Detection, FeatureDetector};
use crate::{batch::TransactionBatch, transaction::columns};

/// Transaction types treated as "category unknown".
pub const UNKNOWN_TYPES: [&str; 4] = ["Неизвестно", "Unknown", "Other", ""];

pub struct UnknownTypeDetector;

impl UnknownTypeDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_unknown(t_type: Option<&str>) -> bool {
        match t_type {
            None => true,
            Some(t) => UNKNOWN_TYPES.contains(&t),
        }
    }
}

impl Default for UnknownTypeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureDetector for UnknownTypeDetector {
    fn column(&self) -> &'static str {
        columns::NONE_TYPE
    }

    fn detect(&self, batch: &TransactionBatch) -> Detection {
        Detection::flags(
            batch
                .rows()
                .iter()
                .map(|row| Self::is_unknown(row.t_type.as_deref()))
                .collect(),
        )
    }
}
