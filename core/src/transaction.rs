//! Row types that flow through the pipeline.
//!
//! Each stage produces a new row type from the previous one:
//!   Transaction → FeatureRow → ScoredTransaction
//! Nothing is mutated once a stage has produced it.

use crate::{
    error::{RiskError, RiskResult},
    geo::GeoPoint,
    types::{ClientId, TransactionId},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the signal columns produced by the feature detectors.
pub mod columns {
    pub const CLIENT_AGE: &str = "client_age";
    pub const BIG_SUM: &str = "risk_big_sum";
    pub const NIGHT_TIME: &str = "risk_night_time";
    pub const GEOLOCATION_CHANGE: &str = "risk_geolocation_change";
    pub const OPER_RATE: &str = "oper_rate";
    pub const SMALL_SUM: &str = "small_sum";
    pub const NONE_TYPE: &str = "none_type";

    /// Every boolean flag column, in detector registration order.
    pub const FLAGS: [&str; 6] = [
        BIG_SUM,
        NIGHT_TIME,
        GEOLOCATION_CHANGE,
        OPER_RATE,
        SMALL_SUM,
        NONE_TYPE,
    ];
}

/// One financial event, validated and typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub transaction_id:   TransactionId,
    pub client_id:        ClientId,
    pub date_time:        NaiveDateTime,
    pub amount:           f64,
    pub t_type:           Option<String>,
    pub birth_date:       NaiveDate,
    pub sender_latitude:  Option<f64>,
    pub sender_longitude: Option<f64>,
}

impl Transaction {
    pub fn sender_location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.sender_latitude, self.sender_longitude)
    }
}

/// The boolean signals raised for one transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub risk_big_sum:            bool,
    pub risk_night_time:         bool,
    pub risk_geolocation_change: bool,
    pub oper_rate:               bool,
    pub small_sum:               bool,
    pub none_type:               bool,
}

impl FeatureFlags {
    /// Look up a flag by its column name. `None` for unknown columns.
    pub fn get(&self, column: &str) -> Option<bool> {
        match column {
            columns::BIG_SUM => Some(self.risk_big_sum),
            columns::NIGHT_TIME => Some(self.risk_night_time),
            columns::GEOLOCATION_CHANGE => Some(self.risk_geolocation_change),
            columns::OPER_RATE => Some(self.oper_rate),
            columns::SMALL_SUM => Some(self.small_sum),
            columns::NONE_TYPE => Some(self.none_type),
            _ => None,
        }
    }

    /// Set a flag by its column name while a row is being assembled.
    pub fn set(&mut self, column: &str, value: bool) -> RiskResult<()> {
        let slot = match column {
            columns::BIG_SUM => &mut self.risk_big_sum,
            columns::NIGHT_TIME => &mut self.risk_night_time,
            columns::GEOLOCATION_CHANGE => &mut self.risk_geolocation_change,
            columns::OPER_RATE => &mut self.oper_rate,
            columns::SMALL_SUM => &mut self.small_sum,
            columns::NONE_TYPE => &mut self.none_type,
            other => return Err(RiskError::missing_column(other)),
        };
        *slot = value;
        Ok(())
    }
}

/// A transaction augmented with every detector's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub transaction: Transaction,
    pub client_age:  i32,
    pub flags:       FeatureFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskStatus {
    Normal,
    Review,
    Suspicious,
}

impl RiskStatus {
    pub const SUSPICIOUS_FROM: u32 = 80;
    pub const REVIEW_ABOVE: u32 = 50;

    /// `>= 80` is Suspicious, `51..=79` is Review, anything else Normal.
    pub fn from_score(score: u32) -> Self {
        if score >= Self::SUSPICIOUS_FROM {
            Self::Suspicious
        } else if score > Self::REVIEW_ABOVE {
            Self::Review
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Review => "Review",
            Self::Suspicious => "Suspicious",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The externally persisted record. Intermediate flags are not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub transaction:   Transaction,
    pub client_age:    i32,
    pub risk_score:    u32,
    pub reason_flags:  String,
    pub risk_status:   RiskStatus,
    pub is_suspicious: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries_are_half_open() {
        assert_eq!(RiskStatus::from_score(0), RiskStatus::Normal);
        assert_eq!(RiskStatus::from_score(50), RiskStatus::Normal);
        assert_eq!(RiskStatus::from_score(51), RiskStatus::Review);
        assert_eq!(RiskStatus::from_score(79), RiskStatus::Review);
        assert_eq!(RiskStatus::from_score(80), RiskStatus::Suspicious);
        assert_eq!(RiskStatus::from_score(250), RiskStatus::Suspicious);
    }

    #[test]
    fn flags_round_trip_by_column_name() {
        let mut flags = FeatureFlags::default();
        for column in columns::FLAGS {
            assert_eq!(flags.get(column), Some(false));
            flags.set(column, true).unwrap();
            assert_eq!(flags.get(column), Some(true));
        }
        assert_eq!(flags.get(columns::CLIENT_AGE), None);
        assert!(flags.set("blacklist", true).is_err());
    }
}
