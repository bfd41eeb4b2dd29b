use crate::error::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LargeAmountParams {
    /// Amounts strictly above this are flagged.
    pub threshold: f64,
}

impl Default for LargeAmountParams {
    fn default() -> Self {
        Self { threshold: 100_000.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NightTimeParams {
    /// Inclusive hour bounds, 0..=23.
    pub start_hour: u32,
    pub end_hour:   u32,
}

impl Default for NightTimeParams {
    fn default() -> Self {
        Self { start_hour: 0, end_hour: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeolocationParams {
    pub distance_km: f64,
    pub max_hours:   f64,
}

impl Default for GeolocationParams {
    fn default() -> Self {
        Self { distance_km: 500.0, max_hours: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OperationRateParams {
    /// Flag when the window holds more than this many operations.
    pub n_threshold:    usize,
    pub window_minutes: i64,
}

impl Default for OperationRateParams {
    fn default() -> Self {
        Self { n_threshold: 7, window_minutes: 120 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmallSumParams {
    /// Inclusive band of amounts that count as "small".
    pub min_amount:      f64,
    pub max_amount:      f64,
    pub total_threshold: f64,
    pub window_minutes:  i64,
}

impl Default for SmallSumParams {
    fn default() -> Self {
        Self {
            min_amount:      0.0,
            max_amount:      10_000.0,
            total_threshold: 20_000.0,
            window_minutes:  60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringParams {
    /// Clients this old or older trigger the escalation rule.
    pub age_threshold: i32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self { age_threshold: 60 }
    }
}

/// Longest accepted trailing window: one hundred years.
pub const MAX_WINDOW_MINUTES: i64 = 100 * 366 * 24 * 60;

/// Upper bound of the small-sum band. Window totals are kept in cents.
pub const MAX_SMALL_AMOUNT: f64 = 1e12;

fn check_window(block: &str, minutes: i64) -> RiskResult<()> {
    if minutes <= 0 || minutes > MAX_WINDOW_MINUTES {
        return Err(RiskError::config(format!(
            "{block}.window_minutes must be within 1..={MAX_WINDOW_MINUTES}, got {minutes}"
        )));
    }
    Ok(())
}

/// Tunable parameters of every detector plus the escalation age.
/// Any block or field omitted from the JSON keeps its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureParams {
    pub large_amount:   LargeAmountParams,
    pub night_time:     NightTimeParams,
    pub geolocation:    GeolocationParams,
    pub operation_rate: OperationRateParams,
    pub small_sums:     SmallSumParams,
    pub scoring:        ScoringParams,
}

impl FeatureParams {
    /// Load from a JSON file and validate.
    pub fn load(path: &str) -> RiskResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RiskError::config(format!("Cannot read {path}: {e}")))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> RiskResult<Self> {
        let params: Self = serde_json::from_str(content)
            .map_err(|e| RiskError::config(format!("Malformed detector params: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> RiskResult<()> {
        let night = &self.night_time;
        if night.start_hour > 23 || night.end_hour > 23 {
            return Err(RiskError::config(format!(
                "night_time hours must be within 0..=23, got [{}, {}]",
                night.start_hour, night.end_hour
            )));
        }
        if night.start_hour > night.end_hour {
            return Err(RiskError::config(format!(
                "night_time start_hour {} is after end_hour {}",
                night.start_hour, night.end_hour
            )));
        }
        if !(self.geolocation.distance_km >= 0.0 && self.geolocation.max_hours >= 0.0) {
            return Err(RiskError::config("geolocation limits must be non-negative"));
        }
        check_window("operation_rate", self.operation_rate.window_minutes)?;
        let small = &self.small_sums;
        check_window("small_sums", small.window_minutes)?;
        if !(small.min_amount <= small.max_amount) {
            return Err(RiskError::config(format!(
                "small_sums band is empty: [{}, {}]",
                small.min_amount, small.max_amount
            )));
        }
        if !(small.max_amount <= MAX_SMALL_AMOUNT) {
            return Err(RiskError::config(format!(
                "small_sums.max_amount {} exceeds {MAX_SMALL_AMOUNT}",
                small.max_amount
            )));
        }
        if !small.total_threshold.is_finite() {
            return Err(RiskError::config("small_sums.total_threshold must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let params = FeatureParams::from_json_str("{}").unwrap();
        assert_eq!(params, FeatureParams::default());
        assert_eq!(params.operation_rate.n_threshold, 7);
        assert_eq!(params.small_sums.window_minutes, 60);
        assert_eq!(params.scoring.age_threshold, 60);
    }

    #[test]
    fn partial_block_keeps_other_defaults() {
        let params =
            FeatureParams::from_json_str(r#"{"operation_rate": {"n_threshold": 3}}"#).unwrap();
        assert_eq!(params.operation_rate.n_threshold, 3);
        assert_eq!(params.operation_rate.window_minutes, 120);
        assert_eq!(params.large_amount.threshold, 100_000.0);
    }

    #[test]
    fn inverted_night_window_is_rejected() {
        let err = FeatureParams::from_json_str(
            r#"{"night_time": {"start_hour": 22, "end_hour": 5}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RiskError::Config { .. }), "got {err}");
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = FeatureParams::from_json_str(r#"{"small_sums": {"window_minutes": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, RiskError::Config { .. }), "got {err}");
    }

    #[test]
    fn oversized_window_is_rejected() {
        let err = FeatureParams::from_json_str(
            r#"{"operation_rate": {"window_minutes": 1000000000000}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RiskError::Config { .. }), "got {err}");

        let err = FeatureParams::from_json_str(
            r#"{"small_sums": {"window_minutes": 1000000000000}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RiskError::Config { .. }), "got {err}");
    }

    #[test]
    fn century_window_is_accepted() {
        let json = format!(r#"{{"operation_rate": {{"window_minutes": {MAX_WINDOW_MINUTES}}}}}"#);
        assert!(FeatureParams::from_json_str(&json).is_ok());
    }

    #[test]
    fn unbounded_small_sum_band_is_rejected() {
        let err = FeatureParams::from_json_str(r#"{"small_sums": {"max_amount": 1e300}}"#)
            .unwrap_err();
        assert!(matches!(err, RiskError::Config { .. }), "got {err}");
    }
}
