//! Risk weight configuration.
//!
//! File format (group labels are ignored, inner key is the reason label):
//!
//! ```json
//! {
//!   "priority":  { "Large amount": { "column": "risk_big_sum", "score": 40 } },
//!   "secondary": { "Elderly client": { "column": "client_age", "score": [2, 10] } }
//! }
//! ```
//!
//! Entry order, flattened across groups, is the order reasons are reported in.

use crate::{
    error::{RiskError, RiskResult},
    transaction::columns,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum WeightRule {
    /// Adds `weight` to the score when `column` is set on the row.
    Weighted {
        column: String,
        weight: f64,
        reason: String,
    },
    /// Escalation for elderly clients: multiply when any other rule fired,
    /// otherwise add the flat bonus.
    AgeEscalation {
        multiplier: f64,
        bonus:      f64,
        reason:     String,
    },
}

impl WeightRule {
    pub fn column(&self) -> &str {
        match self {
            Self::Weighted { column, .. } => column,
            Self::AgeEscalation { .. } => columns::CLIENT_AGE,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Weighted { reason, .. } | Self::AgeEscalation { reason, .. } => reason,
        }
    }
}

/// Ordered, read-only weight table. Built once per process.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskWeightConfig {
    rules: Vec<WeightRule>,
}

impl RiskWeightConfig {
    /// Build from rules already in reporting order.
    pub fn new(rules: Vec<WeightRule>) -> RiskResult<Self> {
        let escalations = rules
            .iter()
            .filter(|r| matches!(r, WeightRule::AgeEscalation { .. }))
            .count();
        if escalations > 1 {
            return Err(RiskError::config(format!(
                "expected at most one '{}' entry, found {escalations}",
                columns::CLIENT_AGE
            )));
        }
        Ok(Self { rules })
    }

    pub fn load(path: &str) -> RiskResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RiskError::config(format!("Cannot read {path}: {e}")))?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded {} risk weight rules from {path}", config.rules.len());
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> RiskResult<Self> {
        let root: Map<String, Value> = serde_json::from_str(content)
            .map_err(|e| RiskError::config(format!("Malformed weight config: {e}")))?;

        let mut rules = Vec::new();
        for (group, entries) in &root {
            let entries = entries.as_object().ok_or_else(|| {
                RiskError::config(format!("group '{group}' must be an object"))
            })?;
            for (feature, info) in entries {
                rules.push(parse_rule(feature, info)?);
            }
        }
        Self::new(rules)
    }

    pub fn rules(&self) -> &[WeightRule] {
        &self.rules
    }

    pub fn escalation(&self) -> Option<(f64, f64)> {
        self.rules.iter().find_map(|r| match r {
            WeightRule::AgeEscalation { multiplier, bonus, .. } => Some((*multiplier, *bonus)),
            WeightRule::Weighted { .. } => None,
        })
    }

    /// Every column the rules read, in rule order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(WeightRule::column)
    }
}

fn parse_rule(feature: &str, info: &Value) -> RiskResult<WeightRule> {
    let column = info
        .get("column")
        .and_then(Value::as_str)
        .ok_or_else(|| missing_key(feature, "column"))?;
    let score = info.get("score").ok_or_else(|| missing_key(feature, "score"))?;

    let rule = if column == columns::CLIENT_AGE {
        let pair = score.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
            RiskError::config(format!(
                "'{feature}': {} score must be a [multiplier, bonus] pair",
                columns::CLIENT_AGE
            ))
        })?;
        WeightRule::AgeEscalation {
            multiplier: non_negative(feature, &pair[0])?,
            bonus:      non_negative(feature, &pair[1])?,
            reason:     feature.to_string(),
        }
    } else {
        WeightRule::Weighted {
            column: column.to_string(),
            weight: non_negative(feature, score)?,
            reason: feature.to_string(),
        }
    };
    Ok(rule)
}

fn non_negative(feature: &str, value: &Value) -> RiskResult<f64> {
    match value.as_f64() {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(RiskError::config(format!(
            "'{feature}': score {value} is not a non-negative number"
        ))),
    }
}

fn missing_key(feature: &str, key: &str) -> RiskError {
    RiskError::config(format!("'{feature}' is missing required key '{key}'"))
}
