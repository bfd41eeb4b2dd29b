//! Scoring engine: reduces a row's flags and age to a score, a status and
//! a reason trail.
//!
//! Per row:
//!   1. Walk the weight rules in configured order. Each set flag adds its
//!      weight and its reason; the age rule adds its reason when the client
//!      is at or over the age threshold.
//!   2. Escalation (elderly clients only): if any weighted rule fired the
//!      total is multiplied, otherwise the flat bonus is added. Never both.
//!   3. Score = integer part of the total; status from the score.

use crate::{
    config::ScoringParams,
    error::{RiskError, RiskResult},
    transaction::{columns, FeatureFlags, FeatureRow, RiskStatus, ScoredTransaction},
    weights::{RiskWeightConfig, WeightRule},
};

pub struct ScoringEngine {
    config: RiskWeightConfig,
    params: ScoringParams,
}

impl ScoringEngine {
    /// Fails if the configuration references a column no detector produces.
    pub fn new(config: RiskWeightConfig, params: ScoringParams) -> RiskResult<Self> {
        let probe = FeatureFlags::default();
        if let Some(unknown) = config
            .columns()
            .find(|&c| c != columns::CLIENT_AGE && probe.get(c).is_none())
        {
            return Err(RiskError::missing_column(unknown));
        }
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &RiskWeightConfig {
        &self.config
    }

    pub fn score(&self, rows: &[FeatureRow]) -> Vec<ScoredTransaction> {
        let scored: Vec<ScoredTransaction> = rows.iter().map(|row| self.score_row(row)).collect();
        log::debug!("Scored {} transactions", scored.len());
        scored
    }

    pub fn score_row(&self, row: &FeatureRow) -> ScoredTransaction {
        let elderly = row.client_age >= self.params.age_threshold;
        let mut total = 0.0;
        let mut any_flag = false;
        let mut reasons: Vec<&str> = Vec::new();

        for rule in self.config.rules() {
            match rule {
                WeightRule::Weighted { column, weight, reason } => {
                    if row.flags.get(column).unwrap_or(false) {
                        total += weight;
                        any_flag = true;
                        reasons.push(reason);
                    }
                }
                WeightRule::AgeEscalation { reason, .. } => {
                    if elderly {
                        reasons.push(reason);
                    }
                }
            }
        }

        if elderly {
            if let Some((multiplier, bonus)) = self.config.escalation() {
                if any_flag {
                    total *= multiplier;
                } else {
                    total += bonus;
                }
            }
        }

        let risk_score = total.max(0.0).floor() as u32;
        let risk_status = RiskStatus::from_score(risk_score);

        ScoredTransaction {
            transaction: row.transaction.clone(),
            client_age: row.client_age,
            risk_score,
            reason_flags: reasons.join(", "),
            risk_status,
            is_suspicious: risk_status != RiskStatus::Normal,
        }
    }
}
