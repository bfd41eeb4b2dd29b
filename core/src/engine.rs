//! The batch engine: raw rows → feature rows → scored transactions.
//!
//! DETECTOR ORDER (fixed, documented, never reordered):
//!   1. Large amount
//!   2. Night time
//!   3. Geolocation jump
//!   4. Operation rate
//!   5. Small sums
//!   6. Unknown type
//!
//! RULES:
//!   - Detectors read only the immutable TransactionBatch.
//!   - Each detector contributes exactly one column.
//!   - Scoring sees only the assembled FeatureRows and the weight config.
//!   - Identical input always yields identical output.

use crate::{
    batch::TransactionBatch,
    config::FeatureParams,
    error::RiskResult,
    features::{
        ClientAgeDetector, DataQualityWarning, FeatureDetector, GeolocationDetector,
        LargeAmountDetector, NightTimeDetector, OperationRateDetector, SmallSumDetector,
        UnknownTypeDetector,
    },
    ingest::{self, RawRow},
    scoring::ScoringEngine,
    transaction::{FeatureFlags, FeatureRow, RiskStatus, ScoredTransaction, Transaction},
    weights::RiskWeightConfig,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Feature-augmented batch plus the recoverable data problems met on the way.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub rows:     Vec<FeatureRow>,
    pub warnings: Vec<DataQualityWarning>,
}

pub struct FeaturePipeline {
    age:       ClientAgeDetector,
    detectors: Vec<Box<dyn FeatureDetector>>,
}

impl FeaturePipeline {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            age:       ClientAgeDetector::new(today),
            detectors: Vec::new(),
        }
    }

    /// Build a pipeline with every detector registered in the documented
    /// order. Call this instead of new() + manual register() calls.
    pub fn build(params: &FeatureParams, today: NaiveDate) -> Self {
        let mut pipeline = Self::new(today);
        pipeline.register(Box::new(LargeAmountDetector::new(params.large_amount.clone())));
        pipeline.register(Box::new(NightTimeDetector::new(params.night_time.clone())));
        pipeline.register(Box::new(GeolocationDetector::new(params.geolocation.clone())));
        pipeline.register(Box::new(OperationRateDetector::new(params.operation_rate.clone())));
        pipeline.register(Box::new(SmallSumDetector::new(params.small_sums.clone())));
        pipeline.register(Box::new(UnknownTypeDetector::new()));
        pipeline
    }

    pub fn register(&mut self, detector: Box<dyn FeatureDetector>) {
        self.detectors.push(detector);
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.column()).collect()
    }

    pub fn extract(&self, transactions: Vec<Transaction>) -> RiskResult<FeatureTable> {
        let batch = TransactionBatch::new(transactions);
        log::info!(
            "Extracting features for {} transactions across {} clients",
            batch.len(),
            batch.partitions().len()
        );

        let ages = self.age.ages(&batch);
        let mut flags = vec![FeatureFlags::default(); batch.len()];
        let mut warnings = Vec::new();

        for detector in &self.detectors {
            let detection = detector.detect(&batch);
            log::debug!("{}: {} rows flagged", detector.column(), detection.raised());
            for (row_flags, value) in flags.iter_mut().zip(&detection.flags) {
                row_flags.set(detector.column(), *value)?;
            }
            warnings.extend(detection.warnings);
        }

        let rows = batch
            .into_rows()
            .into_iter()
            .zip(ages)
            .zip(flags)
            .map(|((transaction, client_age), flags)| FeatureRow {
                transaction,
                client_age,
                flags,
            })
            .collect();

        Ok(FeatureTable { rows, warnings })
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub scored:   Vec<ScoredTransaction>,
    pub warnings: Vec<DataQualityWarning>,
}

impl BatchReport {
    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for status in [RiskStatus::Normal, RiskStatus::Review, RiskStatus::Suspicious] {
            counts.insert(status.as_str(), 0);
        }
        for row in &self.scored {
            *counts.entry(row.risk_status.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// How often each reason label appears, most frequent first.
    pub fn reason_frequencies(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.scored {
            for reason in row.reason_flags.split(", ").filter(|r| !r.is_empty()) {
                *counts.entry(reason).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> =
            counts.into_iter().map(|(r, n)| (r.to_string(), n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

/// Features and scoring wired together, configured once per process.
pub struct RiskEngine {
    features: FeaturePipeline,
    scoring:  ScoringEngine,
}

impl RiskEngine {
    pub fn new(
        weights: RiskWeightConfig,
        params: &FeatureParams,
        today: NaiveDate,
    ) -> RiskResult<Self> {
        params.validate()?;
        Ok(Self {
            features: FeaturePipeline::build(params, today),
            scoring:  ScoringEngine::new(weights, params.scoring.clone())?,
        })
    }

    /// Validate raw rows, then score them.
    pub fn run(&self, rows: &[RawRow]) -> RiskResult<BatchReport> {
        let transactions = ingest::parse_rows(rows)?;
        self.run_transactions(transactions)
    }

    pub fn run_transactions(&self, transactions: Vec<Transaction>) -> RiskResult<BatchReport> {
        let table = self.features.extract(transactions)?;
        let scored = self.scoring.score(&table.rows);

        let report = BatchReport {
            scored,
            warnings: table.warnings,
        };
        let counts = report.status_counts();
        log::info!(
            "Scored {} transactions: {:?}, {} data quality warnings",
            report.scored.len(),
            counts,
            report.warnings.len()
        );
        Ok(report)
    }
}
