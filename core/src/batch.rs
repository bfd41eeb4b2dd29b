//! The immutable working set shared by all feature detectors.

use crate::{
    transaction::Transaction,
    window::{ClientPartition, ClientPartitions},
};
use chrono::NaiveDateTime;

pub struct TransactionBatch {
    rows:       Vec<Transaction>,
    partitions: ClientPartitions,
}

impl TransactionBatch {
    pub fn new(rows: Vec<Transaction>) -> Self {
        let partitions = ClientPartitions::build(&rows);
        Self { rows, partitions }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn partitions(&self) -> &ClientPartitions {
        &self.partitions
    }

    /// The partition's timestamps in chronological order.
    pub fn times(&self, partition: &ClientPartition) -> Vec<NaiveDateTime> {
        partition.rows.iter().map(|&idx| self.rows[idx].date_time).collect()
    }

    pub fn into_rows(self) -> Vec<Transaction> {
        self.rows
    }
}
