//! Shared primitive types used across the scoring engine.

/// Stable identifier of a single financial event.
pub type TransactionId = String;

/// Identifier of the client that owns a transaction history.
pub type ClientId = String;

/// Identifier of one batch run, as recorded in the data mart.
pub type RunId = String;

/// Index of a row inside a [`crate::batch::TransactionBatch`].
pub type RowIndex = usize;
