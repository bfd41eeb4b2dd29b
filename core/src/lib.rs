//! Transaction risk scoring.
//!
//! A batch of historical transactions is turned into per-transaction
//! behavioural signals (features), which a configurable weight table
//! reduces to a risk score, a status and an ordered reason trail.

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod geo;
pub mod ingest;
pub mod rng;
pub mod scoring;
pub mod store;
pub mod synth;
pub mod transaction;
pub mod types;
pub mod weights;
pub mod window;
