//! risk-runner: headless batch runner for transaction risk scoring.
//!
//! Usage:
//!   risk-runner --weights data/risk_weights.json --input transactions.json --db mart.db
//!   risk-runner --weights data/risk_weights.json --db mart.db
//!   risk-runner --generate 500 --seed 42 --db mart.db --report summary.json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use risk_core::{
    config::FeatureParams,
    engine::{BatchReport, RiskEngine},
    ingest,
    store::RiskStore,
    synth::{self, SynthOptions},
    weights::RiskWeightConfig,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;

#[derive(Serialize)]
struct RunSummary<'a> {
    run_id:        &'a str,
    transactions:  usize,
    warnings:      usize,
    status_counts: BTreeMap<&'static str, usize>,
    top_reasons:   Vec<(String, usize)>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let weights_path = str_arg(&args, "--weights").unwrap_or("./data/risk_weights.json");
    let params_path = str_arg(&args, "--params");
    let input = str_arg(&args, "--input");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let generate = parse_arg(&args, "--generate", 0usize);
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 30i64);
    let report_path = str_arg(&args, "--report");
    let today = match str_arg(&args, "--today") {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("--today expects YYYY-MM-DD, got {s}"))?,
        None => chrono::Local::now().date_naive(),
    };

    println!("risk-runner: transaction risk scoring");
    println!("  weights:   {weights_path}");
    println!("  params:    {}", params_path.unwrap_or("(defaults)"));
    println!("  input:     {}", input.unwrap_or("(database feed)"));
    println!("  db:        {db}");
    println!("  today:     {today}");
    println!();

    // Configuration is loaded once, before any data is touched.
    let weights = RiskWeightConfig::load(weights_path)?;
    let params = match params_path {
        Some(p) => FeatureParams::load(p)?,
        None => FeatureParams::default(),
    };
    let engine = RiskEngine::new(weights, &params, today)?;

    let store = RiskStore::open(db)?;
    store.migrate()?;

    if generate > 0 {
        let start = today - chrono::Duration::days(days);
        let rows = synth::generate(&SynthOptions {
            seed,
            clients: generate,
            start,
            days,
        });
        store.replace_transactions(&rows)?;
    }

    let raw_rows = match input {
        Some(path) => ingest::read_json_rows(path)?,
        None => store.fetch_transactions()?,
    };

    let report = engine.run(&raw_rows)?;

    let run_id = format!("run-{}", uuid::Uuid::new_v4());
    store.insert_run(
        &run_id,
        env!("CARGO_PKG_VERSION"),
        &chrono::Local::now().to_rfc3339(),
    )?;
    store.load_scored(&run_id, &report.scored)?;

    print_summary(&store, &run_id, &report)?;

    if let Some(path) = report_path {
        let summary = RunSummary {
            run_id:        &run_id,
            transactions:  report.scored.len(),
            warnings:      report.warnings.len(),
            status_counts: report.status_counts(),
            top_reasons:   report.reason_frequencies(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Cannot write report to {path}"))?;
        log::info!("Run summary written to {path}");
    }
    Ok(())
}

fn print_summary(store: &RiskStore, run_id: &str, report: &BatchReport) -> Result<()> {
    let stored = store.scored_count(run_id)?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {run_id}");
    println!("  transactions:   {}", report.scored.len());
    println!("  stored:         {stored}");
    println!("  warnings:       {}", report.warnings.len());
    for (status, count) in report.status_counts() {
        println!("  {status:<15} {count}");
    }

    println!();
    println!("=== TOP REASONS ===");
    let reasons = report.reason_frequencies();
    if reasons.is_empty() {
        println!("  (no rule triggered)");
    } else {
        for (reason, count) in reasons.iter().take(10) {
            println!("  {count:>7}  {reason}");
        }
    }

    let suspicious: Vec<_> = report
        .scored
        .iter()
        .filter(|s| s.is_suspicious)
        .take(5)
        .collect();
    if !suspicious.is_empty() {
        println!();
        println!("=== SAMPLE FLAGGED TRANSACTIONS ===");
        for s in suspicious {
            println!(
                "  {} | client {} | {:>4} {:<10} | {}",
                s.transaction.transaction_id,
                s.transaction.client_id,
                s.risk_score,
                s.risk_status,
                s.reason_flags
            );
        }
    }
    Ok(())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
