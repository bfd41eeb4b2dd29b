//! End-to-end runs: raw JSON rows through features and scoring.

use chrono::NaiveDate;
use risk_core::{
    config::FeatureParams,
    engine::{FeaturePipeline, RiskEngine},
    error::RiskError,
    ingest::RawRow,
    transaction::{columns, RiskStatus},
    weights::RiskWeightConfig,
};
use serde_json::{json, Value};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 19).expect("fixture date")
}

fn engine() -> RiskEngine {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/risk_weights.json");
    let weights = RiskWeightConfig::load(path).expect("shipped weights");
    RiskEngine::new(weights, &FeatureParams::default(), today()).expect("engine")
}

fn raw(value: Value) -> RawRow {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture row must be an object, got {other}"),
    }
}

fn rows() -> Vec<RawRow> {
    vec![
        // Young client, large night transfer.
        raw(json!({
            "transaction_id": "t1", "client_id": "c-young", "date_time": "2025-10-01 02:00:00",
            "amount": 150000, "t_type": "Transfers to individuals", "birth_date": "1990-03-15",
            "sender_latitude": 55.7558, "sender_longitude": 37.6173
        })),
        // Elderly client, same transfer.
        raw(json!({
            "transaction_id": "t2", "client_id": "c-old", "date_time": "2025-10-01 02:00:00",
            "amount": "150000.00", "t_type": "Transfers to individuals", "birth_date": "1953-07-01",
            "sender_latitude": "55.7558", "sender_longitude": "37.6173"
        })),
        // Elderly client, nothing unusual.
        raw(json!({
            "transaction_id": "t3", "client_id": "c-old", "date_time": "2025-10-05 14:00:00",
            "amount": 500, "t_type": "Supermarkets", "birth_date": "1953-07-01",
            "sender_latitude": 55.7558, "sender_longitude": 37.6173
        })),
        // Young client, null category, missing coordinates.
        raw(json!({
            "transaction_id": "t4", "client_id": "c-young", "date_time": "2025-10-06T15:30:00",
            "amount": 42.5, "t_type": null, "birth_date": "1990-03-15",
            "sender_latitude": null, "sender_longitude": null
        })),
    ]
}

#[test]
fn batch_is_scored_row_for_row_in_input_order() {
    let report = engine().run(&rows()).expect("batch run");
    let ids: Vec<&str> = report
        .scored
        .iter()
        .map(|s| s.transaction.transaction_id.as_str())
        .collect();
    assert_eq!(ids, ["t1", "t2", "t3", "t4"]);

    let young = &report.scored[0];
    assert_eq!(young.client_age, 35);
    assert_eq!(young.risk_score, 60);
    assert_eq!(young.risk_status, RiskStatus::Review);
    assert_eq!(young.reason_flags, "Large amount, Night-time operation");

    let elderly = &report.scored[1];
    assert_eq!(elderly.client_age, 72);
    assert_eq!(elderly.risk_score, 120);
    assert_eq!(elderly.risk_status, RiskStatus::Suspicious);
    assert_eq!(
        elderly.reason_flags,
        "Large amount, Night-time operation, Elderly client"
    );

    let quiet = &report.scored[2];
    assert_eq!(quiet.risk_score, 10);
    assert_eq!(quiet.risk_status, RiskStatus::Normal);
    assert!(!quiet.is_suspicious);
    assert_eq!(quiet.reason_flags, "Elderly client");

    let unknown = &report.scored[3];
    assert_eq!(unknown.risk_score, 10);
    assert_eq!(unknown.reason_flags, "Unknown transfer category");
}

#[test]
fn missing_coordinates_are_reported_not_fatal() {
    let report = engine().run(&rows()).expect("batch run");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].transaction_id, "t4");
    assert_eq!(report.warnings[0].column, columns::GEOLOCATION_CHANGE);
}

#[test]
fn serialized_output_has_no_intermediate_flags() {
    let report = engine().run(&rows()).expect("batch run");
    let value = serde_json::to_value(&report.scored[0]).expect("serializable record");
    let object = value.as_object().expect("record serializes to an object");

    for column in columns::FLAGS {
        assert!(!object.contains_key(column), "flag column {column} leaked");
    }
    for column in [
        "transaction_id",
        "client_id",
        "date_time",
        "amount",
        "client_age",
        "risk_score",
        "reason_flags",
        "risk_status",
        "is_suspicious",
    ] {
        assert!(object.contains_key(column), "missing output column {column}");
    }
}

#[test]
fn summaries_count_statuses_and_reasons() {
    let report = engine().run(&rows()).expect("batch run");
    let counts = report.status_counts();
    assert_eq!(counts["Normal"], 2);
    assert_eq!(counts["Review"], 1);
    assert_eq!(counts["Suspicious"], 1);

    let reasons = report.reason_frequencies();
    assert_eq!(reasons[0], ("Elderly client".to_string(), 2));
    assert!(reasons.contains(&("Large amount".to_string(), 2)));
}

#[test]
fn missing_required_column_fails_the_whole_batch() {
    let mut rows = rows();
    rows[2].remove("amount");
    match engine().run(&rows) {
        Err(RiskError::MissingColumn { column }) => assert_eq!(column, "amount"),
        other => panic!("expected MissingColumn, got {:?}", other.map(|r| r.scored.len())),
    }
}

#[test]
fn unparseable_timestamp_fails_the_whole_batch() {
    let mut rows = rows();
    rows[1].insert("date_time".into(), json!("yesterday"));
    match engine().run(&rows) {
        Err(RiskError::InvalidValue { column, row, .. }) => {
            assert_eq!(column, "date_time");
            assert_eq!(row, 1);
        }
        other => panic!("expected InvalidValue, got {:?}", other.map(|r| r.scored.len())),
    }
}

#[test]
fn empty_batch_produces_empty_report() {
    let report = engine().run(&[]).expect("empty run");
    assert!(report.scored.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn invalid_params_are_rejected_before_running() {
    let weights = RiskWeightConfig::from_json_str("{}").expect("empty weights");
    let params = FeatureParams::from_json_str(r#"{ "night_time": { "start_hour": 3 } }"#)
        .expect("valid params");
    assert!(RiskEngine::new(weights.clone(), &params, today()).is_ok());

    let mut broken = FeatureParams::default();
    broken.operation_rate.window_minutes = 0;
    assert!(matches!(
        RiskEngine::new(weights, &broken, today()),
        Err(RiskError::Config { .. })
    ));
}

#[test]
fn pipeline_registers_detectors_in_documented_order() {
    let pipeline = FeaturePipeline::build(&FeatureParams::default(), today());
    assert_eq!(pipeline.columns(), columns::FLAGS.to_vec());
}

#[test]
fn shipped_params_file_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/feature_params.json");
    let params = FeatureParams::load(path).expect("shipped params");
    assert_eq!(params, FeatureParams::default());
}

#[test]
fn oversized_window_is_a_config_error_not_a_panic() {
    let json = r#"{ "operation_rate": { "window_minutes": 1000000000000 } }"#;
    assert!(matches!(
        FeatureParams::from_json_str(json),
        Err(RiskError::Config { .. })
    ));

    let mut params = FeatureParams::default();
    params.small_sums.window_minutes = 1_000_000_000_000;
    let weights = RiskWeightConfig::from_json_str("{}").expect("empty weights");
    assert!(matches!(
        RiskEngine::new(weights, &params, today()),
        Err(RiskError::Config { .. })
    ));
}
