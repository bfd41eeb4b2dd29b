use risk_core::{
    error::RiskError,
    weights::{RiskWeightConfig, WeightRule},
};

fn config_error(json: &str) -> String {
    match RiskWeightConfig::from_json_str(json) {
        Err(RiskError::Config { message }) => message,
        Err(other) => panic!("expected a config error, got {other}"),
        Ok(config) => panic!("expected a config error, got {config:?}"),
    }
}

#[test]
fn entries_keep_file_order_across_groups() {
    let config = RiskWeightConfig::from_json_str(
        r#"{
            "secondary": { "Unknown category": { "column": "none_type", "score": 10 } },
            "priority":  {
                "Night": { "column": "risk_night_time", "score": 20 },
                "Large": { "column": "risk_big_sum",    "score": 40 }
            }
        }"#,
    )
    .expect("valid weights");
    let reasons: Vec<&str> = config.rules().iter().map(WeightRule::reason).collect();
    assert_eq!(reasons, ["Unknown category", "Night", "Large"]);
    let columns: Vec<&str> = config.columns().collect();
    assert_eq!(columns, ["none_type", "risk_night_time", "risk_big_sum"]);
}

#[test]
fn age_entry_becomes_escalation_rule() {
    let config = RiskWeightConfig::from_json_str(
        r#"{ "g": { "Elderly client": { "column": "client_age", "score": [2, 10] } } }"#,
    )
    .expect("valid weights");
    assert_eq!(config.escalation(), Some((2.0, 10.0)));
    assert_eq!(
        config.rules()[0],
        WeightRule::AgeEscalation {
            multiplier: 2.0,
            bonus:      10.0,
            reason:     "Elderly client".into(),
        }
    );
}

#[test]
fn shipped_weights_file_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/risk_weights.json");
    let config = RiskWeightConfig::load(path).expect("shipped weights");
    assert_eq!(config.rules().len(), 7);
    assert_eq!(config.escalation(), Some((2.0, 10.0)));
}

#[test]
fn missing_column_key_is_rejected() {
    let message = config_error(r#"{ "g": { "Large": { "score": 40 } } }"#);
    assert!(message.contains("column"), "{message}");
}

#[test]
fn missing_score_key_is_rejected() {
    let message = config_error(r#"{ "g": { "Large": { "column": "risk_big_sum" } } }"#);
    assert!(message.contains("score"), "{message}");
}

#[test]
fn scalar_age_score_is_rejected() {
    config_error(r#"{ "g": { "Elderly": { "column": "client_age", "score": 10 } } }"#);
}

#[test]
fn age_score_needs_exactly_two_values() {
    config_error(r#"{ "g": { "Elderly": { "column": "client_age", "score": [2, 10, 1] } } }"#);
}

#[test]
fn array_score_on_flag_column_is_rejected() {
    config_error(r#"{ "g": { "Large": { "column": "risk_big_sum", "score": [40, 1] } } }"#);
}

#[test]
fn negative_weight_is_rejected() {
    config_error(r#"{ "g": { "Large": { "column": "risk_big_sum", "score": -5 } } }"#);
}

#[test]
fn second_age_entry_is_rejected() {
    config_error(
        r#"{
            "a": { "Elderly":     { "column": "client_age", "score": [2, 10] } },
            "b": { "Very old":    { "column": "client_age", "score": [3, 20] } }
        }"#,
    );
}

#[test]
fn malformed_json_is_a_config_error() {
    config_error(r#"{ "g": { "Large": "#);
}

#[test]
fn non_object_group_is_rejected() {
    config_error(r#"{ "g": [1, 2, 3] }"#);
}

#[test]
fn missing_file_is_a_config_error() {
    match RiskWeightConfig::load("/nonexistent/risk_weights.json") {
        Err(RiskError::Config { .. }) => {}
        other => panic!("expected a config error, got {other:?}"),
    }
}
