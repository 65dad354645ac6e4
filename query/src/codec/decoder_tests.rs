//! Tests for row decoding and encoding

use chrono::{TimeZone, Utc};
use serde_json::json;

use super::*;
use crate::codec::{Diagnostics, EventSource, RowEncoder, convert_to_type};
use crate::error::DecodeError;
use crate::schema::schema_from_json;

const EVENTS_SCHEMA: &str = r#"{
    "table": "events",
    "columns": [
        {"name": "session_id", "type": "str"},
        {"name": "client_time", "type": "datetime"},
        {"name": "event_name", "type": "str"},
        {"name": "event_params", "type": "json"},
        {"name": "level", "type": "int"},
        {"name": "app_major", "type": "str"},
        {"name": "app_minor", "type": "str"},
        {"name": "source", "type": "enum(GAME, GENERATED)"},
        {"name": "player", "type": "str"},
        {"name": "utc_offset", "type": "timezone"}
    ],
    "column_map": {
        "session_id": "session_id",
        "timestamp": "client_time",
        "event_name": "event_name",
        "event_data": {"params": "event_params", "level": "level"},
        "app_version": ["app_major", "app_minor"],
        "event_source": "source",
        "user_id": "player",
        "time_offset": "utc_offset",
        "app_id": null
    }
}"#;

fn row(session: &str, time: &str, name: &str, level: &str) -> Vec<Value> {
    vec![
        Value::from(session),
        Value::from(time),
        Value::from(name),
        Value::from(r#"{"difficulty": "hard"}"#),
        Value::from(level),
        Value::from("1"),
        Value::from("4"),
        Value::from("game"),
        Value::from("player-7"),
        Value::from("UTC-05:00"),
    ]
}

fn fallbacks() -> Fallbacks {
    Fallbacks::new().with("app_id", "CRYSTAL")
}

#[test]
fn test_decodes_event_fields() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());

    let event: Event = decoder
        .decode(&row("s1", "2023-05-01 12:00:00", "click", "3"))
        .unwrap();

    assert_eq!(event.session_id, "s1");
    assert_eq!(event.app_id, "CRYSTAL");
    assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap());
    assert_eq!(event.event_name, "click");
    assert_eq!(
        serde_json::Value::Object(event.event_data.clone()),
        json!({"difficulty": "hard", "level": 3})
    );
    assert_eq!(event.app_version.as_deref(), Some("1.4"));
    assert_eq!(event.event_source, EventSource::Game);
    assert_eq!(event.user_id.as_deref(), Some("player-7"));
    assert_eq!(event.time_offset.map(|z| z.to_string()).as_deref(), Some("UTC-05:00"));
    assert_eq!(event.event_sequence_index, Some(0));
    assert_eq!(diag.issue_count(), 0);
}

#[test]
fn test_sequence_index_restarts_per_session() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());

    let rows = vec![
        row("a", "2023-05-01 12:00:00", "start", "1"),
        row("a", "2023-05-01 12:00:01", "click", "1"),
        row("b", "2023-05-01 12:00:02", "start", "1"),
        row("a", "2023-05-01 12:00:03", "click", "1"),
    ];
    let batch = decoder.decode_events(&rows).unwrap();
    let indices: Vec<_> = batch
        .records
        .iter()
        .map(|e| e.event_sequence_index)
        .collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(0), Some(0)]);
}

#[test]
fn test_source_index_wins_over_counter() {
    let doc = r#"{
        "table": "t",
        "columns": [
            {"name": "sid", "type": "str"},
            {"name": "idx", "type": "int"}
        ],
        "column_map": {"session_id": "sid", "event_sequence_index": "idx"}
    }"#;
    let schema = schema_from_json(doc).unwrap();
    let diag = Diagnostics::disabled();
    let mut decoder = RowDecoder::new(&schema, &diag);

    let rows = vec![
        vec![Value::from("a"), Value::from("40")],
        vec![Value::from("a"), Value::Null],
    ];
    let batch = decoder.decode_events(&rows).unwrap();
    assert_eq!(batch.records[0].event_sequence_index, Some(40));
    // counter still advanced on the first row
    assert_eq!(batch.records[1].event_sequence_index, Some(1));
}

#[test]
fn test_missing_timestamp_falls_back_to_epoch_with_warning() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());

    let mut raw = row("s1", "2023-05-01 12:00:00", "click", "3");
    raw[1] = Value::from("None");
    let event: Event = decoder.decode(&raw).unwrap();
    assert_eq!(event.timestamp, chrono::DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(diag.warned_fields(), vec!["timestamp"]);
}

#[test]
fn test_type_mismatch_coerces_and_warns_once() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());

    let rows = vec![
        row("s1", "2023-05-01 12:00:00", "click", "three"),
        row("s1", "2023-05-01 12:00:01", "click", "four"),
    ];
    let batch = decoder.decode_events(&rows).unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(
        batch.records[0].event_data.get("level"),
        Some(&json!("three"))
    );
    assert_eq!(diag.warned_fields(), vec!["event_data"]);
    assert_eq!(diag.issue_count(), 2);
}

#[test]
fn test_unknown_event_source_defaults_to_game() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());

    let mut raw = row("s1", "2023-05-01 12:00:00", "click", "3");
    raw[7] = Value::from("replay");
    let event: Event = decoder.decode(&raw).unwrap();
    assert_eq!(event.event_source, EventSource::Game);
    assert!(diag.warned_fields().contains(&"event_source".to_string()));
}

#[test]
fn test_wrong_row_length_is_skipped_or_fatal() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let rows = vec![
        row("s1", "2023-05-01 12:00:00", "click", "3"),
        vec![Value::from("short")],
        row("s1", "2023-05-01 12:00:01", "click", "3"),
    ];

    let mut lenient = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());
    let batch = lenient.decode_events(&rows).unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.skipped, 1);

    let mut strict = RowDecoder::new(&schema, &diag)
        .with_fallbacks(fallbacks())
        .with_config(DecoderConfig { fail_fast: true });
    let err = strict.decode_events(&rows).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::RowLength { row: 1, expected: 10, actual: 1, .. }
    ));
}

#[test]
fn test_reset_restarts_sequence() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());

    let first: Event = decoder.decode(&row("s1", "2023-05-01 12:00:00", "a", "1")).unwrap();
    decoder.reset();
    let second: Event = decoder.decode(&row("s1", "2023-05-01 12:00:01", "b", "1")).unwrap();
    assert_eq!(first.event_sequence_index, Some(0));
    assert_eq!(second.event_sequence_index, Some(0));
}

#[test]
fn test_decodes_features() {
    let doc = r#"{
        "table": "features",
        "columns": [
            {"name": "feature", "type": "str"},
            {"name": "kind", "type": "str"},
            {"name": "unit", "type": "str"},
            {"name": "unit_index", "type": "int"},
            {"name": "session", "type": "str"},
            {"name": "names", "type": "json"},
            {"name": "vals", "type": "json"}
        ],
        "column_map": {
            "name": "feature",
            "feature_type": "kind",
            "game_unit": "unit",
            "game_unit_index": "unit_index",
            "session_id": "session",
            "subfeatures": "names",
            "values": "vals"
        }
    }"#;
    let schema = schema_from_json(doc).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag)
        .with_fallbacks(Fallbacks::new().with("app_id", "CRYSTAL"));

    let rows = vec![vec![
        Value::from("Clicks"),
        Value::from("Aggregate"),
        Value::from("level"),
        Value::from("2"),
        Value::from("s1"),
        Value::from(r#"["count", "rate"]"#),
        Value::from("[12, 0.5]"),
    ]];
    let batch = decoder.decode_features(&rows).unwrap();
    let feature = &batch.records[0];
    assert_eq!(feature.name, "Clicks");
    assert_eq!(feature.game_unit_index, Some(2));
    assert_eq!(feature.app_id, "CRYSTAL");
    assert_eq!(feature.user_id, None);
    assert_eq!(feature.subfeatures, vec!["count", "rate"]);
    assert_eq!(feature.values, vec![json!(12), json!(0.5)]);
}

#[test]
fn test_encode_round_trips_modulo_normalization() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());
    let original = row("s1", "2023-05-01 12:00:00", "click", "3");

    let event: Event = decoder.decode(&original).unwrap();
    let encoded = RowEncoder::new(&schema).encode(&event);

    let normalized: Vec<Value> = original
        .iter()
        .zip(schema.column_types())
        .map(|(cell, ty)| convert_to_type(cell, ty).unwrap())
        .collect();
    assert_eq!(encoded, normalized);
    // numeric string comes back as the integer
    assert_eq!(encoded[4], Value::Int(3));
    assert_eq!(encoded[3], Value::Json(json!({"difficulty": "hard"})));
}

#[test]
fn test_encode_leaves_unsplittable_list_null() {
    let schema = schema_from_json(EVENTS_SCHEMA).unwrap();
    let diag = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diag).with_fallbacks(fallbacks());
    let mut event: Event = decoder
        .decode(&row("s1", "2023-05-01 12:00:00", "click", "3"))
        .unwrap();
    event.app_version = Some("1.4.2".to_string());

    let encoded = RowEncoder::new(&schema).encode(&event);
    assert_eq!(encoded[5], Value::Null);
    assert_eq!(encoded[6], Value::Null);
}
