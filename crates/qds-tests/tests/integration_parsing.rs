// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Parsing Integration Tests
//!
//! End-to-end checks of the producer input path:
//!
//! - Timestamp reordering observed through the buffer
//! - ISO-8601 acceptance and rejection
//! - Serialize/reparse round-trips, including string escaping

use qds_buffer::{DataSource, DataSourceConfig};
use qds_core::error::ParsingError;
use qds_core::types::{Measurement, MeasurementType};
use qds_parsing::parse_measurements;

use qds_tests::common::builders::MeasurementBuilder;
use qds_tests::common::fixtures::{DataSetFixtures, MeasurementFixtures};

// =============================================================================
// Timestamp Rotation (S6)
// =============================================================================

#[test]
fn test_timestamp_moves_to_front_of_stored_set() {
    let source = DataSource::new(DataSourceConfig::default());
    source
        .add(1, DataSetFixtures::with_trailing_timestamp())
        .unwrap();

    let entries = source.entries();
    let measurements = &entries[0].measurements;
    assert_eq!(measurements[0].kind, MeasurementType::Timestamp);
    assert_eq!(measurements[0].name, "t");
    assert_eq!(measurements[1].kind, MeasurementType::Integer);
    assert_eq!(measurements[1].name, "x");
}

// =============================================================================
// ISO-8601 Acceptance (S7)
// =============================================================================

fn timestamp_json(value: &str) -> String {
    format!(r#"[{{"NAME":"t","TYPE":"TIMESTAMP","VALUE":"{value}"}}]"#)
}

#[test]
fn test_accepted_timestamp_literals() {
    for value in [
        "2019-02-18T13:29:43+02:00",
        "2019-02-18T13:29:43Z",
        "20190218T132943-0200",
    ] {
        assert!(
            parse_measurements(&timestamp_json(value)).is_ok(),
            "should accept {value}"
        );
    }
}

#[test]
fn test_rejected_timestamp_literals() {
    for value in [
        "2019-02-18T24:29:43+02:00",
        "2019-13-18T13:29:43+02:00",
        "2019-2-18T13:29:43+02:00",
    ] {
        let error = parse_measurements(&timestamp_json(value)).unwrap_err();
        assert!(
            matches!(error, ParsingError::InvalidValue { kind: "TIMESTAMP", .. }),
            "should reject {value}"
        );
    }
}

// =============================================================================
// Round-Trips (Invariants 5 & 6)
// =============================================================================

#[test]
fn test_parse_serialize_roundtrip() {
    let set = parse_measurements(DataSetFixtures::machining()).unwrap();

    let json = Measurement::to_json(&set);
    let reparsed = parse_measurements(&json).unwrap();
    assert_eq!(reparsed, set);
}

#[test]
fn test_serialized_set_reparses_to_the_same_measurements() {
    let set = MeasurementFixtures::mixed_set();
    let json = Measurement::to_json(&set);
    let reparsed = parse_measurements(&json).unwrap();
    assert_eq!(reparsed, set);
}

#[test]
fn test_parsed_measurement_matches_builder() {
    let set = parse_measurements(
        r#"[{"NAME":"power","TYPE":"DOUBLE","UNIT":"W","VALUE":1.5}]"#,
    )
    .unwrap();

    let expected = MeasurementBuilder::new()
        .name("power")
        .unit("W")
        .double_value(1.5)
        .build();
    assert_eq!(set[0], expected);
}

#[test]
fn test_roundtrip_with_timestamp_rotation_is_stable() {
    // On the first parse the trailing timestamp rotates to the front;
    // after that the representation is a fixed point of parse∘serialize.
    let set = parse_measurements(DataSetFixtures::with_trailing_timestamp()).unwrap();
    assert_eq!(set[0].kind, MeasurementType::Timestamp);

    let json = Measurement::to_json(&set);
    let reparsed = parse_measurements(&json).unwrap();
    assert_eq!(reparsed, set);
}

#[test]
fn test_string_escape_roundtrip() {
    let raw = "quote\" back\\ tab\t nl\n cr\r ctl\u{01}\u{1f} end";
    let input =
        serde_json::json!([{ "NAME": "s", "TYPE": "STRING", "VALUE": raw }]).to_string();

    let source = DataSource::new(DataSourceConfig::default());
    source.add(1, &input).unwrap();

    let snapshot = source.entries()[0].snapshot();
    assert_eq!(snapshot[0].value.as_str(), Some(raw));

    // Serializing and reparsing restores the identical byte string.
    let json = Measurement::to_json(&snapshot);
    let reparsed = parse_measurements(&json).unwrap();
    assert_eq!(reparsed[0].value.as_str(), Some(raw));
}

// =============================================================================
// Error Surface
// =============================================================================

#[test]
fn test_schema_violations() {
    let error = parse_measurements(r#"[{"NAME":"a","COLOR":"red"}]"#).unwrap_err();
    assert_eq!(error, ParsingError::invalid_key("COLOR"));

    let error =
        parse_measurements(r#"[{"NAME":"a","NAME":"b","TYPE":"STRING","VALUE":""}]"#).unwrap_err();
    assert_eq!(error, ParsingError::duplicate_key("NAME"));

    let error = parse_measurements(r#"[{"NAME":1,"TYPE":"STRING","VALUE":""}]"#).unwrap_err();
    assert!(matches!(error, ParsingError::WrongType { key: "NAME", .. }));

    let error = parse_measurements(r#"["loose"]"#).unwrap_err();
    assert_eq!(error, ParsingError::not_an_object("loose"));

    let error = parse_measurements(r#"[{"NAME":"a","TYPE":"STRING","VALUE":""}] x"#).unwrap_err();
    assert_eq!(error, ParsingError::ExtraData);
}

#[test]
fn test_uint64_narrowing() {
    // Values in range pass through the unsigned path unchanged.
    let set = parse_measurements(r#"[{"NAME":"n","TYPE":"LONG","VALUE":9007199254740993}]"#)
        .unwrap();
    assert_eq!(set[0].value.as_i64(), Some(9_007_199_254_740_993));
}
