// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! QDS schema validation on top of the event parser.
//!
//! [`DataValidator`] consumes [`ParserEvent`]s and accumulates validated
//! [`Measurement`]s. Each measurement object may carry the keys `NAME`,
//! `TYPE`, `UNIT` and `VALUE` (each at most once) plus the ignored legacy
//! key `DECIMALS`. When an object ends, the required keys must be present
//! and the value must satisfy the per-type rules; a completed `TIMESTAMP`
//! measurement is rotated to the front of the list.

use qds_core::error::{ParsingError, ParsingResult};
use qds_core::types::{Measurement, MeasurementType, MeasurementValue};

use crate::parser::{EventHandler, JsonParser, ParserEvent};
use crate::timestamp;

/// Parses and validates a QDS document into a measurement list.
///
/// # Examples
///
/// ```
/// use qds_parsing::parse_measurements;
///
/// let set = parse_measurements(
///     r#"[{"NAME":"ProgramNumber","TYPE":"INT","VALUE":1}]"#,
/// ).unwrap();
/// assert_eq!(set.len(), 1);
/// assert_eq!(set[0].value.as_i64(), Some(1));
/// ```
pub fn parse_measurements(json: &str) -> ParsingResult<Vec<Measurement>> {
    let mut validator = DataValidator::new();
    JsonParser::parse(json, &mut validator)?;
    Ok(validator.into_measurements())
}

// =============================================================================
// Field Rules
// =============================================================================

/// The validation rule selected by the most recent object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRule {
    Name,
    Type,
    Unit,
    Value,
    /// Legacy key set by VisionLine, ignored.
    Decimals,
}

impl FieldRule {
    fn for_key(key: &str) -> Option<Self> {
        match key {
            "NAME" => Some(FieldRule::Name),
            "TYPE" => Some(FieldRule::Type),
            "UNIT" => Some(FieldRule::Unit),
            "VALUE" => Some(FieldRule::Value),
            "DECIMALS" => Some(FieldRule::Decimals),
            _ => None,
        }
    }
}

// =============================================================================
// Data Validator
// =============================================================================

/// Event handler that enforces the QDS measurement schema.
///
/// The validator is single-use parse state: feed one document's events,
/// then take the result with [`DataValidator::into_measurements`].
#[derive(Debug, Default)]
pub struct DataValidator {
    data: Vec<Measurement>,
    current: Option<FieldRule>,
    element_completed: bool,
}

impl DataValidator {
    /// Creates an empty parse state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulated measurements.
    pub fn into_measurements(self) -> Vec<Measurement> {
        self.data
    }

    fn on_key(&mut self, key: &str) -> ParsingResult<()> {
        if self.data.is_empty() || self.element_completed {
            return Err(ParsingError::not_an_object(key));
        }

        match FieldRule::for_key(key) {
            Some(rule) => {
                self.current = Some(rule);
                Ok(())
            }
            None => Err(ParsingError::invalid_key(key)),
        }
    }

    fn on_value(&mut self, event: ParserEvent<'_>) -> ParsingResult<()> {
        if self.element_completed {
            return Err(ParsingError::not_an_object(event.value_text()));
        }
        let Some(measurement) = self.data.last_mut() else {
            return Err(ParsingError::not_an_object(event.value_text()));
        };
        let Some(rule) = self.current.take() else {
            return Err(ParsingError::missing_key(event.value_text()));
        };

        match rule {
            FieldRule::Name => {
                let ParserEvent::String(text) = event else {
                    return Err(ParsingError::wrong_type(
                        "NAME",
                        event.value_text(),
                        event.type_name(),
                        "string",
                    ));
                };
                if !measurement.name.is_empty() {
                    return Err(ParsingError::duplicate_key("NAME"));
                }
                measurement.name = text.to_string();
            }
            FieldRule::Type => {
                let ParserEvent::String(text) = event else {
                    return Err(ParsingError::wrong_type(
                        "TYPE",
                        event.value_text(),
                        event.type_name(),
                        "string",
                    ));
                };
                if measurement.kind != MeasurementType::NotSet {
                    return Err(ParsingError::duplicate_key("TYPE"));
                }
                measurement.kind = MeasurementType::parse(text)
                    .ok_or_else(|| ParsingError::invalid_value("TYPE", text))?;
            }
            FieldRule::Unit => {
                let ParserEvent::String(text) = event else {
                    return Err(ParsingError::wrong_type(
                        "UNIT",
                        event.value_text(),
                        event.type_name(),
                        "string",
                    ));
                };
                if !measurement.unit.is_empty() {
                    return Err(ParsingError::duplicate_key("UNIT"));
                }
                measurement.unit = text.to_string();
            }
            FieldRule::Value => {
                if !measurement.value.is_empty() {
                    return Err(ParsingError::duplicate_key("VALUE"));
                }
                measurement.value = match event {
                    ParserEvent::String(text) => MeasurementValue::String(text.to_string()),
                    ParserEvent::Int64(v) => MeasurementValue::Int(v),
                    // Unsigned values narrow without a range check; values
                    // above i64::MAX are undefined input.
                    ParserEvent::Uint64(v) => MeasurementValue::Int(v as i64),
                    ParserEvent::Double(v) => MeasurementValue::Double(v),
                    ParserEvent::Bool(v) => MeasurementValue::Bool(v),
                    ParserEvent::ObjectBegin | ParserEvent::ObjectEnd | ParserEvent::Key(_) => {
                        return Err(ParsingError::InvalidStructure)
                    }
                };
            }
            FieldRule::Decimals => {}
        }

        Ok(())
    }

    fn on_object_end(&mut self) -> ParsingResult<()> {
        if self.element_completed {
            return Err(ParsingError::InvalidStructure);
        }
        let Some(measurement) = self.data.last_mut() else {
            return Err(ParsingError::InvalidStructure);
        };

        if measurement.name.is_empty() {
            return Err(ParsingError::missing_field("NAME"));
        }
        if measurement.kind == MeasurementType::NotSet {
            return Err(ParsingError::missing_field("TYPE"));
        }
        if measurement.value.is_empty() {
            return Err(ParsingError::missing_field("VALUE"));
        }

        let mut is_timestamp = false;
        match measurement.kind {
            MeasurementType::String | MeasurementType::Ref | MeasurementType::ForeignKey => {
                if measurement.value.as_str().is_none() {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                }
            }
            MeasurementType::Integer => {
                let Some(value) = measurement.value.as_i64() else {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                };
                if value > i64::from(i32::MAX) {
                    return Err(ParsingError::invalid_value("INTEGER", value));
                }
            }
            MeasurementType::Long => {
                if measurement.value.as_i64().is_none() {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                }
            }
            MeasurementType::Float => {
                let Some(value) = measurement.value.as_f64() else {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                };
                if value > f64::from(f32::MAX) {
                    return Err(ParsingError::invalid_value("FLOAT", value));
                }
            }
            MeasurementType::Double => {
                if measurement.value.as_f64().is_none() {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                }
            }
            MeasurementType::Bool => {
                if measurement.value.as_bool().is_none() {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                }
            }
            MeasurementType::Word => {
                let Some(text) = measurement.value.as_str() else {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                };
                if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(ParsingError::invalid_value("WORD", text));
                }
            }
            MeasurementType::Timestamp => {
                let Some(text) = measurement.value.as_str() else {
                    return Err(ParsingError::type_mismatch(measurement.name.clone()));
                };
                if !timestamp::is_valid(text) {
                    return Err(ParsingError::invalid_value("TIMESTAMP", text));
                }
                is_timestamp = true;
            }
            MeasurementType::NotSet => {
                return Err(ParsingError::missing_field("TYPE"));
            }
        }

        if is_timestamp {
            // API recommendation: the timestamp entry leads the data set.
            self.data.rotate_right(1);
        }

        self.element_completed = true;
        Ok(())
    }
}

impl EventHandler for DataValidator {
    fn on_event(&mut self, event: ParserEvent<'_>) -> ParsingResult<()> {
        match event {
            ParserEvent::ObjectBegin => {
                self.data.push(Measurement::default());
                self.element_completed = false;
                Ok(())
            }
            ParserEvent::ObjectEnd => self.on_object_end(),
            ParserEvent::Key(key) => self.on_key(key),
            _ => self.on_value(event),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(validator: &mut DataValidator, events: &[ParserEvent<'_>]) -> ParsingResult<()> {
        for event in events {
            validator.on_event(*event)?;
        }
        Ok(())
    }

    fn complete_object(name: &str, kind: &str, value: ParserEvent<'_>) -> Vec<Measurement> {
        let mut validator = DataValidator::new();
        feed(
            &mut validator,
            &[
                ParserEvent::ObjectBegin,
                ParserEvent::Key("NAME"),
                ParserEvent::String(name),
                ParserEvent::Key("TYPE"),
                ParserEvent::String(kind),
                ParserEvent::Key("VALUE"),
                value,
                ParserEvent::ObjectEnd,
            ],
        )
        .unwrap();
        validator.into_measurements()
    }

    #[test]
    fn test_object_begin_appends_measurement() {
        let mut validator = DataValidator::new();
        assert!(validator.data.is_empty());
        validator.on_event(ParserEvent::ObjectBegin).unwrap();
        assert_eq!(validator.data.len(), 1);
    }

    #[test]
    fn test_object_end_requires_open_object() {
        let mut validator = DataValidator::new();
        assert_eq!(
            validator.on_event(ParserEvent::ObjectEnd).unwrap_err(),
            ParsingError::InvalidStructure
        );
    }

    #[test]
    fn test_object_end_twice_is_invalid() {
        let mut validator = DataValidator::new();
        feed(
            &mut validator,
            &[
                ParserEvent::ObjectBegin,
                ParserEvent::Key("NAME"),
                ParserEvent::String("a"),
                ParserEvent::Key("TYPE"),
                ParserEvent::String("STRING"),
                ParserEvent::Key("VALUE"),
                ParserEvent::String("x"),
                ParserEvent::ObjectEnd,
            ],
        )
        .unwrap();
        assert_eq!(
            validator.on_event(ParserEvent::ObjectEnd).unwrap_err(),
            ParsingError::InvalidStructure
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let mut validator = DataValidator::new();
        validator.on_event(ParserEvent::ObjectBegin).unwrap();
        assert_eq!(
            validator.on_event(ParserEvent::ObjectEnd).unwrap_err(),
            ParsingError::missing_field("NAME")
        );

        let error = parse_measurements(r#"[{"NAME":"a","VALUE":1}]"#).unwrap_err();
        assert_eq!(error, ParsingError::missing_field("TYPE"));

        let error = parse_measurements(r#"[{"NAME":"a","TYPE":"STRING"}]"#).unwrap_err();
        assert_eq!(error, ParsingError::missing_field("VALUE"));
    }

    #[test]
    fn test_key_outside_object() {
        let mut validator = DataValidator::new();
        assert_eq!(
            validator.on_event(ParserEvent::Key("NAME")).unwrap_err(),
            ParsingError::not_an_object("NAME")
        );
    }

    #[test]
    fn test_unknown_key() {
        let mut validator = DataValidator::new();
        validator.on_event(ParserEvent::ObjectBegin).unwrap();
        assert_eq!(
            validator.on_event(ParserEvent::Key("abcd")).unwrap_err(),
            ParsingError::invalid_key("abcd")
        );
    }

    #[test]
    fn test_value_without_key() {
        let mut validator = DataValidator::new();
        assert_eq!(
            validator.on_event(ParserEvent::String("abcd")).unwrap_err(),
            ParsingError::not_an_object("abcd")
        );

        validator.on_event(ParserEvent::ObjectBegin).unwrap();
        assert_eq!(
            validator.on_event(ParserEvent::String("abcd")).unwrap_err(),
            ParsingError::missing_key("abcd")
        );
    }

    #[test]
    fn test_name_rules() {
        let mut validator = DataValidator::new();
        feed(
            &mut validator,
            &[ParserEvent::ObjectBegin, ParserEvent::Key("NAME")],
        )
        .unwrap();

        assert_eq!(
            validator.on_event(ParserEvent::Int64(123)).unwrap_err(),
            ParsingError::wrong_type("NAME", "123", "int64", "string")
        );

        validator.current = Some(FieldRule::Name);
        validator.on_event(ParserEvent::String("abcd")).unwrap();
        assert_eq!(validator.data[0].name, "abcd");

        validator.current = Some(FieldRule::Name);
        assert_eq!(
            validator.on_event(ParserEvent::String("zzzz")).unwrap_err(),
            ParsingError::duplicate_key("NAME")
        );
    }

    #[test]
    fn test_type_rules() {
        let mut validator = DataValidator::new();
        validator.on_event(ParserEvent::ObjectBegin).unwrap();

        validator.current = Some(FieldRule::Type);
        assert_eq!(
            validator.on_event(ParserEvent::Bool(true)).unwrap_err(),
            ParsingError::wrong_type("TYPE", "true", "bool", "string")
        );

        validator.current = Some(FieldRule::Type);
        assert_eq!(
            validator.on_event(ParserEvent::String("abcd")).unwrap_err(),
            ParsingError::invalid_value("TYPE", "abcd")
        );

        for (literal, kind) in [
            ("STRING", MeasurementType::String),
            ("INTEGER", MeasurementType::Integer),
            ("INT", MeasurementType::Integer),
            ("FLOAT", MeasurementType::Float),
            ("LONG", MeasurementType::Long),
            ("DOUBLE", MeasurementType::Double),
            ("BOOL", MeasurementType::Bool),
            ("WORD", MeasurementType::Word),
            ("TIMESTAMP", MeasurementType::Timestamp),
            ("REF", MeasurementType::Ref),
            ("FOREIGN_KEY", MeasurementType::ForeignKey),
        ] {
            validator.data[0].kind = MeasurementType::NotSet;
            validator.current = Some(FieldRule::Type);
            validator.on_event(ParserEvent::String(literal)).unwrap();
            assert_eq!(validator.data[0].kind, kind, "literal {literal}");
        }

        validator.current = Some(FieldRule::Type);
        assert_eq!(
            validator.on_event(ParserEvent::String("STRING")).unwrap_err(),
            ParsingError::duplicate_key("TYPE")
        );
    }

    #[test]
    fn test_unit_rules() {
        let mut validator = DataValidator::new();
        validator.on_event(ParserEvent::ObjectBegin).unwrap();

        validator.current = Some(FieldRule::Unit);
        assert_eq!(
            validator.on_event(ParserEvent::Double(1.5)).unwrap_err(),
            ParsingError::wrong_type("UNIT", "1.5", "double", "string")
        );

        validator.current = Some(FieldRule::Unit);
        validator.on_event(ParserEvent::String("mm")).unwrap();
        assert_eq!(validator.data[0].unit, "mm");

        validator.current = Some(FieldRule::Unit);
        assert_eq!(
            validator.on_event(ParserEvent::String("cm")).unwrap_err(),
            ParsingError::duplicate_key("UNIT")
        );
    }

    #[test]
    fn test_value_rules() {
        let mut validator = DataValidator::new();
        validator.on_event(ParserEvent::ObjectBegin).unwrap();

        for (event, expected) in [
            (
                ParserEvent::String("abcd"),
                MeasurementValue::String("abcd".to_string()),
            ),
            (ParserEvent::Int64(-7), MeasurementValue::Int(-7)),
            (ParserEvent::Uint64(456), MeasurementValue::Int(456)),
            (ParserEvent::Double(1.25), MeasurementValue::Double(1.25)),
            (ParserEvent::Bool(true), MeasurementValue::Bool(true)),
        ] {
            validator.data[0].value = MeasurementValue::Empty;
            validator.current = Some(FieldRule::Value);
            validator.on_event(event).unwrap();
            assert_eq!(validator.data[0].value, expected);
        }

        validator.current = Some(FieldRule::Value);
        assert_eq!(
            validator.on_event(ParserEvent::Int64(1)).unwrap_err(),
            ParsingError::duplicate_key("VALUE")
        );
    }

    #[test]
    fn test_decimals_is_ignored() {
        let set = parse_measurements(
            r#"[{"NAME":"a","TYPE":"INT","VALUE":1,"DECIMALS":3}]"#,
        )
        .unwrap();
        assert_eq!(set[0].value.as_i64(), Some(1));
    }

    #[test]
    fn test_integer_range() {
        let set = complete_object("a", "INTEGER", ParserEvent::Int64(i64::from(i32::MAX)));
        assert_eq!(set[0].value.as_i64(), Some(i64::from(i32::MAX)));

        let error = parse_measurements(&format!(
            r#"[{{"NAME":"a","TYPE":"INTEGER","VALUE":{}}}]"#,
            i64::from(i32::MAX) + 1
        ))
        .unwrap_err();
        assert!(matches!(
            error,
            ParsingError::InvalidValue { kind: "INTEGER", .. }
        ));
    }

    #[test]
    fn test_long_has_no_range_check() {
        let set = complete_object("a", "LONG", ParserEvent::Int64(i64::MAX - 1));
        assert_eq!(set[0].value.as_i64(), Some(i64::MAX - 1));
    }

    #[test]
    fn test_float_range() {
        let set = complete_object("a", "FLOAT", ParserEvent::Double(1.5));
        assert_eq!(set[0].value.as_f64(), Some(1.5));

        let error = parse_measurements(
            r#"[{"NAME":"a","TYPE":"FLOAT","VALUE":1e300}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            error,
            ParsingError::InvalidValue { kind: "FLOAT", .. }
        ));
    }

    #[test]
    fn test_double_accepts_large_values() {
        let set = complete_object("a", "DOUBLE", ParserEvent::Double(1e300));
        assert_eq!(set[0].value.as_f64(), Some(1e300));
    }

    #[test]
    fn test_word_rules() {
        let set = complete_object("a", "WORD", ParserEvent::String("A5E9"));
        assert_eq!(set[0].value.as_str(), Some("A5E9"));

        for bad in ["A5E91", "A5G9", "2019-02-18T13:29:43+02:00", "a5e"] {
            let error = parse_measurements(&format!(
                r#"[{{"NAME":"a","TYPE":"WORD","VALUE":"{bad}"}}]"#
            ))
            .unwrap_err();
            assert!(
                matches!(error, ParsingError::InvalidValue { kind: "WORD", .. }),
                "word {bad}"
            );
        }
    }

    #[test]
    fn test_timestamp_validation() {
        let set = complete_object(
            "t",
            "TIMESTAMP",
            ParserEvent::String("2019-02-18T13:29:43Z"),
        );
        assert_eq!(set[0].kind, MeasurementType::Timestamp);

        let error = parse_measurements(
            r#"[{"NAME":"t","TYPE":"TIMESTAMP","VALUE":"2019-2-18T13:29:43+02:00"}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            error,
            ParsingError::InvalidValue { kind: "TIMESTAMP", .. }
        ));
    }

    #[test]
    fn test_timestamp_rotates_to_front() {
        let set = parse_measurements(
            r#"[
                {"NAME":"x","TYPE":"INT","VALUE":1},
                {"NAME":"y","TYPE":"INT","VALUE":2},
                {"NAME":"t","TYPE":"TIMESTAMP","VALUE":"2019-02-18T13:29:43Z"},
                {"NAME":"z","TYPE":"INT","VALUE":3}
            ]"#,
        )
        .unwrap();

        let names: Vec<&str> = set.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["t", "x", "y", "z"]);
    }

    #[test]
    fn test_type_mismatch_reports_name() {
        let error = parse_measurements(
            r#"[{"NAME":"my-name","TYPE":"STRING","VALUE":123}]"#,
        )
        .unwrap_err();
        assert_eq!(error, ParsingError::type_mismatch("my-name"));

        let error = parse_measurements(
            r#"[{"NAME":"my-name","TYPE":"BOOL","VALUE":"true"}]"#,
        )
        .unwrap_err();
        assert_eq!(error, ParsingError::type_mismatch("my-name"));

        let error = parse_measurements(
            r#"[{"NAME":"my-name","TYPE":"REF","VALUE":true}]"#,
        )
        .unwrap_err();
        assert_eq!(error, ParsingError::type_mismatch("my-name"));
    }

    #[test]
    fn test_multiple_measurements() {
        let set = parse_measurements(
            r#"[
                {"NAME":"aaa","TYPE":"STRING","VALUE":"test-string"},
                {"NAME":"bbb","TYPE":"INT","VALUE":123,"UNIT":"mm"},
                {"NAME":"ccc","TYPE":"BOOL","VALUE":true}
            ]"#,
        )
        .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set[0].value.as_str(), Some("test-string"));
        assert_eq!(set[1].value.as_i64(), Some(123));
        assert_eq!(set[1].unit, "mm");
        assert_eq!(set[2].value.as_bool(), Some(true));
    }

    #[test]
    fn test_bare_object_document() {
        let set =
            parse_measurements(r#"{"NAME":"a","TYPE":"STRING","VALUE":""}"#).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].name, "a");
    }
}
