// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built JSON documents and measurement sets for consistent testing.

use qds_core::types::{Measurement, MeasurementType};

// =============================================================================
// Data Set Fixtures
// =============================================================================

/// Fixture providing standard QDS JSON documents.
pub struct DataSetFixtures;

impl DataSetFixtures {
    /// The minimal valid data set used by most scenarios.
    pub fn dummy() -> &'static str {
        r#"{"NAME":"a","TYPE":"STRING","VALUE":""}"#
    }

    /// A data set referencing the given reference name or file path.
    pub fn with_reference(value: &str) -> String {
        format!(r#"{{"NAME":"a","TYPE":"REF","VALUE":"{value}"}}"#)
    }

    /// A representative machining data set.
    pub fn machining() -> &'static str {
        r#"[
            {"NAME":"ProgramName","TYPE":"STRING","VALUE":"cut-42"},
            {"NAME":"ProgramNumber","TYPE":"INT","VALUE":42},
            {"NAME":"LaserPower","TYPE":"DOUBLE","UNIT":"W","VALUE":1500.5},
            {"NAME":"Finished","TYPE":"BOOL","VALUE":true}
        ]"#
    }

    /// A data set whose timestamp measurement is listed last.
    pub fn with_trailing_timestamp() -> &'static str {
        r#"[
            {"NAME":"x","TYPE":"INT","VALUE":1},
            {"NAME":"t","TYPE":"TIMESTAMP","VALUE":"2019-02-18T13:29:43Z"}
        ]"#
    }
}

// =============================================================================
// Measurement Fixtures
// =============================================================================

/// Fixture providing in-memory measurement sets.
pub struct MeasurementFixtures;

impl MeasurementFixtures {
    /// A measurement set covering every scalar value kind.
    pub fn mixed_set() -> Vec<Measurement> {
        vec![
            Measurement::new("name", MeasurementType::String, "text"),
            Measurement::new("count", MeasurementType::Integer, 7i64),
            Measurement::new("power", MeasurementType::Double, 2.5f64).with_unit("W"),
            Measurement::new("ok", MeasurementType::Bool, true),
        ]
    }
}
