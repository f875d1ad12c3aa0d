// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builder patterns for constructing test data with sensible defaults.

use qds_core::types::{Measurement, MeasurementType, MeasurementValue};

// =============================================================================
// Measurement Builder
// =============================================================================

/// Builder for constructing [`Measurement`] instances in tests.
#[derive(Debug, Clone, Default)]
pub struct MeasurementBuilder {
    name: Option<String>,
    kind: MeasurementType,
    unit: String,
    value: MeasurementValue,
}

impl MeasurementBuilder {
    /// Creates a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the measurement name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the measurement type.
    pub fn kind(mut self, kind: MeasurementType) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the unit.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Sets a string value and, unless set before, the `STRING` type.
    pub fn string_value(mut self, value: impl Into<String>) -> Self {
        if self.kind == MeasurementType::NotSet {
            self.kind = MeasurementType::String;
        }
        self.value = MeasurementValue::String(value.into());
        self
    }

    /// Sets an integer value and, unless set before, the `INTEGER` type.
    pub fn int_value(mut self, value: i64) -> Self {
        if self.kind == MeasurementType::NotSet {
            self.kind = MeasurementType::Integer;
        }
        self.value = MeasurementValue::Int(value);
        self
    }

    /// Sets a double value and, unless set before, the `DOUBLE` type.
    pub fn double_value(mut self, value: f64) -> Self {
        if self.kind == MeasurementType::NotSet {
            self.kind = MeasurementType::Double;
        }
        self.value = MeasurementValue::Double(value);
        self
    }

    /// Sets a boolean value and, unless set before, the `BOOL` type.
    pub fn bool_value(mut self, value: bool) -> Self {
        if self.kind == MeasurementType::NotSet {
            self.kind = MeasurementType::Bool;
        }
        self.value = MeasurementValue::Bool(value);
        self
    }

    /// Builds the measurement.
    ///
    /// # Panics
    /// Panics if the name was not set.
    pub fn build(self) -> Measurement {
        Measurement {
            name: self.name.expect("name is required"),
            kind: self.kind,
            unit: self.unit,
            value: self.value,
        }
    }
}

// =============================================================================
// Data Set Builder
// =============================================================================

/// Builder for the JSON wire representation of a QDS data set.
#[derive(Debug, Clone, Default)]
pub struct DataSetBuilder {
    measurements: Vec<serde_json::Value>,
}

impl DataSetBuilder {
    /// Creates an empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a measurement object from explicit wire fields.
    pub fn measurement(
        mut self,
        name: &str,
        kind: &str,
        value: serde_json::Value,
    ) -> Self {
        self.measurements.push(serde_json::json!({
            "NAME": name,
            "TYPE": kind,
            "VALUE": value,
        }));
        self
    }

    /// Appends a measurement object carrying a unit.
    pub fn measurement_with_unit(
        mut self,
        name: &str,
        kind: &str,
        unit: &str,
        value: serde_json::Value,
    ) -> Self {
        self.measurements.push(serde_json::json!({
            "NAME": name,
            "TYPE": kind,
            "UNIT": unit,
            "VALUE": value,
        }));
        self
    }

    /// Appends a `REF` measurement pointing at a reference name or a file
    /// path.
    pub fn reference(self, name: &str, value: &str) -> Self {
        self.measurement(name, "REF", serde_json::json!(value))
    }

    /// Builds the JSON document.
    pub fn build(self) -> String {
        serde_json::Value::Array(self.measurements).to_string()
    }
}
