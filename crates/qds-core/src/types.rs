// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for the QDS buffer.
//!
//! This module provides the measurement model shared by the parser, the
//! ring buffer and the data-source façade:
//!
//! - [`Measurement`]: one named, typed, optionally unit-carrying value
//! - [`MeasurementType`] / [`MeasurementValue`]: the QDS type system
//! - [`BufferEntry`]: a counter-tagged measurement set inside the buffer
//! - [`ReferenceData`]: an out-of-band binary blob addressed by name
//! - [`ResetInformation`] / [`DeletionInformation`]: bookkeeping records

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Measurement Type
// =============================================================================

/// The data type of a QDS measurement.
///
/// The wire representation uses the upper-case literals of the QDS protocol
/// (`"STRING"`, `"INTEGER"`, ...). `INT` is accepted as a legacy alias for
/// `INTEGER`.
///
/// # Examples
///
/// ```
/// use qds_core::types::MeasurementType;
///
/// assert_eq!(MeasurementType::parse("INTEGER"), Some(MeasurementType::Integer));
/// assert_eq!(MeasurementType::parse("INT"), Some(MeasurementType::Integer));
/// assert_eq!(MeasurementType::Integer.as_str(), "INTEGER");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementType {
    /// No type assigned yet; never present in a validated measurement.
    #[default]
    NotSet,

    /// UTF-8 string.
    String,

    /// 32-bit signed integer range.
    #[serde(alias = "INT")]
    Integer,

    /// 32-bit floating point range.
    Float,

    /// 64-bit signed integer.
    Long,

    /// 64-bit floating point.
    Double,

    /// Boolean.
    Bool,

    /// Four hexadecimal digits.
    Word,

    /// ISO-8601 date-time literal.
    Timestamp,

    /// Symbolic name of a binary reference attachment.
    Ref,

    /// Foreign key into another data set.
    ForeignKey,
}

impl MeasurementType {
    /// Returns the wire literal of this type, or an empty string for
    /// [`MeasurementType::NotSet`].
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::NotSet => "",
            MeasurementType::String => "STRING",
            MeasurementType::Integer => "INTEGER",
            MeasurementType::Float => "FLOAT",
            MeasurementType::Long => "LONG",
            MeasurementType::Double => "DOUBLE",
            MeasurementType::Bool => "BOOL",
            MeasurementType::Word => "WORD",
            MeasurementType::Timestamp => "TIMESTAMP",
            MeasurementType::Ref => "REF",
            MeasurementType::ForeignKey => "FOREIGN_KEY",
        }
    }

    /// Parses a wire literal, accepting the legacy `INT` alias.
    ///
    /// Returns `None` for unknown literals; `NOT_SET` is not parseable.
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "STRING" => Some(MeasurementType::String),
            "INTEGER" | "INT" => Some(MeasurementType::Integer),
            "FLOAT" => Some(MeasurementType::Float),
            "LONG" => Some(MeasurementType::Long),
            "DOUBLE" => Some(MeasurementType::Double),
            "BOOL" => Some(MeasurementType::Bool),
            "WORD" => Some(MeasurementType::Word),
            "TIMESTAMP" => Some(MeasurementType::Timestamp),
            "REF" => Some(MeasurementType::Ref),
            "FOREIGN_KEY" => Some(MeasurementType::ForeignKey),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Measurement Value
// =============================================================================

/// The value of a QDS measurement.
///
/// A tagged union over the scalar types the QDS JSON format can carry.
/// [`MeasurementValue::Empty`] marks a value that has not been set; a
/// validated measurement never carries it.
///
/// Serialization emits the native JSON type (string, integer, floating
/// point, boolean), which is what the QDS output format requires.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MeasurementValue {
    /// No value assigned yet.
    #[default]
    Empty,

    /// UTF-8 string value.
    String(String),

    /// Signed 64-bit integer value.
    Int(i64),

    /// 64-bit floating point value.
    Double(f64),

    /// Boolean value.
    Bool(bool),
}

impl MeasurementValue {
    /// Returns the name of the contained variant for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            MeasurementValue::Empty => "empty",
            MeasurementValue::String(_) => "string",
            MeasurementValue::Int(_) => "int64",
            MeasurementValue::Double(_) => "double",
            MeasurementValue::Bool(_) => "bool",
        }
    }

    /// Returns `true` if no value has been assigned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, MeasurementValue::Empty)
    }

    /// Attempts to view this value as a string slice.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MeasurementValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to view this value as an i64.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MeasurementValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to view this value as an f64.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MeasurementValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to view this value as a bool.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MeasurementValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementValue::Empty => Ok(()),
            MeasurementValue::String(v) => write!(f, "{}", v),
            MeasurementValue::Int(v) => write!(f, "{}", v),
            MeasurementValue::Double(v) => write!(f, "{}", v),
            MeasurementValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for MeasurementValue {
    fn from(v: String) -> Self {
        MeasurementValue::String(v)
    }
}

impl From<&str> for MeasurementValue {
    fn from(v: &str) -> Self {
        MeasurementValue::String(v.to_string())
    }
}

impl From<i64> for MeasurementValue {
    fn from(v: i64) -> Self {
        MeasurementValue::Int(v)
    }
}

impl From<f64> for MeasurementValue {
    fn from(v: f64) -> Self {
        MeasurementValue::Double(v)
    }
}

impl From<bool> for MeasurementValue {
    fn from(v: bool) -> Self {
        MeasurementValue::Bool(v)
    }
}

impl Serialize for MeasurementValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MeasurementValue::Empty => serializer.serialize_none(),
            MeasurementValue::String(v) => serializer.serialize_str(v),
            MeasurementValue::Int(v) => serializer.serialize_i64(*v),
            MeasurementValue::Double(v) => serializer.serialize_f64(*v),
            MeasurementValue::Bool(v) => serializer.serialize_bool(*v),
        }
    }
}

impl<'de> Deserialize<'de> for MeasurementValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = MeasurementValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, integer, floating point or boolean value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(MeasurementValue::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(MeasurementValue::String(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(MeasurementValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                // Unsigned values narrow without a range check; values above
                // i64::MAX are undefined input.
                Ok(MeasurementValue::Int(v as i64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(MeasurementValue::Double(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(MeasurementValue::Bool(v))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(MeasurementValue::Empty)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(MeasurementValue::Empty)
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// One named, typed, optionally unit-carrying value within a QDS data set.
///
/// # Examples
///
/// ```
/// use qds_core::types::{Measurement, MeasurementType};
///
/// let m = Measurement::new("Power", MeasurementType::Double, 1500.0)
///     .with_unit("W");
/// assert_eq!(m.value.as_f64(), Some(1500.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Measurement {
    /// Name of the measurement.
    #[serde(rename = "NAME")]
    pub name: String,

    /// Type of the measurement.
    #[serde(rename = "TYPE")]
    pub kind: MeasurementType,

    /// Unit of the measurement; empty when the data set carries none.
    #[serde(rename = "UNIT", default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    /// Value of the measurement.
    #[serde(rename = "VALUE")]
    pub value: MeasurementValue,
}

impl Measurement {
    /// Creates a measurement without a unit.
    pub fn new(
        name: impl Into<String>,
        kind: MeasurementType,
        value: impl Into<MeasurementValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            unit: String::new(),
            value: value.into(),
        }
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Serializes a measurement set to its JSON wire representation.
    ///
    /// Emits an array of objects with keys `NAME`, `TYPE`, `UNIT` (omitted
    /// when empty) and `VALUE`, where `VALUE` carries the native JSON type.
    /// Control characters, quotes and backslashes in strings are escaped.
    pub fn to_json(list: &[Measurement]) -> String {
        serde_json::to_string(list).expect("measurement serialization is infallible")
    }
}

// =============================================================================
// Buffer Entry
// =============================================================================

/// A counter-tagged measurement set stored in the ring buffer.
///
/// The measurement list is shared-owned: a snapshot taken during iteration
/// stays readable after the entry has been evicted from the buffer.
///
/// The lock flag is the only field that may change after insertion. It is
/// atomic so consumers can mark an entry as "keep" while holding the
/// buffer's shared lock; a locked entry is never evicted on overflow and
/// never overwritten by a counter-mode-1 reinsertion.
#[derive(Debug)]
pub struct BufferEntry {
    /// ID (counter) of the data set.
    pub id: i64,

    /// The measurements of this data set.
    pub measurements: Arc<Vec<Measurement>>,

    /// Unix epoch milliseconds at which the entry was stored.
    pub created_at_ms: u64,

    locked: AtomicBool,
}

impl BufferEntry {
    /// Creates an unlocked entry.
    pub fn new(id: i64, measurements: Arc<Vec<Measurement>>, created_at_ms: u64) -> Self {
        Self {
            id,
            measurements,
            created_at_ms,
            locked: AtomicBool::new(false),
        }
    }

    /// Returns a snapshot handle to the measurement list.
    ///
    /// The handle keeps the list alive past a later eviction of the entry.
    #[inline]
    pub fn snapshot(&self) -> Arc<Vec<Measurement>> {
        Arc::clone(&self.measurements)
    }

    /// Returns `true` if the entry is protected from overflow eviction.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Sets the lock flag.
    ///
    /// Safe to call while holding the buffer's shared lock; this is the
    /// only mutation the iteration protocol permits.
    #[inline]
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Release);
    }
}

impl Clone for BufferEntry {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            measurements: Arc::clone(&self.measurements),
            created_at_ms: self.created_at_ms,
            locked: AtomicBool::new(self.is_locked()),
        }
    }
}

// =============================================================================
// Reference Data
// =============================================================================

/// An out-of-band binary attachment addressed by a symbolic name.
///
/// `id == 0` means the reference has not yet been bound to a data set; it
/// is patched to the owning entry's ID once a data set referencing the
/// name is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// ID of the data set this reference belongs to (0 if not yet bound).
    pub id: i64,

    /// The symbolic reference name (unique across the table).
    pub name: String,

    /// Data format, e.g. `bmp`, `jpg`, `xml`.
    pub format: String,

    /// The binary content.
    pub content: Vec<u8>,
}

impl ReferenceData {
    /// Returns `true` once the reference belongs to a stored data set.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.id != 0
    }
}

// =============================================================================
// Reset & Deletion Bookkeeping
// =============================================================================

/// Why a buffer reset was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    /// Reason unknown.
    #[default]
    Unknown,

    /// Reset triggered by the system.
    System,

    /// Reset requested by a user.
    User,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetReason::Unknown => write!(f, "unknown"),
            ResetReason::System => write!(f, "system"),
            ResetReason::User => write!(f, "user"),
        }
    }
}

/// Bookkeeping record produced by a reset that discarded at least one
/// entry.
///
/// The empty sentinel (`reset_time_ms == 0`) is returned when a reset hits
/// an empty buffer; it never enters the reset journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResetInformation {
    /// Unix epoch milliseconds at which the reset ran.
    pub reset_time_ms: u64,

    /// Why the reset was performed.
    pub reason: ResetReason,

    /// Storage timestamp of the oldest discarded data set.
    pub oldest_dataset_time_ms: u64,

    /// Storage timestamp of the newest discarded data set.
    pub newest_dataset_time_ms: u64,

    /// Number of data sets discarded.
    pub deleted_count: u64,
}

impl ResetInformation {
    /// Returns `true` for the sentinel produced by resetting an empty
    /// buffer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reset_time_ms == 0
    }
}

/// Bookkeeping record for one entry evicted by buffer overflow.
///
/// Explicit deletes and resets do not produce deletion records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeletionInformation {
    /// Unix epoch milliseconds at which the eviction ran.
    pub deletion_time_ms: u64,

    /// Storage timestamp of the evicted data set.
    pub dataset_time_ms: u64,
}

// =============================================================================
// Counter Mode
// =============================================================================

/// Ordering policy for data-set IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CounterMode {
    /// Mode 0: IDs must be strictly increasing; the producer enforces
    /// ordering and a stale ID is an error.
    #[default]
    Monotonic,

    /// Mode 1: arbitrary IDs; reinserting an existing ID replaces the
    /// entry when it is unlocked and is rejected when it is locked.
    Overwrite,
}

impl CounterMode {
    /// Returns the numeric mode of the QDS protocol (0 or 1).
    #[inline]
    pub fn as_i8(&self) -> i8 {
        match self {
            CounterMode::Monotonic => 0,
            CounterMode::Overwrite => 1,
        }
    }

    /// Converts the numeric mode of the QDS protocol.
    pub fn from_i8(mode: i8) -> Option<Self> {
        match mode {
            0 => Some(CounterMode::Monotonic),
            1 => Some(CounterMode::Overwrite),
            _ => None,
        }
    }
}

impl fmt::Display for CounterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

// =============================================================================
// Tests
// =============================================================================
