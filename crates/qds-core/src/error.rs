// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for the QDS buffer.
//!
//! Every subsystem surfaces its own error enum; [`QdsError`] aggregates
//! them for the data-source façade, whose `add` path can fail in any of
//! the four domains:
//!
//! ```text
//! QdsError (root)
//! ├── ParsingError  - JSON syntax and QDS schema violations
//! ├── BufferError   - ring buffer ordering and capacity violations
//! ├── RefError      - reference table lookups and bindings
//! └── FileIoError   - file operations during path ingestion
//! ```
//!
//! # Examples
//!
//! ```
//! use qds_core::error::{BufferError, QdsError};
//!
//! let error = BufferError::bad_id(3, 7);
//! let root: QdsError = error.into();
//! assert_eq!(root.error_type(), "buffer");
//! ```

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// QdsError - Root Error Type
// =============================================================================

/// The root error type of the QDS buffer.
///
/// All subsystem errors convert into this type, giving the data-source
/// API one error surface.
#[derive(Debug, Error)]
pub enum QdsError {
    /// JSON parsing or schema validation failed.
    #[error("Parsing error: {0}")]
    Parsing(#[from] ParsingError),

    /// Ring buffer rejected the operation.
    #[error("Ring buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Reference table rejected the operation.
    #[error("Reference error: {0}")]
    Ref(#[from] RefError),

    /// A file operation during path ingestion failed.
    #[error("File I/O error: {0}")]
    FileIo(#[from] FileIoError),
}

impl QdsError {
    /// Returns the error domain as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            QdsError::Parsing(_) => "parsing",
            QdsError::Buffer(_) => "buffer",
            QdsError::Ref(_) => "ref",
            QdsError::FileIo(_) => "file_io",
        }
    }
}

// =============================================================================
// ParsingError
// =============================================================================

/// Errors raised by the JSON event parser and the QDS data validator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParsingError {
    /// The input is not well-formed JSON.
    #[error("invalid JSON: {message}")]
    Syntax {
        /// The underlying parser diagnostic.
        message: String,
    },

    /// Non-whitespace input remained after the JSON document.
    #[error("unexpected data after the JSON document")]
    ExtraData,

    /// A key or scalar appeared outside a measurement object.
    #[error("entry '{token}' is not an object")]
    NotAnObject {
        /// The offending token.
        token: String,
    },

    /// An object key is not part of the QDS schema.
    #[error("invalid key '{key}'")]
    InvalidKey {
        /// The unknown key.
        key: String,
    },

    /// A scalar arrived without a preceding key.
    #[error("missing key for value '{value}'")]
    MissingKey {
        /// The orphaned value.
        value: String,
    },

    /// A recognized key appeared twice in one object.
    #[error("duplicate {key} key")]
    DuplicateKey {
        /// The duplicated key.
        key: &'static str,
    },

    /// A scalar has the wrong JSON type for its key.
    #[error("{key} value '{value}' has wrong type ({actual}), should be {expected}")]
    WrongType {
        /// The key being populated.
        key: &'static str,
        /// The offending value, rendered as text.
        value: String,
        /// The JSON type that arrived.
        actual: &'static str,
        /// The JSON type the key requires.
        expected: &'static str,
    },

    /// A required key was absent when the object ended.
    #[error("measurement missing {field}")]
    MissingField {
        /// The missing key.
        field: &'static str,
    },

    /// A value failed its per-type validation.
    #[error("invalid {kind} value '{value}'")]
    InvalidValue {
        /// The measurement type whose rule was violated.
        kind: &'static str,
        /// The offending value, rendered as text.
        value: String,
    },

    /// The value tag does not match the declared measurement type.
    #[error("VALUE of '{name}' does not match its TYPE")]
    TypeMismatch {
        /// Name of the offending measurement.
        name: String,
    },

    /// Object events arrived in an impossible order.
    #[error("invalid JSON structure")]
    InvalidStructure,
}

impl ParsingError {
    /// Creates a syntax error from a parser diagnostic.
    pub fn syntax(message: impl ToString) -> Self {
        Self::Syntax {
            message: message.to_string(),
        }
    }

    /// Creates a not-an-object error.
    pub fn not_an_object(token: impl Into<String>) -> Self {
        Self::NotAnObject { token: token.into() }
    }

    /// Creates an invalid-key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    /// Creates a missing-key error.
    pub fn missing_key(value: impl Into<String>) -> Self {
        Self::MissingKey { value: value.into() }
    }

    /// Creates a duplicate-key error.
    pub fn duplicate_key(key: &'static str) -> Self {
        Self::DuplicateKey { key }
    }

    /// Creates a wrong-type error.
    pub fn wrong_type(
        key: &'static str,
        value: impl Into<String>,
        actual: &'static str,
        expected: &'static str,
    ) -> Self {
        Self::WrongType {
            key,
            value: value.into(),
            actual,
            expected,
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid-value error.
    pub fn invalid_value(kind: &'static str, value: impl ToString) -> Self {
        Self::InvalidValue {
            kind,
            value: value.to_string(),
        }
    }

    /// Creates a type-mismatch error.
    pub fn type_mismatch(name: impl Into<String>) -> Self {
        Self::TypeMismatch { name: name.into() }
    }
}

// =============================================================================
// BufferError
// =============================================================================

/// Errors raised by the ring buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Counter mode 0 requires strictly increasing IDs.
    #[error("bad id {id}, last stored id is {last_id}")]
    BadId {
        /// The rejected ID.
        id: i64,
        /// The ID currently at the buffer tail.
        last_id: i64,
    },

    /// The buffer is full and overflow eviction is disabled.
    #[error("data overflow, buffer is full")]
    Overflow,
}

impl BufferError {
    /// Creates a bad-id error.
    pub fn bad_id(id: i64, last_id: i64) -> Self {
        Self::BadId { id, last_id }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            BufferError::BadId { .. } => "bad_id",
            BufferError::Overflow => "overflow",
        }
    }
}

// =============================================================================
// RefError
// =============================================================================

/// Errors raised by the reference table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefError {
    /// The reference name is already registered.
    #[error("reference '{name}' exists already")]
    Exists {
        /// The duplicated name.
        name: String,
    },

    /// No reference is registered under the name.
    #[error("reference '{name}' not found")]
    NotFound {
        /// The missing name.
        name: String,
    },

    /// The reference is already bound to a data set and cannot be rebound.
    #[error("reference '{name}' is already in use")]
    InUse {
        /// The bound name.
        name: String,
    },

    /// A REF value is neither a registered reference nor an existing file.
    #[error("the reference of '{name}' is neither an existing file nor a registered reference")]
    Invalid {
        /// Name of the measurement carrying the value.
        name: String,
    },
}

impl RefError {
    /// Creates an already-exists error.
    pub fn exists(name: impl Into<String>) -> Self {
        Self::Exists { name: name.into() }
    }

    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an in-use error.
    pub fn in_use(name: impl Into<String>) -> Self {
        Self::InUse { name: name.into() }
    }

    /// Creates an invalid-reference error.
    pub fn invalid(name: impl Into<String>) -> Self {
        Self::Invalid { name: name.into() }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            RefError::Exists { .. } => "exists",
            RefError::NotFound { .. } => "not_found",
            RefError::InUse { .. } => "in_use",
            RefError::Invalid { .. } => "invalid",
        }
    }
}

// =============================================================================
// FileIoError
// =============================================================================

/// Errors raised by file operations during reference path ingestion.
///
/// Path ingestion reads a file and then deletes it; the sequence is not
/// crash-safe, and a failure between read and delete leaves the file in
/// place.
#[derive(Debug, Error)]
pub enum FileIoError {
    /// Reading the file failed.
    #[error("could not read file '{path}': {source}")]
    Read {
        /// The ingested path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is empty.
    #[error("file '{path}' is empty")]
    Empty {
        /// The ingested path.
        path: PathBuf,
    },

    /// Deleting the file after reading it failed.
    #[error("could not delete file '{path}': {source}")]
    Delete {
        /// The ingested path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FileIoError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates an empty-file error.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::Empty { path: path.into() }
    }

    /// Creates a delete error.
    pub fn delete(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Delete {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with [`QdsError`].
pub type QdsResult<T> = Result<T, QdsError>;

/// A Result type with [`ParsingError`].
pub type ParsingResult<T> = Result<T, ParsingError>;

/// A Result type with [`BufferError`].
pub type BufferResult<T> = Result<T, BufferError>;

/// A Result type with [`RefError`].
pub type RefResult<T> = Result<T, RefError>;

// =============================================================================
// Tests
// =============================================================================
