// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # qds-core
//!
//! Core data model and error types for the QDS (Quality Data Streaming)
//! buffer.
//!
//! This crate provides the foundational types shared by the parsing and
//! buffering crates:
//!
//! - **Types**: `Measurement`, `MeasurementType`, `MeasurementValue`,
//!   `BufferEntry`, `ReferenceData`, reset/deletion bookkeeping records
//! - **Error**: the unified error hierarchy rooted at `QdsError`
//!
//! ## Example
//!
//! ```
//! use qds_core::types::{Measurement, MeasurementType};
//!
//! let set = vec![
//!     Measurement::new("ProgramName", MeasurementType::String, "test"),
//!     Measurement::new("ProgramNumber", MeasurementType::Integer, 1i64),
//! ];
//!
//! let json = Measurement::to_json(&set);
//! assert!(json.starts_with("[{\"NAME\":\"ProgramName\""));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{
    BufferError, BufferResult, FileIoError, ParsingError, ParsingResult, QdsError, QdsResult,
    RefError, RefResult,
};
pub use types::{
    BufferEntry, CounterMode, DeletionInformation, Measurement, MeasurementType, MeasurementValue,
    ReferenceData, ResetInformation, ResetReason,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
