// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # qds-parsing
//!
//! Streaming JSON parsing and schema validation for QDS measurement sets.
//!
//! The crate splits the producer-side input path into two layers:
//!
//! - [`parser`]: a depth-bounded event parser streaming `serde_json`
//!   tokens to an [`parser::EventHandler`] without building a tree
//! - [`validator`]: the QDS schema rules, accumulating validated
//!   [`qds_core::types::Measurement`] lists
//! - [`timestamp`]: the ISO-8601 acceptance grammar for `TIMESTAMP`
//!   values
//!
//! ## Example
//!
//! ```
//! use qds_parsing::parse_measurements;
//!
//! let set = parse_measurements(
//!     r#"[
//!         {"NAME":"ProgramName","TYPE":"STRING","VALUE":"test"},
//!         {"NAME":"ProgramNumber","TYPE":"INT","VALUE":1}
//!     ]"#,
//! ).unwrap();
//!
//! assert_eq!(set.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod parser;
pub mod timestamp;
pub mod validator;

pub use parser::{EventHandler, JsonParser, ParserEvent};
pub use validator::{parse_measurements, DataValidator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
