// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # qds-buffer
//!
//! Thread-safe, in-process ring buffer for QDS (Quality Data Streaming)
//! measurement sets produced by industrial equipment.
//!
//! Producers feed counter-tagged JSON data sets; consumers iterate the
//! live buffer, observe reset and overflow bookkeeping, and resolve
//! binary reference attachments by name. Memory is bounded: when the
//! buffer is full the oldest unlocked entries are discarded, and
//! operators can pin entries past overflow by locking them.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         DataSource                            │
//! │                                                               │
//! │  JSON ──▶ parser+validator ──▶ reference pass ──▶ RingBuffer  │
//! │                                     │                 │       │
//! │                                     ▼                 │ hook  │
//! │                              ReferenceTable ◀─────────┤       │
//! │                                                       ▼       │
//! │                    ResetJournal / DeletionJournal (capped)    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use qds_buffer::{DataSource, DataSourceConfig};
//! use qds_core::types::ResetReason;
//!
//! let source = DataSource::new(DataSourceConfig::default());
//!
//! source.add(0, r#"[
//!     {"NAME":"ProgramName","TYPE":"STRING","VALUE":"test"},
//!     {"NAME":"ProgramNumber","TYPE":"INT","VALUE":1}
//! ]"#).unwrap();
//!
//! assert_eq!(source.size(), 1);
//! assert_eq!(source.last_id(), 0);
//!
//! // Consumers iterate under the shared lock.
//! for entry in source.entries().iter() {
//!     assert_eq!(entry.measurements.len(), 2);
//! }
//!
//! source.reset(ResetReason::User);
//! assert_eq!(source.size(), 0);
//! ```
//!
//! ## Module Overview
//!
//! - [`ring`]: the bounded FIFO with counter modes, entry locking and the
//!   delete-notification hook
//! - [`refs`]: the dual-indexed reference table with path ingestion
//! - [`journal`]: capped bookkeeping journals with a latched overflow flag
//! - [`source`]: the façade, capability views and factory
//! - [`config`]: data-source configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod journal;
pub mod refs;
pub mod ring;
pub mod source;

pub use config::{DataSourceConfig, DataSourceConfigBuilder};
pub use journal::{DeletionJournal, Journal, ResetJournal};
pub use refs::ReferenceTable;
pub use ring::{DeleteEvent, OnDelete, PushOutcome, RingBuffer};
pub use source::{
    DataSource, DataSourceFactory, DataSourceIn, DataSourceInOut, DataSourceInfo, DataSourceOut,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::config::DataSourceConfig;
    pub use crate::ring::PushOutcome;
    pub use crate::source::{DataSource, DataSourceIn, DataSourceInOut, DataSourceOut};
    pub use qds_core::error::{QdsError, QdsResult};
    pub use qds_core::types::{Measurement, MeasurementType, MeasurementValue, ResetReason};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = DataSourceConfig::default();
        assert!(config.buffer_size > 0);
        assert!(config.allow_overflow);
    }
}
