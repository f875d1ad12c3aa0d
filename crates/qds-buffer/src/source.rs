// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The QDS data source.
//!
//! [`DataSource`] composes the parser, the ring buffer and the reference
//! table into the public API, maintains the reset and deletion journals,
//! and wires the buffer's delete hook to reference cleanup and journal
//! bookkeeping.
//!
//! Two capability views scope access for producers and consumers:
//! [`DataSourceIn`] (add, register references, reset) and
//! [`DataSourceOut`] (delete, acknowledge bookkeeping, iterate, resolve
//! references). [`DataSourceInOut`] merges both;
//! [`DataSourceFactory::create`] hands out the merged view.
//!
//! # Lock order
//!
//! The reference lock is taken alone during the reference-resolution
//! pass and released before the buffer lock. The delete hook runs under
//! the buffer lock and takes the reference lock and the deletion-journal
//! lock; `reset` takes the reset-journal lock and then the buffer lock.
//! No path acquires the buffer lock while holding only an inner lock, so
//! the partial order is free of cycles.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{info, warn};

use qds_core::error::QdsResult;
use qds_core::types::{
    BufferEntry, CounterMode, DeletionInformation, Measurement, MeasurementType, ReferenceData,
    ResetReason,
};
use qds_parsing::parse_measurements;

use crate::config::DataSourceConfig;
use crate::journal::{DeletionJournal, ResetJournal};
use crate::refs::ReferenceTable;
use crate::ring::{DeleteEvent, OnDelete, PushOutcome, RingBuffer};

// =============================================================================
// Capability Views
// =============================================================================

/// Metadata getters shared by the input and output views.
pub trait DataSourceInfo: Send + Sync {
    /// Returns the number of stored data sets.
    fn size(&self) -> usize;

    /// Returns the buffer capacity.
    fn max_size(&self) -> usize;

    /// Returns the ID of the newest data set, or -1 when empty.
    fn last_id(&self) -> i64;

    /// Returns the active counter mode.
    fn counter_mode(&self) -> CounterMode;

    /// Returns the overflow policy.
    fn allow_overflow(&self) -> bool;
}

/// The producer-side view of a data source.
pub trait DataSourceIn: DataSourceInfo {
    /// Adds a QDS data set from its JSON representation.
    fn add(&self, id: i64, json: &str) -> QdsResult<PushOutcome>;

    /// Registers a reference attachment under a caller-chosen name.
    fn set_reference(&self, name: &str, content: Vec<u8>, format: &str) -> QdsResult<()>;

    /// Discards all stored data sets and references.
    fn reset(&self, reason: ResetReason);
}

/// The consumer-side view of a data source.
pub trait DataSourceOut: DataSourceInfo {
    /// Deletes the data set with the given ID; absence is success.
    fn delete(&self, id: i64);

    /// Returns `true` if unacknowledged reset records exist.
    fn is_reset(&self) -> bool;

    /// Takes the reset journal, leaving it empty with the latch cleared.
    fn acknowledge_reset(&self) -> ResetJournal;

    /// Returns `true` if unacknowledged overflow-eviction records exist.
    fn is_overflown(&self) -> bool;

    /// Takes the deletion journal, leaving it empty with the latch
    /// cleared.
    fn acknowledge_overflow(&self) -> DeletionJournal;

    /// Resolves a reference attachment by name.
    fn get_reference(&self, name: &str) -> QdsResult<ReferenceData>;

    /// Returns the shared-lock iteration handle over the buffer.
    ///
    /// Hold the guard while traversing. The entry lock flag is the only
    /// field that may be mutated through it; everything else goes through
    /// the write API.
    fn entries(&self) -> RwLockReadGuard<'_, VecDeque<BufferEntry>>;
}

/// The merged producer and consumer view.
pub trait DataSourceInOut: DataSourceIn + DataSourceOut {
    /// Returns the reset journal cap.
    fn reset_journal_cap(&self) -> usize;

    /// Returns the deletion journal cap.
    fn deletion_journal_cap(&self) -> usize;
}

// =============================================================================
// Data Source
// =============================================================================

/// Thread-safe QDS data source.
pub struct DataSource {
    buffer: RingBuffer,
    references: Arc<ReferenceTable>,
    reset_journal: RwLock<ResetJournal>,
    deletion_journal: Arc<RwLock<DeletionJournal>>,
    config: DataSourceConfig,
}

impl DataSource {
    /// Creates a data source from its configuration.
    pub fn new(config: DataSourceConfig) -> Self {
        let references = Arc::new(ReferenceTable::new());
        let deletion_journal = Arc::new(RwLock::new(DeletionJournal::new()));

        // The hook runs under the buffer lock; it only takes the
        // reference lock and the deletion-journal lock.
        let hook_references = Arc::clone(&references);
        let hook_journal = Arc::clone(&deletion_journal);
        let deletion_cap = config.deletion_journal_cap;
        let on_delete: OnDelete = Box::new(move |event| match event {
            DeleteEvent::Evicted { entry, at_ms } => {
                hook_journal.write().push_capped(
                    DeletionInformation {
                        deletion_time_ms: at_ms,
                        dataset_time_ms: entry.created_at_ms,
                    },
                    deletion_cap,
                );
                hook_references.unbind(entry.id);
            }
            DeleteEvent::Removed { entry } => hook_references.unbind(entry.id),
            DeleteEvent::Cleared => hook_references.clear(),
        });

        let buffer = RingBuffer::new(
            config.buffer_size,
            config.counter_mode,
            config.allow_overflow,
            Some(on_delete),
        );

        Self {
            buffer,
            references,
            reset_journal: RwLock::new(ResetJournal::new()),
            deletion_journal,
            config,
        }
    }

    /// Adds a QDS data set from its JSON representation.
    ///
    /// The document is parsed and validated, `REF` measurements are
    /// resolved against the reference table (binding registered
    /// references, ingesting file paths), and the measurement set is
    /// pushed to the buffer. When the push is declined or any step fails
    /// after references were bound, the references bound under this ID
    /// are unbound again and the buffer is left unchanged.
    pub fn add(&self, id: i64, json: &str) -> QdsResult<PushOutcome> {
        let mut measurements = parse_measurements(json)?;

        if let Err(error) = self.bind_references(id, &mut measurements) {
            self.references.unbind(id);
            return Err(error);
        }

        match self.buffer.push(id, Arc::new(measurements)) {
            Ok(PushOutcome::Stored { evicted }) => Ok(PushOutcome::Stored { evicted }),
            Ok(PushOutcome::RejectedByLock) => {
                warn!(id, "data set declined, surviving entries are locked");
                self.references.unbind(id);
                Ok(PushOutcome::RejectedByLock)
            }
            Err(error) => {
                self.references.unbind(id);
                Err(error.into())
            }
        }
    }

    fn bind_references(&self, id: i64, measurements: &mut [Measurement]) -> QdsResult<()> {
        for measurement in measurements
            .iter_mut()
            .filter(|measurement| measurement.kind == MeasurementType::Ref)
        {
            self.references.bind_or_ingest(id, measurement)?;
        }
        Ok(())
    }

    /// Registers a reference attachment under a caller-chosen name.
    pub fn set_reference(&self, name: &str, content: Vec<u8>, format: &str) -> QdsResult<()> {
        self.references
            .set_reference(name, content, format)
            .map_err(Into::into)
    }

    /// Resolves a reference attachment by name.
    pub fn get_reference(&self, name: &str) -> QdsResult<ReferenceData> {
        self.references.get(name).map_err(Into::into)
    }

    /// Deletes the data set with the given ID; absence is success.
    ///
    /// References bound to the data set are erased through the delete
    /// hook.
    pub fn delete(&self, id: i64) {
        self.buffer.delete(id);
    }

    /// Discards all stored data sets and references.
    ///
    /// A reset of a non-empty buffer is recorded in the reset journal;
    /// resetting an empty buffer journals nothing.
    pub fn reset(&self, reason: ResetReason) {
        let mut journal = self.reset_journal.write();

        let information = self.buffer.reset(reason);
        if information.is_empty() {
            return;
        }

        info!(
            reason = %information.reason,
            deleted = information.deleted_count,
            "buffer reset"
        );
        journal.push_capped(information, self.config.reset_journal_cap);
    }

    /// Returns `true` if unacknowledged reset records exist.
    pub fn is_reset(&self) -> bool {
        !self.reset_journal.read().is_empty()
    }

    /// Takes the reset journal, leaving it empty with the latch cleared.
    pub fn acknowledge_reset(&self) -> ResetJournal {
        self.reset_journal.write().take()
    }

    /// Returns `true` if unacknowledged overflow-eviction records exist.
    pub fn is_overflown(&self) -> bool {
        !self.deletion_journal.read().is_empty()
    }

    /// Takes the deletion journal, leaving it empty with the latch
    /// cleared.
    pub fn acknowledge_overflow(&self) -> DeletionJournal {
        self.deletion_journal.write().take()
    }

    /// Returns the shared-lock iteration handle over the buffer.
    pub fn entries(&self) -> RwLockReadGuard<'_, VecDeque<BufferEntry>> {
        self.buffer.entries()
    }

    /// Returns the number of stored data sets.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the buffer capacity.
    pub fn max_size(&self) -> usize {
        self.buffer.max_size()
    }

    /// Returns the ID of the newest data set, or -1 when empty.
    pub fn last_id(&self) -> i64 {
        self.buffer.last_id()
    }

    /// Returns the active counter mode.
    pub fn counter_mode(&self) -> CounterMode {
        self.buffer.counter_mode()
    }

    /// Returns the overflow policy.
    pub fn allow_overflow(&self) -> bool {
        self.buffer.allow_overflow()
    }

    /// Returns the reset journal cap.
    pub fn reset_journal_cap(&self) -> usize {
        self.config.reset_journal_cap
    }

    /// Returns the deletion journal cap.
    pub fn deletion_journal_cap(&self) -> usize {
        self.config.deletion_journal_cap
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("buffer", &self.buffer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataSourceInfo for DataSource {
    fn size(&self) -> usize {
        DataSource::size(self)
    }

    fn max_size(&self) -> usize {
        DataSource::max_size(self)
    }

    fn last_id(&self) -> i64 {
        DataSource::last_id(self)
    }

    fn counter_mode(&self) -> CounterMode {
        DataSource::counter_mode(self)
    }

    fn allow_overflow(&self) -> bool {
        DataSource::allow_overflow(self)
    }
}

impl DataSourceIn for DataSource {
    fn add(&self, id: i64, json: &str) -> QdsResult<PushOutcome> {
        DataSource::add(self, id, json)
    }

    fn set_reference(&self, name: &str, content: Vec<u8>, format: &str) -> QdsResult<()> {
        DataSource::set_reference(self, name, content, format)
    }

    fn reset(&self, reason: ResetReason) {
        DataSource::reset(self, reason)
    }
}

impl DataSourceOut for DataSource {
    fn delete(&self, id: i64) {
        DataSource::delete(self, id)
    }

    fn is_reset(&self) -> bool {
        DataSource::is_reset(self)
    }

    fn acknowledge_reset(&self) -> ResetJournal {
        DataSource::acknowledge_reset(self)
    }

    fn is_overflown(&self) -> bool {
        DataSource::is_overflown(self)
    }

    fn acknowledge_overflow(&self) -> DeletionJournal {
        DataSource::acknowledge_overflow(self)
    }

    fn get_reference(&self, name: &str) -> QdsResult<ReferenceData> {
        DataSource::get_reference(self, name)
    }

    fn entries(&self) -> RwLockReadGuard<'_, VecDeque<BufferEntry>> {
        DataSource::entries(self)
    }
}

impl DataSourceInOut for DataSource {
    fn reset_journal_cap(&self) -> usize {
        DataSource::reset_journal_cap(self)
    }

    fn deletion_journal_cap(&self) -> usize {
        DataSource::deletion_journal_cap(self)
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Factory for shared data-source handles.
pub struct DataSourceFactory;

impl DataSourceFactory {
    /// Creates a data source behind the merged capability view.
    ///
    /// Borrow the concrete [`DataSource`] as `&dyn DataSourceIn` or
    /// `&dyn DataSourceOut` to hand a restricted surface to producers or
    /// consumers.
    pub fn create(config: DataSourceConfig) -> Arc<dyn DataSourceInOut> {
        Arc::new(DataSource::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
