// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Reference table for REF measurement attachments.
//!
//! The table maps unique symbolic names to [`ReferenceData`] and keeps a
//! secondary index from owning entry ID to the names bound to it, so the
//! delete hook can bulk-erase everything an evicted data set owned. Both
//! indices live behind one lock and are kept in lockstep.
//!
//! A REF value that names no registered reference is treated as a file
//! path: the file is read whole, deleted, and replaced by a synthesized
//! `ref-<n>` name. Reading and deleting are separate steps and not
//! crash-safe; a crash in between leaves an orphan file behind.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use parking_lot::RwLock;
use tracing::debug;

use qds_core::error::{FileIoError, QdsResult, RefError, RefResult};
use qds_core::types::{Measurement, MeasurementValue, ReferenceData};

// =============================================================================
// Reference Table
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    /// Unique name index owning the records.
    by_name: HashMap<String, ReferenceData>,

    /// Entry-ID index (non-unique, including the unbound id 0).
    by_id: HashMap<i64, HashSet<String>>,

    /// Synthesized-name counter; monotonic, never reused, survives clear.
    next_ref: u64,
}

/// Thread-safe, dual-indexed store of reference attachments.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    inner: RwLock<Tables>,
}

impl ReferenceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reference under a caller-chosen name.
    ///
    /// The reference starts unbound (`id == 0`) and is patched to an entry
    /// ID once a data set referencing the name is accepted. Fails with
    /// [`RefError::Exists`] when the name is taken.
    pub fn set_reference(&self, name: &str, content: Vec<u8>, format: &str) -> RefResult<()> {
        let mut tables = self.inner.write();

        if tables.by_name.contains_key(name) {
            return Err(RefError::exists(name));
        }

        // id = 0, it will get updated once the measurement arrives.
        tables.by_name.insert(
            name.to_string(),
            ReferenceData {
                id: 0,
                name: name.to_string(),
                format: format.to_string(),
                content,
            },
        );
        tables.by_id.entry(0).or_default().insert(name.to_string());

        Ok(())
    }

    /// Looks up a reference by name.
    pub fn get(&self, name: &str) -> RefResult<ReferenceData> {
        self.inner
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| RefError::not_found(name))
    }

    /// Resolves one `Ref`-typed measurement against the table.
    ///
    /// If the measurement's value names a registered reference, the
    /// reference is bound to `entry_id` ([`RefError::InUse`] when already
    /// bound to another data set). Otherwise the value is treated as a
    /// file path: the file is read whole and deleted, the content is
    /// stored under a synthesized `ref-<n>` name bound to `entry_id`, and
    /// the measurement's value is rewritten to that name. A path that
    /// cannot be opened fails with [`RefError::Invalid`].
    pub fn bind_or_ingest(&self, entry_id: i64, measurement: &mut Measurement) -> QdsResult<()> {
        let mut tables = self.inner.write();
        let Tables {
            by_name,
            by_id,
            next_ref,
        } = &mut *tables;

        let Some(value) = measurement.value.as_str().map(str::to_string) else {
            return Err(RefError::invalid(measurement.name.clone()).into());
        };

        if let Some(reference) = by_name.get_mut(&value) {
            // A registered reference exists; bind it if still unbound.
            if reference.is_bound() {
                return Err(RefError::in_use(value).into());
            }
            reference.id = entry_id;
            if let Some(names) = by_id.get_mut(&0) {
                names.remove(&value);
            }
            by_id.entry(entry_id).or_default().insert(value);
            return Ok(());
        }

        // Not a registered reference; probe the value as a file path.
        let path = Path::new(&value);
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(_) => return Err(RefError::invalid(measurement.name.clone()).into()),
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|source| FileIoError::read(path, source))?;
        drop(file);

        if content.is_empty() {
            return Err(FileIoError::empty(path).into());
        }

        fs::remove_file(path).map_err(|source| FileIoError::delete(path, source))?;

        let reference_name = format!("ref-{}", *next_ref);
        *next_ref += 1;

        let format = match value.rfind('.') {
            Some(position) => &value[position + 1..],
            None => "unknown",
        };

        debug!(
            reference = %reference_name,
            format = %format,
            bytes = content.len(),
            "ingested file into reference table"
        );

        by_name.insert(
            reference_name.clone(),
            ReferenceData {
                id: entry_id,
                name: reference_name.clone(),
                format: format.to_string(),
                content,
            },
        );
        by_id
            .entry(entry_id)
            .or_default()
            .insert(reference_name.clone());

        // The measurement now carries the synthesized name, not the path.
        measurement.value = MeasurementValue::String(reference_name);

        Ok(())
    }

    /// Erases every reference bound to `entry_id`.
    ///
    /// Unbound references (`id == 0`) are never touched; `entry_id == 0`
    /// is a no-op.
    pub fn unbind(&self, entry_id: i64) {
        if entry_id == 0 {
            return;
        }

        let mut tables = self.inner.write();
        let Tables { by_name, by_id, .. } = &mut *tables;

        if let Some(names) = by_id.remove(&entry_id) {
            for name in names {
                by_name.remove(&name);
            }
        }
    }

    /// Drops the whole table, keeping the synthesized-name counter.
    pub fn clear(&self) {
        let mut tables = self.inner.write();
        tables.by_name.clear();
        tables.by_id.clear();
    }

    /// Returns the number of stored references.
    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_name.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
