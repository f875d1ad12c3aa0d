// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Buffer Integration Tests
//!
//! Cross-module behavior of the ring buffer observed through the data
//! source:
//!
//! - Entry locking under the shared-lock iteration protocol
//! - Overflow eviction and the deletion journal
//! - Snapshot stability across eviction

use qds_buffer::{DataSource, DataSourceConfig, PushOutcome};
use qds_core::error::QdsError;
use qds_core::types::ResetReason;

use qds_tests::common::fixtures::DataSetFixtures;

// =============================================================================
// Lock Protocol
// =============================================================================

#[test]
fn test_locked_entry_survives_overflow() {
    let source = DataSource::new(DataSourceConfig::builder().buffer_size(3).build());

    for id in [1, 2, 3] {
        source.add(id, DataSetFixtures::dummy()).unwrap();
    }

    // Mark the middle entry as "keep" while holding the shared lock.
    {
        let entries = source.entries();
        entries[1].set_locked(true);
    }

    for id in [4, 5, 6] {
        source.add(id, DataSetFixtures::dummy()).unwrap();
    }

    let entries = source.entries();
    let ids: Vec<i64> = entries.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![2, 5, 6]);
}

#[test]
fn test_fully_locked_buffer_declines_pushes() {
    let source = DataSource::new(DataSourceConfig::builder().buffer_size(2).build());

    source.add(1, DataSetFixtures::dummy()).unwrap();
    source.add(2, DataSetFixtures::dummy()).unwrap();
    {
        let entries = source.entries();
        entries[0].set_locked(true);
        entries[1].set_locked(true);
    }

    let outcome = source.add(3, DataSetFixtures::dummy()).unwrap();
    assert_eq!(outcome, PushOutcome::RejectedByLock);
    assert_eq!(source.size(), 2);
    assert_eq!(source.last_id(), 2);

    // Unlocking makes room again.
    source.entries()[0].set_locked(false);
    let outcome = source.add(3, DataSetFixtures::dummy()).unwrap();
    assert_eq!(outcome, PushOutcome::Stored { evicted: 1 });
}

// =============================================================================
// Deletion Journal
// =============================================================================

#[test]
fn test_deletion_journal_records_only_overflow() {
    let source = DataSource::new(DataSourceConfig::builder().buffer_size(2).build());

    source.add(1, DataSetFixtures::dummy()).unwrap();
    source.add(2, DataSetFixtures::dummy()).unwrap();

    // Explicit delete and reset are silent in the deletion journal.
    source.delete(1);
    source.reset(ResetReason::User);
    assert!(!source.is_overflown());

    source.add(3, DataSetFixtures::dummy()).unwrap();
    source.add(4, DataSetFixtures::dummy()).unwrap();
    source.add(5, DataSetFixtures::dummy()).unwrap();
    assert!(source.is_overflown());

    let journal = source.acknowledge_overflow();
    assert_eq!(journal.len(), 1);
    assert!(journal.list()[0].deletion_time_ms >= journal.list()[0].dataset_time_ms);
}

#[test]
fn test_deletion_journal_cap_latches() {
    let source = DataSource::new(
        DataSourceConfig::builder()
            .buffer_size(1)
            .deletion_journal_cap(3)
            .build(),
    );

    // Each push past the first evicts one entry.
    for id in 0..6 {
        source.add(id, DataSetFixtures::dummy()).unwrap();
    }

    let journal = source.acknowledge_overflow();
    assert_eq!(journal.len(), 3);
    assert!(journal.exceeded_max_entries());

    // The acknowledge cleared journal and latch.
    source.add(100, DataSetFixtures::dummy()).unwrap();
    let journal = source.acknowledge_overflow();
    assert_eq!(journal.len(), 1);
    assert!(!journal.exceeded_max_entries());
}

// =============================================================================
// Overflow Disabled
// =============================================================================

#[test]
fn test_overflow_disabled_rejects_with_error() {
    let source = DataSource::new(
        DataSourceConfig::builder()
            .buffer_size(2)
            .allow_overflow(false)
            .build(),
    );

    source.add(1, DataSetFixtures::dummy()).unwrap();
    source.add(2, DataSetFixtures::dummy()).unwrap();

    let error = source.add(3, DataSetFixtures::dummy()).unwrap_err();
    assert!(matches!(error, QdsError::Buffer(_)));
    assert_eq!(source.size(), 2);
    assert!(!source.is_overflown());
    assert!(!source.allow_overflow());
}

// =============================================================================
// Snapshot Stability
// =============================================================================

#[test]
fn test_snapshot_outlives_eviction() {
    let source = DataSource::new(DataSourceConfig::builder().buffer_size(1).build());

    source.add(1, DataSetFixtures::machining()).unwrap();
    let snapshot = source.entries()[0].snapshot();

    // Overflow evicts the snapshotted entry.
    source.add(2, DataSetFixtures::dummy()).unwrap();
    assert_eq!(source.entries()[0].id, 2);

    // The shared-owned measurement list stays readable.
    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot[0].value.as_str(), Some("cut-42"));
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn test_journal_cap_getters() {
    let source = DataSource::new(
        DataSourceConfig::builder()
            .reset_journal_cap(11)
            .deletion_journal_cap(22)
            .build(),
    );
    assert_eq!(source.reset_journal_cap(), 11);
    assert_eq!(source.deletion_journal_cap(), 22);
}
