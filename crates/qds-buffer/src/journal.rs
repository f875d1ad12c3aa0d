// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bounded bookkeeping journals.
//!
//! Reset and overflow events are recorded in capped FIFO journals until a
//! consumer acknowledges them. The journals are lossy by design: when the
//! cap is exceeded the oldest record is dropped and the
//! `exceeded_max_entries` flag latches until the next acknowledge.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use qds_core::types::{DeletionInformation, ResetInformation};

/// Journal of reset events awaiting acknowledgement.
pub type ResetJournal = Journal<ResetInformation>;

/// Journal of overflow-eviction events awaiting acknowledgement.
pub type DeletionJournal = Journal<DeletionInformation>;

// =============================================================================
// Journal
// =============================================================================

/// A bounded FIFO of bookkeeping records with a latched overflow flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal<T> {
    list: VecDeque<T>,
    exceeded_max_entries: bool,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        Self {
            list: VecDeque::new(),
            exceeded_max_entries: false,
        }
    }
}

impl<T> Journal<T> {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, dropping the oldest one when `cap` is exceeded.
    ///
    /// A drop latches `exceeded_max_entries` until the journal is taken.
    pub fn push_capped(&mut self, record: T, cap: usize) {
        self.list.push_back(record);
        if self.list.len() > cap {
            self.list.pop_front();
            self.exceeded_max_entries = true;
        }
    }

    /// Returns the recorded events, oldest first.
    pub fn list(&self) -> &VecDeque<T> {
        &self.list
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if nothing awaits acknowledgement.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if records were dropped since the last acknowledge.
    pub fn exceeded_max_entries(&self) -> bool {
        self.exceeded_max_entries
    }

    /// Takes the journal content, leaving an empty journal with the
    /// overflow flag cleared.
    pub fn take(&mut self) -> Journal<T> {
        std::mem::take(self)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_cap() {
        let mut journal: Journal<u32> = Journal::new();
        journal.push_capped(1, 3);
        journal.push_capped(2, 3);
        journal.push_capped(3, 3);

        assert_eq!(journal.len(), 3);
        assert!(!journal.exceeded_max_entries());
    }

    #[test]
    fn test_cap_drops_oldest_and_latches() {
        let mut journal: Journal<u32> = Journal::new();
        for record in 1..=5 {
            journal.push_capped(record, 3);
        }

        assert_eq!(journal.len(), 3);
        assert!(journal.exceeded_max_entries());
        assert_eq!(journal.list().iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_take_resets_journal_and_latch() {
        let mut journal: Journal<u32> = Journal::new();
        for record in 1..=5 {
            journal.push_capped(record, 3);
        }

        let taken = journal.take();
        assert_eq!(taken.len(), 3);
        assert!(taken.exceeded_max_entries());

        assert!(journal.is_empty());
        assert!(!journal.exceeded_max_entries());
    }

    #[test]
    fn test_latch_survives_further_pushes() {
        let mut journal: Journal<u32> = Journal::new();
        for record in 1..=4 {
            journal.push_capped(record, 3);
        }
        assert!(journal.exceeded_max_entries());

        // No further drop, but the latch stays set.
        journal.take();
        journal.push_capped(9, 3);
        assert!(!journal.exceeded_max_entries());
    }
}
