// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bounded ring buffer for QDS data sets.
//!
//! The buffer is a FIFO of [`BufferEntry`] with a capacity cap and two
//! counter-ordering policies. When a push finds the buffer full and
//! overflow is allowed, the oldest unlocked entries are evicted; locked
//! entries survive overflow and, in counter mode 1, reinsertion.
//!
//! A single delete-notification hook observes every removal. The hook
//! runs under the buffer's exclusive lock and must not take that lock
//! again; the lock order (reference table and journals after the buffer
//! lock) is the data-source layer's contract.
//!
//! # Thread Safety
//!
//! All operations lock an internal `parking_lot::RwLock`. Consumers
//! iterate under the shared guard returned by [`RingBuffer::entries`] and
//! may flip an entry's lock flag through it; every other mutation goes
//! through the exclusive-locking methods.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{RwLock, RwLockReadGuard};
use tracing::debug;

use qds_core::error::{BufferError, BufferResult};
use qds_core::types::{BufferEntry, CounterMode, Measurement, ResetInformation, ResetReason};

// =============================================================================
// Delete Notifications
// =============================================================================

/// A removal observed by the delete-notification hook.
#[derive(Debug)]
pub enum DeleteEvent<'a> {
    /// The entry was evicted because the buffer overflowed.
    Evicted {
        /// The evicted entry.
        entry: &'a BufferEntry,
        /// Unix epoch milliseconds of the eviction.
        at_ms: u64,
    },

    /// The entry was removed by an explicit delete or a counter-mode-1
    /// reinsertion.
    Removed {
        /// The removed entry.
        entry: &'a BufferEntry,
    },

    /// The whole buffer was cleared by a reset.
    Cleared,
}

/// Delete-notification hook type.
///
/// Invoked with the buffer's exclusive lock held; the hook must not fail
/// and must not call back into the buffer.
pub type OnDelete = Box<dyn Fn(DeleteEvent<'_>) + Send + Sync>;

// =============================================================================
// Push Outcome
// =============================================================================

/// Result of a successful [`RingBuffer::push`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The data set was stored; `evicted` entries were discarded to make
    /// room.
    Stored {
        /// Number of overflow evictions performed by this push.
        evicted: usize,
    },

    /// The data set was declined without an error: every surviving entry
    /// is locked (buffer full), or a counter-mode-1 reinsertion hit a
    /// locked entry.
    RejectedByLock,
}

impl PushOutcome {
    /// Returns `true` if the data set was stored.
    #[inline]
    pub fn is_stored(&self) -> bool {
        matches!(self, PushOutcome::Stored { .. })
    }

    /// Returns the number of entries evicted by this push.
    #[inline]
    pub fn evicted(&self) -> usize {
        match self {
            PushOutcome::Stored { evicted } => *evicted,
            PushOutcome::RejectedByLock => 0,
        }
    }
}

// =============================================================================
// Ring Buffer
// =============================================================================

/// Bounded, thread-safe FIFO of QDS data sets.
pub struct RingBuffer {
    max_size: usize,
    counter_mode: CounterMode,
    allow_overflow: bool,
    entries: RwLock<VecDeque<BufferEntry>>,
    on_delete: Option<OnDelete>,
}

impl RingBuffer {
    /// Creates a buffer for up to `max_size` entries.
    pub fn new(
        max_size: usize,
        counter_mode: CounterMode,
        allow_overflow: bool,
        on_delete: Option<OnDelete>,
    ) -> Self {
        Self {
            max_size,
            counter_mode,
            allow_overflow,
            entries: RwLock::new(VecDeque::with_capacity(max_size.min(100_000))),
            on_delete,
        }
    }

    /// Stores a data set.
    ///
    /// When the buffer is full, either fails with
    /// [`BufferError::Overflow`] (overflow disabled) or evicts the oldest
    /// unlocked entries, notifying the hook for each one. If every
    /// surviving entry is locked the push is declined with
    /// [`PushOutcome::RejectedByLock`].
    ///
    /// In counter mode 0 the ID must be greater than the last stored ID
    /// ([`BufferError::BadId`] otherwise). In counter mode 1 an existing
    /// unlocked entry with the same ID is replaced (hook notified once); a
    /// locked one declines the push with no state change.
    pub fn push(
        &self,
        id: i64,
        measurements: Arc<Vec<Measurement>>,
    ) -> BufferResult<PushOutcome> {
        let mut entries = self.entries.write();

        // Discard old unlocked data.
        let mut evicted = 0usize;
        if entries.len() >= self.max_size {
            if !self.allow_overflow {
                return Err(BufferError::Overflow);
            }

            let mut index = 0;
            while entries.len() >= self.max_size && index < entries.len() {
                if entries[index].is_locked() {
                    index += 1;
                    continue;
                }

                debug!(id = entries[index].id, "evicting unlocked entry on overflow");
                if let Some(on_delete) = &self.on_delete {
                    on_delete(DeleteEvent::Evicted {
                        entry: &entries[index],
                        at_ms: now_ms(),
                    });
                }
                entries.remove(index);
                evicted += 1;
            }

            if entries.len() >= self.max_size {
                // All surviving entries are locked, no room for new data.
                return Ok(PushOutcome::RejectedByLock);
            }
        }

        match self.counter_mode {
            CounterMode::Monotonic => {
                // Only IDs newer than the buffer tail are allowed.
                if let Some(last) = entries.back() {
                    if last.id >= id {
                        return Err(BufferError::bad_id(id, last.id));
                    }
                }
            }
            CounterMode::Overwrite => {
                if let Some(position) = entries.iter().position(|entry| entry.id == id) {
                    if entries[position].is_locked() {
                        // No action if the entry is locked.
                        return Ok(PushOutcome::RejectedByLock);
                    }

                    if let Some(on_delete) = &self.on_delete {
                        on_delete(DeleteEvent::Removed {
                            entry: &entries[position],
                        });
                    }
                    entries.remove(position);
                }
            }
        }

        entries.push_back(BufferEntry::new(id, measurements, now_ms()));
        Ok(PushOutcome::Stored { evicted })
    }

    /// Deletes the entry with the given ID.
    ///
    /// Absence is not an error. The hook observes the removal as
    /// [`DeleteEvent::Removed`].
    pub fn delete(&self, id: i64) {
        let mut entries = self.entries.write();

        for index in 0..entries.len() {
            let entry = &entries[index];
            if entry.id == id {
                if let Some(on_delete) = &self.on_delete {
                    on_delete(DeleteEvent::Removed { entry });
                }
                entries.remove(index);
                return;
            }
            if self.counter_mode == CounterMode::Monotonic && entry.id > id {
                // Mode-0 entries are sorted by ID, the scan can stop here.
                return;
            }
        }
    }

    /// Discards every entry.
    ///
    /// Returns the sentinel (`reset_time_ms == 0`) for an empty buffer;
    /// otherwise notifies the hook once with [`DeleteEvent::Cleared`] and
    /// returns the bookkeeping record of the discarded range.
    pub fn reset(&self, reason: ResetReason) -> ResetInformation {
        let mut entries = self.entries.write();

        if entries.is_empty() {
            return ResetInformation::default();
        }

        if let Some(on_delete) = &self.on_delete {
            on_delete(DeleteEvent::Cleared);
        }

        let information = ResetInformation {
            reset_time_ms: now_ms(),
            reason,
            oldest_dataset_time_ms: entries.front().map(|e| e.created_at_ms).unwrap_or(0),
            newest_dataset_time_ms: entries.back().map(|e| e.created_at_ms).unwrap_or(0),
            deleted_count: entries.len() as u64,
        };

        entries.clear();
        information
    }

    /// Returns the shared-lock iteration handle.
    ///
    /// Hold the guard while traversing; the entry lock flag is the only
    /// field that may be mutated through it.
    pub fn entries(&self) -> RwLockReadGuard<'_, VecDeque<BufferEntry>> {
        self.entries.read()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the capacity.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the ID of the newest entry, or -1 for an empty buffer.
    pub fn last_id(&self) -> i64 {
        self.entries.read().back().map(|entry| entry.id).unwrap_or(-1)
    }

    /// Returns the counter mode.
    pub fn counter_mode(&self) -> CounterMode {
        self.counter_mode
    }

    /// Returns the overflow policy.
    pub fn allow_overflow(&self) -> bool {
        self.allow_overflow
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("max_size", &self.max_size)
            .field("counter_mode", &self.counter_mode)
            .field("allow_overflow", &self.allow_overflow)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

// =============================================================================
// Tests
// =============================================================================
