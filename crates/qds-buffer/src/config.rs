// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Data-source configuration.

use serde::{Deserialize, Serialize};

use qds_core::types::CounterMode;

// =============================================================================
// Data Source Configuration
// =============================================================================

/// Configuration for a QDS data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Number of storable buffer entries.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Ordering policy for data-set IDs.
    #[serde(default)]
    pub counter_mode: CounterMode,

    /// Whether a full buffer evicts its oldest unlocked entries instead of
    /// rejecting the push.
    #[serde(default = "default_allow_overflow")]
    pub allow_overflow: bool,

    /// Cap of the reset journal.
    #[serde(default = "default_journal_cap")]
    pub reset_journal_cap: usize,

    /// Cap of the deletion journal.
    #[serde(default = "default_journal_cap")]
    pub deletion_journal_cap: usize,
}

fn default_buffer_size() -> usize {
    100
}

fn default_allow_overflow() -> bool {
    true
}

fn default_journal_cap() -> usize {
    100
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            counter_mode: CounterMode::default(),
            allow_overflow: default_allow_overflow(),
            reset_journal_cap: default_journal_cap(),
            deletion_journal_cap: default_journal_cap(),
        }
    }
}

impl DataSourceConfig {
    /// Creates a configuration builder.
    pub fn builder() -> DataSourceConfigBuilder {
        DataSourceConfigBuilder::default()
    }

    /// Creates a configuration with small limits for tests.
    pub fn for_testing() -> Self {
        Self {
            buffer_size: 10,
            counter_mode: CounterMode::Monotonic,
            allow_overflow: true,
            reset_journal_cap: 10,
            deletion_journal_cap: 10,
        }
    }
}

/// Builder for [`DataSourceConfig`].
#[derive(Debug, Default)]
pub struct DataSourceConfigBuilder {
    config: DataSourceConfig,
}

impl DataSourceConfigBuilder {
    /// Sets the buffer capacity.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Sets the counter mode.
    pub fn counter_mode(mut self, mode: CounterMode) -> Self {
        self.config.counter_mode = mode;
        self
    }

    /// Sets the overflow policy.
    pub fn allow_overflow(mut self, allow: bool) -> Self {
        self.config.allow_overflow = allow;
        self
    }

    /// Sets the reset journal cap.
    pub fn reset_journal_cap(mut self, cap: usize) -> Self {
        self.config.reset_journal_cap = cap;
        self
    }

    /// Sets the deletion journal cap.
    pub fn deletion_journal_cap(mut self, cap: usize) -> Self {
        self.config.deletion_journal_cap = cap;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DataSourceConfig {
        self.config
    }
}

// =============================================================================
// Tests
// =============================================================================
