// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! Shared fixtures and builders for the integration tests.
//!
//! - `fixtures`: Pre-built JSON documents and measurement sets
//! - `builders`: Builder patterns for constructing test data

pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
