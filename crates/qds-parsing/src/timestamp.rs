// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ISO-8601 acceptance for TIMESTAMP measurement values.
//!
//! The grammar covers calendar dates (leap days only in valid leap years),
//! ordinal dates (`YYYY-DDD`, day 366 only in leap years), hyphenated or
//! unseparated date forms, `HH:MM[:SS][.ffffff]` or `HHMM[SS][.ffffff]`
//! times, and a mandatory timezone (`Z`, or an offset whose separator
//! style matches the time's). Date and time separator styles are
//! independent of each other.

use once_cell::sync::Lazy;
use regex::Regex;

// Month/day and leap-year alternations for one separator style. The `regex`
// crate has no backreferences, so the hyphenated and unseparated date forms
// are spelled out as separate alternatives.
fn date_pattern(sep: &str) -> String {
    format!(
        "(?:[1-9]\\d{{3}}{sep}(?:(?:0[1-9]|1[0-2]){sep}(?:0[1-9]|1\\d|2[0-8])|(?:0[13-9]|1[0-2]){sep}(?:29|30)|(?:0[13578]|1[02]){sep}31|00[1-9]|0[1-9]\\d|[12]\\d{{2}}|3[0-5]\\d|36[0-5])|(?:[1-9]\\d(?:0[48]|[2468][048]|[13579][26])|(?:[2468][048]|[13579][26])00)(?:{sep}02{sep}29|{sep}366))"
    )
}

// Time-of-day with the timezone separator tied to the time separator.
fn time_pattern(sep: &str) -> String {
    format!(
        "(?:(?:[01]\\d|2[0-3]){sep}[0-5]\\d(?:{sep}[0-5]\\d)?(?:\\.\\d{{1,6}})?(?:Z|[+-](?:[01]\\d|2[0-3])(?:{sep}[0-5]\\d)?))"
    )
}

static ISO_8601: Lazy<Regex> = Lazy::new(|| {
    let date = format!("(?:{}|{})", date_pattern("-"), date_pattern(""));
    let time = format!("(?:{}|{})", time_pattern(":"), time_pattern(""));
    Regex::new(&format!("^{date}T{time}$")).expect("static ISO-8601 pattern is valid")
});

/// Returns `true` if `value` is an acceptable ISO-8601 date-time literal.
pub fn is_valid(value: &str) -> bool {
    ISO_8601.is_match(value)
}

// =============================================================================
// Tests
// =============================================================================
