//! Core entry structures

use crate::{new_entry_id, EntryId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stringified params keyed by name, the unit of composite-key matching.
pub type ParamMap = BTreeMap<String, String>;

/// A single cache record: opaque value plus a validity flag.
///
/// Entries are never physically deleted by normal operations; deletion flips
/// `valid` to false and default reads skip invalid entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_id: EntryId,
    /// Opaque payload, possibly codec-encoded.
    pub value: String,
    pub valid: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Entry {
    /// Create a new valid entry holding `value`.
    pub fn new(value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            entry_id: new_entry_id(),
            value: value.into(),
            valid: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry {} ({})",
            self.entry_id,
            if self.valid { "valid" } else { "invalid" }
        )
    }
}

/// One named component of an entry's composite lookup key.
///
/// Owned by its entry; `(name, entry_id)` is unique, so an entry never
/// carries two params with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
    pub entry_id: EntryId,
}

impl Param {
    /// Create a param row for `entry_id`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, entry_id: EntryId) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            entry_id,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
