//! Paramcache Core - Entity Types
//!
//! Pure data types for the composite-parameter cache: entries, param rows,
//! param values, and errors. All other crates depend on this.

pub mod entry;
pub mod error;
pub mod value;

pub use entry::{Entry, Param, ParamMap};
pub use error::{CacheError, CacheResult, StorageError};
pub use value::{ParamSet, ParamValue, RESERVED_PARAM_NAMES, TYPE_PARAM};

use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entry identifier using UUIDv7 for timestamp-sortable IDs.
pub type EntryId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntryId (timestamp-sortable).
pub fn new_entry_id() -> EntryId {
    Uuid::now_v7()
}
