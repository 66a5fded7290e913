//! Paramcache Storage - Entry Store Trait and In-Memory Implementation
//!
//! Defines the storage abstraction for cache entries and their param rows.
//! Durable backends implement [`EntryStore`]; [`MemoryStore`] is the
//! in-process reference implementation.

pub mod schema;

pub use schema::SchemaRegistry;

use chrono::Utc;
use paramcache_core::{
    CacheError, CacheResult, Entry, EntryId, Param, ParamMap, StorageError, TYPE_PARAM,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

// ============================================================================
// ENTRY STORE TRAIT
// ============================================================================

/// Outcome of an upsert: the entry touched and whether it was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    pub entry_id: EntryId,
    /// True if a new entry was inserted, false if an existing one was
    /// overwritten.
    pub created: bool,
}

/// Storage trait for cache entries located by composite params.
///
/// All matching is exact equality over stringified param values. Backends
/// must make `upsert` safe against concurrent callers racing on the same
/// param set: either wrap the look-up-then-write in a serializable
/// transaction or enforce a uniqueness constraint over the full param
/// signature, surfacing conflicts as [`StorageError::ConstraintViolation`]
/// for the caller to retry as an update.
pub trait EntryStore: Send + Sync {
    /// Return entries carrying a matching param row for every `(name, value)`
    /// pair in `attrs`, deduplicated, in unspecified order.
    ///
    /// When `only_valid` is set the result is restricted to entries with
    /// `valid = true`. Filtering on zero attrs with `only_valid = true`
    /// returns every valid entry; callers should avoid that for lookups
    /// since it is not a meaningful composite-key match.
    fn filter(&self, attrs: &ParamMap, only_valid: bool) -> CacheResult<Vec<Entry>>;

    /// Return the single valid entry matching `attrs`.
    ///
    /// Errors with [`CacheError::NotFound`] on zero matches and
    /// [`CacheError::MultipleFound`] on more than one (a composite-key
    /// uniqueness violation).
    fn find_one(&self, attrs: &ParamMap) -> CacheResult<Entry>;

    /// Create or update the entry matching `attrs` exactly.
    ///
    /// `attrs` must include the `type` param. Any existing match (valid or
    /// invalid) has its value overwritten and `valid` reset to true. With no
    /// match, the param names are validated against the established schema
    /// for the type (a new type establishes it) and a fresh entry plus one
    /// param row per attr is inserted.
    fn upsert(&self, value: &str, attrs: &ParamMap) -> CacheResult<Upserted>;

    /// Set `valid = false` on every entry matching `attrs`, searched across
    /// valid and invalid entries. Idempotent; returns the number of matches.
    fn invalidate(&self, attrs: &ParamMap) -> CacheResult<u64>;

    /// Distinct values ever stored under param `name`, across valid and
    /// invalid entries.
    fn distinct_param_values(&self, name: &str) -> CacheResult<BTreeSet<String>>;

    /// Param names carried by an entry.
    fn param_names(&self, entry_id: EntryId) -> CacheResult<BTreeSet<String>>;

    /// Param rows carried by an entry.
    fn entry_params(&self, entry_id: EntryId) -> CacheResult<Vec<Param>>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Internal tables. One lock over all of them keeps the look-up-then-write
/// in `upsert` and `invalidate` serializable.
#[derive(Debug, Default)]
struct Tables {
    entries: HashMap<EntryId, Entry>,
    params: HashMap<EntryId, Vec<Param>>,
    /// Index over `(name, value)` supporting equality filters.
    index: HashMap<(String, String), HashSet<EntryId>>,
}

impl Tables {
    /// IDs of entries matching every pair in `attrs`.
    fn match_ids(&self, attrs: &ParamMap, only_valid: bool) -> HashSet<EntryId> {
        let mut ids: Option<HashSet<EntryId>> = None;
        for (name, value) in attrs {
            let hits = self
                .index
                .get(&(name.clone(), value.clone()))
                .cloned()
                .unwrap_or_default();
            ids = Some(match ids {
                Some(acc) => acc.intersection(&hits).copied().collect(),
                None => hits,
            });
            if ids.as_ref().is_some_and(HashSet::is_empty) {
                break;
            }
        }
        // Zero attrs matches every entry.
        let ids = ids.unwrap_or_else(|| self.entries.keys().copied().collect());
        if only_valid {
            ids.into_iter()
                .filter(|id| self.entries.get(id).is_some_and(|e| e.valid))
                .collect()
        } else {
            ids
        }
    }

    /// Param names of one arbitrary entry carrying `type = type_value`,
    /// excluding `type` itself. Validity is ignored: invalidated entries
    /// still define the schema.
    fn sample_schema(&self, type_value: &str) -> Option<BTreeSet<String>> {
        let ids = self
            .index
            .get(&(TYPE_PARAM.to_string(), type_value.to_string()))?;
        let sample = ids.iter().next()?;
        let names = self
            .params
            .get(sample)
            .map(|rows| {
                rows.iter()
                    .filter(|p| p.name != TYPE_PARAM)
                    .map(|p| p.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        Some(names)
    }

    fn insert_entry(&mut self, value: &str, attrs: &ParamMap) -> EntryId {
        let entry = Entry::new(value);
        let entry_id = entry.entry_id;
        let rows: Vec<Param> = attrs
            .iter()
            .map(|(name, value)| Param::new(name.clone(), value.clone(), entry_id))
            .collect();
        for row in &rows {
            self.index
                .entry((row.name.clone(), row.value.clone()))
                .or_default()
                .insert(entry_id);
        }
        self.entries.insert(entry_id, entry);
        self.params.insert(entry_id, rows);
        entry_id
    }
}

/// In-memory entry store.
///
/// Serves as the reference implementation and as the test double for code
/// built against [`EntryStore`]. A single `RwLock` over all tables provides
/// the transactional guarantees the trait requires.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) -> CacheResult<()> {
        let mut tables = self.write()?;
        tables.entries.clear();
        tables.params.clear();
        tables.index.clear();
        Ok(())
    }

    /// Count of stored entries, valid and invalid.
    pub fn entry_count(&self) -> CacheResult<usize> {
        Ok(self.read()?.entries.len())
    }

    /// Count of stored param rows.
    pub fn param_count(&self) -> CacheResult<usize> {
        Ok(self.read()?.params.values().map(Vec::len).sum())
    }

    /// Human-readable param listing for an entry, in the form
    /// `"Cache type=user, id=7"`.
    pub fn describe_entry(&self, entry_id: EntryId) -> CacheResult<String> {
        let rows = self.entry_params(entry_id)?;
        let rendered: Vec<String> = rows.iter().map(ToString::to_string).collect();
        Ok(format!("Cache {}", rendered.join(", ")))
    }

    fn read(&self) -> CacheResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| CacheError::Storage(StorageError::LockPoisoned))
    }

    fn write(&self) -> CacheResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| CacheError::Storage(StorageError::LockPoisoned))
    }
}

impl EntryStore for MemoryStore {
    fn filter(&self, attrs: &ParamMap, only_valid: bool) -> CacheResult<Vec<Entry>> {
        let tables = self.read()?;
        Ok(tables
            .match_ids(attrs, only_valid)
            .into_iter()
            .filter_map(|id| tables.entries.get(&id).cloned())
            .collect())
    }

    fn find_one(&self, attrs: &ParamMap) -> CacheResult<Entry> {
        let mut matches = self.filter(attrs, true)?;
        match matches.len() {
            0 => Err(CacheError::NotFound),
            1 => Ok(matches.remove(0)),
            count => Err(CacheError::MultipleFound { count }),
        }
    }

    fn upsert(&self, value: &str, attrs: &ParamMap) -> CacheResult<Upserted> {
        let type_value = attrs.get(TYPE_PARAM).ok_or(CacheError::MissingType)?;
        let mut tables = self.write()?;

        // Overwrite requires an exact composite match: the same param names,
        // not merely a superset. A partial key falls through to schema
        // validation instead of touching an arbitrary superset match.
        // Validity is ignored either way.
        let existing = tables.match_ids(attrs, false);
        let exact = existing.into_iter().find(|id| {
            tables
                .params
                .get(id)
                .is_some_and(|rows| rows.len() == attrs.len())
        });
        if let Some(entry_id) = exact {
            let entry = tables.entries.get_mut(&entry_id).ok_or_else(|| {
                CacheError::Storage(StorageError::Backend {
                    reason: format!("index points at missing entry {entry_id}"),
                })
            })?;
            entry.value = value.to_string();
            entry.valid = true;
            entry.updated_at = Utc::now();
            return Ok(Upserted {
                entry_id,
                created: false,
            });
        }

        let given: BTreeSet<String> = attrs
            .keys()
            .filter(|name| name.as_str() != TYPE_PARAM)
            .cloned()
            .collect();
        schema::check_param_names(type_value, tables.sample_schema(type_value).as_ref(), &given)?;

        let entry_id = tables.insert_entry(value, attrs);
        Ok(Upserted {
            entry_id,
            created: true,
        })
    }

    fn invalidate(&self, attrs: &ParamMap) -> CacheResult<u64> {
        let mut tables = self.write()?;
        let ids = tables.match_ids(attrs, false);
        let count = ids.len() as u64;
        for id in ids {
            if let Some(entry) = tables.entries.get_mut(&id) {
                entry.valid = false;
                entry.updated_at = Utc::now();
            }
        }
        Ok(count)
    }

    fn distinct_param_values(&self, name: &str) -> CacheResult<BTreeSet<String>> {
        let tables = self.read()?;
        Ok(tables
            .index
            .keys()
            .filter(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn param_names(&self, entry_id: EntryId) -> CacheResult<BTreeSet<String>> {
        let rows = self.entry_params(entry_id)?;
        Ok(rows.into_iter().map(|p| p.name).collect())
    }

    fn entry_params(&self, entry_id: EntryId) -> CacheResult<Vec<Param>> {
        let tables = self.read()?;
        tables
            .params
            .get(&entry_id)
            .cloned()
            .ok_or(CacheError::NotFound)
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
