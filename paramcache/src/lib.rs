//! Paramcache - Composite-Parameter Cache
//!
//! Cache entries are located by a set of named params rather than a single
//! key. The param named `type` classifies an entry and pins its schema: once
//! any entry of a type exists, every later entry of that type must carry
//! exactly the same param names. Deletion is soft — entries are flagged
//! invalid, never removed.
//!
//! # Example
//!
//! ```
//! use paramcache::{Cache, ParamSet};
//! use paramcache_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//!
//! let attrs = ParamSet::new().with("type", "user").with("id", 7);
//! cache.set("profile-blob", &attrs).unwrap();
//! assert_eq!(cache.get(&attrs).unwrap(), "profile-blob");
//!
//! cache.delete(&attrs).unwrap();
//! assert!(cache.get(&attrs).is_err());
//! ```

pub mod codec;

pub use codec::{JsonCodec, PayloadCodec};
pub use paramcache_core::{
    CacheError, CacheResult, Entry, EntryId, Param, ParamMap, ParamSet, ParamValue, StorageError,
    RESERVED_PARAM_NAMES, TYPE_PARAM,
};
pub use paramcache_storage::{EntryStore, MemoryStore, SchemaRegistry, Upserted};

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The cache facade: an [`EntryStore`] plus a [`PayloadCodec`].
///
/// All operations take a [`ParamSet`]; its values are stringified before any
/// matching, and the reserved control-flag names (`valid`, `only_valid`,
/// `pickle`, `unpickle`) are stripped — params with those names cannot be
/// targeted through this API (see [`RESERVED_PARAM_NAMES`]).
///
/// The codec only applies to the `*_encoded`/`*_decoded` methods, the
/// explicit rendering of the original pickle/unpickle switches. Plain `set`
/// and `get` move the payload verbatim.
#[derive(Debug)]
pub struct Cache<S: EntryStore, C: PayloadCodec = JsonCodec> {
    store: Arc<S>,
    codec: C,
}

// Hand-written: the derive would demand S: Clone, but the store is shared
// through the Arc and need not be cloneable itself.
impl<S: EntryStore, C: PayloadCodec + Clone> Clone for Cache<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
        }
    }
}

impl<S: EntryStore> Cache<S, JsonCodec> {
    /// Create a cache over `store` with the default JSON codec.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            codec: JsonCodec,
        }
    }
}

impl<S: EntryStore, C: PayloadCodec> Cache<S, C> {
    /// Create a cache over `store` with a custom payload codec.
    pub fn with_codec(store: Arc<S>, codec: C) -> Self {
        Self { store, codec }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store `value` under the composite key `attrs`.
    ///
    /// A `type` param is mandatory ([`CacheError::MissingType`] otherwise).
    /// An existing entry with identical params — even an invalidated one —
    /// is overwritten and marked valid again; otherwise the param names are
    /// checked against the type's schema and a new entry is created.
    pub fn set(&self, value: impl Into<String>, attrs: &ParamSet) -> CacheResult<EntryId> {
        if !attrs.contains(TYPE_PARAM) {
            return Err(CacheError::MissingType);
        }
        let outcome = self.store.upsert(&value.into(), &attrs.render())?;
        debug!(
            entry_id = %outcome.entry_id,
            created = outcome.created,
            "cache set"
        );
        Ok(outcome.entry_id)
    }

    /// Encode `value` through the codec, then store it (pickle mode).
    pub fn set_encoded<T: Serialize>(&self, value: &T, attrs: &ParamSet) -> CacheResult<EntryId> {
        let encoded = self.codec.encode(value)?;
        self.set(encoded, attrs)
    }

    /// Return the value of the single valid entry matching `attrs`.
    ///
    /// Errors with [`CacheError::NotFound`] on zero matches and
    /// [`CacheError::MultipleFound`] on several.
    pub fn get(&self, attrs: &ParamSet) -> CacheResult<String> {
        Ok(self.store.find_one(&attrs.render())?.value)
    }

    /// Fetch and decode through the codec (unpickle mode).
    pub fn get_decoded<T: DeserializeOwned>(&self, attrs: &ParamSet) -> CacheResult<T> {
        let raw = self.get(attrs)?;
        self.codec.decode(&raw)
    }

    /// Values of every valid entry matching `attrs`, in unspecified order.
    pub fn get_many(&self, attrs: &ParamSet) -> CacheResult<Vec<String>> {
        let entries = self.store.filter(&attrs.render(), true)?;
        Ok(entries.into_iter().map(|e| e.value).collect())
    }

    /// [`Cache::get_many`], decoding each value through the codec.
    pub fn get_many_decoded<T: DeserializeOwned>(&self, attrs: &ParamSet) -> CacheResult<Vec<T>> {
        self.get_many(attrs)?
            .iter()
            .map(|raw| self.codec.decode(raw))
            .collect()
    }

    /// Invalidate every entry matching `attrs` (soft delete).
    ///
    /// Idempotent; zero matches is success. Returns the number of entries
    /// matched.
    pub fn delete(&self, attrs: &ParamSet) -> CacheResult<u64> {
        let count = self.store.invalidate(&attrs.render())?;
        debug!(count, "cache delete");
        Ok(count)
    }
}

// ============================================================================
// TESTS
// ============================================================================
