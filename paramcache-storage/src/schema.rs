//! Schema derivation and enforcement.
//!
//! There is no stored schema table: the set of param names required for a
//! `type` is derived from whatever entries of that type already exist. One
//! arbitrary entry is sampled — the schema contract is entry-independent, so
//! one sample suffices — and invalidated entries participate like valid ones.
//! The check runs at creation time only; entries altered out of band are not
//! re-verified.

use crate::EntryStore;
use paramcache_core::{CacheError, CacheResult, ParamMap, TYPE_PARAM};
use std::collections::BTreeSet;

/// Derives per-type schemas from the entries in a store.
pub struct SchemaRegistry<'a, S: EntryStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EntryStore + ?Sized> SchemaRegistry<'a, S> {
    /// Create a registry reading through `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Distinct `type` values ever stored, across valid and invalid entries.
    pub fn type_list(&self) -> CacheResult<BTreeSet<String>> {
        self.store.distinct_param_values(TYPE_PARAM)
    }

    /// The non-type param names required for `type_value`, or `None` if no
    /// entry of that type exists yet.
    pub fn type_param_names(&self, type_value: &str) -> CacheResult<Option<BTreeSet<String>>> {
        if !self.type_list()?.contains(type_value) {
            return Ok(None);
        }
        let attrs: ParamMap = [(TYPE_PARAM.to_string(), type_value.to_string())]
            .into_iter()
            .collect();
        let matches = self.store.filter(&attrs, false)?;
        let Some(sample) = matches.first() else {
            return Ok(None);
        };
        let mut names = self.store.param_names(sample.entry_id)?;
        names.remove(TYPE_PARAM);
        Ok(Some(names))
    }

    /// Check that a new entry of `type_value` may be created with the given
    /// non-type param names. A type with no existing entries always passes:
    /// it establishes the schema.
    pub fn validate_new_entry(
        &self,
        type_value: &str,
        given: &BTreeSet<String>,
    ) -> CacheResult<()> {
        let expected = self.type_param_names(type_value)?;
        check_param_names(type_value, expected.as_ref(), given)
    }
}

/// Compare a caller's param names against an established schema.
///
/// `expected = None` means the type is new and anything goes. On mismatch
/// the error carries both name lists; missing names take display priority
/// over excess names.
pub fn check_param_names(
    type_value: &str,
    expected: Option<&BTreeSet<String>>,
    given: &BTreeSet<String>,
) -> CacheResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    if expected == given {
        return Ok(());
    }
    Err(CacheError::SchemaMismatch {
        type_value: type_value.to_string(),
        missing: expected.difference(given).cloned().collect(),
        excess: given.difference(expected).cloned().collect(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn attrs(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_type_list_spans_validity() {
        let store = MemoryStore::new();
        store
            .upsert("one", &attrs(&[("type", "user"), ("id", "1")]))
            .unwrap();
        store
            .upsert("two", &attrs(&[("type", "order"), ("ref", "9")]))
            .unwrap();
        store.invalidate(&attrs(&[("type", "order")])).unwrap();

        let registry = SchemaRegistry::new(&store);
        assert_eq!(registry.type_list().unwrap(), names(&["order", "user"]));
    }

    #[test]
    fn test_type_param_names_unknown_type() {
        let store = MemoryStore::new();
        let registry = SchemaRegistry::new(&store);
        assert_eq!(registry.type_param_names("ghost").unwrap(), None);
    }

    #[test]
    fn test_type_param_names_excludes_type() {
        let store = MemoryStore::new();
        store
            .upsert("one", &attrs(&[("type", "user"), ("id", "1"), ("org", "acme")]))
            .unwrap();

        let registry = SchemaRegistry::new(&store);
        assert_eq!(
            registry.type_param_names("user").unwrap(),
            Some(names(&["id", "org"]))
        );
    }

    #[test]
    fn test_validate_new_type_always_passes() {
        let store = MemoryStore::new();
        let registry = SchemaRegistry::new(&store);
        registry
            .validate_new_entry("ghost", &names(&["anything"]))
            .unwrap();
    }

    #[test]
    fn test_validate_known_type_enforces_names() {
        let store = MemoryStore::new();
        store
            .upsert("one", &attrs(&[("type", "user"), ("id", "1")]))
            .unwrap();

        let registry = SchemaRegistry::new(&store);
        registry.validate_new_entry("user", &names(&["id"])).unwrap();

        let err = registry
            .validate_new_entry("user", &names(&["nick"]))
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::SchemaMismatch {
                type_value: "user".to_string(),
                missing: vec!["id".to_string()],
                excess: vec!["nick".to_string()],
            }
        );
    }

    #[test]
    fn test_check_param_names_missing_and_excess() {
        let expected = names(&["a", "b"]);

        // Pure subset: only missing reported.
        let err = check_param_names("t", Some(&expected), &names(&["a"])).unwrap_err();
        match err {
            CacheError::SchemaMismatch { missing, excess, .. } => {
                assert_eq!(missing, vec!["b".to_string()]);
                assert!(excess.is_empty());
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }

        // Pure superset: only excess reported.
        let err = check_param_names("t", Some(&expected), &names(&["a", "b", "c"])).unwrap_err();
        match err {
            CacheError::SchemaMismatch { missing, excess, .. } => {
                assert!(missing.is_empty());
                assert_eq!(excess, vec!["c".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }
}
