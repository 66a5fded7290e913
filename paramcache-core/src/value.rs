//! Param values and param sets
//!
//! Composite-key lookups are always performed over stringified param values.
//! [`ParamValue`] is the closed set of value shapes callers may supply;
//! [`ParamValue::render`] is the total, recursive stringification over it.

use crate::entry::ParamMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The distinguished param name that classifies an entry's schema.
pub const TYPE_PARAM: &str = "type";

/// Param names reserved for control flags on the original keyword-argument
/// surface. They are stripped before matching: a caller cannot target an
/// attribute literally named one of these.
pub const RESERVED_PARAM_NAMES: [&str; 4] = ["valid", "only_valid", "pickle", "unpickle"];

/// A param value supplied as a filter or create argument.
///
/// Rendering is exact-equality material: two values match iff their rendered
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Returned unchanged by `render`.
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Reference to a structured domain record, rendered as
    /// `"<type_tag>.<id>.<display>"`.
    Record {
        type_tag: String,
        id: String,
        display: String,
    },
    /// Sequence of values, rendered recursively as `[a, b, c]`.
    Seq(Vec<ParamValue>),
}

impl ParamValue {
    /// Stringify this value for storage and matching.
    ///
    /// Total over every variant: strings pass through unchanged, records
    /// render as `type_tag.id.display`, sequences render their elements
    /// recursively inside brackets, and the scalar variants use their
    /// natural display form.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Record {
                type_tag,
                id,
                display,
            } => format!("{type_tag}.{id}.{display}"),
            ParamValue::Seq(items) => {
                let rendered: Vec<String> = items.iter().map(ParamValue::render).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Int(i as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(items: Vec<ParamValue>) -> Self {
        ParamValue::Seq(items)
    }
}

/// Named params for a cache operation.
///
/// The Rust rendering of the original keyword-argument surface: one value
/// per name, stringified by [`ParamSet::render`] before any matching.
/// The names in [`RESERVED_PARAM_NAMES`] were control flags on that surface
/// and are dropped during rendering; an attribute carrying one of those
/// names cannot be targeted through this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    params: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    /// Create an empty param set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a param, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a param by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Whether a param with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Number of params.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Stringify every value, dropping reserved control-flag names.
    pub fn render(&self) -> ParamMap {
        self.params
            .iter()
            .filter(|(name, _)| !RESERVED_PARAM_NAMES.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.render()))
            .collect()
    }
}

impl<N: Into<String>, V: Into<ParamValue>> FromIterator<(N, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

// =============================================================================
// TESTS
// =============================================================================


// =============================================================================
// PROPERTY-BASED TESTS
// =============================================================================
