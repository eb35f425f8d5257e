//! Resolved shared lists and the pure parts of resolution: filtering and enum interpolation.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::types::{AnyValue, EntryFilter, SharedList};

static ENUM_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+)\s*:\s*([A-Za-z0-9_\-]+)\s*\}\}").expect("valid"));

/// Read-only map of list name to resolved list.
///
/// Built once by the resolver and shared by reference; there is no way to obtain a mutable
/// handle to a list or an entry:
///
/// ```compile_fail
/// use toolgate_core::SharedLists;
///
/// fn overwrite(lists: &SharedLists) {
///     let entries = lists.entries("chains").unwrap();
///     entries[0] = serde_json::Value::Null;
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedLists {
    lists: Arc<BTreeMap<String, Arc<SharedList>>>,
}

impl SharedLists {
    pub fn freeze(lists: BTreeMap<String, SharedList>) -> Self {
        Self {
            lists: Arc::new(lists.into_iter().map(|(k, v)| (k, Arc::new(v))).collect()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SharedList> {
        self.lists.get(name).map(Arc::as_ref)
    }

    pub fn entries(&self, name: &str) -> Option<&[AnyValue]> {
        self.get(name).map(|l| l.entries.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// `{ name: [entries...] }`, the shape hooks and diagnostics print.
    pub fn to_value(&self) -> AnyValue {
        let map = self
            .lists
            .iter()
            .map(|(k, v)| (k.clone(), AnyValue::Array(v.entries.clone())))
            .collect::<serde_json::Map<_, _>>();
        AnyValue::Object(map)
    }
}

pub fn apply_filter(entries: Vec<AnyValue>, filter: Option<&EntryFilter>) -> Vec<AnyValue> {
    let Some(filter) = filter else {
        return entries;
    };
    entries
        .into_iter()
        .filter(|entry| entry_matches(entry, filter))
        .collect()
}

fn entry_matches(entry: &AnyValue, filter: &EntryFilter) -> bool {
    match filter {
        EntryFilter::Exists { key, exists } => {
            let present = entry.get(key).is_some_and(|v| !v.is_null());
            present == *exists
        }
        EntryFilter::Value { key, value } => entry.get(key) == Some(value),
        EntryFilter::In { key, values } => entry
            .get(key)
            .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
    }
}

/// Expand every `{{listName:fieldName}}` token to the comma-joined values of that field.
///
/// Entries without the field (or with `null`) are skipped. Tokens naming an unknown list are
/// left as they are.
pub fn interpolate_enum(template: &str, lists: &SharedLists) -> String {
    ENUM_TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let Some(entries) = lists.entries(&caps[1]) else {
                return caps[0].to_string();
            };
            let field = &caps[2];
            entries
                .iter()
                .filter_map(|e| e.get(field))
                .filter(|v| !v.is_null())
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .into_owned()
}

pub(crate) fn scalar_to_string(v: &AnyValue) -> String {
    match v {
        AnyValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
