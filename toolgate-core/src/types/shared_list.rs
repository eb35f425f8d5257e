use crate::types::AnyValue;

/// On-disk shape of a shared list: `{ meta, entries }`.
///
/// Both fields are optional here so the resolver can report a missing one by name.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SharedListFile {
    #[serde(default)]
    pub meta: Option<ListMeta>,
    #[serde(default)]
    pub entries: Option<Vec<AnyValue>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ListMeta {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<AnyValue>,
}

/// Declarative entry filter of a shared-list reference.
///
/// ```yaml
/// filter: { key: mainnet, exists: true }
/// filter: { key: type, value: evm }
/// filter: { key: alias, in: [ETHEREUM_MAINNET, POLYGON_MAINNET] }
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum EntryFilter {
    Exists { key: String, exists: bool },
    In {
        key: String,
        #[serde(rename = "in")]
        values: Vec<AnyValue>,
    },
    Value { key: String, value: AnyValue },
}

/// A resolved shared list: filtered entries plus the metadata they came with.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SharedList {
    pub meta: ListMeta,
    pub entries: Vec<AnyValue>,
}
