//! Loading of shared lists referenced by a descriptor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;
use toolgate_core::lists::{apply_filter, SharedLists};
use toolgate_core::parser::{parse_document_str, DocumentFormat};
use toolgate_core::types::{SharedList, SharedListFile, SharedListRef};
use toolgate_core::ParseError;
use tracing::debug;

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Debug, thiserror::Error)]
pub enum SharedListError {
    #[error("invalid shared list reference {0:?}")]
    InvalidReference(String),
    #[error("shared list {reference} not found in {dir}")]
    NotFound { reference: String, dir: PathBuf },
    #[error("failed to read shared list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse shared list {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("shared list {reference} is missing {field}")]
    MissingField {
        reference: String,
        field: &'static str,
    },
    #[error("shared list {reference} version mismatch: requested {requested}, found {found}")]
    VersionMismatch {
        reference: String,
        requested: String,
        found: String,
    },
    #[error("shared lists {first} and {second} both declare the name {name}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

/// Resolve every reference concurrently and freeze the result.
///
/// Lists are keyed by their own `meta.name`, which need not equal the reference string.
/// Two references resolving to the same name are rejected.
pub async fn resolve_shared_lists(
    refs: &[SharedListRef],
    lists_dir: &Path,
) -> Result<SharedLists, SharedListError> {
    let resolved = try_join_all(refs.iter().map(|r| resolve_one(r, lists_dir))).await?;
    let mut map: BTreeMap<String, SharedList> = BTreeMap::new();
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    for (r, list) in refs.iter().zip(resolved) {
        let name = list.meta.name.clone();
        if let Some(first) = owners.insert(name.clone(), &r.reference) {
            return Err(SharedListError::DuplicateName {
                name,
                first: first.to_string(),
                second: r.reference.clone(),
            });
        }
        map.insert(name, list);
    }
    Ok(SharedLists::freeze(map))
}

async fn resolve_one(r: &SharedListRef, lists_dir: &Path) -> Result<SharedList, SharedListError> {
    let path = locate(&r.reference, lists_dir).await?;
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| SharedListError::Read {
            path: path.clone(),
            source,
        })?;
    let file = parse_document_str::<SharedListFile>(&text, DocumentFormat::Auto)
        .map_err(|source| SharedListError::Parse {
            path: path.clone(),
            source,
        })?
        .document;

    let meta = file.meta.ok_or_else(|| SharedListError::MissingField {
        reference: r.reference.clone(),
        field: "meta",
    })?;
    let entries = file.entries.ok_or_else(|| SharedListError::MissingField {
        reference: r.reference.clone(),
        field: "entries",
    })?;

    // Exact match only; no range compatibility.
    if meta.version != r.version {
        return Err(SharedListError::VersionMismatch {
            reference: r.reference.clone(),
            requested: r.version.clone(),
            found: meta.version,
        });
    }

    let total = entries.len();
    let entries = apply_filter(entries, r.filter.as_ref());
    debug!(
        list = %meta.name,
        reference = %r.reference,
        kept = entries.len(),
        total,
        "resolved shared list"
    );
    Ok(SharedList { meta, entries })
}

/// `<dir>/<reference>.{json,yaml,yml}`, first existing file wins.
pub fn candidate_paths(reference: &str, lists_dir: &Path) -> Result<Vec<PathBuf>, SharedListError> {
    let valid = !reference.is_empty()
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(SharedListError::InvalidReference(reference.to_string()));
    }
    Ok(EXTENSIONS
        .iter()
        .map(|ext| lists_dir.join(format!("{reference}.{ext}")))
        .collect())
}

async fn locate(reference: &str, lists_dir: &Path) -> Result<PathBuf, SharedListError> {
    for path in candidate_paths(reference, lists_dir)? {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }
    }
    Err(SharedListError::NotFound {
        reference: reference.to_string(),
        dir: lists_dir.to_path_buf(),
    })
}
