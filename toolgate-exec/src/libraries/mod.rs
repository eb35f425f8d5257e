//! Auxiliary capabilities a descriptor's hooks may ask for by name.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde_json::Value;

/// Names allowed when the caller does not supply an allow-list.
const DEFAULT_ALLOWED: [&str; 5] = ["ethers", "moment", "indicatorts", "@erc725/erc725.js", "ccxt"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("libraries not in allowlist: {}", .0.join(", "))]
    NotAllowed(Vec<String>),
    #[error("library not available: {0}")]
    NotFound(String),
    #[error("library {library} failed: {message}")]
    Call { library: String, message: String },
}

/// A loaded capability. Hooks call into it by function name with JSON arguments.
pub trait Library: Send + Sync {
    fn name(&self) -> &str;

    fn call(&self, function: &str, args: Value) -> Result<Value, LibraryError>;
}

#[async_trait]
pub trait LibraryProvider: Send + Sync {
    async fn load(&self, name: &str) -> Result<Arc<dyn Library>, LibraryError>;
}

/// Provider backed by libraries the host registered up front.
#[derive(Clone, Default)]
pub struct StaticLibraryProvider {
    libraries: BTreeMap<String, Arc<dyn Library>>,
}

impl StaticLibraryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, library: Arc<dyn Library>) {
        self.libraries.insert(library.name().to_string(), library);
    }

    pub fn with(mut self, library: Arc<dyn Library>) -> Self {
        self.register(library);
        self
    }
}

#[async_trait]
impl LibraryProvider for StaticLibraryProvider {
    async fn load(&self, name: &str) -> Result<Arc<dyn Library>, LibraryError> {
        self.libraries
            .get(name)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryAllowlist {
    names: BTreeSet<String>,
}

impl LibraryAllowlist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A fresh copy of the built-in allow-list; changing it does not affect other callers.
    pub fn default_allowlist() -> Self {
        Self::new(DEFAULT_ALLOWED)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for LibraryAllowlist {
    fn default() -> Self {
        Self::default_allowlist()
    }
}

/// Name to loaded library, shared read-only with hooks.
#[derive(Clone, Default)]
pub struct Libraries {
    map: Arc<BTreeMap<String, Arc<dyn Library>>>,
}

impl Libraries {
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Library>> {
        self.map.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Libraries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.map.keys()).finish()
    }
}

/// Check every requested name against the allow-list, then load them all concurrently.
///
/// All disallowed names are reported together.
pub async fn load_libraries(
    required: &[String],
    allowlist: Option<&LibraryAllowlist>,
    provider: &dyn LibraryProvider,
) -> Result<Libraries, LibraryError> {
    if required.is_empty() {
        return Ok(Libraries::default());
    }

    let fallback;
    let allowlist = match allowlist {
        Some(a) => a,
        None => {
            fallback = LibraryAllowlist::default_allowlist();
            &fallback
        }
    };

    let denied: Vec<String> = required
        .iter()
        .filter(|name| !allowlist.contains(name))
        .cloned()
        .collect();
    if !denied.is_empty() {
        return Err(LibraryError::NotAllowed(denied));
    }

    let loaded = try_join_all(required.iter().map(|name| async move {
        let lib = provider.load(name).await?;
        Ok::<_, LibraryError>((name.clone(), lib))
    }))
    .await?;

    Ok(Libraries {
        map: Arc::new(loaded.into_iter().collect()),
    })
}
