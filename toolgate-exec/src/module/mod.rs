//! Descriptor modules: the parsed descriptor document plus the compiled-in hooks it names.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use toolgate_core::{parse_value_str, ParseError};

use crate::hooks::HandlersFactory;
use crate::legacy::LegacyHandler;

/// Top-level key naming the handler set; defaults to the descriptor namespace.
pub const HANDLERS_KEY: &str = "handlers";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("{path}: descriptor document must be an object")]
    NotAnObject { path: PathBuf },
    #[error("{path}: `handlers` must be a string")]
    InvalidHandlersKey { path: PathBuf },
    #[error("{path}: no handler set registered under \"{key}\"")]
    UnknownHandlers { path: PathBuf, key: String },
    #[error("module not found: {0}")]
    NotFound(PathBuf),
}

/// What a descriptor file exports.
///
/// `main` and `schema` are raw values: the loader only extracts them, validation happens later.
#[derive(Debug, Clone, Default)]
pub struct DescriptorModule {
    pub main: Option<Value>,
    pub schema: Option<Value>,
    pub handlers: Option<HandlersFactory>,
    /// Named hooks a legacy schema's modifiers refer to.
    pub legacy_handlers: BTreeMap<String, LegacyHandler>,
}

impl DescriptorModule {
    pub fn has_handlers(&self) -> bool {
        self.handlers.is_some()
    }
}

/// Path to module. Implementations decide where descriptor text and hook code come from.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Raw text of the descriptor, as handed to the security scan.
    async fn read_source(&self, path: &Path) -> Result<String, LoadError>;

    /// Build the module from `source`, the text [`read_source`](Self::read_source) returned
    /// and the scan approved. Implementations must not fetch the descriptor again.
    async fn load(&self, path: &Path, source: &str) -> Result<DescriptorModule, LoadError>;
}

/// Hook code compiled into the host, keyed by handler-set name.
#[derive(Debug, Clone, Default)]
pub struct HandlerCatalog {
    factories: BTreeMap<String, HandlersFactory>,
    legacy: BTreeMap<String, BTreeMap<String, LegacyHandler>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_factory(&mut self, key: impl Into<String>, factory: HandlersFactory) {
        self.factories.insert(key.into(), factory);
    }

    pub fn register_legacy(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        handler: LegacyHandler,
    ) {
        self.legacy
            .entry(key.into())
            .or_default()
            .insert(name.into(), handler);
    }

    pub fn with_factory(mut self, key: impl Into<String>, factory: HandlersFactory) -> Self {
        self.register_factory(key, factory);
        self
    }

    pub fn with_legacy(
        mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        handler: LegacyHandler,
    ) -> Self {
        self.register_legacy(key, name, handler);
        self
    }

    fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key) || self.legacy.contains_key(key)
    }

    /// Turn a parsed descriptor document into a module, attaching the hooks it names.
    pub fn bind(&self, path: &Path, document: Value) -> Result<DescriptorModule, LoadError> {
        let Value::Object(mut doc) = document else {
            return Err(LoadError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        let explicit = match doc.remove(HANDLERS_KEY) {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                return Err(LoadError::InvalidHandlersKey {
                    path: path.to_path_buf(),
                })
            }
        };
        let main = doc.remove("main");
        let schema = doc.remove("schema");

        if let Some(key) = &explicit {
            if !self.contains(key) {
                return Err(LoadError::UnknownHandlers {
                    path: path.to_path_buf(),
                    key: key.clone(),
                });
            }
        }
        let key = explicit.or_else(|| {
            main.as_ref()
                .or(schema.as_ref())
                .and_then(|v| v.get("namespace"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let mut module = DescriptorModule {
            main,
            schema,
            ..DescriptorModule::default()
        };
        if let Some(key) = key {
            if module.main.is_some() {
                module.handlers = self.factories.get(&key).cloned();
            } else if module.schema.is_some() {
                module.legacy_handlers = self.legacy.get(&key).cloned().unwrap_or_default();
            }
        }
        Ok(module)
    }
}

/// Descriptors on disk, hooks from a [`HandlerCatalog`].
#[derive(Debug, Clone, Default)]
pub struct FileModuleLoader {
    catalog: HandlerCatalog,
}

impl FileModuleLoader {
    pub fn new(catalog: HandlerCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ModuleLoader for FileModuleLoader {
    async fn read_source(&self, path: &Path) -> Result<String, LoadError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn load(&self, path: &Path, source: &str) -> Result<DescriptorModule, LoadError> {
        let document = parse_value_str(source).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        self.catalog.bind(path, document)
    }
}

/// Modules registered in memory under a path.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleLoader {
    modules: BTreeMap<PathBuf, (String, DescriptorModule)>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>, module: DescriptorModule) {
        self.modules.insert(path.into(), (source.into(), module));
    }

    /// Parse `source` as a descriptor document and bind its hooks from `catalog`.
    pub fn insert_document(
        &mut self,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        catalog: &HandlerCatalog,
    ) -> Result<(), LoadError> {
        let path = path.into();
        let source = source.into();
        let document = parse_value_str(&source).map_err(|e| LoadError::Parse {
            path: path.clone(),
            source: e,
        })?;
        let module = catalog.bind(&path, document)?;
        self.modules.insert(path, (source, module));
        Ok(())
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn read_source(&self, path: &Path) -> Result<String, LoadError> {
        self.modules
            .get(path)
            .map(|(source, _)| source.clone())
            .ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }

    /// Returns the registered module; `source` was registered alongside it.
    async fn load(&self, path: &Path, _source: &str) -> Result<DescriptorModule, LoadError> {
        self.modules
            .get(path)
            .map(|(_, module)| module.clone())
            .ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }
}
