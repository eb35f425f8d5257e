//! Load a descriptor into an [`ActivationBundle`].
//!
//! Stages run in order and each gates the next:
//! scan, load, dialect detection/adaptation, validation, shared lists, libraries, hooks.
//! A failing stage ends the load with `status = false`; whatever was already known stays in
//! the bundle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use toolgate_core::{route_input_schema, scan_source, validate_main, Descriptor, InputShape, SharedLists};
use tracing::{debug, warn};

use crate::hooks::{create_handler_map, HandlerDeps, HandlerMap, HandlersFactory};
use crate::legacy::{adapt, detect, DescriptorFormat};
use crate::libraries::{load_libraries, Libraries, LibraryAllowlist, LibraryProvider};
use crate::lists::resolve_shared_lists;
use crate::module::ModuleLoader;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Directory holding shared-list files. Without it, declared shared lists are not resolved.
    pub lists_dir: Option<PathBuf>,
    /// `None` means the built-in allow-list.
    pub allowlist: Option<LibraryAllowlist>,
}

/// Outcome of a load, with the same shape whether it succeeded or not.
#[derive(Debug, Clone, Default)]
pub struct ActivationBundle {
    pub status: bool,
    pub messages: Vec<String>,
    /// The `main` block as loaded (after legacy adaptation); `Null` if loading never got that far.
    pub main: Value,
    pub descriptor: Option<Arc<Descriptor>>,
    pub handler_map: Arc<HandlerMap>,
    pub shared_lists: SharedLists,
    pub libraries: Libraries,
    pub warnings: Vec<String>,
}

impl ActivationBundle {
    fn fail(mut self, messages: impl IntoIterator<Item = String>) -> Self {
        self.status = false;
        self.messages.extend(messages);
        for m in &self.messages {
            warn!(message = %m, "descriptor load failed");
        }
        self
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_deref()
    }

    pub fn route_names(&self) -> Vec<String> {
        self.descriptor()
            .map(Descriptor::route_names)
            .unwrap_or_default()
    }

    pub fn tool_name(&self, route_name: &str) -> Option<String> {
        let d = self.descriptor()?;
        d.route(route_name).map(|_| d.tool_name(route_name))
    }

    /// Caller-facing parameter schema of a route, with shared-list enums expanded.
    pub fn input_schema(&self, route_name: &str) -> Option<InputShape> {
        let route = self.descriptor()?.route(route_name)?;
        Some(route_input_schema(route, &self.shared_lists))
    }
}

pub struct Pipeline {
    loader: Arc<dyn ModuleLoader>,
    libraries: Arc<dyn LibraryProvider>,
}

impl Pipeline {
    pub fn new(loader: Arc<dyn ModuleLoader>, libraries: Arc<dyn LibraryProvider>) -> Self {
        Self { loader, libraries }
    }

    pub async fn load(&self, path: &Path, config: &PipelineConfig) -> ActivationBundle {
        let mut bundle = ActivationBundle::default();

        let source = match self.loader.read_source(path).await {
            Ok(s) => s,
            Err(e) => return bundle.fail([e.to_string()]),
        };
        let report = scan_source(&source);
        debug!(path = %path.display(), findings = report.findings.len(), "security scan");
        if !report.status {
            return bundle.fail(report.messages);
        }

        let module = match self.loader.load(path, &source).await {
            Ok(m) => m,
            Err(e) => return bundle.fail([e.to_string()]),
        };

        let detection = detect(&module);
        debug!(format = ?detection.format, "descriptor dialect");
        let (main, handlers): (Value, Option<HandlersFactory>) = match detection.format {
            DescriptorFormat::Legacy => {
                let schema = module.schema.unwrap_or_default();
                let adapted = adapt(&schema, &module.legacy_handlers);
                bundle.warnings.extend(adapted.warnings);
                (adapted.main, adapted.handlers)
            }
            DescriptorFormat::Current | DescriptorFormat::Unknown => match module.main {
                Some(main) => (main, module.handlers),
                None => return bundle.fail(["No main export found".to_string()]),
            },
        };
        bundle.main = main;

        if let Err(e) = validate_main(&bundle.main) {
            return bundle.fail(e.messages());
        }
        let descriptor: Descriptor = match serde_json::from_value(bundle.main.clone()) {
            Ok(d) => d,
            Err(e) => return bundle.fail([format!("main: {e}")]),
        };
        debug!(namespace = %descriptor.namespace, routes = descriptor.routes.len(), "descriptor valid");

        if !descriptor.shared_lists.is_empty() {
            match &config.lists_dir {
                Some(dir) => match resolve_shared_lists(&descriptor.shared_lists, dir).await {
                    Ok(lists) => bundle.shared_lists = lists,
                    Err(e) => return bundle.fail([e.to_string()]),
                },
                None => {
                    let w = "sharedLists declared but no lists directory configured; not resolved";
                    warn!(namespace = %descriptor.namespace, "{w}");
                    bundle.warnings.push(w.to_string());
                }
            }
        }

        if !descriptor.required_libraries.is_empty() {
            match load_libraries(
                &descriptor.required_libraries,
                config.allowlist.as_ref(),
                self.libraries.as_ref(),
            )
            .await
            {
                Ok(libs) => bundle.libraries = libs,
                Err(e) => return bundle.fail([e.to_string()]),
            }
        }

        let deps = HandlerDeps {
            shared_lists: bundle.shared_lists.clone(),
            libraries: bundle.libraries.clone(),
        };
        match create_handler_map(handlers.as_ref(), &deps, &descriptor.route_names()) {
            Ok(map) => bundle.handler_map = Arc::new(map),
            Err(e) => return bundle.fail([e.to_string()]),
        }

        debug!(namespace = %descriptor.namespace, "descriptor activated");
        bundle.descriptor = Some(Arc::new(descriptor));
        bundle.status = true;
        bundle
    }
}
