//! The `flowMCP` 1.x descriptor dialect.
//!
//! A legacy `schema` carries routes with `requestMethod`/`route` and an ordered list of
//! modifiers `{ phase, handlerName }`. Adaptation rewrites it into a current `main` block and
//! folds the modifiers into the three hook slots of each route.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::warn;

use crate::engine::{Payload, RequestStruct};
use crate::hooks::{HandlersFactory, Hook, HookContext, HookError, HookPhase, RouteHooks};
use crate::module::DescriptorModule;

/// Version every adapted descriptor is given.
pub const ADAPTED_VERSION: &str = "2.0.0";

const DEPRECATION_WARNING: &str =
    "Legacy flowMCP descriptor format is deprecated; it was converted to the current format";

/// Fields carried over unchanged from a legacy schema.
const COPIED_FIELDS: [&str; 10] = [
    "namespace",
    "name",
    "description",
    "docs",
    "tags",
    "root",
    "requiredServerParams",
    "requiredLibraries",
    "sharedLists",
    "headers",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Current,
    Legacy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub is_legacy: bool,
    pub format: DescriptorFormat,
}

/// `main.version` starting with `2.` is current; a `schema` with a `flowMCP` key is legacy.
pub fn detect(module: &DescriptorModule) -> Detection {
    let current = module
        .main
        .as_ref()
        .and_then(|m| m.get("version"))
        .and_then(Value::as_str)
        .is_some_and(|v| v.starts_with("2."));
    if current {
        return Detection {
            is_legacy: false,
            format: DescriptorFormat::Current,
        };
    }
    let legacy = module
        .schema
        .as_ref()
        .and_then(Value::as_object)
        .is_some_and(|s| s.contains_key("flowMCP"));
    if legacy {
        return Detection {
            is_legacy: true,
            format: DescriptorFormat::Legacy,
        };
    }
    Detection {
        is_legacy: false,
        format: DescriptorFormat::Unknown,
    }
}

/// What a legacy handler sees and hands back.
#[derive(Debug, Clone)]
pub struct LegacyContext {
    pub request: RequestStruct,
    pub payload: Payload,
    pub user_params: Map<String, Value>,
    pub route_name: String,
    /// The modifier's own phase string, e.g. `pre` or `postRequest`.
    pub phase: String,
}

pub type LegacyFuture = BoxFuture<'static, Result<LegacyContext, HookError>>;

type LegacyFn = dyn Fn(LegacyContext) -> LegacyFuture + Send + Sync;

#[derive(Clone)]
pub struct LegacyHandler {
    f: Arc<LegacyFn>,
}

impl LegacyHandler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(LegacyContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LegacyContext, HookError>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |ctx| Box::pin(f(ctx))),
        }
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(LegacyContext) -> Result<LegacyContext, HookError> + Send + Sync + 'static,
    {
        Self::new(move |ctx| {
            let out = f(ctx);
            async move { out }
        })
    }

    pub fn call(&self, ctx: LegacyContext) -> LegacyFuture {
        (self.f)(ctx)
    }
}

impl std::fmt::Debug for LegacyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LegacyHandler(..)")
    }
}

#[derive(Debug, Clone)]
pub struct Adapted {
    pub main: Value,
    pub handlers: Option<HandlersFactory>,
    pub has_handlers: bool,
    pub warnings: Vec<String>,
}

/// Rewrite a legacy schema into a current `main` block plus hooks.
///
/// Modifiers are applied in declaration order; when two land in the same slot of a route the
/// later one replaces the earlier and a warning names both. Modifiers whose handler is not
/// registered are skipped with a warning.
pub fn adapt(schema: &Value, handlers: &BTreeMap<String, LegacyHandler>) -> Adapted {
    let mut warnings = vec![DEPRECATION_WARNING.to_string()];
    let empty = Map::new();
    let schema = schema.as_object().unwrap_or(&empty);

    let mut main = Map::new();
    for field in COPIED_FIELDS {
        if let Some(v) = schema.get(field) {
            main.insert(field.to_string(), v.clone());
        }
    }
    main.insert("version".to_string(), Value::String(ADAPTED_VERSION.to_string()));

    let mut routes = Map::new();
    let mut hooks: BTreeMap<String, RouteHooks> = BTreeMap::new();
    if let Some(legacy_routes) = schema.get("routes").and_then(Value::as_object) {
        for (route_name, legacy) in legacy_routes {
            routes.insert(route_name.clone(), adapt_route(legacy));

            let route_hooks = collect_modifiers(route_name, legacy, handlers, &mut warnings);
            if !route_hooks.is_empty() {
                hooks.insert(route_name.clone(), route_hooks);
            }
        }
    }
    main.insert("routes".to_string(), Value::Object(routes));

    for w in &warnings {
        warn!(warning = %w, "legacy descriptor");
    }

    let has_handlers = !hooks.is_empty();
    let handlers = has_handlers.then(|| {
        let hooks = Arc::new(hooks);
        HandlersFactory::new(move |_| hooks.as_ref().clone())
    });

    Adapted {
        main: Value::Object(main),
        handlers,
        has_handlers,
        warnings,
    }
}

fn adapt_route(legacy: &Value) -> Value {
    let mut route = Map::new();
    let renamed = [("requestMethod", "method"), ("route", "path")];
    for (from, to) in renamed {
        if let Some(v) = legacy.get(from) {
            route.insert(to.to_string(), v.clone());
        }
    }
    for field in ["description", "parameters", "output", "tests"] {
        if let Some(v) = legacy.get(field) {
            route.insert(field.to_string(), v.clone());
        }
    }
    Value::Object(route)
}

fn slot_for(phase: &str) -> Option<HookPhase> {
    if phase == "execute" {
        Some(HookPhase::ExecuteRequest)
    } else if phase.contains("pre") {
        Some(HookPhase::PreRequest)
    } else if phase.contains("post") {
        Some(HookPhase::PostRequest)
    } else {
        None
    }
}

fn collect_modifiers(
    route_name: &str,
    legacy: &Value,
    handlers: &BTreeMap<String, LegacyHandler>,
    warnings: &mut Vec<String>,
) -> RouteHooks {
    let mut out = RouteHooks::default();
    let mut installed: BTreeMap<HookPhase, String> = BTreeMap::new();
    let Some(modifiers) = legacy.get("modifiers").and_then(Value::as_array) else {
        return out;
    };

    for m in modifiers {
        let phase = m.get("phase").and_then(Value::as_str).unwrap_or_default();
        let name = m.get("handlerName").and_then(Value::as_str).unwrap_or_default();

        let Some(slot) = slot_for(phase) else {
            warnings.push(format!(
                "Route \"{route_name}\": unknown modifier phase \"{phase}\", skipped"
            ));
            continue;
        };
        let Some(handler) = handlers.get(name) else {
            warnings.push(format!(
                "Route \"{route_name}\": handler \"{name}\" not found, modifier skipped"
            ));
            continue;
        };

        if out.set(slot, wrap(slot, phase, handler.clone())).is_some() {
            let previous = installed.get(&slot).cloned().unwrap_or_default();
            warnings.push(format!(
                "Route \"{route_name}\": {slot} handler \"{previous}\" replaced by \"{name}\""
            ));
        }
        installed.insert(slot, name.to_string());
    }
    out
}

fn wrap(slot: HookPhase, phase: &str, handler: LegacyHandler) -> Hook {
    let phase = phase.to_string();
    Hook::new(move |mut ctx: HookContext| {
        let handler = handler.clone();
        let phase = phase.clone();
        async move {
            if slot == HookPhase::PostRequest {
                if let Some(response) = ctx.response.take() {
                    ctx.request.data = response;
                }
            }

            let out = handler
                .call(LegacyContext {
                    request: ctx.request,
                    payload: ctx.payload,
                    user_params: ctx.user_params.clone(),
                    route_name: ctx.route_name.clone(),
                    phase,
                })
                .await?;
            ctx.request = out.request;
            ctx.payload = out.payload;

            if slot != HookPhase::PreRequest {
                ctx.response = Some(ctx.request.data.clone());
            }
            Ok(ctx)
        }
    })
}
