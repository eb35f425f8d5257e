//! Per-route request hooks.
//!
//! A hook is an async function from [`HookContext`] to [`HookContext`]: it receives the request
//! state owned for the duration of the call and hands back the (possibly rewritten) state.

mod factory;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use toolgate_core::SharedLists;

use crate::engine::{Payload, RequestStruct};
use crate::libraries::Libraries;

pub use factory::{create_handler_map, HandlerFactoryError};

pub type HookFuture = BoxFuture<'static, Result<HookContext, HookError>>;

type HookFn = dyn Fn(HookContext) -> HookFuture + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for HookError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HookError {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookPhase {
    PreRequest,
    ExecuteRequest,
    PostRequest,
}

impl HookPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            HookPhase::PreRequest => "preRequest",
            HookPhase::ExecuteRequest => "executeRequest",
            HookPhase::PostRequest => "postRequest",
        }
    }
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State handed to a hook.
///
/// `preRequest` typically rewrites `payload`; `executeRequest` sets `response` (or writes
/// `request.data` directly); `postRequest` reads and replaces `response`.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub route_name: String,
    pub user_params: Map<String, Value>,
    pub request: RequestStruct,
    pub payload: Payload,
    pub response: Option<Value>,
}

#[derive(Clone)]
pub struct Hook {
    f: Arc<HookFn>,
}

impl Hook {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HookContext, HookError>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |ctx| Box::pin(f(ctx))),
        }
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(HookContext) -> Result<HookContext, HookError> + Send + Sync + 'static,
    {
        Self::new(move |ctx| {
            let out = f(ctx);
            async move { out }
        })
    }

    pub fn call(&self, ctx: HookContext) -> HookFuture {
        (self.f)(ctx)
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// The three hook slots of one route; unset slots are `None`.
#[derive(Debug, Clone, Default)]
pub struct RouteHooks {
    pub pre_request: Option<Hook>,
    pub execute_request: Option<Hook>,
    pub post_request: Option<Hook>,
}

impl RouteHooks {
    pub fn with(mut self, phase: HookPhase, hook: Hook) -> Self {
        self.set(phase, hook);
        self
    }

    /// Install `hook` for `phase`, returning whatever was installed before.
    pub fn set(&mut self, phase: HookPhase, hook: Hook) -> Option<Hook> {
        self.slot_mut(phase).replace(hook)
    }

    pub fn get(&self, phase: HookPhase) -> Option<&Hook> {
        match phase {
            HookPhase::PreRequest => self.pre_request.as_ref(),
            HookPhase::ExecuteRequest => self.execute_request.as_ref(),
            HookPhase::PostRequest => self.post_request.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pre_request.is_none() && self.execute_request.is_none() && self.post_request.is_none()
    }

    fn slot_mut(&mut self, phase: HookPhase) -> &mut Option<Hook> {
        match phase {
            HookPhase::PreRequest => &mut self.pre_request,
            HookPhase::ExecuteRequest => &mut self.execute_request,
            HookPhase::PostRequest => &mut self.post_request,
        }
    }
}

/// Route name to hooks, one entry for every declared route.
pub type HandlerMap = BTreeMap<String, RouteHooks>;

/// Everything a handlers factory may capture.
#[derive(Debug, Clone, Default)]
pub struct HandlerDeps {
    pub shared_lists: SharedLists,
    pub libraries: Libraries,
}

type FactoryFn = dyn Fn(&HandlerDeps) -> BTreeMap<String, RouteHooks> + Send + Sync;

/// Compiled-in hook construction for one descriptor.
#[derive(Clone)]
pub struct HandlersFactory {
    f: Arc<FactoryFn>,
}

impl HandlersFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HandlerDeps) -> BTreeMap<String, RouteHooks> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    pub fn build(&self, deps: &HandlerDeps) -> BTreeMap<String, RouteHooks> {
        (self.f)(deps)
    }
}

impl std::fmt::Debug for HandlersFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HandlersFactory(..)")
    }
}
