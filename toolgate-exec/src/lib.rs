#![forbid(unsafe_code)]

//! Loading pipeline and request engine for API descriptors.
//!
//! Static checks and types live in `toolgate-core`; this crate resolves a descriptor's
//! dependencies, binds its hooks and performs route calls.

pub mod engine;
pub mod hooks;
pub mod legacy;
pub mod libraries;
pub mod lists;
pub mod module;
pub mod pipeline;

pub use crate::engine::{EngineConfig, RequestEngine, RequestStruct, ServerParams};
pub use crate::hooks::{
    HandlerDeps, HandlerMap, HandlersFactory, Hook, HookContext, HookError, HookPhase, RouteHooks,
};
pub use crate::legacy::{LegacyContext, LegacyHandler};
pub use crate::libraries::{Library, LibraryAllowlist, LibraryError, LibraryProvider, StaticLibraryProvider};
pub use crate::module::{DescriptorModule, FileModuleLoader, HandlerCatalog, LoadError, ModuleLoader, StaticModuleLoader};
pub use crate::pipeline::{ActivationBundle, Pipeline, PipelineConfig};
