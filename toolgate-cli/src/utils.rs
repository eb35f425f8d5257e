use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use toolgate_exec::engine::{EngineConfig, ServerParams};
use toolgate_exec::libraries::{LibraryAllowlist, StaticLibraryProvider};
use toolgate_exec::module::{FileModuleLoader, HandlerCatalog};
use toolgate_exec::pipeline::{Pipeline, PipelineConfig};

use crate::{EngineArgs, LoadArgs, ParamArgs, ServerArgs};

/// Pipeline over files on disk. The CLI carries no compiled-in hooks or libraries.
pub fn file_pipeline() -> Pipeline {
    Pipeline::new(
        Arc::new(FileModuleLoader::new(HandlerCatalog::new())),
        Arc::new(StaticLibraryProvider::new()),
    )
}

pub fn pipeline_config(load: &LoadArgs) -> PipelineConfig {
    PipelineConfig {
        lists_dir: load.lists_dir.clone(),
        allowlist: (!load.allow_libraries.is_empty())
            .then(|| LibraryAllowlist::new(load.allow_libraries.iter().cloned())),
    }
}

pub fn engine_config(engine: &EngineArgs) -> EngineConfig {
    EngineConfig {
        timeout: Duration::from_millis(engine.timeout),
        max_response_bytes: engine.max_response_bytes,
    }
}

pub fn split_key_value(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k, v)),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

pub fn load_user_params(args: &ParamArgs) -> Result<Map<String, Value>, String> {
    let mut params = match &args.params_file {
        Some(path) => read_params_file(path)?,
        None => Map::new(),
    };
    for s in &args.params {
        let (k, v) = split_key_value(s)?;
        params.insert(k.to_string(), Value::String(v.to_string()));
    }
    Ok(params)
}

fn read_params_file(path: &Path) -> Result<Map<String, Value>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read params {}: {e}", path.display()))?;
    let value = toolgate_core::parse_value_str(&content)
        .map_err(|e| format!("failed to parse params {}: {e}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("params file {} must contain an object", path.display())),
    }
}

pub fn server_params(args: &ServerArgs) -> Result<ServerParams, String> {
    let mut out = ServerParams::from_env(args.server_param_env.iter().map(String::as_str));
    for s in &args.server_params {
        let (k, v) = split_key_value(s)?;
        out.insert(k, v);
    }
    Ok(out)
}
