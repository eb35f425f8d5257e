mod common;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::{sample_main, MockHttpClient};
use serde_json::{json, Map, Value};
use tempfile::TempDir;
use toolgate_exec::engine::{EngineConfig, RequestEngine, ServerParams};
use toolgate_exec::hooks::{HandlersFactory, Hook, HookPhase, RouteHooks};
use toolgate_exec::legacy::LegacyHandler;
use toolgate_exec::libraries::{Library, LibraryError, StaticLibraryProvider};
use toolgate_exec::module::{
    DescriptorModule, FileModuleLoader, HandlerCatalog, LoadError, ModuleLoader, StaticModuleLoader,
};
use toolgate_exec::pipeline::{Pipeline, PipelineConfig};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn pipeline(catalog: HandlerCatalog) -> Pipeline {
    Pipeline::new(
        Arc::new(FileModuleLoader::new(catalog)),
        Arc::new(StaticLibraryProvider::new()),
    )
}

fn descriptor_file(main: Value) -> String {
    serde_json::to_string_pretty(&json!({ "main": main })).unwrap()
}

#[tokio::test]
async fn valid_descriptor_activates() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "demo.json", &descriptor_file(sample_main()));

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(bundle.status, "{:?}", bundle.messages);
    assert!(bundle.messages.is_empty());
    assert_eq!(bundle.route_names(), vec!["search", "update"]);
    assert_eq!(bundle.tool_name("search").as_deref(), Some("demo_search"));
    assert_eq!(bundle.tool_name("missing"), None);
    assert_eq!(bundle.handler_map.len(), 2);
    assert!(bundle.handler_map.values().all(RouteHooks::is_empty));
}

#[tokio::test]
async fn process_access_is_blocked_before_load() {
    let dir = TempDir::new().unwrap();
    let source = "# process.env in a comment is fine\nmain:\n  namespace: demo\n  description: reads process.env.SECRET\n";
    let path = write(dir.path(), "demo.yaml", source);

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(!bundle.status);
    assert_eq!(bundle.messages.len(), 1);
    assert!(bundle.messages[0].contains("SEC006"));
    assert!(bundle.messages[0].contains("line 4"));
    assert_eq!(bundle.main, Value::Null);
}

#[tokio::test]
async fn validation_failure_keeps_main() {
    let dir = TempDir::new().unwrap();
    let mut main = sample_main();
    main["namespace"] = json!("Demo1");
    main["root"] = json!("http://api.example.com/");
    let path = write(dir.path(), "demo.json", &descriptor_file(main));

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(!bundle.status);
    assert_eq!(bundle.messages.len(), 3, "{:?}", bundle.messages);
    assert_eq!(bundle.main["namespace"], json!("Demo1"));
    assert!(bundle.descriptor.is_none());
}

#[tokio::test]
async fn missing_exports_fail() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "empty.json", r#"{ "other": 1 }"#);

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(!bundle.status);
    assert_eq!(bundle.messages, vec!["No main export found".to_string()]);
}

#[tokio::test]
async fn unregistered_handler_set_fails_load() {
    let dir = TempDir::new().unwrap();
    let mut doc = json!({ "main": sample_main() });
    doc["handlers"] = json!("nowhere");
    let path = write(dir.path(), "demo.json", &doc.to_string());

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(!bundle.status);
    assert!(bundle.messages[0].contains("nowhere"));
}

#[tokio::test]
async fn shared_lists_are_resolved_into_bundle() {
    let dir = TempDir::new().unwrap();
    let lists = dir.path().join("lists");
    std::fs::create_dir(&lists).unwrap();
    write(
        &lists,
        "chains.yaml",
        "meta:\n  name: chains\n  version: 2.0.0\n  description: chains\n  fields: [alias]\nentries:\n  - alias: ETH\n  - alias: POLY\n",
    );
    let mut main = sample_main();
    main["sharedLists"] = json!([{ "ref": "chains", "version": "2.0.0" }]);
    main["routes"]["search"]["parameters"][0]["z"]["primitive"] = json!("enum({{chains:alias}})");
    let path = write(dir.path(), "demo.json", &descriptor_file(main));

    let config = PipelineConfig {
        lists_dir: Some(lists),
        ..PipelineConfig::default()
    };
    let bundle = pipeline(HandlerCatalog::new()).load(&path, &config).await;

    assert!(bundle.status, "{:?}", bundle.messages);
    assert_eq!(bundle.shared_lists.entries("chains").unwrap().len(), 2);
    let shape = bundle.input_schema("search").unwrap();
    assert_eq!(shape.schema["properties"]["q"]["enum"], json!(["ETH", "POLY"]));
}

#[tokio::test]
async fn shared_list_version_mismatch_aborts() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "chains.json",
        r#"{"meta":{"name":"chains","version":"2.0.0"},"entries":[]}"#,
    );
    let mut main = sample_main();
    main["sharedLists"] = json!([{ "ref": "chains", "version": "2.1.0" }]);
    let path = write(dir.path(), "demo.json", &descriptor_file(main));

    let config = PipelineConfig {
        lists_dir: Some(dir.path().to_path_buf()),
        ..PipelineConfig::default()
    };
    let bundle = pipeline(HandlerCatalog::new()).load(&path, &config).await;

    assert!(!bundle.status);
    assert!(bundle.messages[0].contains("version mismatch"));
}

#[tokio::test]
async fn shared_lists_without_directory_warn() {
    let dir = TempDir::new().unwrap();
    let mut main = sample_main();
    main["sharedLists"] = json!([{ "ref": "chains", "version": "2.0.0" }]);
    let path = write(dir.path(), "demo.json", &descriptor_file(main));

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(bundle.status);
    assert!(bundle.shared_lists.is_empty());
    assert_eq!(bundle.warnings.len(), 1);
}

#[tokio::test]
async fn disallowed_library_aborts() {
    let dir = TempDir::new().unwrap();
    let mut main = sample_main();
    main["requiredLibraries"] = json!(["left-pad"]);
    let path = write(dir.path(), "demo.json", &descriptor_file(main));

    let bundle = pipeline(HandlerCatalog::new())
        .load(&path, &PipelineConfig::default())
        .await;

    assert!(!bundle.status);
    assert_eq!(bundle.messages, vec!["libraries not in allowlist: left-pad".to_string()]);
}

struct Upper;

impl Library for Upper {
    fn name(&self) -> &str {
        "moment"
    }

    fn call(&self, _function: &str, args: Value) -> Result<Value, LibraryError> {
        Ok(json!(args.as_str().unwrap_or_default().to_uppercase()))
    }
}

#[tokio::test]
async fn factory_hooks_capture_libraries_and_run() {
    let dir = TempDir::new().unwrap();
    let mut main = sample_main();
    main["requiredLibraries"] = json!(["moment"]);
    let path = write(dir.path(), "demo.json", &descriptor_file(main));

    let factory = HandlersFactory::new(|deps| {
        let lib = deps.libraries.get("moment").cloned();
        let post = Hook::sync(move |mut ctx| {
            let lib = lib.as_ref().ok_or("moment not loaded")?;
            let name = ctx.response.take().unwrap_or_default()["name"].clone();
            ctx.response = Some(lib.call("upper", name).map_err(|e| e.to_string())?);
            Ok(ctx)
        });
        BTreeMap::from([(
            "search".to_string(),
            RouteHooks::default().with(HookPhase::PostRequest, post),
        )])
    });
    let catalog = HandlerCatalog::new().with_factory("demo", factory);
    let loader = FileModuleLoader::new(catalog);
    let provider = StaticLibraryProvider::new().with(Arc::new(Upper));
    let bundle = Pipeline::new(Arc::new(loader), Arc::new(provider))
        .load(&path, &PipelineConfig::default())
        .await;
    assert!(bundle.status, "{:?}", bundle.messages);
    assert_eq!(bundle.libraries.names().collect::<Vec<_>>(), vec!["moment"]);

    let client = Arc::new(MockHttpClient::ok(r#"{"name":"ada"}"#));
    let engine = RequestEngine::new(client, EngineConfig::default());
    let result = engine
        .call(
            &bundle,
            "search",
            &Map::new(),
            &ServerParams::new().with("API_KEY", "k"),
        )
        .await;

    assert!(result.status, "{:?}", result.messages);
    assert_eq!(result.data, json!("ADA"));
}

#[tokio::test]
async fn legacy_descriptor_is_adapted_with_warnings() {
    let source = r#"
schema:
  namespace: legacy
  name: Legacy
  description: Old style
  flowMCP: 1.2.0
  root: https://legacy.example
  routes:
    ping:
      requestMethod: GET
      description: Ping
      route: /ping
      parameters: []
      modifiers:
        - phase: post
          handlerName: wrap
        - phase: pre
          handlerName: missing
"#;
    let catalog = HandlerCatalog::new().with_legacy(
        "legacy",
        "wrap",
        LegacyHandler::sync(|mut ctx| {
            ctx.request.data = json!({ "wrapped": ctx.request.data.clone() });
            Ok(ctx)
        }),
    );
    let mut loader = StaticModuleLoader::new();
    loader.insert_document("legacy.yaml", source, &catalog).unwrap();
    let pipeline = Pipeline::new(Arc::new(loader), Arc::new(StaticLibraryProvider::new()));

    let bundle = pipeline
        .load(Path::new("legacy.yaml"), &PipelineConfig::default())
        .await;

    assert!(bundle.status, "{:?}", bundle.messages);
    assert_eq!(bundle.main["version"], json!("2.0.0"));
    assert_eq!(bundle.warnings.len(), 2);
    assert!(bundle.handler_map["ping"].post_request.is_some());
    assert!(bundle.handler_map["ping"].pre_request.is_none());
}

#[tokio::test]
async fn missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let bundle = pipeline(HandlerCatalog::new())
        .load(&dir.path().join("absent.json"), &PipelineConfig::default())
        .await;

    assert!(!bundle.status);
    assert!(bundle.messages[0].starts_with("failed to read"));
}

/// Serves the scanned text once; any later read sees a rewritten document.
struct RewrittenAfterRead {
    inner: FileModuleLoader,
    reads: AtomicUsize,
    rewritten: String,
}

#[async_trait]
impl ModuleLoader for RewrittenAfterRead {
    async fn read_source(&self, path: &Path) -> Result<String, LoadError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.read_source(path).await
        } else {
            Ok(self.rewritten.clone())
        }
    }

    async fn load(&self, path: &Path, source: &str) -> Result<DescriptorModule, LoadError> {
        self.inner.load(path, source).await
    }
}

#[tokio::test]
async fn the_scanned_text_is_the_one_bound() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "demo.json", &descriptor_file(sample_main()));
    let mut rewritten = sample_main();
    rewritten["namespace"] = json!("other");
    rewritten["description"] = json!("reads process.env.SECRET");
    let loader = Arc::new(RewrittenAfterRead {
        inner: FileModuleLoader::default(),
        reads: AtomicUsize::new(0),
        rewritten: descriptor_file(rewritten),
    });
    let pipeline = Pipeline::new(loader.clone(), Arc::new(StaticLibraryProvider::new()));

    let bundle = pipeline.load(&path, &PipelineConfig::default()).await;

    assert!(bundle.status, "{:?}", bundle.messages);
    assert_eq!(loader.reads.load(Ordering::SeqCst), 1);
    assert_eq!(bundle.descriptor().unwrap().namespace, "demo");
}
