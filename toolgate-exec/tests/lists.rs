use std::path::Path;

use serde_json::json;
use tempfile::TempDir;
use toolgate_core::types::{EntryFilter, SharedListRef};
use toolgate_exec::lists::{candidate_paths, resolve_shared_lists, SharedListError};

fn write_chains(dir: &Path) {
    let list = json!({
        "meta": {
            "name": "evmChains",
            "version": "1.0.0",
            "description": "EVM chains",
            "fields": ["alias", "chainId", "mainnet"]
        },
        "entries": [
            { "alias": "ETHEREUM_MAINNET", "chainId": 1, "mainnet": true },
            { "alias": "POLYGON_MAINNET", "chainId": 137, "mainnet": true },
            { "alias": "SEPOLIA", "chainId": 11155111, "mainnet": null }
        ]
    });
    std::fs::write(dir.join("evm-chains.json"), list.to_string()).unwrap();
}

fn chains_ref(version: &str, filter: Option<EntryFilter>) -> SharedListRef {
    SharedListRef {
        reference: "evm-chains".to_string(),
        version: version.to_string(),
        filter,
    }
}

#[tokio::test]
async fn resolves_by_meta_name() {
    let dir = TempDir::new().unwrap();
    write_chains(dir.path());

    let lists = resolve_shared_lists(&[chains_ref("1.0.0", None)], dir.path())
        .await
        .unwrap();

    assert_eq!(lists.names().collect::<Vec<_>>(), vec!["evmChains"]);
    assert_eq!(lists.entries("evmChains").unwrap().len(), 3);
    assert!(lists.get("evm-chains").is_none());
}

#[tokio::test]
async fn version_must_match_exactly() {
    let dir = TempDir::new().unwrap();
    write_chains(dir.path());

    let err = resolve_shared_lists(&[chains_ref("1.0", None)], dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, SharedListError::VersionMismatch { .. }));
    assert_eq!(
        err.to_string(),
        "shared list evm-chains version mismatch: requested 1.0, found 1.0.0"
    );
}

#[tokio::test]
async fn missing_entries_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tokens.yaml"),
        "meta:\n  name: tokens\n  version: 1.0.0\n",
    )
    .unwrap();
    let refs = [SharedListRef {
        reference: "tokens".to_string(),
        version: "1.0.0".to_string(),
        filter: None,
    }];

    let err = resolve_shared_lists(&refs, dir.path()).await.unwrap_err();
    assert!(matches!(err, SharedListError::MissingField { field: "entries", .. }));
}

#[tokio::test]
async fn missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = resolve_shared_lists(&[chains_ref("1.0.0", None)], dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, SharedListError::NotFound { .. }));
}

#[tokio::test]
async fn filters_apply_before_storing() {
    let dir = TempDir::new().unwrap();
    write_chains(dir.path());

    let exists = EntryFilter::Exists {
        key: "mainnet".to_string(),
        exists: true,
    };
    let lists = resolve_shared_lists(&[chains_ref("1.0.0", Some(exists))], dir.path())
        .await
        .unwrap();
    assert_eq!(lists.entries("evmChains").unwrap().len(), 2);

    let only = EntryFilter::In {
        key: "chainId".to_string(),
        values: vec![json!(137)],
    };
    let lists = resolve_shared_lists(&[chains_ref("1.0.0", Some(only))], dir.path())
        .await
        .unwrap();
    assert_eq!(
        lists.entries("evmChains").unwrap()[0]["alias"],
        json!("POLYGON_MAINNET")
    );
}

#[tokio::test]
async fn resolution_is_idempotent_and_independent() {
    let dir = TempDir::new().unwrap();
    write_chains(dir.path());
    let refs = [chains_ref("1.0.0", None)];

    let a = resolve_shared_lists(&refs, dir.path()).await.unwrap();
    let b = resolve_shared_lists(&refs, dir.path()).await.unwrap();

    assert_eq!(a, b);
    assert!(!std::ptr::eq(
        a.entries("evmChains").unwrap().as_ptr(),
        b.entries("evmChains").unwrap().as_ptr()
    ));
}

#[test]
fn rejects_path_like_references() {
    let dir = Path::new("/lists");
    assert!(candidate_paths("../secrets", dir).is_err());
    assert!(candidate_paths("", dir).is_err());
    assert_eq!(
        candidate_paths("evm-chains", dir).unwrap()[0],
        dir.join("evm-chains.json")
    );
}

#[tokio::test]
async fn two_refs_with_one_meta_name_are_rejected() {
    let dir = TempDir::new().unwrap();
    write_chains(dir.path());
    std::fs::copy(dir.path().join("evm-chains.json"), dir.path().join("l2-chains.json")).unwrap();
    let l2 = SharedListRef {
        reference: "l2-chains".to_string(),
        ..chains_ref("1.0.0", None)
    };

    let err = resolve_shared_lists(&[chains_ref("1.0.0", None), l2], dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, SharedListError::DuplicateName { .. }));
    assert_eq!(
        err.to_string(),
        "shared lists evm-chains and l2-chains both declare the name evmChains"
    );
}
