use std::collections::BTreeMap;

use serde_json::json;
use toolgate_core::lists::SharedLists;
use toolgate_core::route_input_schema;
use toolgate_core::types::{ListMeta, Route, SharedList};

fn route() -> Route {
    serde_json::from_value(json!({
        "method": "GET",
        "path": "/balances/{{chain}}",
        "description": "Balances",
        "parameters": [
            { "position": { "key": "chain", "value": "{{USER_PARAM}}", "location": "insert" },
              "z": { "primitive": "enum({{chains:alias}})", "options": [] } },
            { "position": { "key": "limit", "value": "{{USER_PARAM}}", "location": "query" },
              "z": { "primitive": "number()", "options": ["min(1)", "max(100)", "default(10)"] } },
            { "position": { "key": "address", "value": "{{USER_PARAM}}", "location": "query" },
              "z": { "primitive": "string()", "options": ["length(42)", "regex(^0x)", "optional()"] } },
            { "position": { "key": "apikey", "value": "{{SERVER_PARAM:API_KEY}}", "location": "query" },
              "z": { "primitive": "string()", "options": [] } }
        ]
    }))
    .unwrap()
}

fn lists() -> SharedLists {
    let mut map = BTreeMap::new();
    map.insert(
        "chains".to_string(),
        SharedList {
            meta: ListMeta {
                name: "chains".into(),
                version: "1.0.0".into(),
                description: String::new(),
                fields: vec![],
            },
            entries: vec![json!({ "alias": "ETH" }), json!({ "alias": "POLYGON" })],
        },
    );
    SharedLists::freeze(map)
}

#[test]
fn describes_only_user_parameters() {
    let shape = route_input_schema(&route(), &lists());
    assert!(shape.diagnostics.is_empty(), "{:?}", shape.diagnostics);

    let props = shape.schema["properties"].as_object().unwrap();
    assert_eq!(props.len(), 3);
    assert!(!props.contains_key("apikey"));

    assert_eq!(props["chain"]["enum"], json!(["ETH", "POLYGON"]));
    assert_eq!(props["limit"]["minimum"], json!(1.0));
    assert_eq!(props["limit"]["maximum"], json!(100.0));
    assert_eq!(props["limit"]["default"], json!(10));
    assert_eq!(props["address"]["minLength"], json!(42));
    assert_eq!(props["address"]["maxLength"], json!(42));
    assert_eq!(props["address"]["pattern"], json!("^0x"));
    assert_eq!(shape.schema["required"], json!(["chain"]));
}

#[test]
fn unknown_primitive_is_a_diagnostic() {
    let mut r = route();
    r.parameters[0].z.primitive = "bigint()".into();
    let shape = route_input_schema(&r, &SharedLists::default());
    assert_eq!(shape.diagnostics, vec!["chain: unknown primitive bigint()".to_string()]);
}
