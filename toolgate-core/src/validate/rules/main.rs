use serde_json::Value;

use crate::validate::rules::common::{optional_string_array, require_string, type_name, MISSING};
use crate::validate::rules::route;
use crate::validate::validator::{Validator, MAX_ROUTES, NAMESPACE_RE, VERSION_RE};

const PATH: &str = "main";

pub(crate) fn validate_main(v: &mut Validator, main: &Value) {
    let Some(obj) = main.as_object() else {
        v.push(PATH, format!("Must be an object, got {}", type_name(main)));
        return;
    };

    // Required fields gate everything else.
    let namespace = require_string(v, obj, PATH, "namespace");
    require_string(v, obj, PATH, "name");
    require_string(v, obj, PATH, "description");
    let version = require_string(v, obj, PATH, "version");
    let root = require_string(v, obj, PATH, "root");
    let routes = match obj.get("routes") {
        None | Some(Value::Null) => {
            v.push("main.routes", MISSING);
            None
        }
        Some(Value::Object(r)) => Some(r),
        Some(other) => {
            v.push(
                "main.routes",
                format!("Must be an object, got {}", type_name(other)),
            );
            None
        }
    };
    if v.has_violations() {
        return;
    }
    let (Some(namespace), Some(version), Some(root), Some(routes)) =
        (namespace, version, root, routes)
    else {
        return;
    };

    if !NAMESPACE_RE.is_match(namespace) {
        v.push(
            "main.namespace",
            "Must contain only lowercase letters (^[a-z]+$)",
        );
    }
    if !VERSION_RE.is_match(version) {
        v.push("main.version", "Must match pattern ^2\\.\\d+\\.\\d+$");
    }
    if !root.starts_with("https://") {
        v.push("main.root", "Must start with https://");
    }
    if root.ends_with('/') {
        v.push("main.root", "Must not end with a trailing slash");
    }
    if routes.len() > MAX_ROUTES {
        v.push(
            "main.routes",
            format!(
                "Maximum {MAX_ROUTES} routes allowed, found {}",
                routes.len()
            ),
        );
    }

    for field in ["tags", "requiredServerParams", "requiredLibraries", "docs"] {
        optional_string_array(v, obj, PATH, field);
    }
    validate_shared_lists(v, obj.get("sharedLists"));
    validate_headers(v, obj.get("headers"));

    for (name, r) in routes {
        route::validate_route(v, &format!("main.routes.{name}"), r);
    }
}

fn validate_shared_lists(v: &mut Validator, value: Option<&Value>) {
    let Some(value) = value else {
        return;
    };
    let Some(items) = value.as_array() else {
        v.push(
            "main.sharedLists",
            format!("Must be an array, got {}", type_name(value)),
        );
        return;
    };
    for (idx, item) in items.iter().enumerate() {
        let path = format!("main.sharedLists[{idx}]");
        let Some(entry) = item.as_object() else {
            v.push(path, "Must be an object with ref and version");
            continue;
        };
        require_string(v, entry, &path, "ref");
        require_string(v, entry, &path, "version");
        if let Some(filter) = entry.get("filter") {
            validate_filter(v, &format!("{path}.filter"), filter);
        }
    }
}

fn validate_filter(v: &mut Validator, path: &str, filter: &Value) {
    let Some(obj) = filter.as_object() else {
        v.push(path, "Must be an object");
        return;
    };
    require_string(v, obj, path, "key");
    let kinds = ["exists", "value", "in"]
        .iter()
        .filter(|k| obj.contains_key(**k))
        .count();
    if kinds != 1 {
        v.push(path, "Must define exactly one of exists, value, in");
        return;
    }
    if let Some(exists) = obj.get("exists") {
        if !exists.is_boolean() {
            v.push(format!("{path}.exists"), "Must be a boolean");
        }
    }
    if let Some(values) = obj.get("in") {
        if !values.is_array() {
            v.push(format!("{path}.in"), "Must be an array");
        }
    }
}

fn validate_headers(v: &mut Validator, value: Option<&Value>) {
    let Some(value) = value else {
        return;
    };
    let Some(headers) = value.as_object() else {
        v.push(
            "main.headers",
            format!("Must be an object, got {}", type_name(value)),
        );
        return;
    };
    for (k, h) in headers {
        if !h.is_string() {
            v.push(format!("main.headers.{k}"), "Must be a string");
        }
    }
}
