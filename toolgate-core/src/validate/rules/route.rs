use serde_json::Value;

use crate::types::{HttpMethod, MimeType};
use crate::validate::rules::common::{require_non_empty_string, require_string, type_name, MISSING};
use crate::validate::rules::parameters;
use crate::validate::validator::Validator;

pub(crate) fn validate_route(v: &mut Validator, path: &str, route: &Value) {
    let Some(obj) = route.as_object() else {
        v.push(path, format!("Must be an object, got {}", type_name(route)));
        return;
    };

    if let Some(method) = require_string(v, obj, path, "method") {
        if HttpMethod::parse(method).is_none() {
            v.push(
                format!("{path}.method"),
                format!("Must be one of {}", HttpMethod::ALLOWED.join(", ")),
            );
        }
    }
    require_non_empty_string(v, obj, path, "path");
    require_non_empty_string(v, obj, path, "description");

    match obj.get("parameters") {
        None => v.push(format!("{path}.parameters"), MISSING),
        Some(Value::Array(items)) => {
            parameters::validate_parameter_list(v, &format!("{path}.parameters"), items)
        }
        Some(other) => v.push(
            format!("{path}.parameters"),
            format!("Must be an array, got {}", type_name(other)),
        ),
    }

    if let Some(output) = obj.get("output") {
        validate_output(v, &format!("{path}.output"), output);
    }

    if let Some(tests) = obj.get("tests") {
        match tests.as_array() {
            Some(items) => {
                for (idx, t) in items.iter().enumerate() {
                    if !t.is_object() {
                        v.push(format!("{path}.tests[{idx}]"), "Must be an object");
                    }
                }
            }
            None => v.push(format!("{path}.tests"), "Must be an array"),
        }
    }
}

fn validate_output(v: &mut Validator, path: &str, output: &Value) {
    let Some(obj) = output.as_object() else {
        v.push(path, format!("Must be an object, got {}", type_name(output)));
        return;
    };
    if let Some(mime) = require_string(v, obj, path, "mimeType") {
        if !MimeType::ALLOWED.contains(&mime) {
            v.push(
                format!("{path}.mimeType"),
                format!("Must be one of {}", MimeType::ALLOWED.join(", ")),
            );
        }
    }
    if let Some(schema) = obj.get("schema") {
        if !schema.is_object() {
            v.push(format!("{path}.schema"), "Must be an object");
        }
    }
}
