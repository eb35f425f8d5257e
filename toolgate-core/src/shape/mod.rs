//! Input shape of a route as seen by a tool-calling host.
//!
//! Only `{{USER_PARAM}}` parameters are caller-facing; literal and server-param values are
//! filled in by the engine. The `z` rules are described as a JSON-Schema object, they are not
//! enforced here.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::lists::{interpolate_enum, SharedLists};
use crate::template::{parse_value_template, ValueSource};
use crate::types::{Parameter, Route};

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]+)\((.*)\)\s*$").expect("valid"));

#[derive(Debug, Clone, PartialEq)]
pub struct InputShape {
    pub schema: Value,
    pub diagnostics: Vec<String>,
}

pub fn route_input_schema(route: &Route, lists: &SharedLists) -> InputShape {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut diagnostics = Vec::new();

    for p in route.parameters.iter().filter(|p| is_user_param(p)) {
        let key = &p.position.key;
        let (prop, is_required) = describe_parameter(p, lists, &mut diagnostics);
        if is_required {
            required.push(Value::String(key.clone()));
        }
        properties.insert(key.clone(), prop);
    }

    InputShape {
        schema: json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        }),
        diagnostics,
    }
}

fn is_user_param(p: &Parameter) -> bool {
    matches!(parse_value_template(&p.position.value), ValueSource::UserParam)
}

fn describe_parameter(
    p: &Parameter,
    lists: &SharedLists,
    diagnostics: &mut Vec<String>,
) -> (Value, bool) {
    let key = &p.position.key;
    let mut prop = Map::new();
    let primitive = interpolate_enum(&p.z.primitive, lists);

    let kind = match CALL_RE.captures(&primitive) {
        Some(caps) => {
            let name = caps[1].to_string();
            match name.as_str() {
                "string" | "number" | "boolean" | "array" | "object" => {
                    prop.insert("type".into(), Value::String(name.clone()));
                }
                "enum" => {
                    let values: Vec<Value> = caps[2]
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect();
                    prop.insert("type".into(), Value::String("string".into()));
                    prop.insert("enum".into(), Value::Array(values));
                }
                other => {
                    diagnostics.push(format!("{key}: unknown primitive {other}()"));
                }
            }
            name
        }
        None => {
            diagnostics.push(format!("{key}: unparseable primitive {:?}", p.z.primitive));
            String::new()
        }
    };

    let mut required = true;
    for option in &p.z.options {
        let Some(caps) = CALL_RE.captures(option) else {
            diagnostics.push(format!("{key}: unparseable option {option:?}"));
            continue;
        };
        let arg = caps[2].trim();
        match &caps[1] {
            "optional" => required = false,
            "default" => {
                required = false;
                let v = serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.into()));
                prop.insert("default".into(), v);
            }
            "describe" => {
                prop.insert("description".into(), Value::String(arg.into()));
            }
            "regex" => {
                prop.insert("pattern".into(), Value::String(arg.into()));
            }
            "min" | "max" | "length" => match arg.parse::<f64>() {
                Ok(n) => insert_bound(&mut prop, &kind, &caps[1], n),
                Err(_) => diagnostics.push(format!("{key}: {option} expects a number")),
            },
            other => diagnostics.push(format!("{key}: unknown option {other}()")),
        }
    }

    (Value::Object(prop), required)
}

fn insert_bound(prop: &mut Map<String, Value>, kind: &str, option: &str, n: f64) {
    let (min_key, max_key) = match kind {
        "number" => ("minimum", "maximum"),
        "array" => ("minItems", "maxItems"),
        _ => ("minLength", "maxLength"),
    };
    let value = if kind == "number" {
        json!(n)
    } else {
        json!(n as u64)
    };
    match option {
        "min" => {
            prop.insert(min_key.into(), value);
        }
        "max" => {
            prop.insert(max_key.into(), value);
        }
        _ => {
            prop.insert(min_key.into(), value.clone());
            prop.insert(max_key.into(), value);
        }
    }
}
