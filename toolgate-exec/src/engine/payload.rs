use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};
use toolgate_core::template::{
    parse_value_template, replace_placeholders, server_param_name, ValueSource,
};
use toolgate_core::types::{Descriptor, HttpMethod, Parameter, ParameterLocation, Route};
use tracing::debug;

use crate::engine::ServerParams;

/// Request as synthesized from a route, before hooks run.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub method: HttpMethod,
    pub url: url::Url,
    pub headers: BTreeMap<String, String>,
    /// `None` when the route has no body parameters or its method carries no body.
    pub body: Option<Map<String, Value>>,
}

impl Payload {
    pub fn body_bytes(&self) -> Result<Vec<u8>, String> {
        match &self.body {
            None => Ok(Vec::new()),
            Some(b) => serde_json::to_vec(b).map_err(|e| format!("failed to serialize body: {e}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuiltPayload {
    pub payload: Payload,
    /// Header names whose value came from a server param; masked when logged.
    pub secret_headers: Vec<String>,
}

pub fn build_payload(
    main: &Descriptor,
    route: &Route,
    user_params: &Map<String, Value>,
    server_params: &ServerParams,
) -> Result<BuiltPayload, String> {
    let mut headers = BTreeMap::new();
    let mut secret_headers = Vec::new();
    for (name, template) in &main.headers {
        let mut from_server = false;
        let value = replace_placeholders(template, |token| {
            let v = server_param_name(token).and_then(|n| server_params.get(n))?;
            from_server = true;
            Some(v.to_string())
        });
        if from_server {
            secret_headers.push(name.clone());
        }
        headers.insert(name.clone(), value);
    }

    let mut path = route.path.clone();
    let mut query = Vec::<(String, String)>::new();
    let mut body: Option<Map<String, Value>> = None;

    for p in &route.parameters {
        let resolved = resolve_value(p, user_params, server_params);
        match p.position.location {
            ParameterLocation::Insert => {
                if let Some(v) = resolved {
                    path = insert_path_param(&path, &p.position.key, &value_to_string(&v))?;
                }
            }
            ParameterLocation::Query => {
                if let Some(v) = resolved {
                    query.push((p.position.key.clone(), value_to_string(&v)));
                }
            }
            ParameterLocation::Body if !route.method.allows_body() => {
                debug!(method = %route.method, key = %p.position.key, "body parameter dropped");
            }
            ParameterLocation::Body => {
                let fields = body.get_or_insert_with(Map::new);
                if let Some(v) = resolved {
                    fields.insert(p.position.key.clone(), v);
                }
            }
        }
    }

    let raw_url = replace_placeholders(&format!("{}{}", main.root, path), |token| {
        server_param_name(token)
            .and_then(|n| server_params.get(n))
            .map(str::to_string)
    });
    let mut url = url::Url::parse(&raw_url).map_err(|e| format!("invalid URL {raw_url}: {e}"))?;
    if !query.is_empty() {
        let mut qp = url.query_pairs_mut();
        for (k, v) in &query {
            qp.append_pair(k, v);
        }
    }

    if body.is_some()
        && !headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
    {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }

    Ok(BuiltPayload {
        payload: Payload {
            method: route.method,
            url,
            headers,
            body,
        },
        secret_headers,
    })
}

/// `None` means the value is undefined: the parameter is left out of the request.
fn resolve_value(
    p: &Parameter,
    user_params: &Map<String, Value>,
    server_params: &ServerParams,
) -> Option<Value> {
    match parse_value_template(&p.position.value) {
        ValueSource::Literal(s) => Some(Value::String(s)),
        ValueSource::UserParam => user_params.get(&p.position.key).cloned(),
        ValueSource::ServerParam(name) => server_params
            .get(&name)
            .map(|v| Value::String(v.to_string())),
    }
}

/// Substitute both the `{{key}}` and the `:key` form.
fn insert_path_param(path: &str, key: &str, value: &str) -> Result<String, String> {
    let encoded = urlencoding::encode(value);
    let path = path.replace(&format!("{{{{{key}}}}}"), &encoded);
    let colon = Regex::new(&format!(r":{}\b", regex::escape(key)))
        .map_err(|e| format!("invalid path key {key}: {e}"))?;
    Ok(colon
        .replace_all(&path, regex::NoExpand(encoded.as_ref()))
        .into_owned())
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_both_path_forms() {
        assert_eq!(
            insert_path_param("/users/{{id}}/posts", "id", "42").unwrap(),
            "/users/42/posts"
        );
        assert_eq!(insert_path_param("/users/:id", "id", "a b").unwrap(), "/users/a%20b");
        assert_eq!(
            insert_path_param("/users/:idx/:id", "id", "7").unwrap(),
            "/users/:idx/7"
        );
    }

    #[test]
    fn array_values_join_with_commas() {
        assert_eq!(value_to_string(&serde_json::json!(["a", 1, true])), "a,1,true");
    }
}
