use std::collections::BTreeMap;

use crate::types::{AnyValue, EntryFilter, JsonSchema, Parameter};

/// The `main` block of a current-dialect descriptor.
///
/// Built from a raw value only after [`crate::validate_main`] accepted it; the raw value is what
/// the validator inspects so that type errors are reported as violations instead of serde errors.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub namespace: String,
    pub name: String,
    pub description: String,
    pub version: String,
    /// Base URL, `https://` and without a trailing slash.
    pub root: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_server_params: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_libraries: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_lists: Vec<SharedListRef>,

    /// Header name to value template.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    pub routes: BTreeMap<String, Route>,
}

impl Descriptor {
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    pub fn route_names(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    /// Name under which a host registers the route as a tool.
    pub fn tool_name(&self, route_name: &str) -> String {
        format!("{}_{}", self.namespace, route_name)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SharedListRef {
    #[serde(rename = "ref")]
    pub reference: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<EntryFilter>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub description: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,

    /// Example user parameter sets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<AnyValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALLOWED: [&'static str; 4] = ["GET", "POST", "PUT", "DELETE"];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn allows_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub mime_type: MimeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonSchema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MimeType {
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "text/plain")]
    Text,
}

impl MimeType {
    pub const ALLOWED: [&'static str; 3] = ["application/json", "image/png", "text/plain"];

    pub fn as_str(self) -> &'static str {
        match self {
            MimeType::Json => "application/json",
            MimeType::Png => "image/png",
            MimeType::Text => "text/plain",
        }
    }
}
