//! `{{token}}` placeholders used by parameter values, header values, and route paths.

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub const USER_PARAM: &str = "USER_PARAM";
pub const SERVER_PARAM_PREFIX: &str = "SERVER_PARAM:";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid"));
static WHOLE_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{([^{}]+)\}\}$").expect("valid"));

/// Where a parameter's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Literal(String),
    /// `{{USER_PARAM}}`: the caller's value for the parameter's own key.
    UserParam,
    /// `{{SERVER_PARAM:name}}` or bare `{{name}}`.
    ServerParam(String),
}

pub fn parse_value_template(value: &str) -> ValueSource {
    let Some(caps) = WHOLE_PLACEHOLDER_RE.captures(value.trim()) else {
        return ValueSource::Literal(value.to_string());
    };
    let inner = caps[1].trim();
    if inner == USER_PARAM {
        return ValueSource::UserParam;
    }
    if let Some(name) = inner.strip_prefix(SERVER_PARAM_PREFIX) {
        return ValueSource::ServerParam(name.trim().to_string());
    }
    if inner.contains(':') {
        // `{{list:field}}` belongs to shared-list interpolation, not to server params.
        return ValueSource::Literal(value.to_string());
    }
    ValueSource::ServerParam(inner.to_string())
}

/// Replace every `{{...}}` token for which `resolve` returns a value; others stay untouched.
pub fn replace_placeholders(s: &str, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
    PLACEHOLDER_RE
        .replace_all(s, |caps: &Captures<'_>| {
            resolve(caps[1].trim()).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Server-param name referenced by a token's inner text, if any.
pub fn server_param_name(token: &str) -> Option<&str> {
    if token == USER_PARAM {
        return None;
    }
    if let Some(name) = token.strip_prefix(SERVER_PARAM_PREFIX) {
        return Some(name.trim());
    }
    if token.contains(':') {
        return None;
    }
    Some(token)
}
