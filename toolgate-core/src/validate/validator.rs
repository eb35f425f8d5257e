use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};

use super::rules;

pub const MAX_ROUTES: usize = 8;

pub(crate) static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+$").expect("valid"));
pub(crate) static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^2\.\d+\.\d+$").expect("valid"));

pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_main(&mut self, main: &serde_json::Value) {
        rules::main::validate_main(self, main);
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}
