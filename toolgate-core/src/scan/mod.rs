//! Line-based gate over descriptor source text.
//!
//! Runs before a descriptor is loaded. Matching is plain substring matching on every
//! non-comment line: a pattern inside a string literal is reported as well, and only the
//! opening line of a block comment is recognised as a comment. Both behaviours are part of
//! the pass/fail contract existing descriptors were written against.

mod patterns;

pub use patterns::{ForbiddenPattern, FORBIDDEN_PATTERNS};

const COMMENT_MARKERS: [&str; 4] = ["//", "/*", "*", "#"];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScanFinding {
    pub code: &'static str,
    pub label: &'static str,
    /// 1-based line number in the scanned text.
    pub line: usize,
    pub pattern: &'static str,
}

impl std::fmt::Display for ScanFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (\"{}\") found at line {}",
            self.code, self.label, self.pattern, self.line
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanReport {
    pub status: bool,
    pub messages: Vec<String>,
    #[serde(skip)]
    pub findings: Vec<ScanFinding>,
}

pub fn scan_source(source: &str) -> ScanReport {
    let mut findings = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        if is_comment_line(line) {
            continue;
        }
        for p in FORBIDDEN_PATTERNS.iter() {
            if line.contains(p.pattern) {
                findings.push(ScanFinding {
                    code: p.code,
                    label: p.label,
                    line: idx + 1,
                    pattern: p.pattern,
                });
            }
        }
    }

    let messages: Vec<String> = findings.iter().map(ScanFinding::to_string).collect();
    ScanReport {
        status: messages.is_empty(),
        messages,
        findings,
    }
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    COMMENT_MARKERS.iter().any(|m| trimmed.starts_with(m))
}
