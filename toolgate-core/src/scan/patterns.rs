#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForbiddenPattern {
    pub code: &'static str,
    pub pattern: &'static str,
    pub label: &'static str,
}

const fn p(code: &'static str, pattern: &'static str, label: &'static str) -> ForbiddenPattern {
    ForbiddenPattern {
        code,
        pattern,
        label,
    }
}

/// Codes and labels are surfaced verbatim in scan messages; keep them stable.
pub static FORBIDDEN_PATTERNS: [ForbiddenPattern; 16] = [
    p("SEC001", "import ", "Import statement"),
    p("SEC002", "import(", "Dynamic import"),
    p("SEC003", "require(", "require() call"),
    p("SEC004", "eval(", "eval() call"),
    p("SEC005", "new Function", "Function constructor"),
    p("SEC006", "process.", "Process access"),
    p("SEC007", "Function(", "Function() call"),
    p("SEC008", "child_process", "Child process access"),
    p("SEC009", "fs.", "Filesystem access"),
    p("SEC010", "globalThis", "Global scope access"),
    p("SEC011", "global.", "Global object access"),
    p("SEC012", "__dirname", "Directory path access"),
    p("SEC013", "__filename", "File path access"),
    p("SEC014", "setTimeout", "Timer (setTimeout)"),
    p("SEC015", "setInterval", "Timer (setInterval)"),
    p("SEC016", "setImmediate", "Timer (setImmediate)"),
];
