use std::path::Path;

use serde::Serialize;
use toolgate_core::scan_source;

use crate::exit_codes;
use crate::output::{print_error, print_messages, print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ScanResult {
    passed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    findings: Vec<Finding>,
}

#[derive(Serialize)]
struct Finding {
    code: &'static str,
    label: &'static str,
    line: usize,
    message: String,
}

pub async fn scan_cmd(path: &Path, output: OutputArgs) -> i32 {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let report = scan_source(&content);
    let code = if report.status {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if report.status {
            println!("ok: no forbidden patterns in {}", path.display());
        } else {
            print_messages("error: security scan failed", &report.messages);
        }
        return code;
    }

    let result = ScanResult {
        passed: report.status,
        findings: report
            .findings
            .iter()
            .map(|f| Finding {
                code: f.code,
                label: f.label,
                line: f.line,
                message: f.to_string(),
            })
            .collect(),
    };
    print_result(output.format, output.quiet, &result);
    code
}
