use std::path::Path;

use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_messages, print_result, OutputFormat};
use crate::utils::{file_pipeline, pipeline_config};
use crate::{LoadArgs, OutputArgs};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    routes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub async fn validate_cmd(path: &Path, load: LoadArgs, output: OutputArgs) -> i32 {
    if let Err(e) = tokio::fs::metadata(path).await {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        return exit_codes::RUNTIME_ERROR;
    }

    let bundle = file_pipeline().load(path, &pipeline_config(&load)).await;
    let result = ValidateResult {
        valid: bundle.status,
        namespace: bundle.descriptor().map(|d| d.namespace.clone()),
        routes: bundle.route_names(),
        errors: bundle.messages.clone(),
        warnings: bundle.warnings.clone(),
    };
    let code = if bundle.status {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if !result.warnings.is_empty() {
            print_messages("warning:", &result.warnings);
        }
        match &result.namespace {
            Some(ns) if result.valid => {
                println!("ok: {ns} ({} routes)", result.routes.len())
            }
            _ => print_messages("error: validation failed", &result.errors),
        }
        return code;
    }

    print_result(output.format, output.quiet, &result);
    code
}
