use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::exit_codes;
use crate::output::{print_messages, print_result, OutputFormat};
use crate::utils::{file_pipeline, pipeline_config};
use crate::{LoadArgs, OutputArgs};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteEntry {
    name: String,
    tool_name: String,
    method: String,
    path: String,
    description: String,
    input_schema: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<String>,
}

pub async fn routes_cmd(path: &Path, load: LoadArgs, output: OutputArgs) -> i32 {
    let bundle = file_pipeline().load(path, &pipeline_config(&load)).await;
    let Some(descriptor) = bundle.descriptor().filter(|_| bundle.status) else {
        if output.format == OutputFormat::Text && !output.quiet {
            print_messages("error: descriptor failed to load", &bundle.messages);
        } else {
            print_result(
                output.format,
                output.quiet,
                &serde_json::json!({ "errors": bundle.messages }),
            );
        }
        return exit_codes::VALIDATION_FAILED;
    };

    let entries: Vec<RouteEntry> = descriptor
        .routes
        .iter()
        .map(|(name, route)| {
            let shape = bundle.input_schema(name).unwrap_or_else(|| toolgate_core::InputShape {
                schema: Value::Null,
                diagnostics: Vec::new(),
            });
            RouteEntry {
                name: name.clone(),
                tool_name: descriptor.tool_name(name),
                method: route.method.to_string(),
                path: route.path.clone(),
                description: route.description.clone(),
                input_schema: shape.schema,
                diagnostics: shape.diagnostics,
            }
        })
        .collect();

    if output.format == OutputFormat::Text && !output.quiet {
        for e in &entries {
            println!("{}\t{} {}\t{}", e.tool_name, e.method, e.path, e.description);
            for d in &e.diagnostics {
                eprintln!("warning: {d}");
            }
        }
        return exit_codes::SUCCESS;
    }

    print_result(output.format, output.quiet, &entries);
    exit_codes::SUCCESS
}
