use std::path::Path;
use std::sync::Arc;

use toolgate_exec::engine::{ReqwestHttpClient, RequestEngine};

use crate::exit_codes;
use crate::output::{print_error, print_messages, print_result, OutputFormat};
use crate::utils::{engine_config, file_pipeline, load_user_params, pipeline_config, server_params};
use crate::{EngineArgs, LoadArgs, OutputArgs, ParamArgs, ServerArgs};

pub async fn call_cmd(
    path: &Path,
    route: &str,
    load: LoadArgs,
    params: ParamArgs,
    server: ServerArgs,
    engine: EngineArgs,
    output: OutputArgs,
) -> i32 {
    let user_params = match load_user_params(&params) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let server_params = match server_params(&server) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let client = match ReqwestHttpClient::new() {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to build http client: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let bundle = file_pipeline().load(path, &pipeline_config(&load)).await;
    if !bundle.status {
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
    }

    tracing::debug!(route, params = user_params.len(), "calling route");
    let engine = RequestEngine::new(Arc::new(client), engine_config(&engine));
    let result = engine
        .call(&bundle, route, &user_params, &server_params)
        .await;
    let code = if result.status {
        exit_codes::SUCCESS
    } else {
        exit_codes::REQUEST_FAILED
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if result.status {
            println!("{}", result.data_as_string);
        } else {
            print_messages("error: request failed", &result.messages);
        }
        return code;
    }

    print_result(output.format, output.quiet, &result);
    code
}
