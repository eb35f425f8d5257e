use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Directory with shared-list files (`<ref>.json`, `.yaml` or `.yml`).
    #[arg(long)]
    pub lists_dir: Option<PathBuf>,
    /// Replace the built-in library allow-list; repeatable.
    #[arg(long = "allow-library", value_name = "NAME")]
    pub allow_libraries: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ParamArgs {
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
    /// JSON or YAML object of user parameters; `--param` entries override it.
    #[arg(long = "params", value_name = "FILE")]
    pub params_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ServerArgs {
    #[arg(long = "server-param", value_name = "KEY=VALUE")]
    pub server_params: Vec<String>,
    /// Read a server param from the environment variable of the same name; repeatable.
    #[arg(long = "server-param-env", value_name = "NAME")]
    pub server_param_env: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Request timeout in milliseconds.
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
}
