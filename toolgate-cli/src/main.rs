use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

/// Environment variable holding the log filter, e.g. `toolgate_exec=debug`.
const LOG_ENV: &str = "TOOLGATE_LOG";

#[derive(Debug, Parser)]
#[command(name = "toolgate", version, about = "Scan, validate and call API descriptors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Scan { path, output } => cmd::scan::scan_cmd(&path, output).await,
        Command::Validate { path, load, output } => {
            cmd::validate::validate_cmd(&path, load, output).await
        }
        Command::Routes { path, load, output } => {
            cmd::routes::routes_cmd(&path, load, output).await
        }
        Command::Call {
            path,
            route,
            load,
            params,
            server,
            engine,
            output,
        } => cmd::call::call_cmd(&path, &route, load, params, server, engine, output).await,
    }
}
