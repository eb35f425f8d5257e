use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the security scan over a descriptor file.
    Scan {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Load a descriptor through the full pipeline and report the outcome.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List routes with their tool names and input schemas.
    Routes {
        path: PathBuf,
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Call one route.
    Call {
        path: PathBuf,
        route: String,
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        params: ParamArgs,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
