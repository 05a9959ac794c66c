//! etherlib: generate typed contract bindings from ABIs, deployments and chains
//!
//! ## Commands
//!
//! - **generate**: run every plugin declared in `etherlib.config.*` and write outputs
//! - **init**: scaffold a starter `etherlib.config.json`
//!
//! ## Example Usage
//!
//! ```bash
//! # Scaffold a config in the current directory
//! etherlib init
//!
//! # Generate using the discovered config
//! etherlib generate
//!
//! # Use an explicit config under another root, with debug logs
//! etherlib generate --root ./app --config etherlib.config.yaml --verbose
//! ```

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod etherlib_cli;

use etherlib_cli::{generate::GenerateCmd, init::InitCmd, output};

#[derive(Parser)]
#[command(
    name = "etherlib",
    author,
    version,
    about = "Generate typed contract bindings from ABIs, deployments and chains",
    long_about = "Resolves contract ABIs, deployment addresses and chain metadata from the\n\
                  plugins declared in etherlib.config.* and writes the generated files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logs)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the build and write generated files
    Generate(GenerateCmd),

    /// Scaffold a starter etherlib.config.json
    Init(InitCmd),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli {
        command,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    let result = match command {
        Commands::Generate(cmd) => cmd.execute(json).await,
        Commands::Init(cmd) => cmd.execute(json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err, json);
            ExitCode::FAILURE
        }
    }
}
