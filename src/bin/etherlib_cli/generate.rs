use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use etherlib_generator::{generate, GenerateOptions};

use super::output;

#[derive(Parser, Debug)]
#[command(about = "Resolve the build and write generated files")]
pub struct GenerateCmd {
    /// Config file, relative to --root (default: discover etherlib.config.*)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory configs are discovered in and paths resolve against (default: cwd)
    #[arg(long, short)]
    pub root: Option<PathBuf>,
}

impl GenerateCmd {
    pub async fn execute(&self, json_output: bool) -> Result<()> {
        let options = GenerateOptions {
            config: self.config.clone(),
            root: self.root.clone(),
        };
        let report = generate(&options).await?;
        output::print_report(&report, json_output)?;
        Ok(())
    }
}
