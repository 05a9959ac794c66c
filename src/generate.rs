//! The `generate` entry point: options in, files out.

use tracing::info;

use etherlib_core::{generate_configs, GenerateOptions, GenerateReport, Result};

use crate::config_loader::{discover_config, load_configs};

/// Validate `options`, load the config source and run every config in it.
pub async fn generate(options: &GenerateOptions) -> Result<GenerateReport> {
    options.validate()?;
    let root = options.root_dir()?;

    let path = discover_config(&root, options.config.as_deref())?;
    info!("Using config {}", path.display());

    let configs = load_configs(&path, &root)?;
    generate_configs(configs).await
}
