use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(about = "Scaffold a starter etherlib.config.json")]
pub struct InitCmd {
    /// Directory to write the config into
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Overwrite an existing config
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

const CONFIG_TEMPLATE: &str = r#"{
  "output": "src/generated",
  "contracts": [],
  "chains": [],
  "addresses": {},
  "plugins": [
    { "plugin": "foundry", "project": ".", "forge": { "build": true } },
    "viem"
  ]
}
"#;

impl InitCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let config_path = self.output_dir.join("etherlib.config.json");
        write_template(&config_path, CONFIG_TEMPLATE, self.force)?;

        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "config": config_path.display().to_string(),
                }))?
            );
        } else {
            println!("Initialized {}", config_path.display());
            println!("\nRun with:\n  etherlib generate --root {}", self.output_dir.display());
        }
        Ok(())
    }
}

fn write_template(path: &Path, contents: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "Refusing to overwrite existing config at {} (pass --force)",
            path.display()
        ));
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
