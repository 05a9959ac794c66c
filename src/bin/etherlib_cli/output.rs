//! Output formatting for the etherlib CLI.

use anyhow::Result;
use serde_json::json;

use etherlib_generator::{GenerateError, GenerateReport};

/// Print a generate report, human-readable or as JSON.
pub fn print_report(report: &GenerateReport, json_output: bool) -> Result<()> {
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "success": true,
                "files": report.total_files(),
                "configs": report.configs,
            }))?
        );
        return Ok(());
    }

    println!(
        "\x1b[32m✓ Generated {} file(s)\x1b[0m",
        report.total_files()
    );
    for config in &report.configs {
        let dirs: Vec<String> = config
            .output
            .iter()
            .map(|dir| dir.display().to_string())
            .collect();
        println!(
            "\n\x1b[1m{}\x1b[0m ({} contracts, {} chains)",
            dirs.join(", "),
            config.contracts,
            config.chains
        );
        if !config.plugins.is_empty() {
            println!("  plugins: {}", config.plugins.join(", "));
        }
        for file in &config.files {
            println!("  \x1b[36m{}\x1b[0m", file.display());
        }
    }
    Ok(())
}

/// Report a failure on stderr, as JSON with `--json`.
pub fn print_error(err: &anyhow::Error, json_output: bool) {
    let plugin = err
        .downcast_ref::<GenerateError>()
        .and_then(GenerateError::plugin);
    let message = err.to_string();

    if json_output {
        eprintln!(
            "{}",
            json!({
                "success": false,
                "error": message,
                "plugin": plugin,
            })
        );
        return;
    }

    match plugin {
        Some(plugin) => eprintln!("\x1b[31m✗ [{plugin}] {message}\x1b[0m"),
        None => eprintln!("\x1b[31m✗ {message}\x1b[0m"),
    }
}
