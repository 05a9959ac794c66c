//! Locating and parsing `etherlib.config.*` files.
//!
//! A config source holds one config object, an array of them, or an object
//! with a `configs` array (the only multi-config form TOML can express). The
//! `plugins` array of each config is split off and built through the plugin
//! registry; the rest deserializes into [`Config`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use etherlib_core::{Config, GenerateError, Result, CONFIG_EXTENSIONS, CONFIG_FILE_STEM};
use etherlib_plugins::{build_plugin, PluginContext};

/// Config path to load: `explicit` relative to `root`, else the first
/// `etherlib.config.<ext>` found in `root`.
pub fn discover_config(root: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = explicit {
        let path = root.join(explicit);
        return if path.is_file() {
            Ok(path)
        } else {
            Err(GenerateError::ConfigNotFound { path: Some(path) })
        };
    }

    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| root.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file())
        .ok_or(GenerateError::ConfigNotFound { path: None })
}

/// Read every config in `path`, with plugins built and paths resolved against `root`.
pub fn load_configs(path: &Path, root: &Path) -> Result<Vec<Config>> {
    let raw = fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
    let source = parse_source(path, &raw)?;
    let ctx = PluginContext::new(root);

    let configs = split_configs(source).map_err(|message| invalid(path, message))?;
    debug!(path = %path.display(), count = configs.len(), "loaded config source");
    configs
        .into_iter()
        .enumerate()
        .map(|(index, value)| build_config(path, index, value, &ctx))
        .collect()
}

fn invalid(path: &Path, message: impl Into<String>) -> GenerateError {
    GenerateError::InvalidConfig {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn parse_source(path: &Path, raw: &str) -> Result<Value> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str::<Value>(raw).map_err(|e| e.to_string()),
        "toml" => toml::from_str::<Value>(raw).map_err(|e| e.to_string()),
        _ => serde_json::from_str::<Value>(raw).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| invalid(path, message))
}

fn split_configs(source: Value) -> std::result::Result<Vec<Value>, String> {
    match source {
        Value::Array(configs) => Ok(configs),
        Value::Object(mut fields) => match fields.remove("configs") {
            Some(Value::Array(configs)) if fields.is_empty() => Ok(configs),
            Some(Value::Array(_)) => {
                Err("`configs` cannot be combined with other top-level keys".to_string())
            }
            Some(other) => Err(format!("`configs` must be an array, got {other}")),
            None => Ok(vec![Value::Object(fields)]),
        },
        other => Err(format!("expected a config object or array, got {other}")),
    }
}

fn build_config(path: &Path, index: usize, value: Value, ctx: &PluginContext) -> Result<Config> {
    let Value::Object(mut fields) = value else {
        return Err(invalid(path, format!("configs[{index}] must be an object")));
    };

    let declarations = match fields.remove("plugins") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(declarations)) => declarations,
        Some(other) => {
            return Err(invalid(
                path,
                format!("configs[{index}].plugins must be an array, got {other}"),
            ))
        }
    };

    let mut config: Config = serde_json::from_value(Value::Object(fields))
        .map_err(|e| invalid(path, format!("configs[{index}]: {e}")))?;

    for (position, declaration) in declarations.iter().enumerate() {
        let plugin = build_plugin(declaration, ctx).map_err(|e| {
            invalid(path, format!("configs[{index}].plugins[{position}]: {e:#}"))
        })?;
        config.plugins.push(plugin);
    }

    // Empty entries stay empty so the pipeline rejects them instead of
    // resolving them to the root.
    config.output = config
        .output
        .iter()
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                dir.clone()
            } else {
                ctx.resolve_path(dir)
            }
        })
        .collect();

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherlib_types::ChainId;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discovery_order_and_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();

        let err = discover_config(root, None).unwrap_err();
        assert!(matches!(err, GenerateError::ConfigNotFound { path: None }));

        write(root, "etherlib.config.toml", "output = \"dist\"");
        write(root, "etherlib.config.yaml", "output: dist");
        assert_eq!(
            discover_config(root, None).unwrap(),
            root.join("etherlib.config.yaml")
        );

        let err = discover_config(root, Some(Path::new("custom.json"))).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::ConfigNotFound { path: Some(ref p) } if p == &root.join("custom.json")
        ));
    }

    #[test]
    fn test_json_config_with_plugins() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "etherlib.config.json",
            r#"{
                "output": "src/generated",
                "contracts": [{ "name": "Counter", "abi": [], "address": "0xc0" }],
                "plugins": ["viem", { "plugin": "hardhat" }]
            }"#,
        );

        let configs = load_configs(&path, tmp.path()).unwrap();

        assert_eq!(configs.len(), 1);
        let config = &configs[0];
        assert_eq!(config.output, vec![tmp.path().join("src/generated")]);
        let names: Vec<&str> = config.plugins.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["viem", "hardhat"]);
        assert!(config.clean);
    }

    #[test]
    fn test_yaml_array_of_configs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "etherlib.config.yml",
            "- output: a\n  clean: false\n- output: [b, c]\n  addresses:\n    Counter:\n      '1': '0xc0'\n",
        );

        let configs = load_configs(&path, tmp.path()).unwrap();

        assert_eq!(configs.len(), 2);
        assert!(!configs[0].clean);
        assert_eq!(configs[1].output.len(), 2);
        assert_eq!(configs[1].addresses["Counter"][&ChainId(1)], "0xc0");
    }

    #[test]
    fn test_toml_configs_table() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "etherlib.config.toml",
            r#"
[[configs]]
output = "dist"
plugins = ["viem"]

[configs.addresses.Counter]
"31337" = "0xc0"
"#,
        );

        let configs = load_configs(&path, tmp.path()).unwrap();

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].plugins.len(), 1);
        assert_eq!(configs[0].addresses["Counter"][&ChainId(31337)], "0xc0");
    }

    #[test]
    fn test_bad_plugin_is_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "etherlib.config.json",
            r#"{ "output": "dist", "plugins": [{ "plugin": "viem", "flavor": "ts" }] }"#,
        );

        let err = load_configs(&path, tmp.path()).unwrap_err();

        let GenerateError::InvalidConfig { message, .. } = err else {
            panic!("expected InvalidConfig, got {err:?}");
        };
        assert!(message.starts_with("configs[0].plugins[0]: invalid options for plugin \"viem\""));
    }

    #[test]
    fn test_malformed_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "etherlib.config.json", "{ not json");
        assert!(matches!(
            load_configs(&path, tmp.path()),
            Err(GenerateError::InvalidConfig { .. })
        ));

        let path = write(tmp.path(), "etherlib.config.json", "\"dist\"");
        assert!(matches!(
            load_configs(&path, tmp.path()),
            Err(GenerateError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_missing_output_is_left_to_the_pipeline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "etherlib.config.json", r#"{ "plugins": ["viem"] }"#);
        let configs = load_configs(&path, tmp.path()).unwrap();
        assert!(configs[0].output.is_empty());

        let path = write(tmp.path(), "etherlib.config.json", r#"{ "output": ["dist", ""] }"#);
        let configs = load_configs(&path, tmp.path()).unwrap();
        assert_eq!(configs[0].output, vec![tmp.path().join("dist"), PathBuf::new()]);
    }
}
