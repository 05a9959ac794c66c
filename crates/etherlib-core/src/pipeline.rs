//! Config-by-config build pipeline.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{GenerateError, Result};
use crate::merge::BuildFragment;
use crate::normalize::normalize_chains;
use crate::plugin::{register_plugins, RegisteredPlugin, ResolvedBuild};
use crate::reconcile::reconcile_addresses;
use crate::writer::OutputWriter;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub output: Vec<PathBuf>,
    pub plugins: Vec<String>,
    pub contracts: usize,
    pub chains: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub configs: Vec<ConfigReport>,
}

impl GenerateReport {
    pub fn total_files(&self) -> usize {
        self.configs.iter().map(|c| c.files.len()).sum()
    }
}

/// Run every config in order. The first failure stops the run; directories
/// written by earlier configs are left in place.
pub async fn generate_configs(configs: Vec<Config>) -> Result<GenerateReport> {
    let mut writer = OutputWriter::new();
    let mut report = GenerateReport::default();
    for config in configs {
        report.configs.push(run_config(&mut writer, config).await?);
    }
    Ok(report)
}

async fn run_config(writer: &mut OutputWriter, mut config: Config) -> Result<ConfigReport> {
    let blank = config.output.iter().any(|dir| dir.as_os_str().is_empty());
    if config.output.is_empty() || blank {
        return Err(GenerateError::MissingOutput);
    }
    writer.claim(&config.output)?;

    let plugins = register_plugins(std::mem::take(&mut config.plugins));

    info!("Validating plugins");
    for registered in &plugins {
        debug!(plugin = %registered.id, "validate");
        registered
            .plugin
            .validate()
            .await
            .map_err(|source| GenerateError::PluginValidationFailed {
                plugin: registered.id.clone(),
                source,
            })?;
    }

    info!("Resolving options");
    let build = resolve_build(&config, &plugins).await?;

    let mut outputs = Vec::new();
    for registered in &plugins {
        debug!(plugin = %registered.id, "run");
        let produced = registered
            .plugin
            .run(&build)
            .await
            .map_err(|source| GenerateError::PluginRunFailed {
                plugin: registered.id.clone(),
                source,
            })?;
        outputs.extend(produced);
    }

    let mut files = Vec::new();
    for dir in &config.output {
        files.extend(writer.write(dir, config.clean, &outputs)?);
    }

    Ok(ConfigReport {
        output: config.output.clone(),
        plugins: plugins.into_iter().map(|p| p.id).collect(),
        contracts: build.contracts.len(),
        chains: build.chains.len(),
        files,
    })
}

/// Resolve every plugin in order, merge the config's own declarations on top,
/// then normalize chains and reconcile addresses.
pub async fn resolve_build(config: &Config, plugins: &[RegisteredPlugin]) -> Result<ResolvedBuild> {
    let mut fragments = Vec::with_capacity(plugins.len() + config.contracts.len() + 3);
    for registered in plugins {
        debug!(plugin = %registered.id, "resolve");
        let fragment = registered
            .plugin
            .resolve()
            .await
            .map_err(|source| GenerateError::PluginResolveFailed {
                plugin: registered.id.clone(),
                source,
            })?;
        fragments.push(fragment);
    }
    fragments.extend(config.user_fragments());

    let BuildFragment {
        contracts,
        chains,
        mut addresses,
    } = BuildFragment::fold(fragments);

    let mut chains = normalize_chains(chains)?;
    reconcile_addresses(&mut addresses, &mut chains);

    Ok(ResolvedBuild {
        contracts,
        addresses,
        chains,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;
    use etherlib_types::{ChainId, Output};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Test plugin that records every hook call.
    struct Recorder {
        name: &'static str,
        log: Log,
        fragment: BuildFragment,
        outputs: Vec<Output>,
        fail_validate: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                fragment: BuildFragment::new(),
                outputs: Vec::new(),
                fail_validate: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl Plugin for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn validate(&self) -> anyhow::Result<()> {
            self.log.lock().push(format!("validate:{}", self.name));
            if self.fail_validate {
                anyhow::bail!("{} is not installed", self.name);
            }
            Ok(())
        }

        async fn resolve(&self) -> anyhow::Result<BuildFragment> {
            self.log.lock().push(format!("resolve:{}", self.name));
            Ok(self.fragment.clone())
        }

        async fn run(&self, _build: &ResolvedBuild) -> anyhow::Result<Vec<Output>> {
            self.log.lock().push(format!("run:{}", self.name));
            Ok(self.outputs.clone())
        }
    }

    /// Plugin with only a `resolve` hook.
    struct Source(BuildFragment);

    #[async_trait::async_trait]
    impl Plugin for Source {
        fn name(&self) -> &str {
            "source"
        }

        async fn resolve(&self) -> anyhow::Result<BuildFragment> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_hooks_run_in_three_passes() {
        let log = Log::default();
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("dist"))
            .with_plugin(Recorder::new("a", &log))
            .with_plugin(Source(BuildFragment::new()))
            .with_plugin(Recorder::new("b", &log));

        let report = generate_configs(vec![config]).await.unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "validate:a",
                "validate:b",
                "resolve:a",
                "resolve:b",
                "run:a",
                "run:b"
            ]
        );
        assert_eq!(report.configs[0].plugins, vec!["a-0", "source-1", "b-2"]);
    }

    #[tokio::test]
    async fn test_later_plugin_contract_wins() {
        let mut config = Config::new("unused")
            .with_plugin(Source(
                BuildFragment::new()
                    .with_contract("Counter", json!(["first"]))
                    .with_contract("Token", json!(["token"])),
            ))
            .with_plugin(Source(
                BuildFragment::new().with_contract("Counter", json!(["second"])),
            ));
        let plugins = register_plugins(std::mem::take(&mut config.plugins));

        let build = resolve_build(&config, &plugins).await.unwrap();

        assert_eq!(build.contracts["Counter"], json!(["second"]));
        assert_eq!(build.contracts["Token"], json!(["token"]));
    }

    #[tokio::test]
    async fn test_user_addresses_override_plugins_and_chains() {
        let mut config: Config = serde_json::from_value(json!({
            "output": "unused",
            "chains": {
                "mainnet": {
                    "id": 1,
                    "name": "Ethereum",
                    "rpcUrls": { "default": { "http": ["https://eth"] } },
                    "contracts": { "Foo": { "address": "0xB" } }
                }
            },
            "addresses": { "Foo": { "1": "0xA" } }
        }))
        .unwrap();
        config.plugins.push(Box::new(Source(
            BuildFragment::new().with_address("Foo", ChainId(1), "0xPlugin"),
        )));
        let plugins = register_plugins(std::mem::take(&mut config.plugins));

        let build = resolve_build(&config, &plugins).await.unwrap();

        assert_eq!(build.addresses["Foo"][&ChainId(1)], "0xA");
        assert_eq!(
            build.chains["mainnet"].contracts["Foo"].address.as_deref(),
            Some("0xA")
        );
    }

    #[tokio::test]
    async fn test_plugin_chain_back_fills_addresses() {
        let chain = json!({
            "id": 31337,
            "name": "Anvil",
            "rpc": "http://127.0.0.1:8545",
            "contracts": { "Foo": "0xB" }
        });
        let config = Config::default();
        let plugins = register_plugins(vec![Box::new(Source(
            BuildFragment::new().with_chain("anvil", chain),
        ))]);

        let build = resolve_build(&config, &plugins).await.unwrap();

        assert_eq!(build.addresses["Foo"][&ChainId(31337)], "0xB");
        assert!(!build.contracts.contains_key("Foo"));
    }

    #[tokio::test]
    async fn test_missing_output_fails_before_validation() {
        let log = Log::default();
        let config = Config::default().with_plugin(Recorder::new("a", &log));

        let err = generate_configs(vec![config]).await.unwrap_err();

        assert!(matches!(err, GenerateError::MissingOutput));
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_output_entry_is_missing_output() {
        let log = Log::default();
        let tmp = tempfile::tempdir().unwrap();
        let mut generator = Recorder::new("gen", &log);
        generator.outputs = vec![Output::new("a.ts", "a")];

        let mut config = Config::new(tmp.path().join("dist")).with_plugin(generator);
        config.output.push(PathBuf::new());
        let err = generate_configs(vec![config]).await.unwrap_err();

        assert!(matches!(err, GenerateError::MissingOutput));
        assert!(log.lock().is_empty());
        assert!(!tmp.path().join("dist").exists());

        let err = generate_configs(vec![Config::new("")]).await.unwrap_err();
        assert!(matches!(err, GenerateError::MissingOutput));
    }

    #[tokio::test]
    async fn test_partial_user_chain_overlays_plugin_chain() {
        let mut config: Config = serde_json::from_value(json!({
            "output": "unused",
            "chains": { "localhost": { "testnet": true } }
        }))
        .unwrap();
        config.plugins.push(Box::new(Source(BuildFragment::new().with_chain(
            "localhost",
            json!({ "id": 31337, "name": "Localhost", "rpc": "http://127.0.0.1:8545" }),
        ))));
        let plugins = register_plugins(std::mem::take(&mut config.plugins));

        let build = resolve_build(&config, &plugins).await.unwrap();

        let localhost = &build.chains["localhost"];
        assert_eq!(localhost.id, ChainId(31337));
        assert_eq!(localhost.name, "Localhost");
        assert_eq!(localhost.testnet, Some(true));
        assert_eq!(
            localhost.rpc_urls["default"].http,
            vec!["http://127.0.0.1:8545"]
        );
    }

    #[tokio::test]
    async fn test_partial_user_chain_without_base_is_invalid() {
        let config: Config = serde_json::from_value(json!({
            "output": "unused",
            "chains": { "localhost": { "testnet": true } }
        }))
        .unwrap();

        let err = resolve_build(&config, &[]).await.unwrap_err();

        assert!(matches!(err, GenerateError::InvalidChain { ref alias, .. } if alias == "localhost"));
    }

    #[tokio::test]
    async fn test_duplicate_output_across_configs() {
        let log = Log::default();
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");

        let mut first = Recorder::new("first", &log);
        first.outputs = vec![Output::new("a.ts", "a")];
        let second = Recorder::new("second", &log);

        let err = generate_configs(vec![
            Config::new(&dist).with_plugin(first),
            Config::new(&dist).with_plugin(second),
        ])
        .await
        .unwrap_err();

        assert!(matches!(err, GenerateError::DuplicateOutput(_)));
        assert!(!log.lock().iter().any(|entry| entry.ends_with(":second")));
        assert_eq!(fs::read_to_string(dist.join("a.ts")).unwrap(), "a");
    }

    #[tokio::test]
    async fn test_validation_failure_stops_before_resolve_and_writes() {
        let log = Log::default();
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");

        let mut failing = Recorder::new("forge", &log);
        failing.fail_validate = true;
        let err = generate_configs(vec![Config::new(&dist)
            .with_plugin(failing)
            .with_plugin(Recorder::new("after", &log))])
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "forge is not installed");
        assert_eq!(err.plugin(), Some("forge-0"));
        assert_eq!(*log.lock(), vec!["validate:forge"]);
        assert!(!dist.exists());
    }

    #[tokio::test]
    async fn test_resolve_only_plugin_writes_empty_clean_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("old.ts"), "old").unwrap();

        let config = Config::new(&dist).with_plugin(Source(
            BuildFragment::new().with_contract("Counter", json!("X")),
        ));
        let report = generate_configs(vec![config]).await.unwrap();

        assert!(dist.is_dir());
        assert_eq!(fs::read_dir(&dist).unwrap().count(), 0);
        assert_eq!(report.configs[0].contracts, 1);
        assert_eq!(report.total_files(), 0);
    }

    #[tokio::test]
    async fn test_run_outputs_written_to_every_directory() {
        let log = Log::default();
        let tmp = tempfile::tempdir().unwrap();
        let mut generator = Recorder::new("gen", &log);
        generator.outputs = vec![Output::new("Counter.ts", "export {}")];

        let mut config = Config::new(tmp.path().join("a")).with_plugin(generator);
        config.output.push(tmp.path().join("b"));
        let report = generate_configs(vec![config]).await.unwrap();

        for dir in ["a", "b"] {
            assert_eq!(
                fs::read_to_string(tmp.path().join(dir).join("Counter.ts")).unwrap(),
                "export {}"
            );
        }
        assert_eq!(report.total_files(), 2);
    }
}
