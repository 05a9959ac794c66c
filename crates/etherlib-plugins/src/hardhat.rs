//! ABIs, ignition deployments and networks from a Hardhat project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use etherlib_core::{BuildFragment, Plugin};
use etherlib_types::{BlockExplorer, ChainContractEntry, ChainId, Currency, SimpleChain};

use crate::artifacts::{read_json, ArtifactFilter};
use crate::registry::PluginContext;

const ARTIFACT_EXCLUDES: [&str; 2] = ["build-info/*", "*.dbg.json"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HardhatConfig {
    #[serde(default)]
    pub project: Option<PathBuf>,
    #[serde(default = "default_artifacts")]
    pub artifacts: String,
    #[serde(default = "default_ignition")]
    pub ignition: String,
    /// Networks as in `hardhat.config`; those with a `url` become chains.
    #[serde(default)]
    pub networks: IndexMap<String, HardhatNetwork>,
}

fn default_artifacts() -> String {
    "artifacts".to_string()
}

fn default_ignition() -> String {
    "ignition".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardhatNetwork {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub explorer: Option<BlockExplorer>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub testnet: Option<bool>,
    #[serde(default)]
    pub contracts: IndexMap<String, ChainContractEntry>,
}

impl HardhatNetwork {
    fn to_chain(&self) -> Option<SimpleChain> {
        let rpc = self.url.clone()?;
        Some(SimpleChain {
            name: self.name.clone(),
            id: self.chain_id,
            rpc,
            icon: self.icon.clone(),
            testnet: self.testnet,
            currency: self.currency.clone(),
            explorer: self.explorer.clone(),
            contracts: self.contracts.clone(),
        })
    }
}

pub struct HardhatPlugin {
    config: HardhatConfig,
    project: PathBuf,
}

impl HardhatPlugin {
    pub fn new(config: HardhatConfig, ctx: &PluginContext) -> Self {
        let project = match &config.project {
            Some(project) => ctx.resolve_path(project),
            None => ctx.root().to_path_buf(),
        };
        Self { config, project }
    }
}

/// `Module#Contract` -> address maps under `deployments/chain-<id>/`.
fn read_ignition(ignition: &Path) -> Result<Vec<(ChainId, String, String)>> {
    let deployments = ignition.join("deployments");
    let Ok(entries) = fs::read_dir(&deployments) else {
        return Ok(Vec::new());
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    dirs.sort();

    let mut result = Vec::new();
    for dir in dirs {
        let Some(chain_id) = dir
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix("chain-"))
            .and_then(|id| id.parse::<ChainId>().ok())
        else {
            continue;
        };
        let deployed = dir.join("deployed_addresses.json");
        if !deployed.exists() {
            continue;
        }
        let addresses = match read_json(&deployed) {
            Ok(Value::Object(addresses)) => addresses,
            Ok(_) => continue,
            Err(err) => {
                warn!(file = %deployed.display(), error = %err, "skipping unreadable deployment");
                continue;
            }
        };
        for (key, address) in addresses {
            let contract = key.split_once('#').map(|(_, name)| name).unwrap_or(&key);
            if let Some(address) = address.as_str() {
                result.push((chain_id, contract.to_string(), address.to_string()));
            }
        }
    }
    Ok(result)
}

#[async_trait::async_trait]
impl Plugin for HardhatPlugin {
    fn name(&self) -> &str {
        "hardhat"
    }

    async fn validate(&self) -> Result<()> {
        if !self.project.exists() {
            bail!("Hardhat project {} not found.", self.project.display());
        }
        Ok(())
    }

    async fn resolve(&self) -> Result<BuildFragment> {
        let mut fragment = BuildFragment::new();

        for (alias, network) in &self.config.networks {
            match network.to_chain() {
                Some(chain) => fragment = fragment.with_chain(alias, serde_json::to_value(chain)?),
                None => debug!(network = %alias, "skipping network without url"),
            }
        }

        let excludes: Vec<String> = ARTIFACT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        let filter = ArtifactFilter::new(&["*.json".to_string()], &excludes)?;
        let artifacts_dir = self.project.join(&self.config.artifacts);
        for path in filter.collect(&artifacts_dir)? {
            let artifact = match read_json(&path) {
                Ok(artifact) => artifact,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable artifact");
                    continue;
                }
            };
            let name = artifact.get("contractName").and_then(Value::as_str);
            if let (Some(name), Some(abi)) = (name, artifact.get("abi")) {
                fragment = fragment.with_contract(name, abi.clone());
            }
        }

        let ignition = self.project.join(&self.config.ignition);
        let deployments = read_ignition(&ignition)
            .with_context(|| format!("Failed to read deployments in {}", ignition.display()))?;
        for (chain_id, contract, address) in deployments {
            fragment = fragment.with_address(contract, chain_id, address);
        }

        Ok(fragment)
    }
}
