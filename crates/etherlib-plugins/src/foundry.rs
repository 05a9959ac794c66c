//! ABIs and deployments from a [Foundry](https://github.com/foundry-rs/foundry) project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use etherlib_core::{BuildFragment, Plugin};
use etherlib_types::{AddressSpec, ChainId};

use crate::artifacts::{non_empty_abi, read_json, ArtifactFilter};
use crate::registry::PluginContext;

/// forge-std and script/test artifacts that never belong in generated code.
pub const FOUNDRY_DEFAULT_EXCLUDES: [&str; 29] = [
    "Base.sol/*",
    "Common.sol/*",
    "Components.sol/*",
    "IERC165.sol/*",
    "IERC20.sol/*",
    "IERC721.sol/*",
    "IMulticall2.sol/*",
    "MockERC20.sol/*",
    "MockERC721.sol/*",
    "Script.sol/*",
    "StdAssertions.sol/*",
    "StdChains.sol/*",
    "StdCheats.sol/*",
    "StdError.sol/*",
    "StdInvariant.sol/*",
    "StdJson.sol/*",
    "StdMath.sol/*",
    "StdStorage.sol/*",
    "StdStyle.sol/*",
    "StdToml.sol/*",
    "StdUtils.sol/*",
    "Test.sol/*",
    "Vm.sol/*",
    "build-info/*",
    "console.sol/*",
    "console2.sol/*",
    "safeconsole.sol/*",
    "*.s.sol/*",
    "*.t.sol/*",
];

const FORGE_MISSING: &str = "forge must be installed to use Foundry plugin.\n\
To install, follow the instructions at https://book.getfoundry.sh/getting-started/installation";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FoundryConfig {
    /// Project directory, relative to the config root.
    #[serde(default)]
    pub project: Option<PathBuf>,
    /// Artifacts directory inside the project. Defaults to forge's `out`.
    #[serde(default)]
    pub artifacts: Option<String>,
    /// Record CREATE/CREATE2 contracts from `broadcast/**/run-latest.json`.
    #[serde(default)]
    pub include_broadcasts: bool,
    /// Addresses keyed by artifact name (without `namePrefix`).
    #[serde(default)]
    pub deployments: IndexMap<String, AddressSpec>,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub forge: ForgeConfig,
    #[serde(default)]
    pub name_prefix: String,
}

fn default_include() -> Vec<String> {
    vec!["*.json".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Run `forge clean` before resolving.
    pub clean: bool,
    /// Run `forge build` before resolving.
    pub build: bool,
    /// forge executable.
    pub path: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            clean: false,
            build: true,
            path: "forge".to_string(),
        }
    }
}

pub struct FoundryPlugin {
    config: FoundryConfig,
    project: PathBuf,
}

impl FoundryPlugin {
    pub fn new(config: FoundryConfig, ctx: &PluginContext) -> Self {
        let project = match &config.project {
            Some(project) => ctx.resolve_path(project),
            None => ctx.root().to_path_buf(),
        };
        Self { config, project }
    }

    fn forge_required(&self) -> bool {
        self.config.forge.clean || self.config.forge.build
    }

    async fn forge(&self, args: &[&str]) -> Result<std::process::Output> {
        let forge = &self.config.forge.path;
        let output = Command::new(forge)
            .args(args)
            .arg("--root")
            .arg(&self.project)
            .output()
            .await
            .with_context(|| format!("Failed to run {forge}"))?;
        Ok(output)
    }

    async fn forge_checked(&self, args: &[&str]) -> Result<()> {
        let output = self.forge(args).await?;
        if !output.status.success() {
            bail!(
                "`{} {}` failed:\n{}",
                self.config.forge.path,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    /// Artifacts directory: explicit option, else forge's configured `out`, else `out`.
    async fn artifacts_dir(&self) -> PathBuf {
        if let Some(artifacts) = &self.config.artifacts {
            return self.project.join(artifacts);
        }
        let out = match self.forge(&["config", "--json"]).await {
            Ok(output) if output.status.success() => serde_json::from_slice::<Value>(&output.stdout)
                .ok()
                .and_then(|config| config.get("out").and_then(Value::as_str).map(str::to_string)),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "forge config unavailable, using default out directory");
                None
            }
        };
        self.project.join(out.unwrap_or_else(|| "out".to_string()))
    }

    fn filter(&self) -> Result<ArtifactFilter> {
        let exclude = match &self.config.exclude {
            Some(exclude) => exclude.clone(),
            None => FOUNDRY_DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        };
        ArtifactFilter::new(&self.config.include, &exclude)
    }

    fn deployments(&self) -> Result<IndexMap<String, AddressSpec>> {
        if !self.config.include_broadcasts {
            return Ok(self.config.deployments.clone());
        }
        let mut all: IndexMap<String, AddressSpec> = read_broadcasts(&self.project)?
            .into_iter()
            .map(|(name, per_chain)| (name, AddressSpec::PerChain(per_chain)))
            .collect();
        for (name, spec) in &self.config.deployments {
            all.insert(name.clone(), spec.clone());
        }
        Ok(all)
    }
}

/// Deployed addresses from forge script broadcasts, keyed by contract name.
/// The chain id is the name of the directory holding `run-latest.json`.
fn read_broadcasts(project: &Path) -> Result<IndexMap<String, BTreeMap<ChainId, String>>> {
    let mut result: IndexMap<String, BTreeMap<ChainId, String>> = IndexMap::new();
    let pattern = format!(
        "{}/broadcast/**/run-latest.json",
        glob::Pattern::escape(&project.to_string_lossy())
    );

    for entry in glob::glob(&pattern).context("Invalid broadcast pattern")? {
        let path = entry.context("Failed to read broadcast directory")?;
        let Some(chain_id) = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse::<ChainId>().ok())
        else {
            continue;
        };
        let broadcast = match read_json(&path) {
            Ok(broadcast) => broadcast,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable broadcast");
                continue;
            }
        };

        let transactions = broadcast
            .get("transactions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for tx in transactions {
            let kind = tx.get("transactionType").and_then(Value::as_str);
            if !matches!(kind, Some("CREATE") | Some("CREATE2")) {
                continue;
            }
            let created = std::iter::once(tx).chain(
                tx.get("additionalContracts")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
            );
            for contract in created {
                let name = contract.get("contractName").and_then(Value::as_str);
                let address = contract.get("contractAddress").and_then(Value::as_str);
                if let (Some(name), Some(address)) = (name, address) {
                    result
                        .entry(name.to_string())
                        .or_default()
                        .insert(chain_id, address.to_string());
                }
            }
        }
    }

    Ok(result)
}

#[async_trait::async_trait]
impl Plugin for FoundryPlugin {
    fn name(&self) -> &str {
        "foundry"
    }

    async fn validate(&self) -> Result<()> {
        if !self.project.exists() {
            bail!("Foundry project {} not found.", self.project.display());
        }
        if self.forge_required() {
            let installed = Command::new(&self.config.forge.path)
                .arg("--version")
                .output()
                .await
                .map(|output| output.status.success())
                .unwrap_or(false);
            if !installed {
                bail!(FORGE_MISSING);
            }
        }
        Ok(())
    }

    async fn resolve(&self) -> Result<BuildFragment> {
        if self.config.forge.clean {
            self.forge_checked(&["clean"]).await?;
        }
        if self.config.forge.build {
            self.forge_checked(&["build"]).await?;
        }

        let artifacts_dir = self.artifacts_dir().await;
        if !artifacts_dir.exists() {
            bail!("Artifacts not found.");
        }

        let deployments = self.deployments()?;
        let mut fragment = BuildFragment::new();

        for path in self.filter()?.collect(&artifacts_dir)? {
            let artifact = read_json(&path)?;
            let Some(abi) = non_empty_abi(&artifact) else {
                debug!(artifact = %path.display(), "skipping artifact without ABI");
                continue;
            };
            let Some(base) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let name = format!("{}{}", self.config.name_prefix, base);

            fragment = fragment.with_contract(&name, abi.clone());
            if let Some(spec) = deployments.get(base) {
                for (chain_id, address) in spec.entries() {
                    fragment = fragment.with_address(&name, chain_id, address);
                }
            }
        }

        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write(root: &Path, relative: &str, value: Value) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    fn abi(name: &str) -> Value {
        json!([{ "type": "function", "name": name, "inputs": [], "outputs": [], "stateMutability": "view" }])
    }

    fn project() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "out/Counter.sol/Counter.json", json!({ "abi": abi("number") }));
        write(root, "out/Token.sol/Token.json", json!({ "abi": abi("totalSupply") }));
        write(root, "out/Empty.sol/Empty.json", json!({ "abi": [] }));
        write(root, "out/Vm.sol/Vm.json", json!({ "abi": abi("prank") }));
        write(root, "out/Counter.t.sol/CounterTest.json", json!({ "abi": abi("test") }));
        write(
            root,
            "broadcast/Deploy.s.sol/31337/run-latest.json",
            json!({
                "transactions": [
                    {
                        "transactionType": "CREATE",
                        "contractName": "Counter",
                        "contractAddress": "0xbroadcast",
                        "additionalContracts": [
                            { "contractName": "Token", "contractAddress": "0xt0ken" }
                        ]
                    },
                    { "transactionType": "CALL", "contractName": "Counter", "contractAddress": "0xcall" }
                ]
            }),
        );
        tmp
    }

    fn plugin(root: &Path, options: Value) -> FoundryPlugin {
        let mut options = options;
        options["forge"] = json!({ "build": false });
        FoundryPlugin::new(
            serde_json::from_value(options).unwrap(),
            &PluginContext::new(root),
        )
    }

    #[tokio::test]
    async fn test_resolves_artifacts_with_default_excludes() {
        let tmp = project();
        let foundry = plugin(tmp.path(), json!({ "artifacts": "out" }));

        foundry.validate().await.unwrap();
        let fragment = foundry.resolve().await.unwrap();

        let names: Vec<&str> = fragment.contracts.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Counter", "Token"]);
        assert!(fragment.addresses.is_empty());
    }

    #[tokio::test]
    async fn test_deployments_and_prefix() {
        let tmp = project();
        let foundry = plugin(
            tmp.path(),
            json!({
                "artifacts": "out",
                "namePrefix": "My",
                "deployments": { "Counter": "0xc0", "Token": { "10": "0x70" } }
            }),
        );

        let fragment = foundry.resolve().await.unwrap();

        assert!(fragment.contracts.contains_key("MyCounter"));
        assert_eq!(fragment.addresses["MyCounter"][&ChainId(1)], "0xc0");
        assert_eq!(fragment.addresses["MyToken"][&ChainId(10)], "0x70");
    }

    #[tokio::test]
    async fn test_broadcasts_lose_to_explicit_deployments() {
        let tmp = project();
        let foundry = plugin(
            tmp.path(),
            json!({
                "artifacts": "out",
                "includeBroadcasts": true,
                "deployments": { "Token": { "1": "0xexplicit" } }
            }),
        );

        let fragment = foundry.resolve().await.unwrap();

        assert_eq!(fragment.addresses["Counter"][&ChainId(31337)], "0xbroadcast");
        assert_eq!(fragment.addresses["Token"][&ChainId(1)], "0xexplicit");
        assert!(!fragment.addresses["Token"].contains_key(&ChainId(31337)));
    }

    #[tokio::test]
    async fn test_missing_project_and_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = plugin(tmp.path(), json!({ "project": "nope" }));
        let err = missing.validate().await.unwrap_err();
        assert!(err.to_string().starts_with("Foundry project"));

        let empty = plugin(tmp.path(), json!({ "artifacts": "out" }));
        assert_eq!(
            empty.resolve().await.unwrap_err().to_string(),
            "Artifacts not found."
        );
    }

    #[tokio::test]
    async fn test_missing_forge_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let foundry = FoundryPlugin::new(
            serde_json::from_value(json!({
                "forge": { "build": true, "path": "definitely-not-forge-binary" }
            }))
            .unwrap(),
            &PluginContext::new(tmp.path()),
        );
        let err = foundry.validate().await.unwrap_err();
        assert!(err.to_string().starts_with("forge must be installed"));
    }
}
