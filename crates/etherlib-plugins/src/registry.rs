//! Maps plugin declarations from a config file to plugin instances.
//!
//! A declaration is either a bare kind (`"viem"`) or an object naming the kind
//! under `plugin` with the plugin's options alongside:
//!
//! ```json
//! { "plugin": "foundry", "project": "contracts", "forge": { "build": false } }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use etherlib_core::Plugin;

use crate::block_explorer::BlockExplorerPlugin;
use crate::cache::FileCache;
use crate::ethers::EthersPlugin;
use crate::etherscan::EtherscanPlugin;
use crate::fetch::FetchPlugin;
use crate::foundry::FoundryPlugin;
use crate::hardhat::HardhatPlugin;
use crate::http::HttpClient;
use crate::sourcify::SourcifyPlugin;
use crate::viem::ViemPlugin;

/// Known plugin kinds, as written in config files.
pub const PLUGIN_KINDS: [&str; 8] = [
    "fetch",
    "blockExplorer",
    "etherscan",
    "sourcify",
    "foundry",
    "hardhat",
    "viem",
    "ethers",
];

/// Shared environment handed to every plugin built from one config file.
#[derive(Debug, Clone)]
pub struct PluginContext {
    root: PathBuf,
    cache: FileCache,
    http: HttpClient,
}

impl PluginContext {
    /// Context rooted at `root`; the response cache lives in `<root>/.cache`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache: FileCache::new(root.join(".cache")),
            http: HttpClient::default(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Resolve a config-relative path against the root.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}

/// Build one plugin from its declaration.
pub fn build_plugin(decl: &Value, ctx: &PluginContext) -> Result<Box<dyn Plugin>> {
    let (kind, options) = split_declaration(decl)?;

    let plugin: Box<dyn Plugin> = match kind.as_str() {
        "fetch" => Box::new(FetchPlugin::new(parse_options(&kind, options)?, ctx)),
        "blockExplorer" => Box::new(BlockExplorerPlugin::new(
            parse_options(&kind, options)?,
            ctx,
        )),
        "etherscan" => Box::new(EtherscanPlugin::new(parse_options(&kind, options)?, ctx)),
        "sourcify" => Box::new(SourcifyPlugin::new(parse_options(&kind, options)?, ctx)),
        "foundry" => Box::new(FoundryPlugin::new(parse_options(&kind, options)?, ctx)),
        "hardhat" => Box::new(HardhatPlugin::new(parse_options(&kind, options)?, ctx)),
        "viem" => Box::new(ViemPlugin::new(parse_options(&kind, options)?)),
        "ethers" => Box::new(EthersPlugin::new(parse_options(&kind, options)?)),
        other => bail!(
            "unknown plugin \"{other}\" (expected one of: {})",
            PLUGIN_KINDS.join(", ")
        ),
    };
    Ok(plugin)
}

fn split_declaration(decl: &Value) -> Result<(String, Value)> {
    match decl {
        Value::String(kind) => Ok((kind.clone(), Value::Object(Map::new()))),
        Value::Object(fields) => {
            let mut options = fields.clone();
            let kind = options
                .remove("plugin")
                .ok_or_else(|| anyhow!("plugin declaration is missing the `plugin` key"))?;
            let Value::String(kind) = kind else {
                bail!("`plugin` must be a string, got {kind}");
            };
            Ok((kind, Value::Object(options)))
        }
        other => bail!("plugin declaration must be a string or an object, got {other}"),
    }
}

fn parse_options<T: DeserializeOwned>(kind: &str, options: Value) -> Result<T> {
    serde_json::from_value(options).with_context(|| format!("invalid options for plugin \"{kind}\""))
}
