//! Build configuration.
//!
//! A [`Config`] is deserialized from the user's config file (everything but
//! `plugins`, which the loader builds from the plugin registry) and turned into
//! an ordered list of [`BuildFragment`]s that are merged after every plugin's
//! `resolve` contribution.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use etherlib_types::naming::lower_first;
use etherlib_types::{Addresses, ContractConfig, Contracts};

use crate::merge::BuildFragment;
use crate::plugin::Plugin;

/// Chains as written by the user: keyed by alias, or a list to be aliased by name.
///
/// Entries stay raw JSON objects so they can overlay chains contributed by
/// plugins; their shape is checked once the build is merged.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainsInput {
    Map(IndexMap<String, Value>),
    List(Vec<Value>),
}

impl ChainsInput {
    /// Alias every chain. List entries are keyed by their name with the first
    /// character lower-cased, or `chain{index}` when they have no name.
    pub fn into_aliased(self) -> IndexMap<String, Value> {
        match self {
            ChainsInput::Map(map) => map,
            ChainsInput::List(list) => {
                let mut map = IndexMap::with_capacity(list.len());
                for (index, chain) in list.into_iter().enumerate() {
                    let alias = match chain.get("name").and_then(Value::as_str) {
                        Some(name) if !name.is_empty() => lower_first(name),
                        _ => format!("chain{index}"),
                    };
                    map.insert(alias, chain);
                }
                map
            }
        }
    }
}

impl<'de> Deserialize<'de> for ChainsInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if !item.is_object() {
                        return Err(de::Error::custom(format!(
                            "chains[{index}] must be an object, got {item}"
                        )));
                    }
                }
                Ok(ChainsInput::List(items))
            }
            Value::Object(entries) => {
                for (alias, item) in &entries {
                    if !item.is_object() {
                        return Err(de::Error::custom(format!(
                            "chains.{alias} must be an object, got {item}"
                        )));
                    }
                }
                Ok(ChainsInput::Map(entries.into_iter().collect()))
            }
            other => Err(de::Error::custom(format!(
                "chains must be a mapping or a list, got {other}"
            ))),
        }
    }
}

/// One build: where to write, what to start from and which plugins to run.
#[derive(Deserialize)]
pub struct Config {
    /// Output directories. Required; accepts one path or a list. An empty
    /// path counts as missing.
    #[serde(default, deserialize_with = "one_or_many")]
    pub output: Vec<PathBuf>,

    /// Remove each output directory before writing.
    #[serde(default = "default_clean")]
    pub clean: bool,

    /// Extra ABIs by contract name.
    #[serde(default)]
    pub fragments: Contracts,

    #[serde(default)]
    pub contracts: Vec<ContractConfig>,

    #[serde(default)]
    pub chains: Option<ChainsInput>,

    /// Addresses declared here win over every other source.
    #[serde(default)]
    pub addresses: Addresses,

    #[serde(skip)]
    pub plugins: Vec<Box<dyn Plugin>>,
}

fn default_clean() -> bool {
    true
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: Vec::new(),
            clean: true,
            fragments: Contracts::new(),
            contracts: Vec::new(),
            chains: None,
            addresses: Addresses::new(),
            plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("output", &self.output)
            .field("clean", &self.clean)
            .field("fragments", &self.fragments.keys().collect::<Vec<_>>())
            .field("contracts", &self.contracts.len())
            .field("chains", &self.chains)
            .field("addresses", &self.addresses)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Config {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: vec![output.into()],
            ..Default::default()
        }
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// The config's own declarations, in the order they are merged after the
    /// plugins: fragments, the contracts list, chains, then addresses.
    pub fn user_fragments(&self) -> Vec<BuildFragment> {
        let mut fragments = Vec::with_capacity(self.contracts.len() + 3);

        fragments.push(BuildFragment {
            contracts: self.fragments.clone(),
            ..Default::default()
        });

        for entry in &self.contracts {
            let mut fragment = BuildFragment::new().with_contract(&entry.name, entry.abi.clone());
            if let Some(address) = &entry.address {
                for (chain_id, address) in address.entries() {
                    fragment = fragment.with_address(&entry.name, chain_id, address);
                }
            }
            fragments.push(fragment);
        }

        if let Some(chains) = &self.chains {
            fragments.push(BuildFragment {
                chains: chains.clone().into_aliased(),
                ..Default::default()
            });
        }

        fragments.push(BuildFragment {
            addresses: self.addresses.clone(),
            ..Default::default()
        });

        fragments
    }
}
