//! Plugin abstraction.
//!
//! A plugin is a data source, a generator, or both. Data sources contribute a
//! [`BuildFragment`] from `resolve`; generators turn the [`ResolvedBuild`] into
//! [`Output`]s from `run`. Every hook is optional.

use indexmap::IndexMap;
use serde::Serialize;

use etherlib_types::{Addresses, CanonicalChain, Contracts, Output};

use crate::merge::BuildFragment;

/// Unified interface for build sources and code generators.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Declared plugin name. Identity within a config is `{name}-{position}`.
    fn name(&self) -> &str;

    /// Check preconditions (tooling installed, project present) before anything resolves.
    async fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Contribute contracts, chains and addresses.
    async fn resolve(&self) -> anyhow::Result<BuildFragment> {
        Ok(BuildFragment::default())
    }

    /// Emit files from the fully resolved build.
    async fn run(&self, _build: &ResolvedBuild) -> anyhow::Result<Vec<Output>> {
        Ok(Vec::new())
    }
}

/// A plugin bound to its position in a config's plugin list.
pub struct RegisteredPlugin {
    pub id: String,
    pub plugin: Box<dyn Plugin>,
}

/// Assign `{name}-{index}` ids in list order.
pub fn register_plugins(plugins: Vec<Box<dyn Plugin>>) -> Vec<RegisteredPlugin> {
    plugins
        .into_iter()
        .enumerate()
        .map(|(index, plugin)| RegisteredPlugin {
            id: format!("{}-{}", plugin.name(), index),
            plugin,
        })
        .collect()
}

/// The build model generators see: merged contracts, reconciled addresses and
/// canonical chains keyed by alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedBuild {
    pub contracts: Contracts,
    pub addresses: Addresses,
    pub chains: IndexMap<String, CanonicalChain>,
}
