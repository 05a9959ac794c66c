//! ABIs from block explorers exposing the Etherscan-style
//! `?module=contract&action=getabi&address=...` API.

use anyhow::{anyhow, Result};
use serde::Deserialize;

use etherlib_core::{BuildFragment, Plugin};
use etherlib_types::naming::camel_case;
use etherlib_types::{AddressSpec, ChainId};

use crate::cache::{duration_from_ms, FileCache};
use crate::http::{HttpClient, Query};
use crate::registry::PluginContext;
use crate::source::{explorer_result, parse_abi_string, ContractSource};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockExplorerConfig {
    /// Explorer API endpoint, e.g. `https://api.etherscan.io/api`.
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sent as `chainId` and used for single addresses. Defaults to 1.
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    pub contracts: Vec<ContractSource>,
    #[serde(default)]
    pub cache_duration: Option<u64>,
    /// Defaults to `Block Explorer`.
    #[serde(default)]
    pub name: Option<String>,
}

pub struct BlockExplorerPlugin {
    name: String,
    chain_id: ChainId,
    config: BlockExplorerConfig,
    cache: FileCache,
    http: HttpClient,
}

impl BlockExplorerPlugin {
    pub fn new(config: BlockExplorerConfig, ctx: &PluginContext) -> Self {
        Self {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| "Block Explorer".to_string()),
            chain_id: config.chain_id.unwrap_or(ChainId::MAINNET),
            config,
            cache: ctx.cache().clone(),
            http: ctx.http().clone(),
        }
    }

    fn request_query(&self, address: &str) -> Query {
        let mut query = vec![
            ("chainId", self.chain_id.to_string()),
            ("module", "contract".to_string()),
            ("action", "getabi".to_string()),
            ("address", address.to_string()),
        ];
        if let Some(api_key) = &self.config.api_key {
            query.push(("apikey", api_key.clone()));
        }
        query
    }

    fn cache_key(&self, spec: &AddressSpec) -> Result<String> {
        let address = match spec {
            AddressSpec::Single(address) => address.clone(),
            AddressSpec::PerChain(_) => serde_json::to_string(spec)?,
        };
        Ok(format!("{}:{}", camel_case(&self.name), address))
    }
}

#[async_trait::async_trait]
impl Plugin for BlockExplorerPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self) -> Result<BuildFragment> {
        let mut fragment = BuildFragment::new();
        let ttl = duration_from_ms(self.config.cache_duration);

        for contract in &self.config.contracts {
            let spec = contract
                .address
                .as_ref()
                .ok_or_else(|| anyhow!("address is required for contract {}", contract.name))?;

            // A multi-chain contract is looked up by its first address; all of them are recorded.
            match spec {
                AddressSpec::Single(address) => {
                    fragment = fragment.with_address(&contract.name, self.chain_id, address);
                }
                AddressSpec::PerChain(map) => {
                    for (chain_id, address) in map {
                        fragment = fragment.with_address(&contract.name, *chain_id, address);
                    }
                }
            }

            let key = self.cache_key(spec)?;
            if let Some(abi) = self.cache.read(&key) {
                fragment = fragment.with_contract(&contract.name, abi);
                continue;
            }

            let (_, lookup) = spec
                .first()
                .ok_or_else(|| anyhow!("address is required for contract {}", contract.name))?;
            let response = self
                .http
                .get_json_with_query(&self.config.base_url, self.request_query(lookup))
                .await?;
            let result = explorer_result(response.body, &self.name)?;
            let abi = parse_abi_string(result, &self.name)?;

            self.cache.write(&key, &abi, ttl)?;
            fragment = fragment.with_contract(&contract.name, abi);
        }

        Ok(fragment)
    }
}
