//! ABIs from the Etherscan v2 multichain API.
//!
//! With `tryFetchProxyImplementation`, `getsourcecode` is queried first and, if
//! the contract is a verified proxy, the implementation's ABI is used instead of
//! the proxy's own.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use etherlib_core::{BuildFragment, Plugin};
use etherlib_types::{Abi, ChainId};

use crate::cache::{duration_from_ms, FileCache};
use crate::http::{HttpClient, Query};
use crate::registry::PluginContext;
use crate::source::{explorer_result, parse_abi_string, ContractSource};

const BASE_URL: &str = "https://api.etherscan.io/v2/api";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EtherscanConfig {
    pub api_key: String,
    /// Chain to query; also selects the address from per-chain maps.
    pub chain_id: ChainId,
    pub contracts: Vec<ContractSource>,
    #[serde(default)]
    pub cache_duration: Option<u64>,
    #[serde(default)]
    pub try_fetch_proxy_implementation: bool,
}

pub struct EtherscanPlugin {
    config: EtherscanConfig,
    cache: FileCache,
    http: HttpClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    GetAbi,
    GetSourceCode,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::GetAbi => "getabi",
            Action::GetSourceCode => "getsourcecode",
        }
    }
}

impl EtherscanPlugin {
    pub fn new(config: EtherscanConfig, ctx: &PluginContext) -> Self {
        Self {
            config,
            cache: ctx.cache().clone(),
            http: ctx.http().clone(),
        }
    }

    fn request_query(&self, action: Action, address: &str) -> Query {
        let mut query = vec![
            ("chainId", self.config.chain_id.to_string()),
            ("module", "contract".to_string()),
            ("action", action.as_str().to_string()),
            ("address", address.to_string()),
        ];
        if !self.config.api_key.is_empty() {
            query.push(("apikey", self.config.api_key.clone()));
        }
        query
    }

    async fn fetch_abi(&self, address: &str) -> Result<Abi> {
        let response = self
            .http
            .get_json_with_query(BASE_URL, self.request_query(Action::GetAbi, address))
            .await?;
        let result = explorer_result(response.body, "Etherscan getabi")?;
        parse_abi_string(result, "Etherscan getabi")
    }

    /// Implementation address when `address` is a verified proxy.
    async fn proxy_implementation(&self, address: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get_json_with_query(BASE_URL, self.request_query(Action::GetSourceCode, address))
            .await?;
        let result = explorer_result(response.body, "Etherscan getsourcecode")?;
        Ok(implementation_of(&result))
    }
}

fn implementation_of(result: &Value) -> Option<String> {
    let first = result.as_array()?.first()?;
    let is_proxy = first.get("Proxy").and_then(Value::as_str) == Some("1");
    let implementation = first.get("Implementation").and_then(Value::as_str)?;
    (is_proxy && !implementation.is_empty()).then(|| implementation.to_string())
}

#[async_trait::async_trait]
impl Plugin for EtherscanPlugin {
    fn name(&self) -> &str {
        "etherscan"
    }

    async fn resolve(&self) -> Result<BuildFragment> {
        let mut fragment = BuildFragment::new();
        let ttl = duration_from_ms(self.config.cache_duration);
        let chain_id = self.config.chain_id;

        for contract in &self.config.contracts {
            let address = contract.address_for(chain_id)?;
            fragment = fragment.with_address(&contract.name, chain_id, &address);

            let key = format!("etherscan_{}_{}_{}", chain_id, contract.name, address);
            if let Some(abi) = self.cache.read(&key) {
                fragment = fragment.with_contract(&contract.name, abi);
                continue;
            }

            let mut lookup = address.clone();
            if self.config.try_fetch_proxy_implementation {
                if let Some(implementation) = self.proxy_implementation(&address).await? {
                    debug!(contract = %contract.name, %implementation, "following proxy");
                    lookup = implementation;
                }
            }
            let abi = self.fetch_abi(&lookup).await?;

            self.cache.write(&key, &abi, ttl)?;
            fragment = fragment.with_contract(&contract.name, abi);
        }

        Ok(fragment)
    }
}
