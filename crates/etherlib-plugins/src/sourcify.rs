//! Verified ABIs from Sourcify. No API key required.

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use serde_json::Value;

use etherlib_core::{BuildFragment, Plugin};
use etherlib_types::ChainId;

use crate::cache::{duration_from_ms, FileCache};
use crate::http::HttpClient;
use crate::registry::PluginContext;
use crate::source::ContractSource;

const BASE_URL: &str = "https://sourcify.dev/server/v2/contract";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourcifyConfig {
    /// Chain to query; also selects the address from per-chain maps.
    pub chain_id: ChainId,
    pub contracts: Vec<ContractSource>,
    #[serde(default)]
    pub cache_duration: Option<u64>,
}

pub struct SourcifyPlugin {
    config: SourcifyConfig,
    cache: FileCache,
    http: HttpClient,
}

impl SourcifyPlugin {
    pub fn new(config: SourcifyConfig, ctx: &PluginContext) -> Self {
        Self {
            config,
            cache: ctx.cache().clone(),
            http: ctx.http().clone(),
        }
    }

    fn request_url(&self, address: &str) -> String {
        format!("{BASE_URL}/{}/{}?fields=abi", self.config.chain_id, address)
    }
}

#[async_trait::async_trait]
impl Plugin for SourcifyPlugin {
    fn name(&self) -> &str {
        "sourcify"
    }

    async fn resolve(&self) -> Result<BuildFragment> {
        let mut fragment = BuildFragment::new();
        let ttl = duration_from_ms(self.config.cache_duration);
        let chain_id = self.config.chain_id;

        for contract in &self.config.contracts {
            let address = contract.address_for(chain_id)?;
            fragment = fragment.with_address(&contract.name, chain_id, &address);

            let key = format!("sourcify_{}_{}", contract.name, address);
            if let Some(abi) = self.cache.read(&key) {
                fragment = fragment.with_contract(&contract.name, abi);
                continue;
            }

            let response = self.http.get_json(&self.request_url(&address)).await?;
            if response.status == 404 {
                bail!("Contract not found in Sourcify repository.");
            }
            let body = response
                .body
                .ok_or_else(|| anyhow!("Sourcify: response body is not JSON"))?;
            let abi = match body.get("abi") {
                Some(Value::Null) | None => bail!("Contract not found in Sourcify repository."),
                Some(abi) => abi.clone(),
            };

            self.cache.write(&key, &abi, ttl)?;
            fragment = fragment.with_contract(&contract.name, abi);
        }

        Ok(fragment)
    }
}
