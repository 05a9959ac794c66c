//! ABIs from any JSON endpoint.

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use etherlib_core::{BuildFragment, Plugin};
use etherlib_types::ChainId;

use crate::cache::{duration_from_ms, FileCache};
use crate::http::{redact_api_key, HttpClient};
use crate::registry::PluginContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FetchConfig {
    /// Plugin name. Defaults to `fetch`.
    #[serde(default)]
    pub name: Option<String>,
    /// Chain the addresses are recorded under.
    pub chain_id: ChainId,
    /// Contract name to address.
    pub contracts: IndexMap<String, String>,
    /// Request URL; `{name}` and `{address}` are substituted per contract.
    pub url: String,
    /// JSON pointer to the ABI inside the response. Defaults to the whole body.
    #[serde(default)]
    pub abi_pointer: Option<String>,
    /// Cache lifetime in milliseconds.
    #[serde(default)]
    pub cache_duration: Option<u64>,
}

pub struct FetchPlugin {
    name: String,
    config: FetchConfig,
    cache: FileCache,
    http: HttpClient,
}

impl FetchPlugin {
    pub fn new(config: FetchConfig, ctx: &PluginContext) -> Self {
        Self {
            name: config.name.clone().unwrap_or_else(|| "fetch".to_string()),
            config,
            cache: ctx.cache().clone(),
            http: ctx.http().clone(),
        }
    }

    fn request_url(&self, name: &str, address: &str) -> String {
        self.config
            .url
            .replace("{name}", name)
            .replace("{address}", address)
    }
}

#[async_trait::async_trait]
impl Plugin for FetchPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self) -> Result<BuildFragment> {
        let mut fragment = BuildFragment::new();
        let ttl = duration_from_ms(self.config.cache_duration);

        for (name, address) in &self.config.contracts {
            fragment = fragment.with_address(name, self.config.chain_id, address);

            let key = format!("{name}_{address}");
            if let Some(abi) = self.cache.read(&key) {
                fragment = fragment.with_contract(name, abi);
                continue;
            }

            let url = self.request_url(name, address);
            let response = self.http.get_json(&url).await?;
            if !(200..300).contains(&response.status) {
                bail!(
                    "Fetching ABI for {name} from {} failed with status {}",
                    redact_api_key(&url),
                    response.status
                );
            }
            let body = response
                .body
                .ok_or_else(|| anyhow!("Invalid response for {name}: body is not JSON"))?;
            let abi = match &self.config.abi_pointer {
                Some(pointer) => body.pointer(pointer).cloned().ok_or_else(|| {
                    anyhow!("Invalid response for {name}: nothing at `{pointer}`")
                })?,
                None => body,
            };

            self.cache.write(&key, &abi, ttl)?;
            fragment = fragment.with_contract(name, abi);
        }

        Ok(fragment)
    }
}
