//! Chain normalization: every merged chain object becomes a [`CanonicalChain`].

use indexmap::IndexMap;
use serde_json::Value;

use etherlib_types::{CanonicalChain, Chain, RawChain, RpcUrls, SimpleChain};

use crate::error::{GenerateError, Result};

/// Normalize one chain.
///
/// Rich chains keep every field; bare-string contract entries become
/// `{ address }`. Simple chains are expanded into the rich layout and must
/// declare both `id` and `name`.
pub fn normalize_chain(alias: &str, chain: RawChain) -> Result<CanonicalChain> {
    match chain {
        RawChain::Rich(rich) => Ok(Chain {
            id: rich.id,
            name: rich.name,
            rpc_urls: rich.rpc_urls,
            block_explorers: rich.block_explorers,
            native_currency: rich.native_currency,
            testnet: rich.testnet,
            icon: rich.icon,
            contracts: rich
                .contracts
                .into_iter()
                .map(|(name, entry)| (name, entry.into_contract()))
                .collect(),
            extra: rich.extra,
        }),
        RawChain::Simple(simple) => normalize_simple(alias, simple),
    }
}

fn normalize_simple(alias: &str, simple: SimpleChain) -> Result<CanonicalChain> {
    let SimpleChain {
        name,
        id,
        rpc,
        icon,
        testnet,
        currency,
        explorer,
        contracts,
    } = simple;

    let id = id.ok_or_else(|| invalid(alias, "`id` is required for a chain declared with `rpc`"))?;
    let name =
        name.ok_or_else(|| invalid(alias, "`name` is required for a chain declared with `rpc`"))?;

    Ok(Chain {
        id,
        name,
        rpc_urls: IndexMap::from([("default".to_string(), RpcUrls::http(rpc))]),
        block_explorers: explorer.map(|explorer| IndexMap::from([("default".to_string(), explorer)])),
        native_currency: currency,
        testnet,
        icon,
        contracts: contracts
            .into_iter()
            .map(|(name, entry)| (name, entry.into_contract()))
            .collect(),
        extra: Default::default(),
    })
}

fn invalid(alias: &str, reason: &str) -> GenerateError {
    GenerateError::InvalidChain {
        alias: alias.to_string(),
        reason: reason.to_string(),
    }
}

/// Classify and normalize every merged chain, keeping alias order.
pub fn normalize_chains(
    chains: IndexMap<String, Value>,
) -> Result<IndexMap<String, CanonicalChain>> {
    chains
        .into_iter()
        .map(|(alias, value)| {
            let chain = RawChain::from_value(value).map_err(|e| invalid(&alias, &e.to_string()))?;
            let canonical = normalize_chain(&alias, chain)?;
            Ok((alias, canonical))
        })
        .collect()
}
