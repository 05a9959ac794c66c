//! Contract ABIs and the global address table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain_id::ChainId;

/// Contract ABI. Carried verbatim, never inspected by the pipeline.
pub type Abi = serde_json::Value;

/// Contract name to ABI, in insertion order.
pub type Contracts = IndexMap<String, Abi>;

/// Contract name to per-chain deployment address.
pub type Addresses = IndexMap<String, BTreeMap<ChainId, String>>;

/// One entry of a config's `contracts` list: name, ABI and optional address(es).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub name: String,
    pub abi: Abi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressSpec>,
}

/// Either one address (filed under chain 1) or an explicit per-chain map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressSpec {
    Single(String),
    PerChain(BTreeMap<ChainId, String>),
}

impl AddressSpec {
    /// Expand into `(chain, address)` pairs.
    pub fn entries(&self) -> Vec<(ChainId, String)> {
        match self {
            AddressSpec::Single(address) => vec![(ChainId::MAINNET, address.clone())],
            AddressSpec::PerChain(map) => map
                .iter()
                .map(|(chain_id, address)| (*chain_id, address.clone()))
                .collect(),
        }
    }

    /// Address for one chain. A single address only answers for chain 1.
    pub fn for_chain(&self, chain_id: ChainId) -> Option<&str> {
        match self {
            AddressSpec::Single(address) if chain_id == ChainId::MAINNET => Some(address),
            AddressSpec::Single(_) => None,
            AddressSpec::PerChain(map) => map.get(&chain_id).map(String::as_str),
        }
    }

    /// First address in the spec, used when a source only needs one to look up an ABI.
    pub fn first(&self) -> Option<(ChainId, &str)> {
        match self {
            AddressSpec::Single(address) => Some((ChainId::MAINNET, address)),
            AddressSpec::PerChain(map) => map
                .iter()
                .next()
                .map(|(chain_id, address)| (*chain_id, address.as_str())),
        }
    }
}
