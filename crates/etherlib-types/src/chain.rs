//! Chain descriptions.
//!
//! Users describe chains in two shapes:
//! - a *rich* chain in the viem `Chain` layout, recognised by its `rpcUrls` table
//! - a *simple* chain with a single `rpc` string and optional metadata
//!
//! Chains travel as plain JSON while sources contribute to them, so a partial
//! overlay can land on a chain declared elsewhere. The shape is decided once,
//! by [`RawChain::from_value`], on the merged object. After normalization every
//! chain is a [`CanonicalChain`], which is the rich layout with each contract
//! entry expanded to a [`ChainContract`].

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::chain_id::ChainId;

/// Chain record in the viem layout, generic over the contract entry type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "C: Deserialize<'de>"))]
pub struct Chain<C> {
    pub id: ChainId,
    pub name: String,
    pub rpc_urls: IndexMap<String, RpcUrls>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorers: Option<IndexMap<String, BlockExplorer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testnet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub contracts: IndexMap<String, C>,
    /// Fields this crate does not model (`sourceId`, `fees`, `formatters`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rich chain as written by the user: contract entries may be bare address strings.
pub type RichChain = Chain<ChainContractEntry>;

/// Normalized chain handed to generators.
pub type CanonicalChain = Chain<ChainContract>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcUrls {
    pub http: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_socket: Vec<String>,
}

impl RpcUrls {
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            http: vec![url.into()],
            web_socket: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExplorer {
    pub name: String,
    pub url: String,
    #[serde(
        rename = "apiUrl",
        alias = "api",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Per-chain contract record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_created: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChainContract {
    pub fn at(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }
}

/// Contract entry as the user wrote it: `"0x..."` or `{ "address": "0x..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainContractEntry {
    Address(String),
    Detailed(ChainContract),
}

impl ChainContractEntry {
    pub fn into_contract(self) -> ChainContract {
        match self {
            ChainContractEntry::Address(address) => ChainContract::at(address),
            ChainContractEntry::Detailed(contract) => contract,
        }
    }
}

/// Simple chain: one RPC endpoint plus optional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleChain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChainId>,
    pub rpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testnet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer: Option<BlockExplorer>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub contracts: IndexMap<String, ChainContractEntry>,
}

/// A chain description before normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawChain {
    Rich(RichChain),
    Simple(SimpleChain),
}

impl RawChain {
    /// Decide the shape of a JSON chain description.
    ///
    /// An object carrying `rpcUrls` is rich, anything else must be simple.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get("rpcUrls").is_some() {
            serde_json::from_value(value).map(RawChain::Rich)
        } else {
            serde_json::from_value(value).map(RawChain::Simple)
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Declared name, if any. Rich chains always have one.
    pub fn name(&self) -> Option<&str> {
        match self {
            RawChain::Rich(chain) => Some(chain.name.as_str()),
            RawChain::Simple(chain) => chain.name.as_deref(),
        }
    }

    pub fn id(&self) -> Option<ChainId> {
        match self {
            RawChain::Rich(chain) => Some(chain.id),
            RawChain::Simple(chain) => chain.id,
        }
    }
}

impl<'de> Deserialize<'de> for RawChain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        RawChain::from_value(value).map_err(de::Error::custom)
    }
}
