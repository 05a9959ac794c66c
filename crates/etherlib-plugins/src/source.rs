//! Helpers shared by the ABI-fetching data sources.

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use serde_json::Value;

use etherlib_core::GenerateError;
use etherlib_types::{Abi, AddressSpec, ChainId};

/// A contract to look up: name plus the address(es) it is deployed at.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContractSource {
    pub name: String,
    #[serde(default)]
    pub address: Option<AddressSpec>,
}

impl ContractSource {
    /// Address for `chain_id`. A single address is used as-is for any chain.
    pub fn address_for(&self, chain_id: ChainId) -> Result<String> {
        match &self.address {
            Some(AddressSpec::Single(address)) => Ok(address.clone()),
            Some(AddressSpec::PerChain(map)) => map.get(&chain_id).cloned().ok_or_else(|| {
                GenerateError::AddressResolutionFailed {
                    contract: self.name.clone(),
                    chain_id,
                }
                .into()
            }),
            None => Err(anyhow!("address is required for contract {}", self.name)),
        }
    }
}

/// Decode an Etherscan-style `{ status, message, result }` envelope.
///
/// Status `"1"` carries the payload in `result`; status `"0"` carries the
/// error text there instead.
pub fn explorer_result(body: Option<Value>, context: &str) -> Result<Value> {
    let Some(Value::Object(body)) = body else {
        bail!("Invalid response from {context}: expected a JSON object");
    };
    let status = body.get("status").and_then(Value::as_str);
    let result = body.get("result").cloned().unwrap_or(Value::Null);
    match status {
        Some("1") => Ok(result),
        Some("0") => match result {
            Value::String(message) => bail!(message),
            other => bail!("{context} request failed: {other}"),
        },
        _ => bail!("Invalid response from {context}: missing or unknown `status`"),
    }
}

/// ABIs from explorers arrive as a JSON document inside a string.
pub fn parse_abi_string(result: Value, context: &str) -> Result<Abi> {
    match result {
        Value::String(raw) => serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Invalid response from {context}: ABI is not valid JSON ({e})")),
        Value::Array(_) => Ok(result),
        other => bail!("Invalid response from {context}: unexpected ABI payload {other}"),
    }
}
