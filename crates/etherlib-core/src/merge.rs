//! Deterministic merging of partial builds.
//!
//! Every contribution to a build (a plugin's `resolve` result, the config's
//! fragments, contracts list, chains and addresses) is a [`BuildFragment`].
//! The accumulated build is a left fold of [`BuildFragment::merge`] over the
//! ordered fragments. The merge is right-biased: mappings merge key by key,
//! anything else from the later fragment replaces the earlier value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use etherlib_types::{Abi, Addresses, ChainId, Contracts};

/// Right-biased deep merge of two JSON values.
///
/// Objects are merged recursively, keeping the key order of `base` and
/// appending new keys from `overlay`. Arrays and scalars in `overlay` replace
/// whatever `base` held.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let current = slot.take();
                        *slot = deep_merge(current, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Partial build: what one source knows about contracts, chains and addresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildFragment {
    pub contracts: Contracts,
    /// Raw chain objects keyed by alias, merged like contracts.
    pub chains: IndexMap<String, Value>,
    pub addresses: Addresses,
}

impl BuildFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty() && self.chains.is_empty() && self.addresses.is_empty()
    }

    pub fn with_contract(mut self, name: impl Into<String>, abi: Abi) -> Self {
        self.contracts.insert(name.into(), abi);
        self
    }

    pub fn with_address(
        mut self,
        name: impl Into<String>,
        chain_id: ChainId,
        address: impl Into<String>,
    ) -> Self {
        self.addresses
            .entry(name.into())
            .or_default()
            .insert(chain_id, address.into());
        self
    }

    /// Add a chain description. Its shape is only checked at normalization,
    /// so `chain` may be a partial overlay for a chain declared elsewhere.
    pub fn with_chain(mut self, alias: impl Into<String>, chain: Value) -> Self {
        self.chains.insert(alias.into(), chain);
        self
    }

    /// Merge `other` on top of `self`.
    pub fn merge(mut self, other: BuildFragment) -> BuildFragment {
        merge_entries(&mut self.contracts, other.contracts);
        merge_entries(&mut self.chains, other.chains);

        for (name, per_chain) in other.addresses {
            self.addresses.entry(name).or_default().extend(per_chain);
        }

        self
    }

    /// Fold fragments in order, starting from the empty build.
    pub fn fold(fragments: impl IntoIterator<Item = BuildFragment>) -> BuildFragment {
        fragments
            .into_iter()
            .fold(BuildFragment::default(), BuildFragment::merge)
    }
}

fn merge_entries(base: &mut IndexMap<String, Value>, overlay: IndexMap<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(slot) => {
                let current = slot.take();
                *slot = deep_merge(current, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
}
