//! Address reconciliation between the global address table and chain contracts.
//!
//! The global table is authoritative. For each chain, in alias order:
//! 1. every contract with a global address for the chain's id is written into
//!    `chain.contracts`, replacing what the chain declared
//! 2. every chain contract carrying an address fills the global table, but
//!    only where it has no entry for that chain yet
//!
//! Step 2 can add names that have no ABI in `contracts`; generators see them
//! as address-only entries.

use indexmap::IndexMap;
use tracing::debug;

use etherlib_types::{Addresses, CanonicalChain, ChainContract};

pub fn reconcile_addresses(
    addresses: &mut Addresses,
    chains: &mut IndexMap<String, CanonicalChain>,
) {
    for (alias, chain) in chains.iter_mut() {
        for (name, per_chain) in addresses.iter() {
            if let Some(address) = per_chain.get(&chain.id) {
                chain
                    .contracts
                    .insert(name.clone(), ChainContract::at(address.clone()));
            }
        }

        for (name, contract) in &chain.contracts {
            let Some(address) = &contract.address else {
                continue;
            };
            let per_chain = addresses.entry(name.clone()).or_default();
            if !per_chain.contains_key(&chain.id) {
                debug!(chain = %alias, contract = %name, "back-filling address");
                per_chain.insert(chain.id, address.clone());
            }
        }
    }
}
