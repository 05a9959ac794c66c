//! Shared types for the etherlib workspace.
//!
//! This crate holds the data model every other crate speaks:
//! - [`ChainId`] - numeric chain identifier that also travels as a map key string
//! - [`Contracts`] / [`Addresses`] - the ABI table and the global address table
//! - [`RawChain`] / [`CanonicalChain`] - chain descriptions before and after normalization
//! - [`Output`] - a generated file produced by a generator plugin

pub mod chain;
pub mod chain_id;
pub mod contract;
pub mod naming;
pub mod output;

pub use chain::{
    BlockExplorer, CanonicalChain, Chain, ChainContract, ChainContractEntry, Currency, RawChain,
    RichChain, RpcUrls, SimpleChain,
};
pub use chain_id::ChainId;
pub use contract::{Abi, AddressSpec, Addresses, ContractConfig, Contracts};
pub use output::Output;
