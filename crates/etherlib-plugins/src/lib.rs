//! Built-in etherlib plugins.
//!
//! ## Data sources
//!
//! - [`FetchPlugin`] - ABIs from arbitrary JSON endpoints
//! - [`BlockExplorerPlugin`] - any Etherscan-compatible `getabi` API
//! - [`EtherscanPlugin`] - Etherscan v2 multichain API, optionally following proxies
//! - [`SourcifyPlugin`] - verified ABIs from Sourcify
//! - [`FoundryPlugin`] - forge artifacts, deployments and broadcasts
//! - [`HardhatPlugin`] - hardhat artifacts, ignition deployments and networks
//!
//! ## Generators
//!
//! - [`ViemPlugin`] - TypeScript constants and contract helpers for viem
//! - [`EthersPlugin`] - chains, a switchable connection and contract factories for ethers v6
//!
//! Plugins are usually built from config declarations through [`registry::build_plugin`].

pub mod artifacts;
pub mod block_explorer;
pub mod cache;
pub mod ethers;
pub mod etherscan;
pub mod fetch;
pub mod foundry;
pub mod hardhat;
pub mod http;
pub mod registry;
pub mod source;
pub mod sourcify;
mod ts;
pub mod viem;

pub use block_explorer::BlockExplorerPlugin;
pub use ethers::EthersPlugin;
pub use etherscan::EtherscanPlugin;
pub use fetch::FetchPlugin;
pub use foundry::FoundryPlugin;
pub use hardhat::HardhatPlugin;
pub use registry::{build_plugin, PluginContext};
pub use sourcify::SourcifyPlugin;
pub use viem::ViemPlugin;
