//! etherlib: resolve contract ABIs, deployment addresses and chain metadata
//! into generated source files.
//!
//! The library is split across workspace crates:
//!
//! - [`etherlib_types`] - chains, contracts, addresses and output units
//! - [`etherlib_core`] - the plugin lifecycle and build resolution
//! - [`etherlib_plugins`] - built-in data sources and generators
//!
//! This crate ties them together: [`config_loader`] turns config files into
//! [`Config`]s with their plugins built, and [`generate`] runs the whole thing
//! for a set of [`GenerateOptions`].
//!
//! ## Example
//!
//! ```no_run
//! use etherlib_generator::{generate, GenerateOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let report = generate(&GenerateOptions {
//!     root: Some("./my-dapp".into()),
//!     ..Default::default()
//! })
//! .await?;
//! println!("wrote {} files", report.total_files());
//! # Ok(())
//! # }
//! ```

pub mod config_loader;
pub mod generate;

pub use etherlib_core::{
    Config, GenerateError, GenerateOptions, GenerateReport, Plugin, ResolvedBuild,
};
pub use etherlib_types::Output;
pub use generate::generate;
