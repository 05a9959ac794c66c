//! Build resolution for etherlib.
//!
//! A [`Config`] names output directories, static contracts/chains/addresses and
//! an ordered list of [`Plugin`]s. [`generate_configs`] drives each config through
//! three passes over its plugins (validate, resolve, run):
//!
//! 1. every plugin's `resolve` result and the config's own declarations are
//!    folded into one [`BuildFragment`] ([`merge`])
//! 2. chains are normalized into the canonical layout ([`normalize`])
//! 3. the global address table and per-chain contract tables are reconciled
//!    ([`reconcile`])
//! 4. the resulting [`ResolvedBuild`] goes to every plugin's `run`, and the
//!    outputs are written ([`writer`])

pub mod config;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod plugin;
pub mod reconcile;
pub mod writer;

pub use config::{ChainsInput, Config};
pub use error::{GenerateError, OptionIssue, Result};
pub use merge::{deep_merge, BuildFragment};
pub use options::GenerateOptions;
pub use pipeline::{generate_configs, resolve_build, ConfigReport, GenerateReport};
pub use plugin::{register_plugins, Plugin, RegisteredPlugin, ResolvedBuild};

/// Tool name, used for the config file stem and generated banners.
pub const APP_NAME: &str = "etherlib";

/// Config files are discovered as `etherlib.config.<ext>`.
pub const CONFIG_FILE_STEM: &str = "etherlib.config";

/// Supported config file extensions, in discovery order.
pub const CONFIG_EXTENSIONS: [&str; 4] = ["json", "yaml", "yml", "toml"];
