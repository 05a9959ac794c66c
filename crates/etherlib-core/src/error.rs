//! Error kinds raised while loading, resolving and writing a build.

use std::fmt;
use std::path::PathBuf;

use etherlib_types::ChainId;
use thiserror::Error;

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;

/// One rejected CLI-facing option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionIssue {
    /// Field path of the offending option, e.g. `root`.
    pub path: String,
    pub message: String,
}

impl OptionIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for OptionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at `{}`", self.message, self.path)
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{}", config_not_found(.path))]
    ConfigNotFound { path: Option<PathBuf> },

    #[error("Invalid option: {}", join_issues(.issues))]
    InvalidOption { issues: Vec<OptionIssue> },

    #[error("Invalid config {}: {message}", .path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("output is required.")]
    MissingOutput,

    #[error("out \"{}\" must be unique.", .0.display())]
    DuplicateOutput(PathBuf),

    #[error("{source}")]
    PluginValidationFailed {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{source}")]
    PluginResolveFailed {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{source}")]
    PluginRunFailed {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No address for chainId {chain_id}. Set address[{chain_id}] for this contract.")]
    AddressResolutionFailed { contract: String, chain_id: ChainId },

    #[error("Invalid chain \"{alias}\": {reason}")]
    InvalidChain { alias: String, reason: String },

    #[error("Output id \"{0}\" must be a relative path inside the output directory.")]
    InvalidOutputId(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Id of the plugin whose hook failed, if this error came from one.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            GenerateError::PluginValidationFailed { plugin, .. }
            | GenerateError::PluginResolveFailed { plugin, .. }
            | GenerateError::PluginRunFailed { plugin, .. } => Some(plugin),
            _ => None,
        }
    }
}

fn config_not_found(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!("Config not found at {}", path.display()),
        None => "Config not found".to_string(),
    }
}

fn join_issues(issues: &[OptionIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
