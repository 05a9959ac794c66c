//! Subcommands for the etherlib CLI.

pub mod generate;
pub mod init;
pub mod output;
