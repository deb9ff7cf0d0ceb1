//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{CacheArgs, Cli, Commands, ConfigArgs, DownloadArgs};
