//! The config command

use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{Config, ConfigManager};
use crate::error::CapstanResult;

pub fn config(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> CapstanResult<()> {
    match args.command {
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(config)?;
            print!("{}", text);
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", manager.path().display());
            Ok(())
        }
    }
}
