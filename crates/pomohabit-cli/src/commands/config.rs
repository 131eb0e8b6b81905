use std::path::Path;

use clap::Subcommand;
use pomohabit_core::{Config, ConfigError};

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "calendar.utc_offset", "log.level")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => match ctx.config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(ConfigError::UnknownKey(key).into()),
        },
        ConfigAction::Set { key, value } => {
            let mut config = ctx.config.clone();
            config.set(&key, &value)?;
            config.save_to(&ctx.config_path())?;
            println!("ok");
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(&ctx.config)?;
            println!("{json}");
        }
        ConfigAction::Reset => reset(&ctx.config_path())?,
    }
    Ok(())
}

/// Overwrite the config file with defaults. Does not read the old file.
pub fn reset(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    Config::default().save_to(path)?;
    println!("config reset to defaults");
    Ok(())
}
