use clap::Subcommand;
use gosleep_core::Config;

use super::{ensure_unlocked, reschedule_after_settings_change, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "settings.wake_up_time", "policy.away_retry_min")
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

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            ensure_unlocked(&config)?;
            config.set(&key, &value)?;
            reschedule_after_settings_change(&config)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            ensure_unlocked(&Config::load()?)?;
            let config = Config::default();
            config.save()?;
            reschedule_after_settings_change(&config)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
