use std::env;

use crate::error::ConfigError;

/// Environment-sourced configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token used to authenticate the gateway session.
    pub discord_token: String,
    /// Access key for the external draws API.
    pub api_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            discord_token: require_var("DISCORD_TOKEN")?,
            api_token: require_var("API_TOKEN")?,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
