//! Base configuration shared by every service in the workspace.
//!
//! Settings are layered: an optional `configuration` file first, then
//! `APP__*` environment variables (`APP__PORT=8081`). Service-specific
//! sections flatten this struct into their own config types.

use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Port to bind the HTTP listener to; 0 picks a random free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load the base configuration, reading `.env` first so local overrides
    /// apply before the environment source is consulted.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_absent() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8080);
    }
}
