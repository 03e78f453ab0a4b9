use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Safety-net TTL for seat locks. Release is still explicit; the
    /// TTL only reclaims locks orphaned by a crashed process.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
}

fn default_lock_ttl() -> u64 {
    900
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    100
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Environment-specific overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `ITINERA__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("ITINERA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
