use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Base URLs of the external collaborators. Only the booking service
    /// talks to collaborators, so the section is optional.
    pub collaborators: Option<CollaboratorsConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Path of the JSON snapshot document.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollaboratorsConfig {
    pub schedule_url: String,
    pub movie_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    3
}

impl Config {
    /// Load layered configuration for one service.
    ///
    /// Sources, later ones overriding earlier ones:
    /// - `config/{service}.toml` (required)
    /// - `config/{service}.{RUN_MODE}.toml` (optional, RUN_MODE defaults to
    ///   `development`)
    /// - environment variables with the upper-cased service name as prefix,
    ///   e.g. `BOOKING__SERVER__PORT=8080`
    pub fn load(service: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", service)))
            .add_source(
                config::File::with_name(&format!("config/{}.{}", service, run_mode))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(&service.to_uppercase()).separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }
}
