use anyhow::Context;
use serde::Deserialize;

const CONFIG_FILE: &str = "library_manager_backend";
const ENV_PREFIX: &str = "LIBRARY_MANAGER_BACKEND";

/// Backend settings, layered from defaults, an optional `library_manager_backend.toml`
/// and `LIBRARY_MANAGER_BACKEND_*` environment variables
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BackendSettings {
    pub host: String,
    pub port: u16,
    /// Filter used when `RUST_LOG` is not set
    pub log_level: String,
    pub jaeger_enabled: bool,
}

impl BackendSettings {
    pub fn load() -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001_i64)?
            .set_default("log_level", "info")?
            .set_default("jaeger_enabled", false)?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to build backend configuration")?
            .try_deserialize()
            .context("Failed to deserialize backend configuration")
    }
}
