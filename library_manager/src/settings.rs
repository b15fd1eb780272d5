use anyhow::Context;
use serde::Deserialize;

const CONFIG_FILE: &str = "library_manager";
const ENV_PREFIX: &str = "LIBRARY_MANAGER";

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Client settings, layered from defaults, an optional `library_manager.toml`
/// and `LIBRARY_MANAGER_*` environment variables
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base url of the books API, without the `/books` path
    pub api_url: String,
    /// Filter used when `RUST_LOG` is not set
    pub log_level: String,
    pub jaeger_enabled: bool,
}

impl ClientSettings {
    pub fn load() -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("log_level", "warn")?
            .set_default("jaeger_enabled", false)?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to build client configuration")?
            .try_deserialize()
            .context("Failed to deserialize client configuration")
    }
}
