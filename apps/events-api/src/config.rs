use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the core libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    /// Cron schedule for the status sweeper (6-field, seconds first)
    pub sweep_cron: String,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        // Default: once a minute
        let sweep_cron = env_or_default("EVENT_SWEEP_CRON", "0 * * * * *");

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            sweep_cron,
            environment,
        })
    }
}
