use std::path::PathBuf;

use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config
/// components. Missing required values (`PORT`, `MONGODB_URL`,
/// `MONGODB_DATABASE`) abort startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Append-only diagnostic log; an unopenable path disables the
    /// file layer instead of failing startup.
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let log_file = PathBuf::from(env_or_default("LOG_FILE", "logs/blog-api.log"));

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            log_file,
        })
    }
}
