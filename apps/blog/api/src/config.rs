use core_config::{
    AppInfo, ConfigError, FromEnv, api::ApiConfig, app_info, docs::DocsConfig,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use domain_users::HashingConfig;

pub use core_config::Environment;

/// Application configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub docs: DocsConfig,
    pub hashing: HashingConfig,
    /// `None` when `DATABASE_URL` is unset; accounts then live in memory
    pub database: Option<PostgresConfig>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=3000
        let api = ApiConfig::from_env()?; // API_PREFIX=/api
        let docs = DocsConfig::from_env()?;
        let hashing = HashingConfig::from_env()?; // HASH_COST=12

        let database = match PostgresConfig::from_env() {
            Ok(config) => Some(config),
            Err(ConfigError::MissingEnvVar(key)) if key == "DATABASE_URL" => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            api,
            docs,
            hashing,
            database,
        })
    }
}
