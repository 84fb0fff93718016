use core_config::{FromEnv, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_campaigns::DispatchConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application configuration
///
/// Composes the shared config components from the `core_config`,
/// `database` and `domain_campaigns` libraries.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub dispatch: DispatchConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let database = PostgresConfig::from_env()?; // Required - fails if DATABASE_URL not set
        let dispatch = DispatchConfig::from_env()?;

        Ok(Self {
            environment,
            server,
            database,
            dispatch,
        })
    }
}
