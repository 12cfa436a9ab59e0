use clap::Parser;

use crate::config::{AppConfig, Environment};

#[derive(Debug, Parser)]
#[command(name = "apple-api")]
#[command(about = "Products and stores catalogue API")]
#[command(version)]
pub struct Args {
    #[arg(long, help = "API server port (overrides API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Environment preset: development|staging|production")]
    pub env: Option<String>,

    #[arg(long = "db-dsn", help = "PostgreSQL DSN (overrides DATABASE_URL)")]
    pub db_dsn: Option<String>,

    #[arg(long, help = "Serve from in-memory repositories loaded with sample data")]
    pub in_memory: bool,

    #[arg(long, help = "Insert the sample products into the database at startup")]
    pub seed: bool,
}

impl Args {
    /// Build the effective configuration: environment preset, then
    /// environment variables, then these flags.
    pub fn load_config(&self) -> AppConfig {
        let mut config = match self.env.as_deref() {
            Some(env) => AppConfig::for_environment(Environment::parse(env)).with_env_overrides(),
            None => AppConfig::from_env(),
        };
        self.apply(&mut config);
        config
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dsn) = &self.db_dsn {
            config.database.url = dsn.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from(["apple-api", "--port", "5050", "--db-dsn", "postgres://u:p@db/x", "--in-memory"]);
        let mut config = AppConfig::for_environment(Environment::Development);
        args.apply(&mut config);

        assert!(args.in_memory);
        assert!(!args.seed);
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.database.url, "postgres://u:p@db/x");
    }

    #[test]
    fn env_flag_selects_preset() {
        let config = Args::parse_from(["apple-api", "--env", "production"]).load_config();
        assert_eq!(config.environment, Environment::Production);
    }
}
