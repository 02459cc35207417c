use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Vehicle record store API")]
pub struct Args {
    /// Host to bind to (overrides VEHICLE_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides VEHICLE_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides VEHICLE_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Connection pool size (overrides VEHICLE_STORE_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Apply the schema and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::merge(Args::parse(), |key| env::var(key))
    }

    /// Merge parsed CLI args over values read through `lookup`.
    pub fn merge(
        args: Args,
        lookup: impl Fn(&str) -> Result<String, env::VarError>,
    ) -> Result<(Self, bool)> {
        // --- Environment fallback ---
        let env_host = lookup("VEHICLE_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var(&lookup, "VEHICLE_STORE_PORT", 8000u16)?;
        let env_db = lookup("VEHICLE_STORE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/vehicles.db".into());
        let env_max_connections = parse_var(&lookup, "VEHICLE_STORE_MAX_CONNECTIONS", 5u32)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_connections),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Result<String, env::VarError>,
    key: &str,
    default: T,
) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Result<String, env::VarError> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_flags() {
        let (cfg, migrate) = AppConfig::merge(Args::default(), lookup_from(&[])).unwrap();
        assert_eq!(
            cfg,
            AppConfig {
                host: "0.0.0.0".into(),
                port: 8000,
                database_url: "sqlite://./data/vehicles.db".into(),
                max_connections: 5,
            }
        );
        assert!(!migrate);
        assert_eq!(cfg.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn flags_override_environment() {
        let env = lookup_from(&[
            ("VEHICLE_STORE_HOST", "10.0.0.1"),
            ("VEHICLE_STORE_PORT", "9000"),
            ("VEHICLE_STORE_DATABASE_URL", "sqlite://env.db"),
        ]);
        let args = Args {
            port: Some(9100),
            migrate: true,
            ..Args::default()
        };
        let (cfg, migrate) = AppConfig::merge(args, env).unwrap();
        assert_eq!(cfg.host, "10.0.0.1");
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.database_url, "sqlite://env.db");
        assert!(migrate);
    }

    #[test]
    fn malformed_port_names_the_variable() {
        let err = AppConfig::merge(
            Args::default(),
            lookup_from(&[("VEHICLE_STORE_PORT", "eighty")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("VEHICLE_STORE_PORT"));
    }

    #[test]
    fn cli_parses_flags() {
        let args = Args::parse_from(["vehicle-store", "--port", "8080", "--migrate"]);
        assert_eq!(args.port, Some(8080));
        assert!(args.migrate);
        assert!(args.host.is_none());
    }
}
