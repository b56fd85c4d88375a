use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;

/// Where perimeters are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerritorySource {
    /// In-memory index loaded from a `superficies.json` file.
    File(PathBuf),
    /// The `territoires` table of this PostgreSQL database, optionally seeded
    /// from a `superficies.json` file at startup.
    Database { url: String, seed: Option<PathBuf> },
}

/// Invalid or missing configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("DATABASE_URL must be set when TERRITORY_SOURCE=database")]
    MissingDatabaseUrl,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Territory registry backing perimeter checks.
    pub territories: TerritorySource,
    /// Bound on a single territory lookup in milliseconds (default: `2000`).
    pub territory_lookup_timeout_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                  |
    /// |-------------------------------|--------------------------|
    /// | `HOST`                        | `0.0.0.0`                |
    /// | `PORT`                        | `3000`                   |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                     |
    /// | `TERRITORY_SOURCE`            | `file` (or `database`)   |
    /// | `TERRITORY_INDEX_PATH`        | `.db/superficies.json`   |
    /// | `DATABASE_URL`                | required for `database`  |
    /// | `TERRITORY_SEED_PATH`         | unset (`database` only)  |
    /// | `TERRITORY_LOOKUP_TIMEOUT_MS` | `2000`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port: u16 = parse("PORT", var("PORT", "3000"), "u16")?;

        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    expected: "header value",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs: u64 =
            parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"), "u64")?;

        let territories = match var("TERRITORY_SOURCE", "file").as_str() {
            "file" => TerritorySource::File(PathBuf::from(var(
                "TERRITORY_INDEX_PATH",
                ".db/superficies.json",
            ))),
            "database" => TerritorySource::Database {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?,
                seed: lookup("TERRITORY_SEED_PATH")
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "TERRITORY_SOURCE",
                    expected: "source (file or database)",
                    value: other.to_string(),
                })
            }
        };

        let territory_lookup_timeout_ms: u64 = parse(
            "TERRITORY_LOOKUP_TIMEOUT_MS",
            var("TERRITORY_LOOKUP_TIMEOUT_MS", "2000"),
            "u64",
        )?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            territories,
            territory_lookup_timeout_ms,
        })
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.territory_lookup_timeout_ms)
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        })
}
