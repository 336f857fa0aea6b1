use derive_more::Display;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum ConfigError {
    #[display(fmt = "env {} is required when NOTES_STORAGE=postgres", _0)]
    Missing(&'static str),
    #[display(fmt = "env {} has an invalid value: {:?}", _0, _1)]
    Invalid(&'static str, String),
}

impl std::error::Error for ConfigError {}

/// Server settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub pool_size: u32,
    pub rate_limit_replenish_ms: u64,
    pub rate_limit_burst: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        fn parsed<T: FromStr>(
            lookup: &impl Fn(&'static str) -> Option<String>,
            key: &'static str,
            default: T,
        ) -> Result<T, ConfigError> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<T>()
                    .map_err(|_| ConfigError::Invalid(key, raw)),
                None => Ok(default),
            }
        }

        let storage = match lookup("NOTES_STORAGE").as_deref().map(str::trim) {
            None | Some("postgres") => StorageKind::Postgres,
            Some("memory") => StorageKind::Memory,
            Some(other) => return Err(ConfigError::Invalid("NOTES_STORAGE", other.to_owned())),
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let pool_size = parsed(&lookup, "DATABASE_POOL_SIZE", 10)?;
        let rate_limit_replenish_ms = parsed(&lookup, "RATE_LIMIT_REPLENISH_MS", 500)?;
        let rate_limit_burst = parsed(&lookup, "RATE_LIMIT_BURST", 120)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid("DATABASE_POOL_SIZE", "0".to_owned()));
        }
        if rate_limit_replenish_ms == 0 || rate_limit_burst == 0 {
            return Err(ConfigError::Invalid(
                "RATE_LIMIT_*",
                format!("{rate_limit_replenish_ms}ms/{rate_limit_burst}"),
            ));
        }

        Ok(AppConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parsed(&lookup, "PORT", 3000)?,
            storage,
            database_url,
            pool_size,
            rate_limit_replenish_ms,
            rate_limit_burst,
        })
    }
}
