use std::{env, fmt::Display, str::FromStr, sync::Arc};

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{
    constants::{DEFAULT_MAX_CONNECTIONS, LOGIN_PATH},
    error::{ConfigError, StoreError},
};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub login_path: String,
    pub session_secret: Arc<[u8]>,
    /// Apply change events to loaded recipe lists instead of only logging them.
    pub live_updates: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret: String = required(&lookup, "SESSION_SECRET")?;

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            max_connections: try_load(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                &DEFAULT_MAX_CONNECTIONS.to_string(),
            )?,
            login_path: try_load(&lookup, "LOGIN_PATH", LOGIN_PATH)?,
            session_secret: Arc::from(session_secret.into_bytes()),
            live_updates: try_load(&lookup, "LIVE_UPDATES", "false")?,
        })
    }

    pub async fn connect(&self) -> Result<Pool<Postgres>, StoreError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await
            .map_err(StoreError::from_read)
    }
}

fn parse<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value.trim().parse().map_err(|e| {
        log::warn!("Invalid {key} value: {e}");
        ConfigError::new(key, format!("{e}"))
    })
}

fn required<F, T>(lookup: &F, key: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => parse(key, value),
        None => {
            log::error!("Environment variable {key} not found");
            Err(ConfigError::new(key, "missing".to_string()))
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        log::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(key, value)
}
