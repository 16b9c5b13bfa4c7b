use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is unspecified")]
    Missing(&'static str),
    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
}

/// Process configuration, read from the environment (and `.env`, if present).
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub session_ttl: Duration,
    pub purge_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT").ok_or(ConfigError::Missing("PORT"))?;
        let port = port.parse().map_err(|_| ConfigError::Invalid("PORT", port))?;
        let database_path = lookup("DATABASE_PATH").unwrap_or_else(|| "games.db".into());
        let session_ttl = Duration::from_secs(secs(&lookup, "SESSION_TTL_SECS", 3600)?);
        let purge_interval = Duration::from_secs(secs(&lookup, "PURGE_INTERVAL_SECS", 60)?);
        Ok(Self { port, database_path, session_ttl, purge_interval })
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid(key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_port_is_set() {
        let config = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, "games.db");
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.purge_interval, Duration::from_secs(60));
    }

    #[test]
    fn port_is_required_and_validated() {
        assert!(matches!(Config::from_lookup(lookup(&[])), Err(ConfigError::Missing("PORT"))));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "http")])),
            Err(ConfigError::Invalid("PORT", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "80"), ("SESSION_TTL_SECS", "-1")])),
            Err(ConfigError::Invalid("SESSION_TTL_SECS", _))
        ));
    }
}
