use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fmt::Display, fs, path::Path, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub pool_size: u32,
    pub enable_cors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "./data/mun-tracker.db".to_string(),
            pool_size: 8,
            enable_cors: true,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file if one is given, then `MUN_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        try_override(&lookup, "MUN_HOST", &mut self.host);
        try_override(&lookup, "MUN_PORT", &mut self.port);
        try_override(&lookup, "MUN_DATABASE", &mut self.database_path);
        try_override(&lookup, "MUN_POOL_SIZE", &mut self.pool_size);
        try_override(&lookup, "MUN_ENABLE_CORS", &mut self.enable_cors);
    }
}

fn try_override<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => {
            info!("{key} set from environment");
            *target = value;
        }
        Err(e) => {
            warn!("Invalid {key} value {raw:?}: {e}, keeping {target}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\ndatabase_path = \"/tmp/mun.db\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, "/tmp/mun.db");
        assert_eq!(config.host, Config::default().host);
        assert_eq!(config.pool_size, 8);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"eighty\"").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn environment_overrides_apply() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("MUN_HOST", "127.0.0.1"),
            ("MUN_PORT", "4000"),
            ("MUN_ENABLE_CORS", "false"),
        ]));

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4000);
        assert!(!config.enable_cors);
        assert_eq!(config.database_path, "./data/mun-tracker.db");
    }

    #[test]
    fn invalid_environment_values_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("MUN_PORT", "not-a-port"), ("MUN_POOL_SIZE", "-1")]));
        assert_eq!(config, Config::default());
    }
}
