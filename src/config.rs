// File: ./src/config.rs
// `config.toml`: every key optional, serde defaults for the rest.
use crate::cache::local_key;
use crate::context::AppContext;
use crate::error::ParseError;
use crate::model::parser::Zone;
use crate::storage::FileStore;
use anyhow::{Context, Error, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_namespace() -> String {
    "deadlines.local".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Deployment namespace; prefixes every key-value store key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Remote deadline store endpoint. Empty means offline.
    #[serde(default)]
    pub remote_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub allow_insecure_certs: bool,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Zone for naive user-submitted datetimes. Unset means the machine's.
    #[serde(default)]
    pub user_timezone: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            remote_url: String::new(),
            api_token: None,
            allow_insecure_certs: false,
            fetch_timeout_secs: default_fetch_timeout(),
            user_timezone: None,
            catalog_path: None,
            log_level: default_log_level(),
        }
    }
}

const MISSING_CONFIG: &str = "Config file not found";

impl Config {
    /// Reads `config.toml` from the context's config directory.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        if !path.exists() {
            bail!("{} at {}", MISSING_CONFIG, path.display());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Like `load`, but a missing file yields the defaults. Any other
    /// failure (unreadable, invalid TOML) is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Err(e) if Self::is_missing_config_error(&e) => {
                log::info!("No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// True when `err` means there was no file to read.
    pub fn is_missing_config_error(err: &Error) -> bool {
        err.to_string().starts_with(MISSING_CONFIG)
            || err.chain().any(|cause| {
                cause
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
            })
    }

    /// Writes the file under its lock, replacing it atomically.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        let body = toml::to_string_pretty(self)?;
        FileStore::with_lock(&path, || FileStore::atomic_write(&path, &body))?;
        Ok(())
    }

    pub fn is_offline(&self) -> bool {
        self.remote_url.trim().is_empty()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Zone used to read naive user datetimes.
    pub fn user_zone(&self) -> Result<Zone, ParseError> {
        match self.user_timezone.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.parse(),
            _ => Ok(Zone::Local),
        }
    }

    pub fn catalog_path(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        match &self.catalog_path {
            Some(path) => Ok(path.clone()),
            None => ctx.get_catalog_path(),
        }
    }

    /// Key of the persisted tag selection.
    pub fn selection_key(&self) -> &str {
        &self.namespace
    }

    /// Key of the local deadline list.
    pub fn local_deadlines_key(&self) -> String {
        local_key(&self.namespace)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_missing_file_yields_defaults() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_uses_serde_defaults() {
        let ctx = TestContext::new();
        fs::write(
            ctx.get_config_file_path().unwrap(),
            "remote_url = \"https://example.com/api/deadlines\"\nuser_timezone = \"Europe/Paris\"\n",
        )
        .unwrap();
        let config = Config::load(&ctx).unwrap();
        assert_eq!(config.namespace, "deadlines.local");
        assert_eq!(config.fetch_timeout_secs, 10);
        assert!(!config.is_offline());
        assert!(matches!(config.user_zone(), Ok(Zone::Named(_))));
        assert_eq!(config.local_deadlines_key(), "deadlines.local:custom_deadlines");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let ctx = TestContext::new();
        fs::write(ctx.get_config_file_path().unwrap(), "namespace = [").unwrap();
        let err = Config::load_or_default(&ctx).unwrap_err();
        assert!(!Config::is_missing_config_error(&err));
    }

    #[test]
    fn test_save_roundtrip() {
        let ctx = TestContext::new();
        let config = Config {
            namespace: "aideadlin.es".to_string(),
            api_token: Some("secret".to_string()),
            log_level: "debug".to_string(),
            ..Config::default()
        };
        config.save(&ctx).unwrap();
        let loaded = Config::load(&ctx).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_default_user_zone_is_local() {
        assert_eq!(Config::default().user_zone(), Ok(Zone::Local));
        let config = Config {
            user_timezone: Some("Mars/Base".to_string()),
            ..Config::default()
        };
        assert!(config.user_zone().is_err());
    }
}
