// ⚙️ Settings - CLI configuration
//
// Lookup order: JSON file named by CASHBOOK_CONFIG (must exist when set),
// otherwise defaults; CASHBOOK_CATALOG then overrides the catalog path.

use crate::catalog::Catalog;
use crate::range::DEFAULT_LOOKBACK_DAYS;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CASHBOOK_CONFIG";
pub const CATALOG_ENV: &str = "CASHBOOK_CATALOG";
pub const DEFAULT_LOG_FILTER: &str = "cashbook=info";

/// Longest accepted default range, roughly a century
pub const MAX_LOOKBACK_DAYS: i64 = 36_600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON catalog replacing the built-in lists
    pub catalog_path: Option<PathBuf>,

    /// Width of the default date range, in days
    pub lookback_days: i64,

    /// tracing filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_path: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from the environment
    pub fn load() -> Result<Self> {
        let config = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let catalog = env::var_os(CATALOG_ENV).map(PathBuf::from);
        Self::resolve(config.as_deref(), catalog)
    }

    /// Config file (must exist when given) or defaults, then the catalog override
    pub fn resolve(config: Option<&Path>, catalog: Option<PathBuf>) -> Result<Self> {
        let mut settings = match config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if catalog.is_some() {
            settings.catalog_path = catalog;
        }

        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if !(0..=MAX_LOOKBACK_DAYS).contains(&settings.lookback_days) {
            bail!(
                "lookback_days must be between 0 and {}, got {}",
                MAX_LOOKBACK_DAYS,
                settings.lookback_days
            );
        }

        Ok(settings)
    }

    /// Catalog from `catalog_path`, or the built-in one
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::from_file(path),
            None => Ok(Catalog::with_defaults()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.lookback_days, 30);
        assert_eq!(settings.log_filter, "cashbook=info");
        assert_eq!(settings.catalog().unwrap(), Catalog::with_defaults());
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "lookback_days": 7 }"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.lookback_days, 7);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert!(settings.catalog_path.is_none());
    }

    #[test]
    fn test_from_file_rejects_negative_lookback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "lookback_days": -1 }"#).unwrap();

        assert!(Settings::from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_file_rejects_huge_lookback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "lookback_days": 100000000 }"#).unwrap();

        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("lookback_days"));
    }

    #[test]
    fn test_resolve_defaults_without_env() {
        assert_eq!(Settings::resolve(None, None).unwrap(), Settings::default());
    }

    #[test]
    fn test_resolve_missing_config_file_is_an_error() {
        let err = Settings::resolve(Some(Path::new("/no/such/cashbook.json")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_resolve_catalog_override_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "catalog_path": "/from/file.json", "lookback_days": 14 }"#)
            .unwrap();

        let from_file = Settings::resolve(Some(file.path()), None).unwrap();
        assert_eq!(from_file.catalog_path, Some(PathBuf::from("/from/file.json")));

        let overridden =
            Settings::resolve(Some(file.path()), Some(PathBuf::from("/from/env.json"))).unwrap();
        assert_eq!(overridden.catalog_path, Some(PathBuf::from("/from/env.json")));
        assert_eq!(overridden.lookback_days, 14);
    }

    #[test]
    fn test_missing_catalog_file_is_an_error() {
        let settings = Settings {
            catalog_path: Some(PathBuf::from("/no/such/catalog.json")),
            ..Settings::default()
        };
        assert!(settings.catalog().is_err());
    }
}
