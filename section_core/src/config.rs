//! # Catalogue Configuration
//!
//! Where the data lives and how lookups behave. Values are resolved in
//! three layers, later wins:
//!
//! 1. [`CatalogueConfig::default`] (bundled `data/` directory, JSON backend)
//! 2. An optional TOML file
//! 3. Environment: `SECTION_DATA_ROOT`, `SECTION_BACKEND`, `SECTION_REGION`
//!
//! ```toml
//! data_root = "data"          # relative paths resolve against the file
//! backend = "json"            # or "sqlite"
//! default_region = "UK"
//! preload = ["UK"]
//! suggestion_limit = 5
//! suggestion_cutoff = 0.6
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::database::SuggestionPolicy;
use crate::errors::{CatalogueError, CatalogueResult};
use crate::region::Region;

pub const ENV_DATA_ROOT: &str = "SECTION_DATA_ROOT";
pub const ENV_BACKEND: &str = "SECTION_BACKEND";
pub const ENV_REGION: &str = "SECTION_REGION";

/// Storage format of the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `<data_root>/<REGION>/<TAG>.json`
    Json,
    /// `<data_root>/<REGION>_sections.sqlite3` (feature `sqlite`)
    Sqlite,
}

impl FromStr for Backend {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(CatalogueError::config(format!(
                "unknown backend '{}' (expected json or sqlite)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Json => write!(f, "json"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Catalogue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogueConfig {
    pub data_root: PathBuf,
    pub backend: Backend,
    /// Region used when a caller does not name one
    pub default_region: Region,
    /// Regions loaded eagerly when the catalogue opens
    pub preload: Vec<Region>,
    /// Suggestions on a typed miss (cross-type misses get at most 3)
    pub suggestion_limit: usize,
    pub suggestion_cutoff: f64,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        CatalogueConfig {
            data_root: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            backend: Backend::Json,
            default_region: Region::UK,
            preload: Vec::new(),
            suggestion_limit: 5,
            suggestion_cutoff: 0.6,
        }
    }
}

impl CatalogueConfig {
    /// Defaults with a different data root
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        CatalogueConfig {
            data_root: data_root.into(),
            ..Self::default()
        }
    }

    /// Parse TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> CatalogueResult<Self> {
        toml::from_str(contents).map_err(|e| CatalogueError::config(format!("invalid config: {}", e)))
    }

    /// Read a TOML file. A relative `data_root` is taken relative to the
    /// file's directory.
    pub fn from_file(path: &Path) -> CatalogueResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CatalogueError::file_error("read config", path.display().to_string(), e.to_string()))?;
        let mut config = Self::from_toml_str(&contents)?;
        if config.data_root.is_relative() {
            if let Some(dir) = path.parent() {
                config.data_root = dir.join(&config.data_root);
            }
        }
        Ok(config)
    }

    /// Defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> CatalogueResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        tracing::debug!(
            data_root = %config.data_root.display(),
            backend = %config.backend,
            default_region = %config.default_region,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Apply `SECTION_*` overrides looked up through `lookup`
    pub fn apply_overrides<F>(mut self, lookup: F) -> CatalogueResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_DATA_ROOT).filter(|v| !v.is_empty()) {
            self.data_root = PathBuf::from(root);
        }
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.is_empty()) {
            self.backend = backend.parse()?;
        }
        if let Some(region) = lookup(ENV_REGION).filter(|v| !v.is_empty()) {
            self.default_region = region
                .parse()
                .map_err(|e: CatalogueError| CatalogueError::config(format!("{}: {}", ENV_REGION, e)))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> CatalogueResult<()> {
        if self.data_root.as_os_str().is_empty() {
            return Err(CatalogueError::config("data_root must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.suggestion_cutoff) {
            return Err(CatalogueError::config(format!(
                "suggestion_cutoff must be between 0 and 1, got {}",
                self.suggestion_cutoff
            )));
        }
        if cfg!(not(feature = "sqlite")) && self.backend == Backend::Sqlite {
            return Err(CatalogueError::config(
                "sqlite backend requested but section_core was built without the `sqlite` feature",
            ));
        }
        Ok(())
    }

    pub fn suggestion_policy(&self) -> SuggestionPolicy {
        let defaults = SuggestionPolicy::default();
        SuggestionPolicy {
            limit: self.suggestion_limit,
            cross_type_limit: self.suggestion_limit.min(defaults.cross_type_limit),
            cutoff: self.suggestion_cutoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_point_at_bundled_data() {
        let config = CatalogueConfig::default();
        assert!(config.data_root.ends_with("data"));
        assert_eq!(config.backend, Backend::Json);
        assert_eq!(config.suggestion_policy(), SuggestionPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CatalogueConfig::from_toml_str("default_region = \"US\"\npreload = [\"US\", \"EU\"]").unwrap();
        assert_eq!(config.default_region, Region::US);
        assert_eq!(config.preload, vec![Region::US, Region::EU]);
        assert_eq!(config.suggestion_limit, 5);
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = CatalogueConfig::from_toml_str("data_rot = \"x\"").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_relative_data_root_resolves_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.toml");
        std::fs::write(&path, "data_root = \"tables\"\n").unwrap();
        let config = CatalogueConfig::from_file(&path).unwrap();
        assert_eq!(config.data_root, dir.path().join("tables"));
    }

    #[test]
    fn test_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_ROOT, "/srv/sections"),
            (ENV_BACKEND, "JSON"),
            (ENV_REGION, "eu"),
        ]
        .into_iter()
        .collect();
        let config = CatalogueConfig::default()
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/sections"));
        assert_eq!(config.default_region, Region::EU);
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let err = CatalogueConfig::default()
            .apply_overrides(|key| (key == ENV_REGION).then(|| "MARS".to_string()))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("MARS"));

        let err = CatalogueConfig::default()
            .apply_overrides(|key| (key == ENV_BACKEND).then(|| "csv".to_string()))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_cutoff_out_of_range() {
        let config = CatalogueConfig {
            suggestion_cutoff: 1.5,
            ..CatalogueConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
