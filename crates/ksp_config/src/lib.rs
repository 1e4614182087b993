//! Configuration models and loaders for the KSP transfer window calculator.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default catalog shipped with the workspace.
pub const DEFAULT_CATALOG_PATH: &str = "data/orbitals.csv";

/// Top-level application configuration. Every section is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub solver: SolverConfig,
    pub catalog: CatalogConfig,
}

/// Tuning for the transfer window refinement.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Angular error (degrees) below which the refinement stops.
    pub tolerance_deg: f64,
    /// Hard cap on refinement passes.
    pub max_iterations: u32,
    pub anomaly: AnomalyConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: 0.25,
            max_iterations: 10,
            anomaly: AnomalyConfig::Series,
        }
    }
}

/// True anomaly strategy as spelled in configuration files.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyConfig {
    #[default]
    Series,
    Iterative,
}

/// Where the body catalog lives and how strictly to read it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub path: PathBuf,
    /// Skip malformed rows instead of failing the whole load.
    pub skip_invalid: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
            skip_invalid: true,
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Reject values the solver cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tol = self.solver.tolerance_deg;
        if !(tol.is_finite() && tol > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "solver.tolerance_deg must be positive, got {tol}"
            )));
        }
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "solver.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.catalog.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("catalog.path is empty".to_string()));
        }
        Ok(())
    }
}

/// Load and validate configuration from a TOML or YAML file (chosen by extension).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration when a path is given, otherwise fall back to defaults.
pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    }
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_reference_solver() {
        let config = AppConfig::default();
        assert_eq!(config.solver.tolerance_deg, 0.25);
        assert_eq!(config.solver.max_iterations, 10);
        assert_eq!(config.solver.anomaly, AnomalyConfig::Series);
        assert_eq!(config.catalog.path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_partial_toml() {
        let file = write_temp(
            ".toml",
            "[solver]\ntolerance_deg = 0.05\nanomaly = \"iterative\"\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.solver.tolerance_deg, 0.05);
        assert_eq!(config.solver.max_iterations, 10);
        assert_eq!(config.solver.anomaly, AnomalyConfig::Iterative);
        assert!(config.catalog.skip_invalid);
    }

    #[test]
    fn loads_yaml() {
        let file = write_temp(
            ".yaml",
            "catalog:\n  path: other.csv\n  skip_invalid: false\nsolver:\n  max_iterations: 25\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.catalog.path, PathBuf::from("other.csv"));
        assert!(!config.catalog.skip_invalid);
        assert_eq!(config.solver.max_iterations, 25);
    }

    #[test]
    fn rejects_invalid_values() {
        let file = write_temp(".toml", "[solver]\ntolerance_deg = 0.0\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));

        let file = write_temp(".toml", "[solver]\nmax_iterations = 0\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));

        let file = write_temp(".toml", "[solver]\ntolerence = 1.0\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_or_default(None::<&Path>).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(matches!(
            load_or_default(Some("does/not/exist.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
