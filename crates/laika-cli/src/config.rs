//! Optional `laika.toml` project config (§B.3): default input/output
//! format and the `autosectionnumbering` toggle, loaded the same way
//! `markdown-neuraxis-config::Config::load_from_path` does — read to
//! string, `toml::from_str`, wrap both failure modes in a `thiserror` enum.
//! Distinct from the L5 `ConfigValue` model the documents themselves carry.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub autosectionnumbering: Option<bool>,
}

impl CliConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        let config: CliConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path("laika.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_config_file_returns_none() {
        assert!(CliConfig::load_from_path("/nonexistent/laika.toml").unwrap().is_none());
    }

    #[test]
    fn loads_a_well_formed_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "output_format = \"html\"\nautosectionnumbering = true").unwrap();
        let config = CliConfig::load_from_path(file.path()).unwrap().unwrap();
        assert_eq!(config.output_format.as_deref(), Some("html"));
        assert_eq!(config.autosectionnumbering, Some(true));
    }

    #[test]
    fn malformed_config_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();
        let err = CliConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
