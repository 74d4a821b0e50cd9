//! Tool settings
//!
//! Settings for the `rlconf` tool itself (not the experiment documents):
//! where to look for experiment files, whether validation is strict, how
//! to log. Loaded from an optional `rlconf.toml` with `RLCONF_`-prefixed
//! environment variable overrides.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory scanned for experiment documents
    #[serde(default = "default_experiments_dir")]
    pub experiments_dir: String,
    /// Treat unknown selector names as errors
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_experiments_dir() -> String {
    "configs".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            experiments_dir: default_experiments_dir(),
            strict: false,
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the current directory and environment
    pub fn load() -> Result<Self> {
        Self::load_from(".")
    }

    /// Load settings from a specific directory
    pub fn load_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let builder = Config::builder()
            .set_default("experiments_dir", "configs")?
            .set_default("strict", false)?
            .set_default("logging.level", "info")?
            .add_source(File::from(dir.join("rlconf.toml")).required(false))
            .add_source(
                Environment::with_prefix("RLCONF")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(dir.path()).unwrap();
        assert_eq!(settings.experiments_dir, "configs");
        assert!(!settings.strict);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rlconf.toml"),
            "experiments_dir = \"experiments\"\nstrict = true\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let settings = Settings::load_from(dir.path()).unwrap();
        assert_eq!(settings.experiments_dir, "experiments");
        assert!(settings.strict);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rlconf.toml"), "strict = maybe\n").unwrap();
        let err = Settings::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, crate::error::RlconfError::Config(_)));
    }
}
