use crate::external::DEFAULT_COPY_BUFFER_SIZE;
use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for ghost-patch
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GhostPatchConfig {
    /// How git is invoked
    pub git: GitConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GitConfig {
    /// Program name or path of the git binary
    pub program: String,
    /// Size in bytes of the buffer used to stream git output into artifacts
    pub copy_buffer_size: usize,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter; RUST_LOG takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GhostPatchConfig {
    /// Load configuration from the current directory. See [`Self::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files in `dir` (ghost-patch.toml, .ghost-patch-rc)
    /// 3. Environment variables (prefixed with GHOST_PATCH_, `__` between sections)
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_file = dir.join("ghost-patch.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::from(toml_file));
        }

        let rc_file = dir.join(".ghost-patch-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::from(rc_file).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("GHOST_PATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: GhostPatchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.git.program.trim().is_empty() {
            bail!("git.program must not be empty");
        }
        if self.git.copy_buffer_size == 0 {
            bail!("git.copy_buffer_size must be greater than zero");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists, returning its path when one was read.
    ///
    /// Runs before logging is set up, so reporting is left to the caller.
    pub fn load_env_file() -> Result<Option<PathBuf>> {
        Self::load_env_file_from(Path::new("."))
    }

    pub fn load_env_file_from(dir: &Path) -> Result<Option<PathBuf>> {
        let env_file = dir.join(".env");
        if !env_file.exists() {
            return Ok(None);
        }
        dotenvy::from_path(&env_file)?;
        Ok(Some(env_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GhostPatchConfig::default();
        assert_eq!(config.git.program, "git");
        assert_eq!(config.git.copy_buffer_size, 8192);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("ghost-patch.toml"),
            "[git]\ncopy_buffer_size = 4096\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let config = GhostPatchConfig::load_from(tmp.path()).unwrap();

        assert_eq!(config.git.copy_buffer_size, 4096);
        assert_eq!(config.git.program, "git");
        assert!(config.logging.json);
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("ghost-patch.toml"), "[git]\ncopy_buffer_size = 0\n").unwrap();

        assert!(GhostPatchConfig::load_from(tmp.path()).is_err());
    }

    #[test]
    fn test_save_round_trips_through_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = GhostPatchConfig::default();
        config.git.program = "/usr/local/bin/git".to_string();
        config.logging.level = "debug".to_string();

        config.save_to_file(tmp.path().join("ghost-patch.toml")).unwrap();
        let loaded = GhostPatchConfig::load_from(tmp.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_file_from_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(GhostPatchConfig::load_env_file_from(tmp.path()).unwrap().is_none());

        std::fs::write(tmp.path().join(".env"), "GP_DOTENV_TEST_MARKER=loaded\n").unwrap();
        let loaded = GhostPatchConfig::load_env_file_from(tmp.path()).unwrap();

        assert_eq!(loaded, Some(tmp.path().join(".env")));
        assert_eq!(std::env::var("GP_DOTENV_TEST_MARKER").unwrap(), "loaded");
    }
}
