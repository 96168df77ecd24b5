use super::BdkConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the per-user configuration directory under `$HOME`.
const SYMPHONY_DIR: &str = ".symphony";

/// Loads a [`BdkConfig`] from files or strings.
///
/// Every loader applies the `BDK_*` environment overrides after parsing
/// (see [`BdkConfig::apply_env`]).
pub struct BdkConfigLoader;

impl BdkConfigLoader {
    /// Load the configuration from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if its content is neither valid JSON nor YAML.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<BdkConfig> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading BDK configuration");
        let content = std::fs::read_to_string(path)?;
        Self::load_from_content(&content)
    }

    /// Parse the configuration from a string. JSON is tried first, then YAML.
    pub fn load_from_content(content: &str) -> Result<BdkConfig> {
        let config = match serde_json::from_str::<BdkConfig>(content) {
            Ok(config) => config,
            Err(_) => serde_yaml::from_str::<BdkConfig>(content)
                .map_err(|e| Error::Config(format!("invalid configuration: {e}")))?,
        };
        config.apply_env()
    }

    /// Load a file relative to `$HOME/.symphony`.
    pub fn load_from_symphony_dir(relative_path: impl AsRef<Path>) -> Result<BdkConfig> {
        Self::load_from_file(Self::symphony_dir()?.join(relative_path))
    }

    fn symphony_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(SYMPHONY_DIR))
            .ok_or_else(|| Error::Config("cannot determine the home directory".to_string()))
    }
}
