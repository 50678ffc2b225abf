//! Configuration management for the plazas CLI
//!
//! Layers, lowest precedence first: built-in defaults, `plazas.toml` (or the
//! file given with `--config`), `PLAZAS_*` environment variables (a `.env`
//! file is loaded into the environment by `main`), command-line flags.

use crate::error::{CliError, Result};
use plazas_core::default_store_path;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Source CSV used when none is configured.
pub const DEFAULT_SOURCE: &str = "plazas_orden_ultimo_ano.csv";

/// Rows per page when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "plazas.toml";

pub const ENV_SOURCE: &str = "PLAZAS_SOURCE";
pub const ENV_STORE: &str = "PLAZAS_STORE";
pub const ENV_PAGE_SIZE: &str = "PLAZAS_PAGE_SIZE";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Source CSV path
    pub source_path: PathBuf,

    /// Store path; `None` means `plazas.db` next to the source
    pub store_path: Option<PathBuf>,

    /// Rows per page for `plazas query`
    pub page_size: u32,
}

/// Shape of `plazas.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    source: Option<PathBuf>,
    store: Option<PathBuf>,
    page_size: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE),
            store_path: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Defaults, then the config file, then the process environment.
    ///
    /// An explicit `config_file` must exist; the implicit `plazas.toml` is
    /// only read when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::config(format!(
                        "config file '{}' does not exist",
                        path.display()
                    )));
                }
                config.merge_file(path)?;
            }
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    config.merge_file(implicit)?;
                }
            }
        }

        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply the keys present in a TOML file.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.merge_toml(&text)?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(())
    }

    fn merge_toml(&mut self, text: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(text)?;
        if let Some(source) = file.source {
            self.source_path = source;
        }
        if let Some(store) = file.store {
            self.store_path = Some(store);
        }
        if let Some(page_size) = file.page_size {
            self.page_size = page_size;
        }
        Ok(())
    }

    /// Apply `PLAZAS_SOURCE`, `PLAZAS_STORE` and `PLAZAS_PAGE_SIZE` as
    /// returned by `lookup`. Empty values are ignored.
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(source) = get(ENV_SOURCE) {
            self.source_path = PathBuf::from(source);
        }
        if let Some(store) = get(ENV_STORE) {
            self.store_path = Some(PathBuf::from(store));
        }
        if let Some(page_size) = get(ENV_PAGE_SIZE) {
            self.page_size = page_size.trim().parse().map_err(|_| {
                CliError::config(format!(
                    "{ENV_PAGE_SIZE} must be a positive integer, got '{page_size}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Apply command-line flags.
    pub fn with_overrides(
        mut self,
        source: Option<PathBuf>,
        store: Option<PathBuf>,
        page_size: Option<u32>,
    ) -> Self {
        if let Some(source) = source {
            self.source_path = source;
        }
        if let Some(store) = store {
            self.store_path = Some(store);
        }
        if let Some(page_size) = page_size {
            self.page_size = page_size;
        }
        self
    }

    /// Reject configurations no command can run with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CliError::config("page_size must be at least 1"));
        }
        let store = self.store_path();
        if store.is_dir() {
            return Err(CliError::config(format!(
                "store path '{}' is a directory",
                store.display()
            )));
        }
        Ok(())
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Effective store path
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| default_store_path(&self.source_path))
    }

    pub fn page_size(&self) -> Result<NonZeroU32> {
        NonZeroU32::new(self.page_size)
            .ok_or_else(|| CliError::config("page_size must be at least 1"))
    }
}
