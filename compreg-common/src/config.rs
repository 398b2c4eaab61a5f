//! Pipeline configuration loading
//!
//! Configuration file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `COMPREG_CONFIG` environment variable
//! 3. User config file (`~/.config/compreg/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file never terminates startup: the resolver logs a warning
//! and continues with compiled defaults. An explicitly named file that does not
//! exist is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "COMPREG_CONFIG";
/// Environment override for the shared CMS store URL
pub const SHARED_DATABASE_URL_ENV_VAR: &str = "COMPREG_SHARED_DATABASE_URL";
/// Environment override for the output root folder
pub const OUTPUT_ROOT_ENV_VAR: &str = "COMPREG_OUTPUT_ROOT";

/// Upper bound on connections per isolated tenant pool
pub const MAX_ISOLATED_CONNECTIONS: u32 = 5;

/// Default anchor: an exported object literal opening on its own line,
/// e.g. `export const generatedComponents = {`
pub const DEFAULT_ANCHOR_PATTERN: &str =
    r"^\s*export\s+(?:default\s+)?(?:const|let|var)\s+[A-Za-z_$][\w$]*(?:\s*:\s*[^=]+)?\s*=\s*\{\s*$";

/// Complete pipeline configuration (TOML file layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub isolated_pool: IsolatedPoolConfig,
    pub paths: OutputPaths,
    pub patcher: PatcherConfig,
    pub logging: LoggingConfig,
}

/// Shared CMS store settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL of the shared CMS store
    pub shared_url: String,
    /// Create the tenant/layout tables when missing (development stores only)
    pub create_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            shared_url: "sqlite://cms.db?mode=ro".to_string(),
            create_schema: false,
        }
    }
}

/// Connection limits for short-lived isolated tenant pools
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IsolatedPoolConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for IsolatedPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: MAX_ISOLATED_CONNECTIONS,
            connect_timeout_secs: 10,
            idle_timeout_secs: 30,
        }
    }
}

/// Output locations; relative paths resolve against `root`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub registry_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub index_file: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            registry_dir: PathBuf::from("registry/components"),
            artifact_dir: PathBuf::from("src/components/generated"),
            index_file: PathBuf::from("src/components/generated/index.ts"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl OutputPaths {
    /// All paths rooted at `root`, everything else at its default
    pub fn under(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.resolve(&self.registry_dir)
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.resolve(&self.artifact_dir)
    }

    pub fn index_file(&self) -> PathBuf {
        self.resolve(&self.index_file)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.resolve(&self.reports_dir)
    }
}

/// Generated registry index patching settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatcherConfig {
    /// Module path prefix for new import statements
    pub import_prefix: String,
    /// Regex matching the structural anchor line
    pub anchor_pattern: String,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            import_prefix: "./".to_string(),
            anchor_pattern: DEFAULT_ANCHOR_PATTERN.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply `COMPREG_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(SHARED_DATABASE_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                info!("Shared database URL overridden from {}", SHARED_DATABASE_URL_ENV_VAR);
                self.database.shared_url = url;
            }
        }
        if let Ok(root) = std::env::var(OUTPUT_ROOT_ENV_VAR) {
            if !root.trim().is_empty() {
                info!("Output root overridden from {}", OUTPUT_ROOT_ENV_VAR);
                self.paths.root = PathBuf::from(root);
            }
        }
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        let pool = &self.isolated_pool;
        if pool.max_connections == 0 || pool.max_connections > MAX_ISOLATED_CONNECTIONS {
            return Err(Error::Config(format!(
                "isolated_pool.max_connections must be between 1 and {} (got {})",
                MAX_ISOLATED_CONNECTIONS, pool.max_connections
            )));
        }
        if pool.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "isolated_pool.connect_timeout_secs must be positive".to_string(),
            ));
        }
        if self.database.shared_url.trim().is_empty() {
            return Err(Error::Config("database.shared_url is empty".to_string()));
        }
        if self.patcher.anchor_pattern.trim().is_empty() {
            return Err(Error::Config("patcher.anchor_pattern is empty".to_string()));
        }
        Ok(())
    }
}

/// Locates and loads the pipeline configuration
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Config file path by priority, or None when only defaults apply
    ///
    /// The boolean is true when the path was named explicitly (CLI or ENV).
    pub fn config_path(&self) -> Option<(PathBuf, bool)> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some((path.clone(), true));
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some((PathBuf::from(path), true));
            }
        }

        // Priority 3: User config file
        dirs::config_dir()
            .map(|d| d.join("compreg").join("config.toml"))
            .map(|p| (p, false))
    }

    /// Load configuration, then apply ENV overrides and validate
    pub fn load(&self) -> Result<PipelineConfig> {
        let mut config = match self.config_path() {
            Some((path, _)) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                PipelineConfig::from_file(&path)?
            }
            Some((path, true)) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some((path, false)) => {
                warn!(
                    "No config file at {}; using compiled defaults",
                    path.display()
                );
                PipelineConfig::default()
            }
            None => {
                warn!("Could not determine config directory; using compiled defaults");
                PipelineConfig::default()
            }
        };

        // Priority 4 (implicit): serde defaults fill any missing keys
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
