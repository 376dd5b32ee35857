use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StrataConfig {
    pub server: ServerConfig,
    pub memory: MemoryConfig,
    pub store: StoreConfig,
    pub search: SearchConfig,
    pub projection: ProjectionConfig,
    pub reducer: ReducerConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

/// Where the agent keeps its tiered memory files. The hub document lives one
/// level above this directory.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    pub memory_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProjectionConfig {
    pub max_chunks: usize,
}

/// Optional out-of-process reducer, tried before the in-process PCA.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReducerConfig {
    pub enabled: bool,
    pub runtime: String,
    pub script: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deadline for a single unit of work. `0` disables the deadline.
    pub operation_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        let memory_dir = default_strata_dir()
            .join("workspace")
            .join("memory")
            .to_string_lossy()
            .into_owned();
        Self { memory_dir }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let db_path = default_strata_dir()
            .join("memory")
            .join("main.sqlite")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { max_chunks: 500 }
    }
}

impl Default for ReducerConfig {
    fn default() -> Self {
        let tools = default_strata_dir().join("tools");
        Self {
            enabled: true,
            runtime: tools
                .join("venv")
                .join("bin")
                .join("python3")
                .to_string_lossy()
                .into_owned(),
            script: tools
                .join("reduce_embeddings.py")
                .to_string_lossy()
                .into_owned(),
            timeout_secs: 15,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: 60,
        }
    }
}

/// Returns `~/.strata/`
pub fn default_strata_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".strata")
}

/// Returns the default config file path: `~/.strata/config.toml`
pub fn default_config_path() -> PathBuf {
    default_strata_dir().join("config.toml")
}

impl StrataConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            StrataConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Build a config rooted at explicit paths, with every other knob defaulted.
    pub fn for_paths(memory_dir: impl AsRef<Path>, db_path: impl AsRef<Path>) -> Self {
        let mut config = StrataConfig::default();
        config.memory.memory_dir = memory_dir.as_ref().to_string_lossy().into_owned();
        config.store.db_path = db_path.as_ref().to_string_lossy().into_owned();
        config
    }

    /// Apply environment variable overrides
    /// (STRATA_MEMORY_DIR, STRATA_DB, STRATA_LOG_LEVEL, STRATA_REDUCER).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STRATA_MEMORY_DIR") {
            self.memory.memory_dir = val;
        }
        if let Ok(val) = std::env::var("STRATA_DB") {
            self.store.db_path = val;
        }
        if let Ok(val) = std::env::var("STRATA_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("STRATA_REDUCER") {
            self.reducer.script = val;
        }
    }

    pub fn resolved_memory_dir(&self) -> PathBuf {
        expand_tilde(&self.memory.memory_dir)
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.store.db_path)
    }
}

impl ReducerConfig {
    pub fn resolved_runtime(&self) -> PathBuf {
        expand_tilde(&self.runtime)
    }

    pub fn resolved_script(&self) -> PathBuf {
        expand_tilde(&self.script)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
