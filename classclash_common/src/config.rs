use crate::ClashError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "classclash.toml";

/// Default read buffer for content comparison (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default overlap ratio above which a colliding archive pair is treated as
/// the same artifact in different versions
pub const DEFAULT_SAME_ARTIFACT_THRESHOLD: f64 = 0.75;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Read buffer size used when comparing byte streams
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Overlap ratio (exclusive) for the same-artifact heuristic
    #[serde(default = "default_same_artifact_threshold")]
    pub same_artifact_threshold: f64,

    /// Treat identical archives and identical classes as failures too
    #[serde(default)]
    pub warnings_as_errors: bool,

    /// Run the name-matching pass across threads
    #[serde(default = "default_parallel_detection")]
    pub parallel_detection: bool,

    /// Enable portable mode (config alongside binary)
    #[serde(skip)]
    pub portable_mode: bool,
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_same_artifact_threshold() -> f64 {
    DEFAULT_SAME_ARTIFACT_THRESHOLD
}

fn default_parallel_detection() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            same_artifact_threshold: DEFAULT_SAME_ARTIFACT_THRESHOLD,
            warnings_as_errors: false,
            parallel_detection: true,
            portable_mode: false,
        }
    }
}

impl AppConfig {
    /// Rejects values the engine cannot work with
    pub fn validate(&self) -> Result<(), ClashError> {
        if self.buffer_size == 0 {
            return Err(ClashError::Config("buffer_size must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.same_artifact_threshold) {
            return Err(ClashError::Config(format!(
                "same_artifact_threshold must be within [0, 1], got {}",
                self.same_artifact_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
    pub portable: bool,
}

pub fn load_config(prefer_portable: bool) -> Result<LoadedConfig, ClashError> {
    let (path, portable) = resolve_config_path(prefer_portable)?;
    load_config_from(path, portable)
}

/// Loads the configuration stored at `path`, falling back to defaults when absent
pub fn load_config_from(path: PathBuf, portable: bool) -> Result<LoadedConfig, ClashError> {
    let exists = path.exists();

    let mut config = if exists {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data).map_err(|e| ClashError::Serialization(e.to_string()))?
    } else {
        AppConfig::default()
    };

    config.portable_mode = portable;
    config.validate()?;

    Ok(LoadedConfig {
        config,
        path,
        exists,
        portable,
    })
}

pub fn ensure_config(prefer_portable: bool) -> Result<LoadedConfig, ClashError> {
    let loaded = load_config(prefer_portable)?;
    if !loaded.exists {
        save_config(&loaded.path, &loaded.config)?;
    }
    Ok(loaded)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ClashError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| ClashError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool), ClashError> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "aecs4u", "classclash")
        .ok_or_else(|| ClashError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
