//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\streamlet\config.toml
//! - macOS: ~/Library/Application Support/streamlet/config.toml
//! - Linux: ~/.config/streamlet/config.toml
//!
//! An explicit `--config <path>` overrides the default location. A missing
//! or unparsable file falls back to defaults with a logged warning, so
//! loading never fails.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library scanning settings
    pub library: LibraryConfig,

    /// Cover artifact settings
    pub covers: CoversConfig,

    /// External artwork lookup settings
    pub lookup: LookupConfig,
}

/// Library scanning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory of the audio library (created if absent)
    pub root: PathBuf,

    /// Maximum directory recursion depth below the root
    pub scan_depth: usize,

    /// Path to the SQLite database file (default: streamlet.db)
    pub db_path: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./music"),
            scan_depth: 3,
            db_path: None,
        }
    }
}

/// Cover artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoversConfig {
    /// Directory cover artifacts are written to (created if absent)
    pub dir: PathBuf,

    /// URL prefix stored on tracks; the serving boundary decides whether
    /// this is "/covers" or "/api/covers"
    pub url_prefix: String,

    /// Square canvas size in pixels
    pub size: u32,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./covers"),
            url_prefix: "/covers".to_string(),
            size: 400,
        }
    }
}

/// External artwork lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Whether to query the remote catalog at all
    pub enabled: bool,

    /// Search endpoint base URL
    pub endpoint: String,

    /// Request timeout in seconds; a timeout means "no artwork found"
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://itunes.apple.com".to_string(),
            timeout_secs: 10,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("streamlet"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration, preferring an explicit path over the default location.
///
/// Returns default config if the file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let Some(p) = config_path() else {
                tracing::warn!("Could not determine config directory, using defaults");
                return Config::default();
            };
            p
        }
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk at the default location.
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[library]"));
        assert!(toml.contains("[covers]"));
        assert!(toml.contains("[lookup]"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.library.root = PathBuf::from("/srv/music");
        config.covers.url_prefix = "/api/covers".to_string();
        config.lookup.enabled = false;

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.library.root, PathBuf::from("/srv/music"));
        assert_eq!(parsed.covers.url_prefix, "/api/covers");
        assert!(!parsed.lookup.enabled);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        // Config with only some fields
        let toml = r#"
[covers]
url_prefix = "/api/covers"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.covers.url_prefix, "/api/covers");

        // Other fields use defaults
        assert_eq!(config.covers.size, 400);
        assert_eq!(config.library.scan_depth, 3);
        assert!(config.lookup.enabled);
        assert_eq!(config.lookup.endpoint, "https://itunes.apple.com");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[library]\nscan_depth = 5\n").unwrap();

        let config = load(Some(&path));
        assert_eq!(config.library.scan_depth, 5);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let config = load(Some(Path::new("/does/not/exist.toml")));
        assert_eq!(config.library.scan_depth, 3);
    }
}
