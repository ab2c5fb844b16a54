//! Configuration management for axis-selftest.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (`AXIS_SELFTEST_DEVICE_ID`, ...)
//! 2. Project-local config file (`./axis-selftest.toml`)
//! 3. User config file (`~/.config/axis-selftest/config.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # axis-selftest.toml
//!
//! # FIFO instance to test, as numbered by the board support package
//! device_id = 0
//!
//! # Poll iterations per wait before a timeout is declared
//! poll_iterations = 1048576
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::harness::PollBudget;

/// Global cached configuration.
static CONFIG: OnceLock<HarnessConfig> = OnceLock::new();

/// axis-selftest configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// FIFO device id to run against.
    pub device_id: Option<u16>,

    /// Iteration budget for each bounded poll.
    /// Counts condition checks, not wall-clock time.
    pub poll_iterations: Option<u32>,
}

impl HarnessConfig {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `axis-selftest.toml`
    /// 3. User config `~/.config/axis-selftest/config.toml`
    /// 4. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load user config first (lowest priority of file configs)
        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        // Load project-local config (higher priority)
        if let Some(local_config) = Self::load_local_config() {
            config.merge(local_config);
        }

        // Environment variables override everything
        config.apply_env_overrides();

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static HarnessConfig {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Get the device id, with fallback to the first table entry.
    pub fn device_id(&self) -> u16 {
        self.device_id.unwrap_or(0)
    }

    /// Get the poll budget, with fallback to the default.
    pub fn poll_iterations(&self) -> u32 {
        self.poll_iterations.unwrap_or(PollBudget::DEFAULT_ITERATIONS)
    }

    /// Load user configuration from ~/.config/axis-selftest/config.toml
    fn load_user_config() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        let config_path = config_dir.join("axis-selftest").join("config.toml");
        Self::load_from_file(&config_path)
    }

    /// Load project-local configuration from ./axis-selftest.toml
    fn load_local_config() -> Option<Self> {
        // Try current directory
        let local_path = Path::new("axis-selftest.toml");
        if let Some(config) = Self::load_from_file(local_path) {
            return Some(config);
        }

        // Try to find project root by looking for Cargo.toml
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let project_path = Path::new(&manifest_dir).join("axis-selftest.toml");
            if let Some(config) = Self::load_from_file(&project_path) {
                return Some(config);
            }
        }

        None
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    fn merge(&mut self, other: Self) {
        if other.device_id.is_some() {
            self.device_id = other.device_id;
        }
        if other.poll_iterations.is_some() {
            self.poll_iterations = other.poll_iterations;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("AXIS_SELFTEST_DEVICE_ID") {
            match value.parse() {
                Ok(id) => {
                    log::info!("Using AXIS_SELFTEST_DEVICE_ID from environment: {}", id);
                    self.device_id = Some(id);
                }
                Err(_) => log::warn!("Ignoring invalid AXIS_SELFTEST_DEVICE_ID: {}", value),
            }
        }
        if let Ok(value) = std::env::var("AXIS_SELFTEST_POLL_ITERATIONS") {
            match value.parse() {
                Ok(n) => {
                    log::info!("Using AXIS_SELFTEST_POLL_ITERATIONS from environment: {}", n);
                    self.poll_iterations = Some(n);
                }
                Err(_) => {
                    log::warn!("Ignoring invalid AXIS_SELFTEST_POLL_ITERATIONS: {}", value)
                }
            }
        }
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("axis-selftest").join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# axis-selftest configuration
# Place this file at ~/.config/axis-selftest/config.toml or ./axis-selftest.toml

# FIFO instance to test (defaults to device 0)
# device_id = 0

# Poll iterations per bounded wait (defaults to 1048576)
# poll_iterations = 1048576
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fallbacks() {
        let config = HarnessConfig::default();
        assert_eq!(config.device_id(), 0);
        assert_eq!(config.poll_iterations(), PollBudget::DEFAULT_ITERATIONS);
    }

    #[test]
    fn test_config_merge() {
        let mut base = HarnessConfig {
            device_id: Some(1),
            poll_iterations: None,
        };

        let overlay = HarnessConfig {
            device_id: None,
            poll_iterations: Some(256),
        };

        base.merge(overlay);

        // device_id unchanged (overlay was None)
        assert_eq!(base.device_id, Some(1));
        // poll_iterations set from overlay
        assert_eq!(base.poll_iterations, Some(256));
    }

    #[test]
    fn test_get_caches_one_instance() {
        let first = HarnessConfig::get();
        let second = HarnessConfig::get();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_user_config_path_layout() {
        // Skipped on platforms with no config dir at all.
        if let Some(path) = HarnessConfig::user_config_path() {
            assert!(path.ends_with("axis-selftest/config.toml"));
        }
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = HarnessConfig::sample_config();
        let config: HarnessConfig = toml::from_str(&sample).expect("Sample config should parse");
        // The sample ships with everything commented out.
        assert!(config.device_id.is_none());
        assert!(config.poll_iterations.is_none());
    }

    #[test]
    fn test_parse_explicit_values() {
        let config: HarnessConfig =
            toml::from_str("device_id = 3\npoll_iterations = 4096\n").unwrap();
        assert_eq!(config.device_id(), 3);
        assert_eq!(config.poll_iterations(), 4096);
    }
}
