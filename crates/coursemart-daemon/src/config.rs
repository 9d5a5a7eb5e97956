//! Configuration file management.

use std::path::PathBuf;

use coursemart_revenue::ranking::{PageLimits, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// IPC server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Revenue engine settings.
    #[serde(default)]
    pub revenue: RevenueConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

/// IPC server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket file name inside the data directory.
    #[serde(default = "default_socket_name")]
    pub socket_name: String,
}

/// Revenue engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueConfig {
    /// Instructor share written to a fresh database. An existing setting
    /// always wins.
    #[serde(default = "default_instructor_percentage")]
    pub default_instructor_percentage: Decimal,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    #[serde(default = "max_page_limit")]
    pub max_page_limit: u32,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_socket_name() -> String {
    "coursemart.sock".to_string()
}

fn default_instructor_percentage() -> Decimal {
    coursemart_revenue::attribution::DEFAULT_INSTRUCTOR_PERCENTAGE
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn max_page_limit() -> u32 {
    MAX_PAGE_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_name: default_socket_name(),
        }
    }
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            default_instructor_percentage: default_instructor_percentage(),
            default_page_limit: default_page_limit(),
            max_page_limit: max_page_limit(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl RevenueConfig {
    /// Page bounds for ranking requests. A default above the maximum is
    /// pulled down to it.
    pub fn page_limits(&self) -> PageLimits {
        let max_limit = self.max_page_limit.max(1);
        PageLimits {
            default_limit: self.default_page_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a TOML document.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the IPC socket path.
    pub fn socket_path(&self) -> PathBuf {
        self.data_dir().join(&self.server.socket_name)
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("COURSEMART_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/CourseMart")
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs_fallback(".coursemart")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/coursemart"))
}
