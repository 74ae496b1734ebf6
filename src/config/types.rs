use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default root directory for downloaded images
pub const DEFAULT_BASE_DIR: &str = "data";

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Where downloaded images are written
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory; images land in `<base-dir>/downloaded/<domain>`
    #[serde(rename = "base-dir", default = "default_base_dir")]
    pub base_dir: PathBuf,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl StorageConfig {
    /// Directory that holds every per-domain download folder
    pub fn downloads_root(&self) -> PathBuf {
        self.base_dir.join("downloaded")
    }

    /// Destination directory for a given domain string
    pub fn domain_dir(&self, domain: &str) -> PathBuf {
        self.downloads_root().join(domain)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Config {
    /// Returns a copy of this config writing under a different base directory
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.storage.base_dir = base_dir.as_ref().to_path_buf();
        self
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_DIR)
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}
