use crate::crawler::Strategy;
use serde::Deserialize;

/// User agent sent with every fetch unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; CrawlCompare/1.0)";

/// Main configuration structure for Crawl-Compare
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,

    /// File holding the URL list, one URL per line
    #[serde(rename = "urls-file")]
    pub urls_file: String,

    /// Default tracing filter when no verbosity flag is given
    #[serde(rename = "log-level")]
    pub log_level: String,

    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            urls_file: "urls.txt".to_string(),
            log_level: "info".to_string(),
            crawler: CrawlerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Tunable parameters handed to the crawl engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Per-attempt request timeout (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Total attempts per URL for timeouts and connection failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Pause between attempts in the bounded runner (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Worker threads in the pooled runner
    #[serde(rename = "pool-workers")]
    pub pool_workers: usize,

    /// Global in-flight ceiling for the bounded runner
    #[serde(rename = "concurrent-limit")]
    pub concurrent_limit: usize,

    /// Per-host in-flight ceiling for the bounded runner
    #[serde(rename = "per-host-limit")]
    pub per_host_limit: usize,

    /// Enabled strategies
    ///
    /// Membership only; a comparison always runs sequential, then pooled,
    /// then bounded, whatever order they are listed in.
    pub strategies: Vec<Strategy>,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_retries: 2,
            retry_delay_ms: 500,
            pool_workers: 10,
            concurrent_limit: 50,
            per_host_limit: 10,
            strategies: Strategy::ALL.to_vec(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn is_enabled(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file; persistence is disabled when unset
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        self.database_path
            .as_deref()
            .is_some_and(|path| !path.is_empty())
    }
}
