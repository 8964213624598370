use crate::config::types::AppConfig;
use crate::config::validation::validate;
use crate::crawler::Strategy;
use crate::ConfigError;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Loads the application configuration
///
/// Settings are layered: built-in defaults, then the TOML file at `path`
/// (when given), then environment variables. The merged result is validated.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
///
/// # Returns
///
/// * `Ok(AppConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, override, or validate
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use crawl_compare::config::load_config;
///
/// let config = load_config(Some(Path::new("crawl.toml"))).unwrap();
/// println!("Timeout: {}s", config.crawler.timeout_seconds);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Applies environment variable overrides to a configuration
///
/// `lookup` resolves a variable name to its value, which keeps the override
/// logic independent of the process environment.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = parse_env(&lookup, "PORT")? {
        config.server.port = port;
    }
    if let Some(urls_file) = lookup("URLS_FILE") {
        config.urls_file = urls_file;
    }
    if let Some(log_level) = lookup("LOG_LEVEL") {
        config.log_level = log_level.to_lowercase();
    }

    let crawler = &mut config.crawler;
    if let Some(timeout) = parse_env(&lookup, "CRAWL_TIMEOUT")? {
        crawler.timeout_seconds = timeout;
    }
    if let Some(retries) = parse_env(&lookup, "CRAWL_MAX_RETRIES")? {
        crawler.max_retries = retries;
    }
    if let Some(delay) = parse_env(&lookup, "CRAWL_RETRY_DELAY_MS")? {
        crawler.retry_delay_ms = delay;
    }
    if let Some(workers) = parse_env(&lookup, "CRAWL_POOL_WORKERS")? {
        crawler.pool_workers = workers;
    }
    if let Some(limit) = parse_env(&lookup, "CRAWL_CONCURRENT_LIMIT")? {
        crawler.concurrent_limit = limit;
    }
    if let Some(limit) = parse_env(&lookup, "CRAWL_PER_HOST_LIMIT")? {
        crawler.per_host_limit = limit;
    }
    if let Some(user_agent) = lookup("CRAWL_USER_AGENT") {
        crawler.user_agent = user_agent;
    }
    if let Some(raw) = lookup("CRAWL_STRATEGIES") {
        crawler.strategies = parse_strategies(&raw)?;
    }

    if let Some(path) = lookup("DATABASE_PATH") {
        config.storage.database_path = Some(path).filter(|p| !p.is_empty());
    }

    Ok(config)
}

fn parse_env<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

/// Parses a comma-separated strategy list such as `"sequential,pooled"`
fn parse_strategies(raw: &str) -> Result<Vec<Strategy>, ConfigError> {
    let mut strategies = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let strategy = name.parse().map_err(|_| ConfigError::InvalidEnv {
            name: "CRAWL_STRATEGIES".to_string(),
            value: raw.to_string(),
        })?;
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    Ok(strategies)
}

/// Reads the URL list file
///
/// See [`parse_url_list`] for the accepted format.
pub fn load_url_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_url_list(&content)
}

/// Parses a URL list: one URL per line, blank lines and `#` comments skipped
///
/// Every remaining entry must be an absolute HTTP(S) URL.
pub fn parse_url_list(content: &str) -> Result<Vec<String>, ConfigError> {
    let mut urls = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = Url::parse(line)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", line, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "'{}' must use http or https",
                line
            )));
        }

        urls.push(line.to_string());
    }

    Ok(urls)
}
