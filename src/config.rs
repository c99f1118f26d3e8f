//! Centralized configuration management for nianbao

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for downloaded reports and run summaries
    pub download_dir: PathBuf,
    /// Pause between consecutive (code, year) requests (milliseconds)
    pub request_delay_ms: u64,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Remote disclosure hosts
    pub endpoints: Endpoints,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout for announcement APIs and listing pages
    pub api_timeout_seconds: u64,
    /// Timeout for HEAD existence checks
    pub probe_timeout_seconds: u64,
    /// Timeout for a whole PDF download
    pub download_timeout_seconds: u64,
    /// Extra attempts after a connect/timeout failure while downloading
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
}

/// Base URLs of the disclosure sites. Paths and query layouts are fixed in the
/// probes; only the hosts are configurable.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub cninfo: String,
    pub cninfo_static: String,
    pub eastmoney: String,
    pub eastmoney_pdf: String,
    pub hkex: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_timeout_seconds: 30,
            probe_timeout_seconds: 10,
            download_timeout_seconds: 60,
            max_retries: 2,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            cninfo: "http://www.cninfo.com.cn".to_string(),
            cninfo_static: "http://static.cninfo.com.cn".to_string(),
            eastmoney: "https://np-anotice-stock.eastmoney.com".to_string(),
            eastmoney_pdf: "https://pdf.dfcfw.com".to_string(),
            hkex: "https://www1.hkexnews.hk".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every source at one host, used against a local mock server.
    pub fn single_host(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            cninfo: base.clone(),
            cninfo_static: base.clone(),
            eastmoney: base.clone(),
            eastmoney_pdf: base.clone(),
            hkex: base,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let download_dir = std::env::var("NIANBAO_DOWNLOAD_DIR")
            .unwrap_or_else(|_| "annual_reports".to_string())
            .into();

        let http = HttpConfig {
            api_timeout_seconds: parse_env_var("NIANBAO_API_TIMEOUT_SECONDS")?.unwrap_or(30),
            probe_timeout_seconds: parse_env_var("NIANBAO_PROBE_TIMEOUT_SECONDS")?.unwrap_or(10),
            download_timeout_seconds: parse_env_var("NIANBAO_DOWNLOAD_TIMEOUT_SECONDS")?.unwrap_or(60),
            max_retries: parse_env_var("NIANBAO_MAX_RETRIES")?.unwrap_or(2),
            user_agent: std::env::var("NIANBAO_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        };

        Ok(Config {
            download_dir,
            request_delay_ms: parse_env_var("NIANBAO_REQUEST_DELAY_MS")?.unwrap_or(2000),
            http,
            endpoints: Endpoints::default(),
        })
    }

    /// Configuration for tests: everything served from `base`, no politeness delay
    pub fn for_host(base: &str, download_dir: impl Into<PathBuf>) -> Self {
        Config {
            download_dir: download_dir.into(),
            request_delay_ms: 0,
            http: HttpConfig {
                max_retries: 0,
                ..HttpConfig::default()
            },
            endpoints: Endpoints::single_host(base),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.http.api_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.http.probe_timeout_seconds)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.http.download_timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        std::fs::create_dir_all(&self.download_dir)
            .with_context(|| format!("Cannot create download directory: {}", self.download_dir.display()))?;

        if self.http.user_agent.trim().is_empty() {
            return Err(anyhow::anyhow!("User agent must not be empty"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
