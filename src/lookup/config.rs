// Client configuration for the metadata API

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::errors::{LookupError, LookupResult};

pub const DEFAULT_API_HOST: &str = "ytstream-download-youtube-videos.p.rapidapi.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "RAPIDAPI_KEY";
/// Key name used by the web front end's `.env`
pub const ENV_API_KEY_FRONTEND: &str = "VITE_RAPIDAPI_KEY";
pub const ENV_API_HOST: &str = "RAPIDAPI_HOST";
pub const ENV_BASE_URL: &str = "YTSTREAM_BASE_URL";
pub const ENV_TIMEOUT: &str = "YTSTREAM_TIMEOUT_SECS";
pub const ENV_PROXY: &str = "YTSTREAM_PROXY";

/// Settings for the RapidAPI ytstream endpoint
#[derive(Clone)]
pub struct ApiConfig {
    /// Static credential sent as `x-rapidapi-key`
    pub api_key: String,
    /// Sent as `x-rapidapi-host`
    pub api_host: String,
    /// Scheme + host the `/dl` path is appended to
    pub base_url: String,
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// HTTP or SOCKS5 proxy URL (e.g., "socks5h://127.0.0.1:1080")
    pub proxy: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: DEFAULT_API_HOST.to_string(),
            base_url: format!("https://{}", DEFAULT_API_HOST),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            proxy: None,
        }
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variables, after loading `.env`
    /// from the working directory if there is one.
    pub fn from_env() -> LookupResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from a dotenv file without touching the process
    /// environment. Variables already set in the environment win.
    pub fn from_env_file(path: impl AsRef<Path>) -> LookupResult<Self> {
        let path = path.as_ref();
        let file_error =
            |e: dotenvy::Error| LookupError::Config(format!("Cannot read {}: {}", path.display(), e));

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(file_error)? {
            let (key, value) = item.map_err(file_error)?;
            vars.insert(key, value);
        }

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| vars.get(key).cloned()))
    }

    /// Build from any key/value source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> LookupResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| lookup(ENV_API_KEY_FRONTEND))
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LookupError::Config(format!("{} is not set", ENV_API_KEY)))?;

        let api_host = lookup(ENV_API_HOST)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        let base_url = lookup(ENV_BASE_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}", api_host));

        let timeout = match lookup(ENV_TIMEOUT) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    LookupError::Config(format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT, raw))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        let proxy = lookup(ENV_PROXY).filter(|p| !p.trim().is_empty());

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_host,
            base_url,
            timeout,
            proxy,
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Full URL of the download-info endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/dl", self.base_url.trim_end_matches('/'))
    }
}

// Keeps the key out of logs
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .finish()
    }
}
