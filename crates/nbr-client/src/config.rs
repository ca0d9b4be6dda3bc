//! Client configuration loaded from the environment.

use crate::{Result, error::ClientError, types::Service};
use std::{env, fmt, path::Path, time::Duration};

/// Base URL of the backtest service; `{user_key}` is appended.
pub const BACKTEST_BASE_URL: &str = "https://zipline.fin.cloud.ainode.ai";
/// Base URL of the trading service; `{user_key}` is appended.
pub const TRADING_BASE_URL: &str = "https://aifapbt.fin.cloud.ainode.ai";
/// Base URL of the position service; `{user_key}` is appended.
pub const POSITION_BASE_URL: &str = "https://bitgettrader.fin.cloud.ainode.ai";

/// Timeout for ordinary requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for backtest runs.
pub const BACKTEST_TIMEOUT: Duration = Duration::from_secs(300);

const REQUIRED_VARS: [&str; 2] = ["USER_KEY", "DATA_API_KEY"];

/// Credentials and service endpoints.
#[derive(Clone)]
pub struct ApiConfig {
    user_key: String,
    data_api_key: String,
    backtest_base_url: String,
    trading_base_url: String,
    position_base_url: String,
    /// Timeout for ordinary requests.
    pub timeout: Duration,
    /// Timeout for backtest runs.
    pub backtest_timeout: Duration,
}

impl ApiConfig {
    /// Create a configuration with the default endpoints.
    #[must_use]
    pub fn new(user_key: impl Into<String>, data_api_key: impl Into<String>) -> Self {
        let user_key = user_key.into();
        Self {
            backtest_base_url: format!("{BACKTEST_BASE_URL}/{user_key}/"),
            trading_base_url: format!("{TRADING_BASE_URL}/{user_key}/"),
            position_base_url: format!("{POSITION_BASE_URL}/{user_key}/"),
            user_key,
            data_api_key: data_api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            backtest_timeout: BACKTEST_TIMEOUT,
        }
    }

    /// Load the configuration from the environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// `USER_KEY` and `DATA_API_KEY` are required; `NBR_BACKTEST_URL`,
    /// `NBR_TRADING_URL` and `NBR_POSITION_URL` override the endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingEnv`] naming every missing variable.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration from a specific env file, overriding variables
    /// already set in the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a required variable is
    /// missing.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::from_path_override(path.as_ref())?;
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingEnv`] naming every missing variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| value(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ClientError::MissingEnv(missing.join(", ")));
        }

        let (Some(user_key), Some(data_api_key)) = (value("USER_KEY"), value("DATA_API_KEY"))
        else {
            return Err(ClientError::MissingEnv(REQUIRED_VARS.join(", ")));
        };

        let mut config = Self::new(user_key, data_api_key);
        for (service, var) in [
            (Service::Backtest, "NBR_BACKTEST_URL"),
            (Service::Trading, "NBR_TRADING_URL"),
            (Service::Position, "NBR_POSITION_URL"),
        ] {
            if let Some(url) = value(var) {
                config = config.with_base_url(service, url);
            }
        }

        tracing::info!(config = %config, "configuration loaded");
        Ok(config)
    }

    /// Replace the base URL of one service. A trailing `/` is added if
    /// missing.
    #[must_use]
    pub fn with_base_url(mut self, service: Service, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        match service {
            Service::Backtest => self.backtest_base_url = url,
            Service::Trading => self.trading_base_url = url,
            Service::Position => self.position_base_url = url,
        }
        self
    }

    /// Base URL for a service, always ending in `/`.
    pub fn endpoint(&self, service: Service) -> &str {
        match service {
            Service::Backtest => &self.backtest_base_url,
            Service::Trading => &self.trading_base_url,
            Service::Position => &self.position_base_url,
        }
    }

    /// The user key.
    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    /// The market data API key forwarded to backtests.
    pub fn data_api_key(&self) -> &str {
        &self.data_api_key
    }

    /// The user key with everything but the last four characters hidden.
    ///
    /// Keys of four characters or fewer are hidden entirely.
    pub fn masked_user_key(&self) -> String {
        let chars: Vec<char> = self.user_key.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("***{tail}")
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("user_key", &self.masked_user_key())
            .field("data_api_key", &"***")
            .field("timeout", &self.timeout)
            .field("backtest_timeout", &self.backtest_timeout)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiConfig(user_key={})", self.masked_user_key())
    }
}
