//! HTTP client for the backtest, trading and position services.

use crate::{
    Result,
    config::ApiConfig,
    error::ClientError,
    types::{
        BacktestRequest, BacktestResponse, PositionFilter, PositionsRequest, Service,
        StartTradingRequest,
    },
};
use nbr_strategies::StrategyKind;
use reqwest::{Client, Method, RequestBuilder, header};
use serde_json::Value;
use std::{path::Path, time::Duration};

const USER_AGENT: &str = concat!("nbr/", env!("CARGO_PKG_VERSION"));

/// Client for the remote nb-runner services.
///
/// Every operation is a single HTTP call with a timeout; failures are
/// reported, never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client from `USER_KEY` and `DATA_API_KEY`.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is not set.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    /// The configuration in use.
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Build a URL below a service's base URL.
    fn url(&self, service: Service, path: &str) -> String {
        format!("{}{path}", self.config.endpoint(service))
    }

    /// Send a request and decode the body as JSON, falling back to the raw
    /// text as a JSON string.
    async fn send(&self, request: RequestBuilder, url: &str, timeout: Duration) -> Result<Value> {
        let response = request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!(%url, "request timeout");
                ClientError::Timeout(url.to_string())
            } else {
                tracing::error!(%url, error = %e, "request error");
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status.as_u16() >= 400 {
            tracing::error!(%url, status = status.as_u16(), body = %text, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    async fn request(
        &self,
        method: Method,
        service: Service,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
        timeout: Duration,
    ) -> Result<Value> {
        let url = self.url(service, path);
        tracing::debug!(%method, %url, "making request");
        let request = build(self.client.request(method, &url));
        self.send(request, &url, timeout).await
    }

    async fn upload(
        &self,
        service: Service,
        path: &str,
        file: &Path,
        query: Option<[(&str, &str); 1]>,
    ) -> Result<Value> {
        let bytes = match tokio::fs::read(file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClientError::FileNotFound(file.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        self.request(
            Method::POST,
            service,
            path,
            |req| {
                let req = req.multipart(form);
                match query {
                    Some(q) => req.query(&q),
                    None => req,
                }
            },
            self.config.timeout,
        )
        .await
    }

    /// Check that a service is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service reports an error.
    pub async fn health_check(&self, service: Service) -> Result<Value> {
        self.request(Method::GET, service, "", |req| req, self.config.timeout)
            .await
    }

    /// Upload a strategy file.
    ///
    /// The backtest service files strategies per trade type; the trading
    /// service does not.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::FileNotFound`] if `file` does not exist, or an
    /// error if the upload fails.
    pub async fn upload_strategy(
        &self,
        file: &Path,
        trade_type: StrategyKind,
        service: Service,
    ) -> Result<Value> {
        let query = (service == Service::Backtest).then(|| [("tradeType", trade_type.as_str())]);
        self.upload(service, "upload/strategy/", file, query).await
    }

    /// Upload a configuration file to the trading service.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::FileNotFound`] if `file` does not exist, or an
    /// error if the upload fails.
    pub async fn upload_config(&self, file: &Path) -> Result<Value> {
        self.upload(Service::Trading, "upload/config/", file, None)
            .await
    }

    /// Ask a service whether a strategy has been uploaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn check_uploaded_strategy(
        &self,
        strategy_name: &str,
        trade_type: StrategyKind,
        service: Service,
    ) -> Result<Value> {
        let (path, query) = check_strategy_target(strategy_name, trade_type, service);
        self.request(
            Method::GET,
            service,
            path,
            |req| req.query(&query),
            self.config.timeout,
        )
        .await
    }

    /// Run a backtest and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or the response is
    /// not a backtest result.
    pub async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResponse> {
        let value = self
            .request(
                Method::POST,
                Service::Backtest,
                "run/future/backtest/",
                |req| req.json(request),
                self.config.backtest_timeout,
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Start a live trading session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn start_trading(&self, strategy_name: &str, method: &str) -> Result<Value> {
        let body = StartTradingRequest {
            strategy_name: strategy_name.to_string(),
            method: method.to_string(),
        };
        self.request(
            Method::POST,
            Service::Trading,
            "command/run-system",
            |req| req.json(&body),
            self.config.timeout,
        )
        .await
    }

    /// Terminate a live trading session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn terminate_trading(&self, session_id: &str) -> Result<Value> {
        self.request(
            Method::GET,
            Service::Trading,
            "command/terminate/",
            |req| req.query(&[("session_id", session_id)]),
            self.config.timeout,
        )
        .await
    }

    /// List open positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_positions(&self, product_type: &str, margin_coin: &str) -> Result<Value> {
        let body = self.positions_request(product_type, margin_coin);
        self.request(
            Method::POST,
            Service::Position,
            "future/position/all-positions",
            |req| req.json(&body),
            self.config.timeout,
        )
        .await
    }

    fn positions_request(&self, product_type: &str, margin_coin: &str) -> PositionsRequest {
        PositionsRequest {
            user_key: self.config.user_key().to_string(),
            all_positions: PositionFilter {
                product_type: product_type.to_string(),
                margin_coin: margin_coin.to_uppercase(),
            },
        }
    }
}

/// Path and query for the strategy upload check, which differ per service.
fn check_strategy_target(
    strategy_name: &str,
    trade_type: StrategyKind,
    service: Service,
) -> (&'static str, Vec<(&'static str, String)>) {
    match service {
        Service::Backtest => (
            "upload/strategy/check/",
            vec![
                ("tradeType", trade_type.as_str().to_string()),
                ("strategy_name", strategy_name.to_string()),
            ],
        ),
        Service::Trading | Service::Position => (
            "upload/check/strategy/",
            vec![("strategy_name", strategy_name.to_string())],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ApiConfig::new("user", "data")).unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client();
        assert_eq!(
            client.url(Service::Backtest, "run/future/backtest/"),
            "https://zipline.fin.cloud.ainode.ai/user/run/future/backtest/"
        );
        assert_eq!(
            client.url(Service::Trading, "command/run-system"),
            "https://aifapbt.fin.cloud.ainode.ai/user/command/run-system"
        );
        assert_eq!(
            client.url(Service::Position, ""),
            "https://bitgettrader.fin.cloud.ainode.ai/user/"
        );
    }

    #[test]
    fn test_check_strategy_target() {
        let (path, query) =
            check_strategy_target("multi_period_momentum", StrategyKind::Future, Service::Backtest);
        assert_eq!(path, "upload/strategy/check/");
        assert_eq!(query.len(), 2);
        assert_eq!(query[0], ("tradeType", "future".to_string()));

        let (path, query) =
            check_strategy_target("multi_period_momentum", StrategyKind::Spot, Service::Trading);
        assert_eq!(path, "upload/check/strategy/");
        assert_eq!(query, vec![("strategy_name", "multi_period_momentum".to_string())]);
    }

    #[test]
    fn test_positions_request() {
        let request = client().positions_request("susdt-futures", "susdt");
        assert_eq!(request.user_key, "user");
        assert_eq!(request.all_positions.margin_coin, "SUSDT");
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let result = client()
            .upload_strategy(
                Path::new("does/not/exist.py"),
                StrategyKind::Future,
                Service::Backtest,
            )
            .await;
        assert!(matches!(result, Err(ClientError::FileNotFound(_))));
    }
}
