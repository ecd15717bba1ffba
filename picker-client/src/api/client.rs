//! HTTP client for the remote screening service.
//!
//! Wraps the two workflow operations (`screen`, `filter`) plus the
//! supplementary quote/k-line/index endpoints behind typed methods. All
//! operations are idempotent GETs with a bounded client-level timeout;
//! the workflow controller never deals with transport concerns.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use picker_common::config::ApiConfig;

use super::models::{
    FilterResponse, HotResponse, IndexResponse, KlinePeriod, KlineResponse, Quote,
    ScreenCriteria, ScreenResponse,
};

/// Browser-like user agent; some upstream quote sources behind the service
/// reject requests without one, and the service forwards ours.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";

// ============================================================================
// Client Error
// ============================================================================

/// Failure taxonomy of the screening service boundary.
///
/// Every error is non-fatal to the workflow: the controller records it and
/// rolls back the in-flight phase.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Network unreachable, connection refused, DNS failure
    #[error("network error: {0}")]
    Transport(String),

    /// The bounded request timeout was exceeded
    #[error("request timed out")]
    Timeout,

    /// Remote-reported business failure, or a malformed / contract-violating
    /// response. The detail string is shown to the user verbatim.
    #[error("{detail}")]
    Service { detail: String },
}

impl ClientError {
    /// Whether the error originated in the transport layer (including timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

/// Structured error payload of the service (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

// ============================================================================
// Screening Client
// ============================================================================

/// Typed request/response boundary to the remote screening service.
pub struct ScreeningClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ScreeningClient {
    /// Create a client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", config.base_url))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }

    /// Coarse screen over the stock universe.
    ///
    /// An empty `data` list is a valid success (nothing matched the bands).
    pub async fn screen(&self, criteria: &ScreenCriteria) -> Result<ScreenResponse, ClientError> {
        self.get_json("screen", "api/screen", &criteria.to_query())
            .await
    }

    /// Deep technical/AI filter over the given codes.
    ///
    /// `codes` must be non-empty; the response must carry exactly one verdict
    /// per submitted code, anything else is a contract violation surfaced as
    /// a service error.
    pub async fn filter(&self, codes: &[String]) -> Result<FilterResponse, ClientError> {
        if codes.is_empty() {
            return Err(ClientError::Service {
                detail: "no candidate codes to filter".into(),
            });
        }

        let query = [("codes", codes.join(","))];
        let response: FilterResponse = self.get_json("filter", "api/filter", &query).await?;

        if response.all_analysis.len() != codes.len() {
            return Err(ClientError::Service {
                detail: format!(
                    "verdict count mismatch: submitted {} codes, received {} verdicts",
                    codes.len(),
                    response.all_analysis.len()
                ),
            });
        }

        Ok(response)
    }

    /// Realtime snapshot for a single stock.
    pub async fn realtime(&self, code: &str) -> Result<Quote, ClientError> {
        let query = [("code", code.to_string())];
        self.get_json("realtime", "api/realtime", &query).await
    }

    /// Historical k-line bars for a single stock.
    pub async fn kline(
        &self,
        code: &str,
        period: KlinePeriod,
        days: u32,
    ) -> Result<KlineResponse, ClientError> {
        let query = [
            ("code", code.to_string()),
            ("period", period.as_str().to_string()),
            ("days", days.to_string()),
        ];
        self.get_json("kline", "api/kline", &query).await
    }

    /// Top stocks by traded amount.
    pub async fn hot(&self, limit: u32) -> Result<HotResponse, ClientError> {
        let query = [("limit", limit.to_string())];
        self.get_json("hot", "api/hot", &query).await
    }

    /// Benchmark index quotes.
    pub async fn index_snapshot(&self) -> Result<IndexResponse, ClientError> {
        self.get_json("index", "api/index", &[]).await
    }

    /// Issue a GET and decode the JSON body.
    ///
    /// Error mapping: send failures become `Transport`/`Timeout`; non-2xx
    /// responses become `Service` with the payload's `detail` (falling back
    /// to "<op> failed"); an undecodable success body is a `Service` error,
    /// never silently coerced.
    async fn get_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        debug!(op, url = %url, "Requesting screening service");

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout
                } else {
                    ClientError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("{} failed", op));

            debug!(op, %status, detail, "Screening service returned an error");
            return Err(ClientError::Service { detail });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Service {
                    detail: format!("malformed {} response: {}", op, e),
                }
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ScreeningClient {
        test_client_with_timeout(base_url, 30)
    }

    fn test_client_with_timeout(base_url: &str, timeout_secs: u64) -> ScreeningClient {
        ScreeningClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs,
        })
        .unwrap()
    }

    fn screen_body(candidates: serde_json::Value) -> serde_json::Value {
        json!({
            "count": candidates.as_array().map_or(0, |a| a.len()),
            "criteria": {
                "change_range": "3%-5%",
                "volume_ratio_range": "1.5-3",
                "market_cap_range": "50-300亿"
            },
            "data": candidates
        })
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = ScreeningClient::new(&ApiConfig {
            base_url: "not a url".into(),
            timeout_secs: 30,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_screen_sends_criteria_and_decodes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/screen"))
            .and(query_param("change_min", "3"))
            .and(query_param("change_max", "5"))
            .and(query_param("volume_ratio_min", "1.5"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(screen_body(json!([
                {"code": "000001", "name": "平安银行", "price": 10.5, "change_percent": 3.1}
            ]))))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.screen(&ScreenCriteria::default()).await.unwrap();

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].code, "000001");
    }

    #[tokio::test]
    async fn test_screen_empty_result_is_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/screen"))
            .respond_with(ResponseTemplate::new(200).set_body_json(screen_body(json!([]))))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.screen(&ScreenCriteria::default()).await.unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_service_error_detail_used_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/screen"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"detail": "筛选股票失败: 获取数据失败"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.screen(&ScreenCriteria::default()).await.unwrap_err();

        match err {
            ClientError::Service { detail } => assert_eq!(detail, "筛选股票失败: 获取数据失败"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_service_error_without_detail_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/filter"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.filter(&["000001".to_string()]).await.unwrap_err();

        match err {
            ClientError::Service { detail } => assert_eq!(detail, "filter failed"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/screen"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.screen(&ScreenCriteria::default()).await.unwrap_err();

        match err {
            ClientError::Service { detail } => assert!(detail.contains("malformed screen response")),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_variant() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/screen"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(screen_body(json!([])))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = test_client_with_timeout(&server.uri(), 1);
        let err = client.screen(&ScreenCriteria::default()).await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Nothing listens on this port
        let client = test_client("http://127.0.0.1:1");
        let err = client.screen(&ScreenCriteria::default()).await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_filter_rejects_empty_codes_without_request() {
        // No mock server at all: the guard must fire before any I/O
        let client = test_client("http://127.0.0.1:1");
        let err = client.filter(&[]).await.unwrap_err();

        assert!(matches!(err, ClientError::Service { .. }));
    }

    #[tokio::test]
    async fn test_filter_joins_codes_and_checks_verdict_count() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/filter"))
            .and(query_param("codes", "000001,300750"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 0,
                "total_analyzed": 2,
                "filter_criteria": {
                    "volume_pattern": "阶梯式放量",
                    "price_position": "站稳5日线+近期高点",
                    "sector": "数字经济板块"
                },
                "data": [],
                "all_analysis": [{
                    "code": "000001", "name": "平安银行", "price": 10.5,
                    "change_percent": 3.1, "has_volume_pattern": false,
                    "above_ma5_high": false, "in_hot_sector": false,
                    "qualified": false
                }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .filter(&["000001".to_string(), "300750".to_string()])
            .await
            .unwrap_err();

        match err {
            ClientError::Service { detail } => {
                assert!(detail.contains("verdict count mismatch"));
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_realtime_decodes_quote() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/realtime"))
            .and(query_param("code", "600519"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "600519", "name": "贵州茅台", "price": 1680.0,
                "change": 52.0, "change_percent": 3.2, "volume": 32000.0,
                "amount": 5.3e9, "high": 1685.0, "low": 1640.0,
                "open": 1642.0, "pre_close": 1628.0
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let quote = client.realtime("600519").await.unwrap();

        assert_eq!(quote.name, "贵州茅台");
        assert_eq!(quote.pre_close, 1628.0);
        // Optional fields default when the service omits them
        assert_eq!(quote.volume_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_kline_request_shape() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/kline"))
            .and(query_param("code", "300750"))
            .and(query_param("period", "daily"))
            .and(query_param("days", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "300750",
                "period": "daily",
                "data": [
                    {"date": "2024-01-02", "open": 180.0, "close": 185.0,
                     "high": 186.0, "low": 179.5, "volume": 1200.0}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.kline("300750", KlinePeriod::Daily, 30).await.unwrap();

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].close, 185.0);
    }

    #[tokio::test]
    async fn test_hot_sends_limit_and_decodes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/hot"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "data": [{
                    "code": "300750", "name": "宁德时代", "price": 188.5,
                    "change": 7.2, "change_percent": 3.97, "volume": 220000.0,
                    "amount": 4.2e9, "turnover": 1.8
                }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.hot(10).await.unwrap();

        assert_eq!(response.count, 1);
        assert_eq!(response.data[0].code, "300750");
        assert_eq!(response.data[0].amount, 4.2e9);
        // Fields the hot list does not carry default to zero
        assert_eq!(response.data[0].volume_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_index_snapshot_decodes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/index"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"code": "000001", "name": "上证指数", "price": 3250.1,
                     "change": 12.4, "change_percent": 0.38}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.index_snapshot().await.unwrap();
        assert_eq!(response.data[0].name, "上证指数");
    }
}
