//! Wire data model for the remote screening service.
//!
//! All types mirror the JSON payloads of the screening service endpoints
//! (`/api/screen`, `/api/filter`, `/api/realtime`, `/api/kline`,
//! `/api/index`). Result sets are immutable once received; the workflow
//! controller replaces them wholesale on each successful request.
//!
//! Categorical fields produced by the AI ranking stage deserialize unknown
//! values into an `Unknown` variant so that a vocabulary extension on the
//! service side does not break the client.

use picker_common::config::ScreenConfig;
use serde::{Deserialize, Serialize};

// ============================================================================
// Screen Criteria
// ============================================================================

/// Query parameters for the coarse screen.
///
/// Fixed client-side configuration, passed through unchanged to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenCriteria {
    /// Percent-change lower bound (%)
    pub change_min: f64,
    /// Percent-change upper bound (%)
    pub change_max: f64,
    /// Volume-ratio lower bound
    pub volume_ratio_min: f64,
    /// Volume-ratio upper bound
    pub volume_ratio_max: f64,
    /// Float market-cap lower bound (亿)
    pub market_cap_min: f64,
    /// Float market-cap upper bound (亿)
    pub market_cap_max: f64,
    /// Maximum number of candidates returned
    pub limit: u32,
}

impl From<&ScreenConfig> for ScreenCriteria {
    fn from(config: &ScreenConfig) -> Self {
        Self {
            change_min: config.change_min,
            change_max: config.change_max,
            volume_ratio_min: config.volume_ratio_min,
            volume_ratio_max: config.volume_ratio_max,
            market_cap_min: config.market_cap_min,
            market_cap_max: config.market_cap_max,
            limit: config.limit,
        }
    }
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self::from(&ScreenConfig::default())
    }
}

impl ScreenCriteria {
    /// Render as query parameters for `GET /api/screen`.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("change_min", self.change_min.to_string()),
            ("change_max", self.change_max.to_string()),
            ("volume_ratio_min", self.volume_ratio_min.to_string()),
            ("volume_ratio_max", self.volume_ratio_max.to_string()),
            ("market_cap_min", self.market_cap_min.to_string()),
            ("market_cap_max", self.market_cap_max.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

// ============================================================================
// Candidate (coarse-screen result)
// ============================================================================

/// A stock that passed the coarse screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stock code (e.g., "300750")
    pub code: String,
    /// Display name
    pub name: String,
    /// Last price
    pub price: f64,
    /// Absolute change
    #[serde(default)]
    pub change: f64,
    /// Percent change (%)
    pub change_percent: f64,
    /// Volume ratio
    #[serde(default)]
    pub volume_ratio: f64,
    /// Turnover rate (%)
    #[serde(default)]
    pub turnover: f64,
    /// Float market cap (亿)
    #[serde(default)]
    pub market_cap: f64,
    /// Traded amount
    #[serde(default)]
    pub amount: f64,
    /// Traded volume (手)
    #[serde(default)]
    pub volume: f64,
}

// ============================================================================
// Minute Series
// ============================================================================

/// One per-minute trade sample of a refined candidate.
///
/// Timestamps keep the service's `"YYYY-MM-DD HH:MM"` string shape; charting
/// only relies on sample order, so no datetime parsing happens client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteSample {
    /// Sample timestamp
    pub time: String,
    /// Trade price
    pub price: f64,
    /// Minute volume (手)
    pub volume: f64,
    /// Cumulative session volume (手)
    #[serde(default)]
    pub cumulative_volume: f64,
}

impl MinuteSample {
    /// Convert daily k-line bars into a chartable sample series.
    ///
    /// Used when a refined candidate arrives without an embedded minute
    /// series: closes become prices and the cumulative volume is computed
    /// client-side as a running total.
    pub fn series_from_bars(bars: &[KlineBar]) -> Vec<Self> {
        let mut cumulative = 0.0;
        bars.iter()
            .map(|bar| {
                cumulative += bar.volume;
                Self {
                    time: bar.date.clone(),
                    price: bar.close,
                    volume: bar.volume,
                    cumulative_volume: cumulative,
                }
            })
            .collect()
    }
}

// ============================================================================
// Refined Candidate (deep-filter result)
// ============================================================================

/// One analysis criterion with its human-readable label and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionLabel {
    /// Display label (e.g., "阶梯式放量")
    pub label: String,
    /// Whether the criterion was met
    pub passed: bool,
}

/// Structured analysis labels attached to a refined candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedAnalysis {
    /// Volume-pattern criterion
    pub volume_pattern: CriterionLabel,
    /// Price-position criterion
    pub price_position: CriterionLabel,
    /// Sector criterion
    pub sector: CriterionLabel,
}

/// A stock that survived the deep technical/AI filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedCandidate {
    /// Stock code
    pub code: String,
    /// Display name
    pub name: String,
    /// Last price
    pub price: f64,
    /// Percent change (%)
    pub change_percent: f64,
    /// Volume ratio
    #[serde(default)]
    pub volume_ratio: f64,
    /// Float market cap (亿)
    #[serde(default)]
    pub market_cap: f64,
    /// Turnover rate (%)
    #[serde(default)]
    pub turnover: f64,
    /// Traded amount
    #[serde(default)]
    pub amount: f64,
    /// 5-period moving average
    pub ma5: f64,
    /// Computed support level
    pub support_level: f64,
    /// Structured analysis verdict labels
    pub analysis: RefinedAnalysis,
    /// Negative-news summary, when the service performed a news scan
    #[serde(default)]
    pub negative_news: Option<NegativeNewsSummary>,
    /// Bounded per-minute series for visualization, when available
    #[serde(default)]
    pub minute_series: Option<Vec<MinuteSample>>,
}

// ============================================================================
// Analysis Verdict
// ============================================================================

/// Technical-criteria outcome for one submitted code.
///
/// Exactly one verdict exists per code submitted to the deep filter,
/// independent of whether the stock became a refined candidate. Joins with
/// the refined list are performed by code, never by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    /// Stock code
    pub code: String,
    /// Display name
    pub name: String,
    /// Last price
    pub price: f64,
    /// Percent change (%)
    pub change_percent: f64,
    /// Volume ratio
    #[serde(default)]
    pub volume_ratio: f64,
    /// Float market cap (亿)
    #[serde(default)]
    pub market_cap: f64,
    /// 5-period moving average
    #[serde(default)]
    pub ma5: f64,
    /// Computed support level
    #[serde(default)]
    pub support_level: f64,
    /// Shows the qualifying stepwise volume pattern
    pub has_volume_pattern: bool,
    /// Trades above its 5-day MA and recent high watermark
    pub above_ma5_high: bool,
    /// Belongs to a designated hot sector
    pub in_hot_sector: bool,
    /// Derived overall verdict
    pub qualified: bool,
}

impl AnalysisVerdict {
    /// Number of technical criteria met (0-3).
    pub fn criteria_met(&self) -> u8 {
        u8::from(self.has_volume_pattern)
            + u8::from(self.above_ma5_high)
            + u8::from(self.in_hot_sector)
    }
}

// ============================================================================
// AI Ranking
// ============================================================================

/// Tail-session (last trading hour) trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailSessionTrend {
    /// Strengthening into the close
    Strengthening,
    /// Flat close
    Flat,
    /// Fading into the close
    Weakening,
    /// Unrecognized service value
    #[serde(other)]
    Unknown,
}

/// Main-capital flow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// Net inflow
    Inflow,
    /// Net outflow
    Outflow,
    /// Roughly balanced
    Balanced,
    /// Unrecognized service value
    #[serde(other)]
    Unknown,
}

/// Probability class for a higher open next session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenProbability {
    High,
    Medium,
    Low,
    /// Unrecognized service value
    #[serde(other)]
    Unknown,
}

/// Main-capital flow with magnitude in 万元.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalFlow {
    /// Flow direction
    pub direction: FlowDirection,
    /// Absolute magnitude (万元)
    #[serde(default)]
    pub magnitude: f64,
}

/// A candidate re-ranked by the AI scoring stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRankedCandidate {
    /// Underlying candidate quote fields
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Composite AI score
    pub score: f64,
    /// Tail-session trend class
    pub tail_trend: TailSessionTrend,
    /// Headroom to the daily limit-up price (%)
    pub limit_headroom_pct: f64,
    /// Whether the stock is near its daily limit
    pub near_limit: bool,
    /// Main-capital flow
    pub capital_flow: CapitalFlow,
    /// Next-session open-probability class
    pub open_probability: OpenProbability,
    /// Free-text reasons supporting the score
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Free-text warnings
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Negative-news summary, when available
    #[serde(default)]
    pub negative_news: Option<NegativeNewsSummary>,
}

/// Market sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSentiment {
    Bullish,
    Neutral,
    Bearish,
    /// Unrecognized service value
    #[serde(other)]
    Unknown,
}

/// Market snapshot under which the AI ranking was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEnvironment {
    /// Benchmark index percent change (%)
    pub index_change_percent: f64,
    /// Sentiment class
    pub sentiment: MarketSentiment,
    /// Whether the environment is considered safe to buy into
    pub safe_to_buy: bool,
}

// ============================================================================
// Negative News
// ============================================================================

/// Risk level derived from the news scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsRiskLevel {
    Low,
    Medium,
    High,
}

/// One scanned news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline
    pub title: String,
    /// Publication date
    pub date: String,
    /// Publishing source
    pub source: String,
    /// Matched keyword tags
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Negative-news scan summary for one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeNewsSummary {
    /// Whether any negative item was found
    pub has_negative: bool,
    /// Count of negative items
    pub negative_count: u32,
    /// Total items scanned
    pub total_count: u32,
    /// The scanned items, newest first
    #[serde(default)]
    pub items: Vec<NewsItem>,
    /// Aggregate risk level
    pub risk_level: NewsRiskLevel,
}

// ============================================================================
// Response Envelopes
// ============================================================================

/// Echo of the screen criteria as display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenCriteriaEcho {
    /// e.g., "3%-5%"
    pub change_range: String,
    /// e.g., "1.5-3"
    pub volume_ratio_range: String,
    /// e.g., "50-300亿"
    pub market_cap_range: String,
}

/// Response of `GET /api/screen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenResponse {
    /// Number of candidates returned
    pub count: usize,
    /// Criteria echo
    pub criteria: ScreenCriteriaEcho,
    /// The candidate set (replaces any previously held set wholesale)
    pub data: Vec<Candidate>,
}

/// Echo of the deep-filter criteria as display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteriaEcho {
    /// Volume-pattern criterion label
    pub volume_pattern: String,
    /// Price-position criterion label
    pub price_position: String,
    /// Sector criterion label
    pub sector: String,
}

/// Response of `GET /api/filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResponse {
    /// Number of refined candidates
    pub count: usize,
    /// Number of codes analyzed
    pub total_analyzed: usize,
    /// Criteria echo
    pub filter_criteria: FilterCriteriaEcho,
    /// Refined candidates (qualified subset)
    pub data: Vec<RefinedCandidate>,
    /// One verdict per submitted code
    pub all_analysis: Vec<AnalysisVerdict>,
    /// AI re-ranking, when the service ran the AI stage
    #[serde(default)]
    pub ai_selected: Option<Vec<AiRankedCandidate>>,
    /// Market snapshot for the AI ranking, when present
    #[serde(default)]
    pub market_environment: Option<MarketEnvironment>,
}

// ============================================================================
// Quote / K-line / Index (supplementary endpoints)
// ============================================================================

/// Single-stock realtime snapshot from `GET /api/realtime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
    pub amount: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub pre_close: f64,
    #[serde(default)]
    pub turnover: f64,
    #[serde(default)]
    pub volume_ratio: f64,
    #[serde(default)]
    pub market_cap: f64,
}

/// K-line period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KlinePeriod {
    Daily,
    Weekly,
    Monthly,
}

impl KlinePeriod {
    /// Query-parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// One historical k-line bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineBar {
    /// Bar date (e.g., "2024-01-02")
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    /// Volume (手)
    pub volume: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub change_percent: f64,
}

/// Response of `GET /api/kline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineResponse {
    pub code: String,
    pub period: String,
    pub data: Vec<KlineBar>,
}

/// Response of `GET /api/hot` (top stocks by traded amount).
///
/// Entries carry the same quote fields as screen candidates; ranking-only
/// fields the service does not compute for this list default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotResponse {
    pub count: usize,
    pub data: Vec<Candidate>,
}

/// One benchmark index quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub amount: f64,
}

/// Response of `GET /api/index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub data: Vec<IndexQuote>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_screen_criteria_defaults() {
        let criteria = ScreenCriteria::default();
        assert_eq!(criteria.change_min, 3.0);
        assert_eq!(criteria.change_max, 5.0);
        assert_eq!(criteria.volume_ratio_min, 1.5);
        assert_eq!(criteria.volume_ratio_max, 3.0);
        assert_eq!(criteria.market_cap_min, 50.0);
        assert_eq!(criteria.market_cap_max, 300.0);
        assert_eq!(criteria.limit, 20);
    }

    #[test]
    fn test_screen_criteria_query_params() {
        let query = ScreenCriteria::default().to_query();
        assert_eq!(query.len(), 7);
        assert!(query.contains(&("change_min", "3".to_string())));
        assert!(query.contains(&("limit", "20".to_string())));
    }

    #[test]
    fn test_decode_screen_response() {
        let body = json!({
            "count": 1,
            "criteria": {
                "change_range": "3%-5%",
                "volume_ratio_range": "1.5-3",
                "market_cap_range": "50-300亿"
            },
            "data": [{
                "code": "300750",
                "name": "宁德时代",
                "price": 188.5,
                "change": 7.2,
                "change_percent": 3.97,
                "volume_ratio": 2.1,
                "turnover": 1.8,
                "market_cap": 240.0,
                "amount": 4.2e9,
                "volume": 220000.0
            }]
        });

        let resp: ScreenResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.count, 1);
        assert_eq!(resp.data[0].code, "300750");
        assert_eq!(resp.data[0].change_percent, 3.97);
    }

    #[test]
    fn test_decode_candidate_with_missing_optional_fields() {
        let body = json!({
            "code": "600519",
            "name": "贵州茅台",
            "price": 1680.0,
            "change_percent": 3.2
        });

        let candidate: Candidate = serde_json::from_value(body).unwrap();
        assert_eq!(candidate.volume_ratio, 0.0);
        assert_eq!(candidate.market_cap, 0.0);
    }

    #[test]
    fn test_decode_ai_ranked_candidate_flattened() {
        let body = json!({
            "code": "300308",
            "name": "中际旭创",
            "price": 152.3,
            "change": 6.1,
            "change_percent": 4.17,
            "score": 86.5,
            "tail_trend": "strengthening",
            "limit_headroom_pct": 5.6,
            "near_limit": false,
            "capital_flow": { "direction": "inflow", "magnitude": 18200.0 },
            "open_probability": "high",
            "reasons": ["尾盘资金持续流入"],
            "warnings": []
        });

        let ranked: AiRankedCandidate = serde_json::from_value(body).unwrap();
        assert_eq!(ranked.candidate.code, "300308");
        assert_eq!(ranked.tail_trend, TailSessionTrend::Strengthening);
        assert_eq!(ranked.capital_flow.direction, FlowDirection::Inflow);
        assert_eq!(ranked.open_probability, OpenProbability::High);
    }

    #[test]
    fn test_unknown_enum_values_fall_back() {
        let trend: TailSessionTrend = serde_json::from_value(json!("sideways_chop")).unwrap();
        assert_eq!(trend, TailSessionTrend::Unknown);

        let direction: FlowDirection = serde_json::from_value(json!("rotating")).unwrap();
        assert_eq!(direction, FlowDirection::Unknown);

        let sentiment: MarketSentiment = serde_json::from_value(json!("euphoric")).unwrap();
        assert_eq!(sentiment, MarketSentiment::Unknown);
    }

    #[test]
    fn test_decode_filter_response_without_ai_block() {
        let body = json!({
            "count": 0,
            "total_analyzed": 2,
            "filter_criteria": {
                "volume_pattern": "阶梯式放量",
                "price_position": "站稳5日线+近期高点",
                "sector": "数字经济板块"
            },
            "data": [],
            "all_analysis": [
                {
                    "code": "000001", "name": "平安银行", "price": 10.5,
                    "change_percent": 3.1, "has_volume_pattern": false,
                    "above_ma5_high": true, "in_hot_sector": false,
                    "qualified": false
                },
                {
                    "code": "000002", "name": "万科A", "price": 8.2,
                    "change_percent": 4.0, "has_volume_pattern": true,
                    "above_ma5_high": false, "in_hot_sector": false,
                    "qualified": false
                }
            ]
        });

        let resp: FilterResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.all_analysis.len(), 2);
        assert!(resp.ai_selected.is_none());
        assert!(resp.market_environment.is_none());
        assert_eq!(resp.all_analysis[0].criteria_met(), 1);
    }

    #[test]
    fn test_minute_series_from_bars_accumulates_volume() {
        let bars = vec![
            KlineBar {
                date: "2024-01-02".into(),
                open: 10.0,
                close: 10.4,
                high: 10.5,
                low: 9.9,
                volume: 100.0,
                amount: 0.0,
                change_percent: 0.0,
            },
            KlineBar {
                date: "2024-01-03".into(),
                open: 10.4,
                close: 10.2,
                high: 10.6,
                low: 10.1,
                volume: 150.0,
                amount: 0.0,
                change_percent: -1.9,
            },
        ];

        let samples = MinuteSample::series_from_bars(&bars);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].price, 10.4);
        assert_eq!(samples[0].cumulative_volume, 100.0);
        assert_eq!(samples[1].cumulative_volume, 250.0);
    }
}
