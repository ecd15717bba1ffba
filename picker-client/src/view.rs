//! Text rendering of the held workflow state.
//!
//! Pure string building over whatever the controller currently holds; no
//! I/O and no state of its own, so every section renders the same for the
//! same inputs.

use crate::api::models::{
    AiRankedCandidate, Candidate, FlowDirection, IndexQuote, MarketSentiment, OpenProbability,
    Quote, TailSessionTrend,
};
use crate::chart::MinuteSeries;
use crate::workflow::WorkflowController;

/// Eight-level block glyphs for sparkline rendering.
const SPARK_LEVELS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

// ============================================================================
// Market Overview
// ============================================================================

/// Render the benchmark index header.
pub fn render_index(quotes: &[IndexQuote]) -> String {
    let mut out = String::from("## 大盘指数\n\n");

    if quotes.is_empty() {
        out.push_str("(无指数数据)\n");
        return out;
    }

    for quote in quotes {
        out.push_str(&format!(
            "- **{}** {:.2} {} {:+.2}%\n",
            quote.name,
            quote.price,
            trend_arrow(quote.change_percent),
            quote.change_percent
        ));
    }

    out
}

/// Render the top-by-traded-amount list shown next to the index header.
pub fn render_hot(stocks: &[Candidate]) -> String {
    let mut out = String::from("## 热门股票 (按成交额)\n\n");

    if stocks.is_empty() {
        out.push_str("(无热门股票数据)\n");
        return out;
    }

    for (rank, stock) in stocks.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} {} {:.2} {:+.2}% 成交 {:.1} 亿\n",
            rank + 1,
            stock.code,
            stock.name,
            stock.price,
            stock.change_percent,
            stock.amount / 1.0e8
        ));
    }

    out
}

/// Render a single realtime quote refresh line for a refined pick.
pub fn render_quote(quote: &Quote) -> String {
    format!(
        "{} {} 最新 {:.2} {} {:+.2}%，今开 {:.2}，最高 {:.2}，最低 {:.2}，昨收 {:.2}\n",
        quote.code,
        quote.name,
        quote.price,
        trend_arrow(quote.change_percent),
        quote.change_percent,
        quote.open,
        quote.high,
        quote.low,
        quote.pre_close
    )
}

fn trend_arrow(change_percent: f64) -> &'static str {
    if change_percent > 0.0 {
        "▲"
    } else if change_percent < 0.0 {
        "▼"
    } else {
        "─"
    }
}

// ============================================================================
// Series Chart
// ============================================================================

/// Render a validated sample series as a two-row sparkline chart
/// (price on top, volume below) with range and net-change annotations.
pub fn render_series_chart(series: &MinuteSeries) -> String {
    let (min, max) = series.price_range();
    let net = series.net_price_change();

    let price_row: String = series
        .normalized_polyline()
        .iter()
        .map(|&(_, y)| {
            // y is top-down in [0,100]; flip for glyph height
            let level = ((100.0 - y) / 100.0 * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect();

    let volume_row: String = series
        .normalized_volume_bars()
        .iter()
        .map(|&height| {
            let level = (height * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect();

    format!(
        "价格 {} [{:.2} ~ {:.2}] {}{:.2}\n成交 {}\n",
        price_row,
        min,
        max,
        trend_arrow(net),
        net.abs(),
        volume_row
    )
}

// ============================================================================
// Workflow Report
// ============================================================================

/// Markdown report over the controller's held state.
pub struct WorkflowReport<'a> {
    controller: &'a WorkflowController,
}

impl<'a> WorkflowReport<'a> {
    pub fn new(controller: &'a WorkflowController) -> Self {
        Self { controller }
    }

    /// Render every populated section.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "# 两阶段选股报告\n\n**状态**: {}\n\n",
            self.controller.state().as_str()
        ));

        if let Some(error) = self.controller.error() {
            md.push_str(&format!("> ⚠ {}\n\n", error));
        }

        self.push_candidates(&mut md);
        self.push_verdicts(&mut md);
        self.push_refined(&mut md);
        self.push_ai_ranked(&mut md);
        self.push_environment(&mut md);

        md
    }

    fn push_candidates(&self, md: &mut String) {
        let candidates = self.controller.candidates();
        if candidates.is_empty() {
            return;
        }

        md.push_str(&format!("## 初筛结果 ({} 只)\n\n", candidates.len()));
        md.push_str("| 代码 | 名称 | 现价 | 涨幅 | 量比 | 流通市值(亿) |\n");
        md.push_str("|------|------|------|------|------|------|\n");
        for c in candidates {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {:+.2}% | {:.2} | {:.1} |\n",
                c.code, c.name, c.price, c.change_percent, c.volume_ratio, c.market_cap
            ));
        }
        md.push('\n');
    }

    fn push_verdicts(&self, md: &mut String) {
        let verdicts = self.controller.verdicts();
        if verdicts.is_empty() {
            return;
        }

        md.push_str(&format!("## 技术面分析 ({} 只)\n\n", verdicts.len()));
        md.push_str("| 代码 | 名称 | 阶梯放量 | 站稳5日线 | 热点板块 | 达标 |\n");
        md.push_str("|------|------|------|------|------|------|\n");
        for v in verdicts {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                v.code,
                v.name,
                mark(v.has_volume_pattern),
                mark(v.above_ma5_high),
                mark(v.in_hot_sector),
                mark(v.qualified)
            ));
        }
        md.push('\n');
    }

    fn push_refined(&self, md: &mut String) {
        let refined = self.controller.refined();
        if refined.is_empty() {
            return;
        }

        md.push_str(&format!("## 精选股票 ({} 只)\n\n", refined.len()));
        for stock in refined {
            md.push_str(&format!(
                "### {} {}\n\n- 现价 {:.2} ({:+.2}%)，MA5 {:.2}，支撑位 {:.2}\n",
                stock.code, stock.name, stock.price, stock.change_percent, stock.ma5,
                stock.support_level
            ));
            for criterion in [
                &stock.analysis.volume_pattern,
                &stock.analysis.price_position,
                &stock.analysis.sector,
            ] {
                md.push_str(&format!(
                    "- {} {}\n",
                    criterion.label,
                    mark(criterion.passed)
                ));
            }

            if let Some(news) = &stock.negative_news {
                md.push_str(&format!(
                    "- 负面舆情: {}/{} 条，风险等级 {:?}\n",
                    news.negative_count, news.total_count, news.risk_level
                ));
            }

            if let Some(samples) = &stock.minute_series {
                if let Some(series) = MinuteSeries::new(samples) {
                    md.push_str("\n```\n");
                    md.push_str(&render_series_chart(&series));
                    md.push_str("```\n");
                }
            }
            md.push('\n');
        }
    }

    fn push_ai_ranked(&self, md: &mut String) {
        let ranked = self.controller.ai_ranked();
        if ranked.is_empty() {
            return;
        }

        md.push_str(&format!("## AI 优选 ({} 只)\n\n", ranked.len()));
        for stock in ranked {
            md.push_str(&render_ai_candidate(stock));
        }
    }

    fn push_environment(&self, md: &mut String) {
        let Some(env) = self.controller.environment() else {
            return;
        };

        md.push_str("## 市场环境\n\n");
        md.push_str(&format!(
            "- 大盘涨跌 {:+.2}%，情绪 {}，{}\n\n",
            env.index_change_percent,
            sentiment_label(env.sentiment),
            if env.safe_to_buy {
                "可考虑买入"
            } else {
                "建议观望"
            }
        ));
    }
}

fn render_ai_candidate(stock: &AiRankedCandidate) -> String {
    let mut out = format!(
        "### {} {} — 评分 {:.1}\n\n",
        stock.candidate.code, stock.candidate.name, stock.score
    );

    out.push_str(&format!(
        "- 尾盘 {}，距涨停 {:.1}%{}\n",
        tail_trend_label(stock.tail_trend),
        stock.limit_headroom_pct,
        if stock.near_limit { "（接近涨停）" } else { "" }
    ));
    out.push_str(&format!(
        "- 主力资金 {} {:.0} 万，次日高开概率 {}\n",
        flow_label(stock.capital_flow.direction),
        stock.capital_flow.magnitude,
        probability_label(stock.open_probability)
    ));

    for reason in &stock.reasons {
        out.push_str(&format!("- ✓ {}\n", reason));
    }
    for warning in &stock.warnings {
        out.push_str(&format!("- ⚠ {}\n", warning));
    }

    out.push('\n');
    out
}

fn mark(passed: bool) -> &'static str {
    if passed {
        "✓"
    } else {
        "✗"
    }
}

fn sentiment_label(sentiment: MarketSentiment) -> &'static str {
    match sentiment {
        MarketSentiment::Bullish => "偏多",
        MarketSentiment::Neutral => "中性",
        MarketSentiment::Bearish => "偏空",
        MarketSentiment::Unknown => "未知",
    }
}

fn tail_trend_label(trend: TailSessionTrend) -> &'static str {
    match trend {
        TailSessionTrend::Strengthening => "走强",
        TailSessionTrend::Flat => "平稳",
        TailSessionTrend::Weakening => "走弱",
        TailSessionTrend::Unknown => "未知",
    }
}

fn flow_label(direction: FlowDirection) -> &'static str {
    match direction {
        FlowDirection::Inflow => "净流入",
        FlowDirection::Outflow => "净流出",
        FlowDirection::Balanced => "均衡",
        FlowDirection::Unknown => "未知",
    }
}

fn probability_label(probability: OpenProbability) -> &'static str {
    match probability {
        OpenProbability::High => "高",
        OpenProbability::Medium => "中",
        OpenProbability::Low => "低",
        OpenProbability::Unknown => "未知",
    }
}

// ============================================================================
// Tests
// ============================================================================
