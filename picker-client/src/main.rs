//! Picker - two-stage A-share stock selection client.
//!
//! Drives the coarse screen and the deep filter against the screening
//! service and prints the held results as a text report.

use anyhow::Result;
use picker_client::api::models::{KlinePeriod, MinuteSample};
use picker_client::chart::MinuteSeries;
use picker_client::view::{
    render_hot, render_index, render_quote, render_series_chart, WorkflowReport,
};
use picker_client::Workflow;
use picker_common::config::Config;
use picker_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Picker v{}", env!("CARGO_PKG_VERSION"));

    let mut workflow = Workflow::new(&config)?;

    // Market-overview header; failures degrade to log lines
    match workflow.client().index_snapshot().await {
        Ok(response) => println!("{}", render_index(&response.data)),
        Err(e) => tracing::warn!(error = %e, "Index snapshot unavailable"),
    }
    match workflow.client().hot(10).await {
        Ok(response) => println!("{}", render_hot(&response.data)),
        Err(e) => tracing::warn!(error = %e, "Hot-stock list unavailable"),
    }

    let state = workflow.run_screen().await;
    tracing::info!(
        state = state.as_str(),
        candidates = workflow.controller().candidates().len(),
        "Coarse screen finished"
    );

    if !workflow.controller().candidates().is_empty() {
        let state = workflow.run_filter().await;
        tracing::info!(
            state = state.as_str(),
            refined = workflow.controller().refined().len(),
            "Deep filter finished"
        );
    }

    println!("{}", WorkflowReport::new(workflow.controller()).to_markdown());

    // Fresh quote line per refined pick; the filter response may be minutes
    // stale by the time the report is read
    for stock in workflow.controller().refined() {
        match workflow.client().realtime(&stock.code).await {
            Ok(quote) => print!("{}", render_quote(&quote)),
            Err(e) => {
                tracing::warn!(code = %stock.code, error = %e, "Quote refresh failed");
            }
        }
    }

    // Daily k-line fallback chart for refined picks the service returned
    // without an intraday series
    for stock in workflow.controller().refined() {
        if stock.minute_series.is_some() {
            continue;
        }
        match workflow
            .client()
            .kline(&stock.code, KlinePeriod::Daily, 30)
            .await
        {
            Ok(response) => {
                let samples = MinuteSample::series_from_bars(&response.data);
                if let Some(series) = MinuteSeries::new(&samples) {
                    println!("{} {} 日线走势", stock.code, stock.name);
                    println!("{}", render_series_chart(&series));
                }
            }
            Err(e) => {
                tracing::warn!(code = %stock.code, error = %e, "K-line fetch failed");
            }
        }
    }

    Ok(())
}
