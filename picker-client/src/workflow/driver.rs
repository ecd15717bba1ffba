//! Async driver binding the pure controller to the service client.
//!
//! The driver performs the begin → request → complete round trip for each
//! phase. Because it holds the controller by value and its methods take
//! `&mut self`, a single driver naturally serializes its own requests; the
//! generation check in the controller still protects against completions
//! that were superseded by `reset`.

use anyhow::Result;
use tracing::info;

use picker_common::config::Config;

use crate::api::models::ScreenCriteria;
use crate::api::ScreeningClient;

use super::{WorkflowController, WorkflowState};

/// Owns the workflow controller, the service client and the fixed screen
/// criteria, and drives the two phases end to end.
pub struct Workflow {
    controller: WorkflowController,
    client: ScreeningClient,
    criteria: ScreenCriteria,
}

impl Workflow {
    /// Build a workflow from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = ScreeningClient::new(&config.api)?;
        Ok(Self::with_client(
            client,
            ScreenCriteria::from(&config.screen),
        ))
    }

    /// Build a workflow around an existing client (used by tests).
    pub fn with_client(client: ScreeningClient, criteria: ScreenCriteria) -> Self {
        Self {
            controller: WorkflowController::new(),
            client,
            criteria,
        }
    }

    /// Read access to the held workflow state and result sets.
    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    /// The underlying service client (for supplementary quote/k-line calls).
    pub fn client(&self) -> &ScreeningClient {
        &self.client
    }

    /// Run the coarse screen phase; returns the resulting state.
    ///
    /// A rejected start (phase in flight) leaves the state untouched.
    /// Failures land in the controller's error slot, not in a `Result`.
    pub async fn run_screen(&mut self) -> WorkflowState {
        let Some(ticket) = self.controller.begin_screen() else {
            return self.controller.state();
        };

        info!(
            change = format!("{}%-{}%", self.criteria.change_min, self.criteria.change_max),
            volume_ratio = format!(
                "{}-{}",
                self.criteria.volume_ratio_min, self.criteria.volume_ratio_max
            ),
            market_cap = format!(
                "{}-{}亿",
                self.criteria.market_cap_min, self.criteria.market_cap_max
            ),
            "Running coarse screen"
        );

        let outcome = self.client.screen(&self.criteria).await;
        self.controller.complete_screen(&ticket, outcome);
        self.controller.state()
    }

    /// Run the deep filter phase over the held candidates; returns the
    /// resulting state.
    ///
    /// A strict no-op when the candidate set is empty or the state does not
    /// allow filtering.
    pub async fn run_filter(&mut self) -> WorkflowState {
        let Some(ticket) = self.controller.begin_filter() else {
            return self.controller.state();
        };

        info!(codes = ticket.codes().len(), "Running deep filter");

        let outcome = self.client.filter(ticket.codes()).await;
        self.controller.complete_filter(&ticket, outcome);
        self.controller.state()
    }

    /// Reset the workflow to `idle`, discarding all held results.
    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Clear the error banner without changing state.
    pub fn dismiss_error(&mut self) {
        self.controller.dismiss_error();
    }
}
