//! Pure workflow state machine.
//!
//! The controller owns every fetched result set and the single-slot error,
//! and enforces the transition table without performing any I/O itself.
//! Each phase is split into a `begin_*` step (guards the transition, hands
//! out a ticket) and a `complete_*` step (applies the outcome). Tickets
//! carry a per-phase generation token: a completion whose token no longer
//! matches the latest request generation for that phase is discarded
//! without touching state, so a superseded request's late response can
//! never corrupt fresher state.

use tracing::{debug, warn};

use crate::api::models::{
    AiRankedCandidate, AnalysisVerdict, Candidate, FilterResponse, MarketEnvironment,
    RefinedCandidate, ScreenResponse,
};
use crate::api::ClientError;

use super::WorkflowState;

/// Ticket for an in-flight coarse screen.
#[derive(Debug, Clone)]
pub struct ScreenTicket {
    generation: u64,
}

/// Ticket for an in-flight deep filter, carrying the submitted codes.
#[derive(Debug, Clone)]
pub struct FilterTicket {
    generation: u64,
    codes: Vec<String>,
}

impl FilterTicket {
    /// The full candidate code list captured at call time.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

/// The two-phase workflow controller.
///
/// One controller instance owns its complete state exclusively; all work is
/// triggered by discrete actions and completions, so no locking is needed.
#[derive(Debug, Default)]
pub struct WorkflowController {
    state: WorkflowState,
    error: Option<String>,

    candidates: Vec<Candidate>,
    refined: Vec<RefinedCandidate>,
    verdicts: Vec<AnalysisVerdict>,
    ai_ranked: Vec<AiRankedCandidate>,
    environment: Option<MarketEnvironment>,

    screen_generation: u64,
    filter_generation: u64,
}

impl WorkflowController {
    /// Create a controller in the `idle` state with no held results.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current workflow state.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Most recent undismissed error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Candidate set from the last successful coarse screen.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Refined candidates from the last successful deep filter.
    pub fn refined(&self) -> &[RefinedCandidate] {
        &self.refined
    }

    /// Verdicts covering every code submitted to the last deep filter.
    pub fn verdicts(&self) -> &[AnalysisVerdict] {
        &self.verdicts
    }

    /// AI re-ranking from the last successful deep filter (may be empty).
    pub fn ai_ranked(&self) -> &[AiRankedCandidate] {
        &self.ai_ranked
    }

    /// Market snapshot accompanying the AI re-ranking, if any.
    pub fn environment(&self) -> Option<&MarketEnvironment> {
        self.environment.as_ref()
    }

    /// Look up the verdict for a code.
    pub fn verdict_for(&self, code: &str) -> Option<&AnalysisVerdict> {
        self.verdicts.iter().find(|v| v.code == code)
    }

    // ========================================================================
    // Coarse Screen
    // ========================================================================

    /// Start a coarse screen.
    ///
    /// Legal from `idle`, `screened` or `filtered`; returns `None` (and
    /// changes nothing) while a request of either phase is in flight. Clears
    /// all held result sets and any prior error: deep-filter results from a
    /// previous screening session are invalid the moment a new screen begins.
    pub fn begin_screen(&mut self) -> Option<ScreenTicket> {
        if !self.state.can_screen() {
            warn!(state = self.state.as_str(), "Rejected screen request");
            return None;
        }

        self.candidates.clear();
        self.clear_filter_results();
        self.error = None;

        self.screen_generation += 1;
        self.filter_generation += 1; // invalidate any stale filter completion
        self.state = WorkflowState::Screening;

        debug!(generation = self.screen_generation, "Screen started");
        Some(ScreenTicket {
            generation: self.screen_generation,
        })
    }

    /// Apply the outcome of a coarse screen.
    ///
    /// Returns `false` when the ticket was superseded and the outcome was
    /// discarded. On success the candidate set is replaced wholesale and the
    /// state becomes `screened` (an empty set is a valid success); on failure
    /// the error is recorded and the state rolls back to `idle`.
    pub fn complete_screen(
        &mut self,
        ticket: &ScreenTicket,
        outcome: Result<ScreenResponse, ClientError>,
    ) -> bool {
        if ticket.generation != self.screen_generation {
            debug!(
                ticket = ticket.generation,
                latest = self.screen_generation,
                "Discarded superseded screen response"
            );
            return false;
        }

        match outcome {
            Ok(response) => {
                debug!(count = response.data.len(), "Screen succeeded");
                self.candidates = response.data;
                self.state = WorkflowState::Screened;
            }
            Err(err) => {
                warn!(error = %err, "Screen failed");
                self.error = Some(err.to_string());
                self.state = WorkflowState::Idle;
            }
        }

        true
    }

    // ========================================================================
    // Deep Filter
    // ========================================================================

    /// Start a deep filter over the held candidate set.
    ///
    /// Legal from `screened` or `filtered` with a non-empty candidate set;
    /// otherwise a strict no-op returning `None` (no request should be
    /// issued). Previously held filter results are retained until a
    /// successful completion replaces them.
    pub fn begin_filter(&mut self) -> Option<FilterTicket> {
        if !self.state.can_filter() {
            warn!(state = self.state.as_str(), "Rejected filter request");
            return None;
        }
        if self.candidates.is_empty() {
            debug!("Filter skipped: empty candidate set");
            return None;
        }

        self.error = None;
        self.filter_generation += 1;
        self.state = WorkflowState::Filtering;

        let codes: Vec<String> = self.candidates.iter().map(|c| c.code.clone()).collect();
        debug!(
            generation = self.filter_generation,
            codes = codes.len(),
            "Filter started"
        );
        Some(FilterTicket {
            generation: self.filter_generation,
            codes,
        })
    }

    /// Apply the outcome of a deep filter.
    ///
    /// Returns `false` when the ticket was superseded and the outcome was
    /// discarded. On success the refined/verdict/AI/environment collections
    /// are replaced and the state becomes `filtered`; on failure the error is
    /// recorded and the state rolls back to `screened`, keeping the candidate
    /// set and any previously held filter results.
    pub fn complete_filter(
        &mut self,
        ticket: &FilterTicket,
        outcome: Result<FilterResponse, ClientError>,
    ) -> bool {
        if ticket.generation != self.filter_generation {
            debug!(
                ticket = ticket.generation,
                latest = self.filter_generation,
                "Discarded superseded filter response"
            );
            return false;
        }

        match outcome {
            Ok(response) => {
                debug!(
                    refined = response.data.len(),
                    verdicts = response.all_analysis.len(),
                    "Filter succeeded"
                );
                self.refined = response.data;
                self.verdicts = response.all_analysis;
                self.ai_ranked = response.ai_selected.unwrap_or_default();
                self.environment = response.market_environment;
                self.state = WorkflowState::Filtered;
            }
            Err(err) => {
                warn!(error = %err, "Filter failed");
                self.error = Some(err.to_string());
                self.state = WorkflowState::Screened;
            }
        }

        true
    }

    // ========================================================================
    // Reset / Error
    // ========================================================================

    /// Return to `idle`, clearing every held collection and the error.
    ///
    /// Legal from any state; bumps both generations so an in-flight
    /// response of either phase is discarded on arrival.
    pub fn reset(&mut self) {
        debug!(state = self.state.as_str(), "Workflow reset");
        self.candidates.clear();
        self.clear_filter_results();
        self.error = None;
        self.screen_generation += 1;
        self.filter_generation += 1;
        self.state = WorkflowState::Idle;
    }

    /// Clear the error without changing state.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn clear_filter_results(&mut self) {
        self.refined.clear();
        self.verdicts.clear();
        self.ai_ranked.clear();
        self.environment = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
