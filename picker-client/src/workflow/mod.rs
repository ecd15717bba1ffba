//! Two-phase selection workflow.
//!
//! The workflow is a small finite-state machine coordinating two sequential,
//! dependent service calls:
//!
//! ```text
//!            startScreen              startFilter
//!   idle ──────────────► screening ─┐
//!    ▲                              │ ok
//!    │ err                          ▼
//!    └────────────────── screened ──────────► filtering
//!                           ▲                     │
//!                           │ err                 │ ok
//!                           └───── filtered ◄─────┘
//! ```
//!
//! `reset` returns to `idle` from any state. The controller itself is pure
//! (`controller`); the async round trips against the service are performed
//! by the driver (`driver`).

mod controller;
mod driver;

pub use controller::{FilterTicket, ScreenTicket, WorkflowController};
pub use driver::Workflow;

use serde::{Deserialize, Serialize};

/// Workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing fetched yet (or after reset / failed screen)
    Idle,
    /// Coarse screen request in flight
    Screening,
    /// Candidate set held, no deep-filter results yet
    Screened,
    /// Deep filter request in flight
    Filtering,
    /// Deep-filter results held
    Filtered,
}

impl WorkflowState {
    /// Whether a coarse screen may be started.
    ///
    /// Never while either phase is in flight: duplicate submissions are
    /// rejected, not queued.
    pub fn can_screen(&self) -> bool {
        matches!(self, Self::Idle | Self::Screened | Self::Filtered)
    }

    /// Whether a deep filter may be started.
    ///
    /// Requires a completed screen; the controller additionally requires a
    /// non-empty candidate set.
    pub fn can_filter(&self) -> bool {
        matches!(self, Self::Screened | Self::Filtered)
    }

    /// Whether a request is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Screening | Self::Filtering)
    }

    /// Stable lowercase name (for logs and state display).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Screening => "screening",
            Self::Screened => "screened",
            Self::Filtering => "filtering",
            Self::Filtered => "filtered",
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Idle
    }
}
