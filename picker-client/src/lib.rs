//! A-Share Tail-Session Picker Client
//!
//! Client for a two-stage A-share stock selection service: a fast coarse
//! screen over live market snapshots followed by a deep technical / AI filter
//! over the surviving candidates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      picker (client)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
//! │  │  Workflow    │  │  Screening   │  │  Chart       │       │
//! │  │  FSM + driver│──│  Client      │  │  Geometry    │       │
//! │  └──────────────┘  └──────────────┘  └──────────────┘       │
//! │          │                 │                 │              │
//! │          └────────── view (text report) ─────┘              │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │ HTTP/JSON
//!                    screening service (:8000)
//! ```
//!
//! # Key Concepts
//!
//! ## Two-phase workflow
//! - **Screen**: server-side coarse filter on change %, volume ratio and
//!   free-float market cap; yields a candidate set
//! - **Filter**: per-candidate technical analysis (stepped volume, MA5
//!   position, hot sector) plus an optional AI ranking pass
//!
//! ## State machine
//! Phases are strictly sequential. The controller rejects re-entrant or
//! out-of-order starts and discards completions that a `reset` superseded,
//! so the held results always describe a single coherent run.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod api;
pub mod chart;
pub mod view;
pub mod workflow;

pub use api::{ClientError, ScreeningClient};
pub use chart::MinuteSeries;
pub use workflow::{Workflow, WorkflowController, WorkflowState};
