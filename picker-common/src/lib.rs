//! Shared infrastructure for the ashare-picker client.
//!
//! Provides the unified configuration file handling and structured logging
//! setup used by the picker binary and its library crate.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
