//! Typed boundary to the remote screening service.
//!
//! The screening and ranking algorithms live server-side; this module only
//! owns the request/response contract: the wire model (`models`) and the
//! HTTP operations with their error taxonomy (`client`).

mod client;
pub mod models;

pub use client::{ClientError, ScreeningClient};
