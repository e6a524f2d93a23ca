//! HTTP adapter for the cross-sell backend.
//!
//! [`HttpBackend`] implements [`xsell_core::DashboardBackend`] over the JSON
//! endpoints the recommendation service exposes, validating each body before
//! handing it to the dashboard.

mod http;
mod wire;

pub use http::HttpBackend;
