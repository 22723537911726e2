//! # folio-api
//!
//! Content service and HTTP API for Folio.
//!
//! This crate provides:
//! - [`ContentService`]: directory listings, document reads, search and
//!   reindexing over one corpus root
//! - [`server`]: the axum router exposing those operations as JSON
//! - [`ApiError`]: mapping of service errors to HTTP responses

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod server;
pub mod service;

pub use error::ApiError;
pub use server::{AppState, router, serve};
pub use service::{ContentService, HealthReport, SERVICE_NAME, ServiceConfig};
