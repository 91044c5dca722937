//! # API Shared
//!
//! Shared wire types for the dashboard APIs.
//!
//! Contains:
//! - The `ApiResponse` success/error envelope used by every JSON endpoint
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` for common functionality.

pub mod envelope;
pub mod health;

pub use envelope::{ApiResponse, ErrorRes, MessageRes};
pub use health::{HealthRes, HealthService};
