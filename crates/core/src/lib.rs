//! # Longevity Core
//!
//! Core domain logic for the longevity dashboard.
//!
//! This crate contains pure data operations over a read-only fixture store:
//! - Cohort filtering and panel summary statistics for clinicians
//! - Population analytics breakdowns
//! - Patient-facing dashboard, wearable, risk and biomarker views
//! - Wearable vendor catalogue and account-linking redirects
//!
//! **No API concerns**: HTTP servers, status codes and response envelopes belong in
//! `api-rest` or `api-shared`.

pub mod analytics;
pub mod cohort;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod patient;
pub mod store;
pub mod vendors;

pub use cohort::{compute_cohort_view, CohortSummary, CohortView, Criterion, FilterCriteria};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use models::{PatientId, PatientSummary, RecordedSex, RiskLevel, Sex, WearableStatus};
pub use store::FixtureStore;
pub use vendors::{link_vendor, Vendor};
