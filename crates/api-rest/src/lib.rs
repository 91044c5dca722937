//! # API REST
//!
//! REST API for the longevity dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, status codes, CORS)
//!
//! Uses `api-shared` for envelope types and `longevity-core` for all domain logic.

#![warn(rust_2018_idioms)]

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use longevity_core::{CoreConfig, FixtureStore};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by every request handler.
///
/// Both members are read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub store: Arc<FixtureStore>,
}

impl AppState {
    pub fn new(cfg: CoreConfig, store: FixtureStore) -> Self {
        Self {
            cfg: Arc::new(cfg),
            store: Arc::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::doctor_panel,
        handlers::cohort_analytics,
        handlers::cohort_action,
        handlers::patient_dashboard,
        handlers::patient_wearables,
        handlers::patient_risk,
        handlers::update_patient_risk,
        handlers::patient_biomarkers,
        handlers::link_patient_vendor,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::MessageRes,
        handlers::CohortActionReq,
        handlers::ExportRes,
        handlers::RiskUpdateRes,
        handlers::LinkVendorReq,
        longevity_core::FilterCriteria,
        longevity_core::CohortSummary,
        longevity_core::PatientSummary,
        longevity_core::models::Habit,
        longevity_core::models::HabitCategory,
        longevity_core::models::HabitFrequency,
        longevity_core::models::Badge,
        longevity_core::models::Nudge,
        longevity_core::models::NudgeKind,
        longevity_core::models::NudgePriority,
        longevity_core::vendors::VendorLink,
    ))
)]
pub struct ApiDoc;

/// Build the full application router over `state`.
///
/// Used by both the standalone binary and the workspace's `longevity-run` binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/doctor/panel", get(handlers::doctor_panel))
        .route(
            "/api/cohort/analytics",
            get(handlers::cohort_analytics).post(handlers::cohort_action),
        )
        .route("/api/patient/:id", get(handlers::patient_dashboard))
        .route("/api/patient/:id/wearables", get(handlers::patient_wearables))
        .route(
            "/api/patient/:id/risk",
            get(handlers::patient_risk).post(handlers::update_patient_risk),
        )
        .route("/api/patient/:id/biomarkers", get(handlers::patient_biomarkers))
        .route("/api/patient/:id/link-vendor", post(handlers::link_patient_vendor))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
