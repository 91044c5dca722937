//! Request handlers for the REST API.
//!
//! Handlers decode the request, call into `longevity-core`, and wrap the result in the
//! shared JSON envelopes. Views that borrow from the store are serialised inside the
//! handler with `into_response`, so nothing outlives the borrowed state.

use crate::AppState;
use api_shared::{ApiResponse, ErrorRes, HealthRes, HealthService, MessageRes};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Duration, Utc};
use longevity_core::{
    analytics::{
        compute_cohort_breakdown, raise_alerts, CohortBreakdown, CohortDistribution,
        CohortTrends, LongevityMetrics, RaisedAlert,
    },
    cohort::Criterion,
    constants::{COHORT_EXPORT_URL, DEFAULT_TREND_RANGE, EXPORT_LINK_TTL_SECS},
    models::{Clinician, PatientId},
    patient::{biomarker_report, dashboard, risk_report, wearable_report, TrendRange},
    vendors::VendorLink,
    compute_cohort_view, link_vendor, CohortSummary, CoreError, FilterCriteria, PatientSummary,
    RiskLevel, Vendor,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Error half of every handler result.
pub type Rejection = (StatusCode, Json<ErrorRes>);

const INTERNAL_ERROR: &str = "Internal server error";
const PATIENT_NOT_FOUND: &str = "Patient not found";

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(ErrorRes::new(message)))
}

fn internal(context: &str, err: impl std::fmt::Debug, message: &str) -> Rejection {
    tracing::error!("{context}: {err:?}");
    reject(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Map a patient lookup failure to 404, anything else to a generic 500.
fn patient_lookup(err: CoreError) -> Rejection {
    match err {
        CoreError::PatientNotFound(id) => {
            tracing::debug!(patient = %id, "patient not found");
            reject(StatusCode::NOT_FOUND, PATIENT_NOT_FOUND)
        }
        other => internal("Patient lookup error", other, INTERNAL_ERROR),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// HEALTH
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used for monitoring and load balancer checks.
///
/// # Returns
/// `200 OK` with the service liveness flag. This endpoint never fails.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

// ============================================================================
// CLINICIAN PANEL
// ============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PanelQuery {
    /// Clinician whose roster is listed; defaults to the configured clinician.
    pub doctor_id: Option<String>,
    /// `all` or a sex value, both matched case-insensitively.
    pub sex: Option<String>,
    /// `all`, `low`, `moderate` or `high`, exact lowercase.
    pub risk_level: Option<String>,
    /// `all` or a wearable status such as `active`, exact lowercase.
    pub wearable_status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelData<'a> {
    doctor: &'a Clinician,
    patients: Vec<&'a PatientSummary>,
    summary: CohortSummary,
    filters: FilterCriteria,
}

#[utoipa::path(
    get,
    path = "/api/doctor/panel",
    params(PanelQuery),
    responses(
        (status = 200, description = "Filtered clinician panel with summary statistics"),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Filtered patient panel for a clinician.
///
/// Applies the sex, risk level and wearable status filters to the clinician's roster and
/// returns the matched patients with their summary statistics.
///
/// # Returns
/// `200 OK` with the clinician, the matched patients in roster order, their summary and the
/// applied filters echoed as requested.
///
/// # Errors
/// Returns `500 Internal Server Error` if:
/// - the query string cannot be decoded, for example a repeated parameter,
/// - a filter value is not recognised, or
/// - the clinician is unknown.
#[axum::debug_handler]
pub async fn doctor_panel(
    State(state): State<AppState>,
    query: Result<Query<PanelQuery>, QueryRejection>,
) -> Result<Response, Rejection> {
    let Query(query) = query.map_err(|e| internal("Panel query error", e, INTERNAL_ERROR))?;
    let criteria = FilterCriteria::from_params(
        query.sex.as_deref(),
        query.risk_level.as_deref(),
        query.wearable_status.as_deref(),
    )
    .map_err(|e| internal("Panel filter error", e, INTERNAL_ERROR))?;

    let doctor_id =
        non_empty(query.doctor_id).unwrap_or_else(|| state.cfg.default_clinician_id().into());
    let doctor = state
        .store
        .clinician(&doctor_id)
        .map_err(|e| internal("Panel clinician error", e, INTERNAL_ERROR))?;

    let view = compute_cohort_view(state.store.panel(doctor), &criteria);
    let data = PanelData {
        doctor,
        patients: view.matched,
        summary: view.summary,
        filters: criteria,
    };

    Ok(Json(ApiResponse::ok(data)).into_response())
}

// ============================================================================
// COHORT ANALYTICS
// ============================================================================

const ANALYTICS_ERROR: &str = "Failed to fetch cohort analytics";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    pub age_group: Option<String>,
    pub condition: Option<String>,
    /// `all`, `low`, `moderate` or `high`.
    pub risk_level: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsFilters {
    age_group: String,
    condition: String,
    risk_level: Criterion<RiskLevel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CohortAnalyticsRes<'a> {
    filters: AnalyticsFilters,
    summary: &'a CohortDistribution,
    #[serde(flatten)]
    breakdown: CohortBreakdown,
    longevity_metrics: &'a LongevityMetrics,
    trends: &'a CohortTrends,
    alerts: Vec<RaisedAlert>,
    last_updated: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/cohort/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Population analytics for the whole registry"),
        (status = 500, description = "Failed to fetch cohort analytics", body = ErrorRes)
    )
)]
/// Registry-wide analytics: risk, age and condition breakdowns, trends and alerts.
///
/// # Returns
/// `200 OK` with the un-enveloped analytics document and the echoed filters.
///
/// # Errors
/// Returns `500 Internal Server Error` if the query string cannot be decoded or the risk
/// level is not recognised.
#[axum::debug_handler]
pub async fn cohort_analytics(
    State(state): State<AppState>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Response, Rejection> {
    let Query(query) =
        query.map_err(|e| internal("Cohort analytics query error", e, ANALYTICS_ERROR))?;
    let risk_level = Criterion::<RiskLevel>::parse(query.risk_level.as_deref())
        .map_err(|e| internal("Cohort analytics filter error", e, ANALYTICS_ERROR))?;

    let now = Utc::now();
    let distribution = state.store.cohort_distribution();
    let res = CohortAnalyticsRes {
        filters: AnalyticsFilters {
            age_group: non_empty(query.age_group).unwrap_or_else(|| "all".into()),
            condition: non_empty(query.condition).unwrap_or_else(|| "all".into()),
            risk_level,
        },
        summary: distribution,
        breakdown: compute_cohort_breakdown(distribution),
        longevity_metrics: &distribution.longevity_metrics,
        trends: state.store.cohort_trends(),
        alerts: raise_alerts(state.store.cohort_alerts(), now),
        last_updated: now,
    };

    Ok(Json(res).into_response())
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CohortActionReq {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filters: Option<serde_json::Value>,
    #[serde(default)]
    pub export_format: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportRes {
    pub success: bool,
    pub message: String,
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/api/cohort/analytics",
    request_body = CohortActionReq,
    responses(
        (status = 200, description = "Export initiated or filters saved", body = ExportRes),
        (status = 500, description = "Failed to process request", body = ErrorRes)
    )
)]
/// Start a cohort export, or save the supplied filters when no export format is given.
///
/// # Returns
/// `200 OK` with an expiring download link when `exportFormat` is set, otherwise a
/// `"Cohort filters saved"` acknowledgement.
///
/// # Errors
/// Returns `500 Internal Server Error` if the body is not valid JSON of the expected shape.
#[axum::debug_handler]
pub async fn cohort_action(
    State(_state): State<AppState>,
    body: Result<Json<CohortActionReq>, JsonRejection>,
) -> Result<Response, Rejection> {
    let Json(req) =
        body.map_err(|e| internal("Cohort request error", e, "Failed to process request"))?;

    match non_empty(req.export_format) {
        Some(format) => {
            tracing::info!(%format, filters = ?req.filters, "exporting cohort data");
            let res = ExportRes {
                success: true,
                message: "Export initiated".into(),
                download_url: COHORT_EXPORT_URL.into(),
                expires_at: Utc::now() + Duration::seconds(EXPORT_LINK_TTL_SECS),
            };
            Ok(Json(res).into_response())
        }
        None => Ok(Json(MessageRes::new("Cohort filters saved")).into_response()),
    }
}

// ============================================================================
// PATIENT VIEWS
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/patient/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient dashboard bundle"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Dashboard bundle for one patient: profile, risk scores, wearables and vendors.
///
/// # Returns
/// `200 OK` with the profile, risk scores, wearable metrics, habits, badges, nudges and
/// vendor connections.
///
/// # Errors
/// - `404 Not Found` if the patient is unknown.
#[axum::debug_handler]
pub async fn patient_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, Rejection> {
    let record = state.store.patient_record(&id).map_err(patient_lookup)?;
    Ok(Json(ApiResponse::ok(dashboard(record))).into_response())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WearablesQuery {
    /// One of `24h`, `7d`, `30d` or `90d`; defaults to `7d`.
    pub range: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/patient/{id}/wearables",
    params(("id" = String, Path, description = "Patient identifier"), WearablesQuery),
    responses(
        (status = 200, description = "Wearable metrics, trends and time series"),
        (status = 400, description = "Unknown range", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Wearable metrics for one patient over the requested range.
///
/// # Returns
/// `200 OK` with the current metrics, trends and the time series truncated to the range.
///
/// # Errors
/// - `400 Bad Request` if the query cannot be decoded or the range is unknown.
/// - `404 Not Found` if the patient is unknown.
#[axum::debug_handler]
pub async fn patient_wearables(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<WearablesQuery>, QueryRejection>,
) -> Result<Response, Rejection> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!("Wearables query error: {e:?}");
        reject(StatusCode::BAD_REQUEST, "Invalid range")
    })?;
    let range = non_empty(query.range)
        .as_deref()
        .unwrap_or(DEFAULT_TREND_RANGE)
        .parse::<TrendRange>()
        .map_err(|e| {
            tracing::debug!("Invalid wearables range: {e}");
            reject(StatusCode::BAD_REQUEST, "Invalid range")
        })?;

    let record = state.store.patient_record(&id).map_err(patient_lookup)?;
    Ok(Json(ApiResponse::ok(wearable_report(record, range))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/patient/{id}/risk",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Longevity risk categories and contributing factors"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Longevity risk profile for one patient.
///
/// # Returns
/// `200 OK` with the risk categories, contributing factors and assessment time.
///
/// # Errors
/// - `404 Not Found` if the patient is unknown.
#[axum::debug_handler]
pub async fn patient_risk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, Rejection> {
    let record = state.store.patient_record(&id).map_err(patient_lookup)?;
    Ok(Json(risk_report(record, Utc::now())).into_response())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskUpdateRes {
    pub success: bool,
    pub message: String,
    #[schema(value_type = String)]
    pub patient_id: PatientId,
}

#[utoipa::path(
    post,
    path = "/api/patient/{id}/risk",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Risk assessment update acknowledged", body = RiskUpdateRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Failed to update patient risk", body = ErrorRes)
    )
)]
/// Acknowledge new inputs for a patient's risk assessment.
///
/// Risk models are not evaluated here; the submitted payload is logged and acknowledged.
///
/// # Returns
/// `200 OK` with the acknowledgement and the patient id.
///
/// # Errors
/// - `404 Not Found` if the patient is unknown.
/// - `500 Internal Server Error` if the body is not valid JSON.
#[axum::debug_handler]
pub async fn update_patient_risk(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<RiskUpdateRes>, Rejection> {
    let Json(payload) =
        body.map_err(|e| internal("Risk update body error", e, "Failed to update patient risk"))?;
    let record = state.store.patient_record(&id).map_err(patient_lookup)?;

    tracing::info!(patient = %record.id(), %payload, "risk assessment update received");
    Ok(Json(RiskUpdateRes {
        success: true,
        message: "Risk assessment updated".into(),
        patient_id: record.id().clone(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/patient/{id}/biomarkers",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Biomarkers, lab timeline, medications and decision support"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Current biomarkers and lab history for one patient.
///
/// # Returns
/// `200 OK` with current biomarkers, the lab timeline, medications and decision support.
///
/// # Errors
/// - `404 Not Found` if the patient is unknown.
#[axum::debug_handler]
pub async fn patient_biomarkers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, Rejection> {
    let record = state.store.patient_record(&id).map_err(patient_lookup)?;
    Ok(Json(ApiResponse::ok(biomarker_report(record))).into_response())
}

// ============================================================================
// VENDOR LINKING
// ============================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LinkVendorReq {
    /// Vendor id such as `fitbit` or `apple-health`.
    #[serde(default)]
    pub vendor: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/patient/{id}/link-vendor",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = LinkVendorReq,
    responses(
        (status = 200, description = "Authorisation redirect for the vendor", body = VendorLink),
        (status = 400, description = "Vendor missing or unsupported", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Resolve the authorisation redirect for linking a wearable vendor to a patient.
///
/// # Returns
/// `200 OK` with the vendor's authorisation URL and a redirect message.
///
/// # Errors
/// - `400 Bad Request` if the body is malformed, the vendor is missing, or the vendor is
///   not supported.
/// - `404 Not Found` if the patient is unknown.
#[axum::debug_handler]
pub async fn link_patient_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<LinkVendorReq>, JsonRejection>,
) -> Result<Response, Rejection> {
    let Json(req) = body.map_err(|e| {
        tracing::debug!("Link vendor body error: {e:?}");
        reject(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;

    let Some(raw) = non_empty(req.vendor) else {
        return Err(reject(StatusCode::BAD_REQUEST, "Vendor is required"));
    };
    let vendor = raw.parse::<Vendor>().map_err(|e| {
        tracing::debug!("{e}");
        reject(StatusCode::BAD_REQUEST, "Unsupported vendor")
    })?;

    let record = state.store.patient_record(&id).map_err(patient_lookup)?;
    Ok(Json(ApiResponse::ok(link_vendor(record.id().clone(), vendor))).into_response())
}
