//! Constants used throughout the core crate.

/// Clinician whose panel is served when a request does not name one.
pub const DEFAULT_CLINICIAN_ID: &str = "doctor-1";

/// Wearable history window used when a request does not name one.
pub const DEFAULT_TREND_RANGE: &str = "7d";

/// Lifetime of a cohort export download link, in seconds.
pub const EXPORT_LINK_TTL_SECS: i64 = 3600;

/// Download location handed out for cohort exports.
pub const COHORT_EXPORT_URL: &str = "/api/exports/cohort-analytics.csv";
