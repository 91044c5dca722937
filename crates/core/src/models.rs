//! Domain records served by the dashboard.
//!
//! Categorical fields are closed enums so unknown values are rejected when fixtures are
//! loaded or query parameters are decoded, rather than silently matching nothing.
//!
//! All records serialise with camelCase keys, which is the shape the dashboard front-end
//! consumes.

use crate::vendors::{Vendor, VendorConnection};
use crate::{CoreError, CoreResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use utoipa::ToSchema;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Opaque patient identifier.
///
/// The input is trimmed and must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
#[schema(value_type = String)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(input: impl AsRef<str>) -> CoreResult<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "patient id cannot be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// CATEGORICAL VALUES
// ============================================================================

/// Recorded sex of a patient.
///
/// Parsing is case-insensitive: `"Female"`, `"female"` and `"FEMALE"` are the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
    Other,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
            Sex::Other => "other",
        }
    }
}

impl FromStr for Sex {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            "other" => Ok(Sex::Other),
            _ => Err(CoreError::InvalidCriterion {
                field: "sex",
                value: s.to_owned(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A sex value as it was recorded or requested, spelling included.
///
/// Serialises back to the original spelling (`"Female"` stays `"Female"`); equality and
/// hashing use the normalised [`Sex`], so `"Female"` and `"female"` are the same value.
#[derive(Clone, Debug)]
pub struct RecordedSex {
    sex: Sex,
    label: String,
}

impl RecordedSex {
    pub fn new(label: impl Into<String>) -> CoreResult<Self> {
        let label = label.into();
        let sex = label.parse()?;
        Ok(Self { sex, label })
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// The spelling the value arrived with.
    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl From<Sex> for RecordedSex {
    fn from(sex: Sex) -> Self {
        Self {
            sex,
            label: sex.as_str().to_owned(),
        }
    }
}

impl PartialEq for RecordedSex {
    fn eq(&self, other: &Self) -> bool {
        self.sex == other.sex
    }
}

impl Eq for RecordedSex {}

impl PartialEq<Sex> for RecordedSex {
    fn eq(&self, other: &Sex) -> bool {
        self.sex == *other
    }
}

impl Hash for RecordedSex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sex.hash(state);
    }
}

impl FromStr for RecordedSex {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::new(s)
    }
}

impl Serialize for RecordedSex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for RecordedSex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// Overall risk band. Parsed exactly: only the lowercase spellings are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            _ => Err(CoreError::InvalidCriterion {
                field: "riskLevel",
                value: s.to_owned(),
            }),
        }
    }
}

/// Connectivity state of a patient's linked wearable. Parsed exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WearableStatus {
    Active,
    Inactive,
    Partial,
    Pending,
    Error,
}

impl WearableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WearableStatus::Active => "active",
            WearableStatus::Inactive => "inactive",
            WearableStatus::Partial => "partial",
            WearableStatus::Pending => "pending",
            WearableStatus::Error => "error",
        }
    }
}

impl FromStr for WearableStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "active" => Ok(WearableStatus::Active),
            "inactive" => Ok(WearableStatus::Inactive),
            "partial" => Ok(WearableStatus::Partial),
            "pending" => Ok(WearableStatus::Pending),
            "error" => Ok(WearableStatus::Error),
            _ => Err(CoreError::InvalidCriterion {
                field: "wearableStatus",
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskModel {
    Cvd10y,
    T2d5y,
    CancerProxy,
    Neuro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Steps,
    Hrv,
    SleepQuality,
    Vo2max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BiomarkerStatus {
    Optimal,
    Normal,
    Elevated,
    Low,
}

/// Status label for a longevity risk category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FactorDirection {
    Positive,
    Negative,
}

// ============================================================================
// PEOPLE
// ============================================================================

/// A clinician and the roster of patients under their care.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Clinician {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub license_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: NaiveDate,
    pub patients: Vec<PatientId>,
}

/// The per-patient row shown on the clinician panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientSummary {
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    #[schema(value_type = String)]
    pub sex: RecordedSex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub overall_risk: RiskLevel,
    #[serde(default)]
    pub risk_scores: Vec<RiskScore>,
    pub last_visit: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<NaiveDate>,
    #[serde(default)]
    pub recent_biomarkers: Vec<Biomarker>,
    pub wearable_status: WearableStatus,
    /// Percentage of prescribed doses taken, in `[0, 100]`.
    pub medication_compliance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientProfile {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub date_of_birth: NaiveDate,
    #[schema(value_type = String)]
    pub sex: RecordedSex,
    pub height_cm: u32,
    pub weight_kg: f64,
    pub doctor_id: String,
    pub created_at: NaiveDate,
}

// ============================================================================
// RISK
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RiskScore {
    pub id: String,
    pub model: RiskModel,
    pub score: f64,
    pub band: RiskLevel,
    /// 95% confidence interval as `[lower, upper]`.
    #[schema(value_type = Vec<f64>)]
    pub ci95: [f64; 2],
    pub computed_at: NaiveDate,
}

/// Percentile-based longevity risk for one organ system (lower is better).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RiskCategory {
    pub id: String,
    pub name: String,
    pub score: u8,
    pub status: CategoryStatus,
    pub description: String,
    pub factors: Vec<String>,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RiskFactor {
    pub factor: String,
    pub impact: f64,
    pub direction: FactorDirection,
    pub description: String,
    pub intervention: String,
}

/// SHAP-style attribution of one feature to a risk prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShapFactor {
    pub feature: String,
    /// Signed contribution in `[-1, 1]`.
    pub impact: f64,
    pub value: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecisionSupport {
    pub patient_id: PatientId,
    pub top_factors: Vec<ShapFactor>,
    pub recommendations: Vec<String>,
    pub guidelines: Vec<String>,
    pub confidence: u8,
    pub last_updated: NaiveDate,
}

// ============================================================================
// WEARABLES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WearableMetric {
    pub id: String,
    pub vendor: Vendor,
    pub metric: MetricKind,
    pub value: f64,
    pub unit: String,
    pub measured_at: NaiveDate,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WearableTrend {
    pub metric: String,
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    pub change_percent: f64,
    pub trend: TrendDirection,
    pub unit: String,
}

/// One day of aggregated wearable readings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub steps: u32,
    pub hrv: f64,
    pub sleep: f64,
    pub vo2max: f64,
}

// ============================================================================
// LABS AND MEDICATION
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Biomarker {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: ReferenceRange,
    pub status: BiomarkerStatus,
    pub measured_at: NaiveDate,
    pub lab_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BiomarkerTimelinePoint {
    pub date: NaiveDate,
    #[serde(rename = "apoB")]
    pub apo_b: f64,
    pub hba1c: f64,
    pub hs_crp: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub prescribed_by: String,
    pub indication: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// ENGAGEMENT
// ============================================================================

/// Area of health a habit, badge or nudge belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Exercise,
    Nutrition,
    Sleep,
    Stress,
    Medication,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Habit {
    pub id: String,
    pub user_id: PatientId,
    pub name: String,
    pub description: String,
    pub category: HabitCategory,
    pub target: f64,
    pub unit: String,
    pub frequency: HabitFrequency,
    pub streak: u32,
    pub longest_streak: u32,
    pub completed_today: bool,
    pub created_at: NaiveDate,
}

/// An achievement; `earned_at` is unset until the patient earns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: HabitCategory,
    pub requirement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_at: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NudgeKind {
    Habit,
    HealthTip,
    MedicationReminder,
    Appointment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NudgePriority {
    Low,
    Medium,
    High,
}

/// A prompt shown on the patient dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Nudge {
    pub id: String,
    pub user_id: PatientId,
    #[serde(rename = "type")]
    pub kind: NudgeKind,
    pub title: String,
    pub message: String,
    pub priority: NudgePriority,
    pub category: HabitCategory,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_at: Option<NaiveDateTime>,
}

// ============================================================================
// PATIENT RECORD BUNDLE
// ============================================================================

/// Everything the patient-facing views need for a single patient.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientRecord {
    pub profile: PatientProfile,
    pub overall_risk: RiskLevel,
    /// Population percentile of the combined longevity risk.
    pub risk_percentile: u8,
    pub risk_scores: Vec<RiskScore>,
    pub risk_categories: Vec<RiskCategory>,
    pub risk_factors: Vec<RiskFactor>,
    pub wearable_metrics: Vec<WearableMetric>,
    pub wearable_trends: Vec<WearableTrend>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub biomarkers: Vec<Biomarker>,
    pub biomarker_timeline: Vec<BiomarkerTimelinePoint>,
    pub medications: Vec<Medication>,
    pub decision_support: DecisionSupport,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub nudges: Vec<Nudge>,
    pub vendors: Vec<VendorConnection>,
}

impl PatientRecord {
    pub fn id(&self) -> &PatientId {
        &self.profile.id
    }
}
