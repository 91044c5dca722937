//! Patient-facing views assembled from a stored [`PatientRecord`].

use crate::models::{
    Badge, Biomarker, BiomarkerTimelinePoint, DecisionSupport, Habit, Medication, Nudge,
    PatientId, PatientProfile,
    PatientRecord, RiskCategory, RiskFactor, RiskLevel, RiskScore, TimeSeriesPoint,
    WearableMetric, WearableTrend,
};
use crate::vendors::VendorSummary;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// History window for wearable time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendRange {
    Day,
    Week,
    Month,
    Quarter,
}

impl TrendRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendRange::Day => "24h",
            TrendRange::Week => "7d",
            TrendRange::Month => "30d",
            TrendRange::Quarter => "90d",
        }
    }

    pub fn days(self) -> usize {
        match self {
            TrendRange::Day => 1,
            TrendRange::Week => 7,
            TrendRange::Month => 30,
            TrendRange::Quarter => 90,
        }
    }
}

impl FromStr for TrendRange {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "24h" => Ok(TrendRange::Day),
            "7d" => Ok(TrendRange::Week),
            "30d" => Ok(TrendRange::Month),
            "90d" => Ok(TrendRange::Quarter),
            _ => Err(CoreError::InvalidInput(format!("unknown range {s:?}"))),
        }
    }
}

impl Serialize for TrendRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard<'a> {
    pub patient: &'a PatientProfile,
    pub risk_scores: &'a [RiskScore],
    pub wearable_data: &'a [WearableMetric],
    pub wearable_trends: &'a [WearableTrend],
    pub habits: &'a [Habit],
    pub badges: &'a [Badge],
    pub nudges: &'a [Nudge],
    pub vendors: Vec<VendorSummary>,
}

pub fn dashboard(record: &PatientRecord) -> PatientDashboard<'_> {
    PatientDashboard {
        patient: &record.profile,
        risk_scores: &record.risk_scores,
        wearable_data: &record.wearable_metrics,
        wearable_trends: &record.wearable_trends,
        habits: &record.habits,
        badges: &record.badges,
        nudges: &record.nudges,
        vendors: record.vendors.iter().map(VendorSummary::from).collect(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WearableReport<'a> {
    pub metrics: &'a [WearableMetric],
    pub trends: &'a [WearableTrend],
    pub time_series_data: &'a [TimeSeriesPoint],
    pub range: TrendRange,
}

/// Wearable readings with the time series truncated to at most `range` days.
pub fn wearable_report(record: &PatientRecord, range: TrendRange) -> WearableReport<'_> {
    let days = range.days().min(record.time_series.len());
    WearableReport {
        metrics: &record.wearable_metrics,
        trends: &record.wearable_trends,
        time_series_data: &record.time_series[..days],
        range,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport<'a> {
    pub patient_id: &'a PatientId,
    pub timestamp: DateTime<Utc>,
    pub risk_categories: &'a [RiskCategory],
    pub overall_risk: RiskLevel,
    /// Population percentile (lower is better).
    pub risk_score: u8,
    pub last_updated: DateTime<Utc>,
    pub factors: &'a [RiskFactor],
}

pub fn risk_report(record: &PatientRecord, now: DateTime<Utc>) -> RiskReport<'_> {
    RiskReport {
        patient_id: record.id(),
        timestamp: now,
        risk_categories: &record.risk_categories,
        overall_risk: record.overall_risk,
        risk_score: record.risk_percentile,
        last_updated: now,
        factors: &record.risk_factors,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerReport<'a> {
    pub current: &'a [Biomarker],
    pub timeline: &'a [BiomarkerTimelinePoint],
    pub medications: &'a [Medication],
    pub decision_support: &'a DecisionSupport,
}

pub fn biomarker_report(record: &PatientRecord) -> BiomarkerReport<'_> {
    BiomarkerReport {
        current: &record.biomarkers,
        timeline: &record.biomarker_timeline,
        medications: &record.medications,
        decision_support: &record.decision_support,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FixtureStore;

    #[test]
    fn range_parses_known_windows_only() {
        assert_eq!("7d".parse::<TrendRange>().unwrap(), TrendRange::Week);
        assert_eq!("90d".parse::<TrendRange>().unwrap().days(), 90);
        assert!("1y".parse::<TrendRange>().is_err());
    }

    #[test]
    fn wearable_series_is_truncated_to_range() {
        let store = FixtureStore::demo().unwrap();
        let record = store.patient_record("patient-1").unwrap();
        assert_eq!(record.time_series.len(), 8);

        assert_eq!(wearable_report(record, TrendRange::Day).time_series_data.len(), 1);
        assert_eq!(wearable_report(record, TrendRange::Week).time_series_data.len(), 7);
        let month = wearable_report(record, TrendRange::Month);
        assert_eq!(month.time_series_data.len(), 8);

        let json = serde_json::to_value(&month).unwrap();
        assert_eq!(json["range"], "30d");
        assert_eq!(json["timeSeriesData"][0]["date"], "2024-12-04");
    }

    #[test]
    fn dashboard_resolves_vendor_names() {
        let store = FixtureStore::demo().unwrap();
        let record = store.patient_record("patient-1").unwrap();
        let json = serde_json::to_value(dashboard(record)).unwrap();
        assert_eq!(json["patient"]["id"], "patient-1");
        assert_eq!(json["vendors"][0]["name"], "Apple Health");
        assert_eq!(json["vendors"][3]["status"], "not_linked");
        assert_eq!(json["riskScores"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn dashboard_includes_engagement() {
        let store = FixtureStore::demo().unwrap();
        let record = store.patient_record("patient-1").unwrap();
        let json = serde_json::to_value(dashboard(record)).unwrap();

        assert_eq!(json["habits"].as_array().unwrap().len(), 3);
        assert_eq!(json["habits"][0]["category"], "exercise");
        assert_eq!(json["habits"][0]["longestStreak"], 28);
        assert_eq!(json["badges"][0]["earnedAt"], "2024-08-20");
        assert!(json["badges"][1].get("earnedAt").is_none());
        assert_eq!(json["nudges"][2]["type"], "medication_reminder");
        assert_eq!(json["nudges"][2]["createdAt"], "2024-08-30T18:00:00");
    }

    #[test]
    fn risk_report_uses_record_percentile() {
        let store = FixtureStore::demo().unwrap();
        let record = store.patient_record("patient-1").unwrap();
        let now = Utc::now();
        let report = risk_report(record, now);
        assert_eq!(report.risk_score, 25);
        assert_eq!(report.overall_risk, RiskLevel::Low);
        assert_eq!(report.timestamp, now);
        assert_eq!(report.risk_categories[0].id, "cardiovascular");
    }
}
