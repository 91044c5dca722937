//! Population-level cohort analytics for the clinician dashboard.
//!
//! The registry totals come from the fixture store; this module derives the percentage
//! breakdowns shown alongside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RiskDistribution {
    pub low: u32,
    pub moderate: u32,
    pub high: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgeGroupCount {
    pub age_group: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConditionCount {
    pub condition: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LongevityMetrics {
    pub average_biological_age: f64,
    pub average_chronological_age: f64,
    pub healthspan_projection: f64,
    /// Patients in the top decile across all tracked metrics.
    pub top_performers: u32,
}

/// Registry-wide counts for the whole patient population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CohortDistribution {
    pub total_patients: u32,
    pub risk_distribution: RiskDistribution,
    pub age_groups: Vec<AgeGroupCount>,
    pub conditions: Vec<ConditionCount>,
    pub longevity_metrics: LongevityMetrics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BiomarkerTrends {
    pub apob: Vec<f64>,
    pub hba1c: Vec<f64>,
    pub hscrp: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CohortTrends {
    pub monthly_new_patients: Vec<u32>,
    pub risk_improvements: Vec<u32>,
    pub avg_biomarker_trends: BiomarkerTrends,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HighRisk,
    DecliningTrend,
    MedicationCompliance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

/// A cohort-level alert as configured in fixtures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CohortAlert {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub priority: AlertPriority,
    pub patient_count: u32,
}

/// An alert stamped with the time it was raised.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaisedAlert {
    #[serde(flatten)]
    pub alert: CohortAlert,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskShare {
    #[schema(value_type = String)]
    pub name: &'static str,
    pub value: u32,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgeShare {
    pub age_group: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionPrevalence {
    pub condition: String,
    pub count: u32,
    pub prevalence: f64,
}

/// Percentage breakdowns derived from a [`CohortDistribution`].
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CohortBreakdown {
    pub risk_distribution: Vec<RiskShare>,
    pub age_distribution: Vec<AgeShare>,
    pub condition_prevalence: Vec<ConditionPrevalence>,
}

/// Share of `count` in `total` as a percentage rounded to one decimal place.
///
/// An empty population yields `0.0`.
pub fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = f64::from(count) / f64::from(total) * 100.0;
    (pct * 10.0).round() / 10.0
}

pub fn compute_cohort_breakdown(dist: &CohortDistribution) -> CohortBreakdown {
    let total = dist.total_patients;
    let risk = &dist.risk_distribution;

    let risk_distribution = [
        ("Low Risk", risk.low),
        ("Moderate Risk", risk.moderate),
        ("High Risk", risk.high),
    ]
    .into_iter()
    .map(|(name, value)| RiskShare {
        name,
        value,
        percentage: percentage(value, total),
    })
    .collect();

    let age_distribution = dist
        .age_groups
        .iter()
        .map(|g| AgeShare {
            age_group: g.age_group.clone(),
            count: g.count,
            percentage: percentage(g.count, total),
        })
        .collect();

    let condition_prevalence = dist
        .conditions
        .iter()
        .map(|c| ConditionPrevalence {
            condition: c.condition.clone(),
            count: c.count,
            prevalence: percentage(c.count, total),
        })
        .collect();

    CohortBreakdown {
        risk_distribution,
        age_distribution,
        condition_prevalence,
    }
}

/// Stamp every configured alert with `now`.
pub fn raise_alerts(alerts: &[CohortAlert], now: DateTime<Utc>) -> Vec<RaisedAlert> {
    alerts
        .iter()
        .cloned()
        .map(|alert| RaisedAlert {
            alert,
            created: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CohortDistribution {
        CohortDistribution {
            total_patients: 247,
            risk_distribution: RiskDistribution {
                low: 156,
                moderate: 67,
                high: 24,
            },
            age_groups: vec![
                AgeGroupCount {
                    age_group: "30-40".into(),
                    count: 45,
                },
                AgeGroupCount {
                    age_group: "40-50".into(),
                    count: 89,
                },
            ],
            conditions: vec![ConditionCount {
                condition: "Hypertension".into(),
                count: 56,
            }],
            longevity_metrics: LongevityMetrics {
                average_biological_age: 42.3,
                average_chronological_age: 48.7,
                healthspan_projection: 78.2,
                top_performers: 23,
            },
        }
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        assert_eq!(percentage(156, 247), 63.2);
        assert_eq!(percentage(67, 247), 27.1);
        assert_eq!(percentage(24, 247), 9.7);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn breakdown_keeps_fixture_order() {
        let breakdown = compute_cohort_breakdown(&registry());

        let names: Vec<_> = breakdown.risk_distribution.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Low Risk", "Moderate Risk", "High Risk"]);
        assert_eq!(breakdown.risk_distribution[2].value, 24);

        assert_eq!(breakdown.age_distribution[0].age_group, "30-40");
        assert_eq!(breakdown.age_distribution[0].percentage, 18.2);
        assert_eq!(breakdown.age_distribution[1].percentage, 36.0);
        assert_eq!(breakdown.condition_prevalence[0].prevalence, 22.7);
    }

    #[test]
    fn empty_registry_reports_zero_percentages() {
        let mut dist = registry();
        dist.total_patients = 0;
        let breakdown = compute_cohort_breakdown(&dist);
        assert!(breakdown
            .risk_distribution
            .iter()
            .all(|r| r.percentage == 0.0));
    }

    #[test]
    fn raised_alerts_flatten_with_timestamp() {
        let alerts = vec![CohortAlert {
            id: 1,
            kind: AlertKind::HighRisk,
            message: "3 patients need review".into(),
            priority: AlertPriority::High,
            patient_count: 3,
        }];
        let now = Utc::now();
        let raised = raise_alerts(&alerts, now);
        let json = serde_json::to_value(&raised[0]).unwrap();
        assert_eq!(json["type"], "high_risk");
        assert_eq!(json["patientCount"], 3);
        assert!(json["created"].is_string());
    }
}
