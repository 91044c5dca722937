//! Cohort filtering and panel summary statistics.
//!
//! [`compute_cohort_view`] narrows a clinician's patient list by sex, risk band and wearable
//! status, then aggregates the matched rows. It borrows the input, never mutates it, and
//! performs no I/O, so concurrent callers need no coordination.

use crate::models::{PatientSummary, RecordedSex, RiskLevel, WearableStatus};
use crate::{CoreError, CoreResult};
use serde::{Serialize, Serializer};
use std::str::FromStr;
use utoipa::ToSchema;

/// Sentinel accepted in place of a concrete filter value.
pub const ALL: &str = "all";

// ============================================================================
// CRITERIA
// ============================================================================

/// One optional filter: either the `"all"` pass-through or a concrete value to match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Criterion<T> {
    All,
    Only(T),
}

impl<T> Default for Criterion<T> {
    fn default() -> Self {
        Criterion::All
    }
}

impl<T: PartialEq> Criterion<T> {
    /// Whether a record carrying `value` passes this criterion.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Criterion::All => true,
            Criterion::Only(wanted) => wanted == value,
        }
    }
}

impl<T> Criterion<T>
where
    T: FromStr<Err = CoreError>,
{
    /// Decode a raw query-parameter value.
    ///
    /// Absent and empty values, as well as the `"all"` sentinel, mean no filtering.
    pub fn parse(raw: Option<&str>) -> CoreResult<Self> {
        match raw {
            None => Ok(Criterion::All),
            Some(v) if v.is_empty() || v == ALL => Ok(Criterion::All),
            Some(v) => v.parse().map(Criterion::Only),
        }
    }
}

impl<T: Serialize> Serialize for Criterion<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Criterion::All => serializer.serialize_str(ALL),
            Criterion::Only(value) => value.serialize(serializer),
        }
    }
}

/// The three panel filters, applied conjunctively.
///
/// `sex` keeps the spelling it was requested with, so serialising the criteria echoes the
/// caller's input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[schema(value_type = String)]
    pub sex: Criterion<RecordedSex>,
    #[schema(value_type = String)]
    pub risk_level: Criterion<RiskLevel>,
    #[schema(value_type = String)]
    pub wearable_status: Criterion<WearableStatus>,
}

impl FilterCriteria {
    /// Build criteria from raw query-parameter values.
    ///
    /// `sex`, including its `"all"` sentinel, is matched case-insensitively; `risk_level`
    /// and `wearable_status` (and their sentinel) must use the exact lowercase spellings.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCriterion`] naming the first parameter that does not
    /// decode to a known value.
    pub fn from_params(
        sex: Option<&str>,
        risk_level: Option<&str>,
        wearable_status: Option<&str>,
    ) -> CoreResult<Self> {
        Ok(Self {
            sex: Criterion::parse(sex.filter(|s| !s.trim().eq_ignore_ascii_case(ALL)))?,
            risk_level: Criterion::parse(risk_level)?,
            wearable_status: Criterion::parse(wearable_status)?,
        })
    }
}

// ============================================================================
// VIEW
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub total_patients: usize,
    pub high_risk_count: usize,
    pub active_wearables_count: usize,
    /// Mean medication compliance rounded to the nearest integer; 0 for an empty cohort.
    pub avg_compliance: u32,
}

/// The filtered panel rows together with their aggregates.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortView<'a> {
    pub matched: Vec<&'a PatientSummary>,
    pub summary: CohortSummary,
}

/// Filter `records` by `criteria` and summarise the result.
///
/// Matched rows keep their input order. Filters run in the order sex, risk level, wearable
/// status.
pub fn compute_cohort_view<'a>(
    records: &'a [PatientSummary],
    criteria: &FilterCriteria,
) -> CohortView<'a> {
    let matched: Vec<&PatientSummary> = records
        .iter()
        .filter(|p| criteria.sex.admits(&p.sex))
        .filter(|p| criteria.risk_level.admits(&p.overall_risk))
        .filter(|p| criteria.wearable_status.admits(&p.wearable_status))
        .collect();

    let summary = summarise(&matched);
    tracing::debug!(
        input = records.len(),
        matched = summary.total_patients,
        "computed cohort view"
    );

    CohortView { matched, summary }
}

fn summarise(matched: &[&PatientSummary]) -> CohortSummary {
    let total_patients = matched.len();
    let high_risk_count = matched
        .iter()
        .filter(|p| p.overall_risk == RiskLevel::High)
        .count();
    let active_wearables_count = matched
        .iter()
        .filter(|p| p.wearable_status == WearableStatus::Active)
        .count();

    let avg_compliance = if total_patients == 0 {
        0
    } else {
        let sum: f64 = matched.iter().map(|p| p.medication_compliance).sum();
        // Compliance is within [0, 100] so the rounded mean always fits.
        (sum / total_patients as f64).round() as u32
    };

    CohortSummary {
        total_patients,
        high_risk_count,
        active_wearables_count,
        avg_compliance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientId, Sex};
    use chrono::NaiveDate;

    fn patient(
        id: &str,
        sex: Sex,
        risk: RiskLevel,
        wearable: WearableStatus,
        compliance: f64,
    ) -> PatientSummary {
        PatientSummary {
            id: PatientId::new(id).unwrap(),
            name: format!("Patient {id}"),
            age: 40,
            sex: sex.into(),
            avatar: None,
            overall_risk: risk,
            risk_scores: Vec::new(),
            last_visit: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            next_appointment: None,
            recent_biomarkers: Vec::new(),
            wearable_status: wearable,
            medication_compliance: compliance,
        }
    }

    fn two_patients() -> Vec<PatientSummary> {
        vec![
            patient("a", Sex::Female, RiskLevel::High, WearableStatus::Active, 90.0),
            patient("b", Sex::Male, RiskLevel::Low, WearableStatus::Inactive, 70.0),
        ]
    }

    fn mixed_panel() -> Vec<PatientSummary> {
        vec![
            patient("p1", Sex::Female, RiskLevel::Low, WearableStatus::Active, 95.0),
            patient("p2", Sex::Male, RiskLevel::Moderate, WearableStatus::Partial, 78.0),
            patient("p3", Sex::Female, RiskLevel::High, WearableStatus::Inactive, 85.0),
            patient("p4", Sex::Male, RiskLevel::High, WearableStatus::Active, 60.0),
            patient("p5", Sex::Other, RiskLevel::Moderate, WearableStatus::Pending, 88.0),
            patient("p6", Sex::Female, RiskLevel::High, WearableStatus::Active, 71.0),
        ]
    }

    fn ids(view: &CohortView<'_>) -> Vec<String> {
        view.matched.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn high_risk_filter_selects_first_patient() {
        let records = two_patients();
        let criteria = FilterCriteria {
            risk_level: Criterion::Only(RiskLevel::High),
            ..FilterCriteria::default()
        };

        let view = compute_cohort_view(&records, &criteria);

        assert_eq!(view.matched, vec![&records[0]]);
        assert_eq!(
            view.summary,
            CohortSummary {
                total_patients: 1,
                high_risk_count: 1,
                active_wearables_count: 1,
                avg_compliance: 90,
            }
        );
    }

    #[test]
    fn all_criteria_pass_everything_through() {
        let records = two_patients();
        let view = compute_cohort_view(&records, &FilterCriteria::default());

        assert_eq!(view.matched.len(), records.len());
        assert!(view.matched.iter().zip(&records).all(|(m, r)| *m == r));
        assert_eq!(
            view.summary,
            CohortSummary {
                total_patients: 2,
                high_risk_count: 1,
                active_wearables_count: 1,
                avg_compliance: 80,
            }
        );
    }

    #[test]
    fn empty_input_yields_zero_summary() {
        let records: Vec<PatientSummary> = Vec::new();
        let criteria = FilterCriteria {
            sex: Criterion::Only(Sex::Female.into()),
            risk_level: Criterion::Only(RiskLevel::Moderate),
            wearable_status: Criterion::Only(WearableStatus::Error),
        };

        for c in [FilterCriteria::default(), criteria] {
            let view = compute_cohort_view(&records, &c);
            assert!(view.matched.is_empty());
            assert_eq!(
                view.summary,
                CohortSummary {
                    total_patients: 0,
                    high_risk_count: 0,
                    active_wearables_count: 0,
                    avg_compliance: 0,
                }
            );
        }
    }

    #[test]
    fn no_match_averages_to_zero() {
        let records = two_patients();
        let criteria = FilterCriteria {
            wearable_status: Criterion::Only(WearableStatus::Error),
            ..FilterCriteria::default()
        };
        let view = compute_cohort_view(&records, &criteria);
        assert_eq!(view.summary.total_patients, 0);
        assert_eq!(view.summary.avg_compliance, 0);
    }

    #[test]
    fn filters_combine_conjunctively_and_keep_order() {
        let records = mixed_panel();
        let criteria = FilterCriteria {
            sex: Criterion::Only(Sex::Female.into()),
            risk_level: Criterion::Only(RiskLevel::High),
            wearable_status: Criterion::All,
        };

        let view = compute_cohort_view(&records, &criteria);
        assert_eq!(ids(&view), vec!["p3", "p6"]);
        assert_eq!(view.summary.high_risk_count, 2);
        assert_eq!(view.summary.active_wearables_count, 1);
        assert_eq!(view.summary.avg_compliance, 78);

        let criteria = FilterCriteria {
            wearable_status: Criterion::Only(WearableStatus::Active),
            ..criteria
        };
        let view = compute_cohort_view(&records, &criteria);
        assert_eq!(ids(&view), vec!["p6"]);
    }

    #[test]
    fn risk_filter_invariants_hold_for_every_band() {
        let records = mixed_panel();
        for band in [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High] {
            let criteria = FilterCriteria {
                risk_level: Criterion::Only(band),
                ..FilterCriteria::default()
            };
            let view = compute_cohort_view(&records, &criteria);

            assert!(view.matched.iter().all(|p| p.overall_risk == band));
            assert_eq!(view.summary.total_patients, view.matched.len());
            if band == RiskLevel::High {
                assert_eq!(view.summary.high_risk_count, view.matched.len());
            } else {
                assert_eq!(view.summary.high_risk_count, 0);
            }
        }
    }

    #[test]
    fn average_is_rounded_mean() {
        let records = vec![
            patient("x", Sex::Male, RiskLevel::Low, WearableStatus::Active, 80.0),
            patient("y", Sex::Male, RiskLevel::Low, WearableStatus::Active, 81.0),
        ];
        let view = compute_cohort_view(&records, &FilterCriteria::default());
        // 80.5 rounds half away from zero.
        assert_eq!(view.summary.avg_compliance, 81);

        let records = mixed_panel();
        let view = compute_cohort_view(&records, &FilterCriteria::default());
        let mean = records.iter().map(|p| p.medication_compliance).sum::<f64>()
            / records.len() as f64;
        assert!((view.summary.avg_compliance as f64 - mean).abs() <= 0.5);
    }

    #[test]
    fn input_is_left_untouched() {
        let records = mixed_panel();
        let before = records.clone();
        let criteria = FilterCriteria {
            sex: Criterion::Only(Sex::Male.into()),
            ..FilterCriteria::default()
        };
        let _ = compute_cohort_view(&records, &criteria);
        assert_eq!(records, before);
    }

    #[test]
    fn params_decode_with_all_defaults() {
        let criteria = FilterCriteria::from_params(None, Some("all"), Some("")).unwrap();
        assert_eq!(criteria, FilterCriteria::default());

        let criteria =
            FilterCriteria::from_params(Some("Female"), Some("high"), Some("active")).unwrap();
        assert_eq!(criteria.sex, Criterion::Only(RecordedSex::from(Sex::Female)));
        assert_eq!(criteria.risk_level, Criterion::Only(RiskLevel::High));
        assert_eq!(criteria.wearable_status, Criterion::Only(WearableStatus::Active));
    }

    #[test]
    fn sex_sentinel_ignores_case() {
        for raw in ["All", "ALL", " all "] {
            let criteria = FilterCriteria::from_params(Some(raw), None, None).unwrap();
            assert_eq!(criteria.sex, Criterion::All, "{raw:?}");
        }
        assert!(FilterCriteria::from_params(None, Some("All"), None).is_err());
    }

    #[test]
    fn sex_criterion_echoes_requested_spelling() {
        let criteria = FilterCriteria::from_params(Some("Female"), None, None).unwrap();
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["sex"], "Female");

        let records = mixed_panel();
        let view = compute_cohort_view(&records, &criteria);
        assert_eq!(ids(&view), vec!["p1", "p3", "p6"]);
    }

    #[test]
    fn params_reject_unknown_values() {
        let err = FilterCriteria::from_params(None, Some("severe"), None)
            .expect_err("severe is not a risk band");
        assert!(matches!(err, CoreError::InvalidCriterion { field: "riskLevel", .. }));

        let err = FilterCriteria::from_params(None, None, Some("Active"))
            .expect_err("wearable status is exact");
        assert!(matches!(err, CoreError::InvalidCriterion { field: "wearableStatus", .. }));
    }

    #[test]
    fn criteria_serialise_with_sentinel() {
        let criteria = FilterCriteria {
            sex: Criterion::Only(Sex::Female.into()),
            ..FilterCriteria::default()
        };
        let json = serde_json::to_value(criteria).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sex": "female", "riskLevel": "all", "wearableStatus": "all"})
        );
    }
}
