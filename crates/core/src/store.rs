//! Fixture-backed patient store.
//!
//! The dashboard has no persistence layer: every record is read once from a YAML fixture
//! document at startup and then served read-only. The built-in demo document is compiled
//! into the binary; a different document can be supplied through [`CoreConfig`].
//!
//! ## Document layout
//!
//! ```text
//! clinicians:        [Clinician]       # each with a roster of patient ids
//! patientSummaries:  [PatientSummary]  # panel rows, in display order
//! patientRecords:    [PatientRecord]   # full bundles for patient-facing views
//! cohort:            CohortDistribution
//! cohortTrends:      CohortTrends
//! cohortAlerts:      [CohortAlert]
//! ```

use crate::analytics::{CohortAlert, CohortDistribution, CohortTrends};
use crate::config::CoreConfig;
use crate::models::{Clinician, PatientId, PatientRecord, PatientSummary};
use crate::{CoreError, CoreResult};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Demo dataset compiled into the crate.
pub const DEMO_FIXTURES: &str = include_str!("../fixtures/demo.yaml");

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fixtures {
    pub clinicians: Vec<Clinician>,
    pub patient_summaries: Vec<PatientSummary>,
    pub patient_records: Vec<PatientRecord>,
    pub cohort: CohortDistribution,
    pub cohort_trends: CohortTrends,
    pub cohort_alerts: Vec<CohortAlert>,
}

impl Fixtures {
    /// Parse a fixture document from YAML text.
    ///
    /// Schema errors report the path of the offending field (for example
    /// `patientSummaries[1].overallRisk`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FixtureSchema`] if the YAML does not match the fixture schema,
    /// or [`CoreError::FixtureInvalid`] if it parses but violates a data invariant.
    pub fn parse(yaml_text: &str) -> CoreResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let fixtures = match serde_path_to_error::deserialize::<_, Fixtures>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(CoreError::FixtureSchema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        fixtures.validate()?;
        Ok(fixtures)
    }

    fn validate(&self) -> CoreResult<()> {
        let mut seen = HashSet::new();
        for summary in &self.patient_summaries {
            if !seen.insert(&summary.id) {
                return Err(CoreError::FixtureInvalid(format!(
                    "duplicate patient summary {}",
                    summary.id
                )));
            }
            let compliance = summary.medication_compliance;
            if !(0.0..=100.0).contains(&compliance) {
                return Err(CoreError::FixtureInvalid(format!(
                    "medicationCompliance for {} must be within 0..=100, got {compliance}",
                    summary.id
                )));
            }
        }

        let mut clinician_ids = HashSet::new();
        for clinician in &self.clinicians {
            if !clinician_ids.insert(clinician.id.as_str()) {
                return Err(CoreError::FixtureInvalid(format!(
                    "duplicate clinician {}",
                    clinician.id
                )));
            }
            if let Some(missing) = clinician.patients.iter().find(|id| !seen.contains(id)) {
                return Err(CoreError::FixtureInvalid(format!(
                    "clinician {} lists unknown patient {missing}",
                    clinician.id
                )));
            }
        }

        let mut record_ids = HashSet::new();
        for record in &self.patient_records {
            if !record_ids.insert(record.id()) {
                return Err(CoreError::FixtureInvalid(format!(
                    "duplicate patient record {}",
                    record.id()
                )));
            }
        }

        Ok(())
    }
}

/// Read-only store over a loaded fixture document.
///
/// Panels are grouped per clinician at construction so request handlers can borrow them
/// without copying.
#[derive(Debug)]
pub struct FixtureStore {
    clinicians: HashMap<String, Clinician>,
    panels: HashMap<String, Vec<PatientSummary>>,
    records: HashMap<PatientId, PatientRecord>,
    cohort: CohortDistribution,
    cohort_trends: CohortTrends,
    cohort_alerts: Vec<CohortAlert>,
}

impl FixtureStore {
    pub fn new(fixtures: Fixtures) -> Self {
        let Fixtures {
            clinicians,
            patient_summaries,
            patient_records,
            cohort,
            cohort_trends,
            cohort_alerts,
        } = fixtures;

        let panels = clinicians
            .iter()
            .map(|c| {
                let roster: HashSet<&PatientId> = c.patients.iter().collect();
                let panel = patient_summaries
                    .iter()
                    .filter(|s| roster.contains(&s.id))
                    .cloned()
                    .collect();
                (c.id.clone(), panel)
            })
            .collect();

        Self {
            clinicians: clinicians.into_iter().map(|c| (c.id.clone(), c)).collect(),
            panels,
            records: patient_records
                .into_iter()
                .map(|r| (r.id().clone(), r))
                .collect(),
            cohort,
            cohort_trends,
            cohort_alerts,
        }
    }

    /// Store over the compiled-in demo dataset.
    pub fn demo() -> CoreResult<Self> {
        Fixtures::parse(DEMO_FIXTURES).map(Self::new)
    }

    /// Load a fixture document from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FixtureRead`] if the file cannot be read, or any error from
    /// [`Fixtures::parse`].
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::FixtureRead {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Fixtures::parse(&text).map(Self::new)?;
        tracing::info!(
            path = %path.display(),
            clinicians = store.clinicians.len(),
            records = store.records.len(),
            "loaded fixture document"
        );
        Ok(store)
    }

    /// Store selected by configuration: the override file if set, otherwise the demo data.
    pub fn from_config(cfg: &CoreConfig) -> CoreResult<Self> {
        match cfg.fixtures_path() {
            Some(path) => Self::from_path(path),
            None => Self::demo(),
        }
    }

    pub fn clinician(&self, id: &str) -> CoreResult<&Clinician> {
        self.clinicians
            .get(id)
            .ok_or_else(|| CoreError::ClinicianNotFound(id.to_owned()))
    }

    /// Panel rows for the clinician's roster, in fixture order.
    pub fn panel(&self, clinician: &Clinician) -> &[PatientSummary] {
        self.panels
            .get(&clinician.id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn patient_record(&self, id: &str) -> CoreResult<&PatientRecord> {
        PatientId::new(id)
            .ok()
            .and_then(|pid| self.records.get(&pid))
            .ok_or_else(|| CoreError::PatientNotFound(id.to_owned()))
    }

    pub fn cohort_distribution(&self) -> &CohortDistribution {
        &self.cohort
    }

    pub fn cohort_trends(&self) -> &CohortTrends {
        &self.cohort_trends
    }

    pub fn cohort_alerts(&self) -> &[CohortAlert] {
        &self.cohort_alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{compute_cohort_view, FilterCriteria};
    use crate::models::{RiskLevel, Sex, WearableStatus};
    use std::io::Write;

    #[test]
    fn demo_fixtures_parse() {
        let store = FixtureStore::demo().expect("demo fixtures should parse");
        let doctor = store.clinician("doctor-1").unwrap();
        assert_eq!(doctor.name, "Dr. Michael Chen");

        let panel = store.panel(doctor);
        let ids: Vec<_> = panel.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["patient-1", "patient-2", "patient-3"]);
        assert_eq!(panel[0].sex, Sex::Female);
        assert_eq!(panel[1].wearable_status, WearableStatus::Partial);
        assert_eq!(panel[2].overall_risk, RiskLevel::High);

        let record = store.patient_record("patient-1").unwrap();
        assert_eq!(record.profile.name, "Sarah Johnson");
        assert_eq!(record.vendors.len(), 6);
        assert_eq!(store.cohort_distribution().total_patients, 247);
        assert_eq!(store.cohort_alerts().len(), 3);
        assert_eq!(store.cohort_trends().monthly_new_patients.len(), 12);
    }

    #[test]
    fn demo_panel_summary() {
        let store = FixtureStore::demo().unwrap();
        let doctor = store.clinician("doctor-1").unwrap();
        let view = compute_cohort_view(store.panel(doctor), &FilterCriteria::default());
        assert_eq!(view.summary.total_patients, 3);
        assert_eq!(view.summary.high_risk_count, 1);
        assert_eq!(view.summary.active_wearables_count, 1);
        // (95 + 78 + 85) / 3 = 86
        assert_eq!(view.summary.avg_compliance, 86);

        let female = FilterCriteria::from_params(Some("female"), None, None).unwrap();
        let view = compute_cohort_view(store.panel(doctor), &female);
        assert_eq!(view.summary.total_patients, 2);
        assert_eq!(view.summary.avg_compliance, 90);
    }

    #[test]
    fn panel_rows_keep_recorded_spelling() {
        let store = FixtureStore::demo().unwrap();
        let doctor = store.clinician("doctor-1").unwrap();
        let panel = store.panel(doctor);
        assert_eq!(panel[0].sex.as_str(), "Female");

        let json = serde_json::to_value(&panel[0]).unwrap();
        assert_eq!(json["sex"], "Female");

        let female = FilterCriteria::from_params(Some("female"), None, None).unwrap();
        let view = compute_cohort_view(panel, &female);
        assert!(view.matched.iter().all(|p| p.sex.as_str() == "Female"));
    }

    #[test]
    fn unknown_lookups_are_errors() {
        let store = FixtureStore::demo().unwrap();
        assert!(matches!(
            store.clinician("doctor-9"),
            Err(CoreError::ClinicianNotFound(_))
        ));
        assert!(matches!(
            store.patient_record("patient-2"),
            Err(CoreError::PatientNotFound(_))
        ));
        assert!(matches!(
            store.patient_record(""),
            Err(CoreError::PatientNotFound(_))
        ));
    }

    #[test]
    fn schema_errors_name_the_field() {
        let broken = DEMO_FIXTURES.replacen("overallRisk: moderate", "overallRisk: severe", 1);
        let err = Fixtures::parse(&broken).expect_err("severe is not a risk band");
        match err {
            CoreError::FixtureSchema { path, .. } => {
                assert!(path.contains("patientSummaries"), "path was {path}");
                assert!(path.contains("overallRisk"), "path was {path}");
            }
            other => panic!("expected FixtureSchema, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        let broken = format!("{DEMO_FIXTURES}\nunexpectedKey: true\n");
        let err = Fixtures::parse(&broken).expect_err("unknown key should fail");
        assert!(matches!(err, CoreError::FixtureSchema { .. }));
    }

    #[test]
    fn rejects_out_of_range_compliance() {
        let broken =
            DEMO_FIXTURES.replacen("medicationCompliance: 78", "medicationCompliance: 178", 1);
        let err = Fixtures::parse(&broken).expect_err("compliance above 100");
        match err {
            CoreError::FixtureInvalid(msg) => assert!(msg.contains("patient-2")),
            other => panic!("expected FixtureInvalid, got {other:?}"),
        }
    }

    #[test]
    fn rejects_roster_with_unknown_patient() {
        let broken = DEMO_FIXTURES.replacen(
            "patients: [patient-1, patient-2, patient-3]",
            "patients: [patient-1, patient-7]",
            1,
        );
        let err = Fixtures::parse(&broken).expect_err("patient-7 has no summary");
        assert!(matches!(err, CoreError::FixtureInvalid(ref m) if m.contains("patient-7")));
    }

    #[test]
    fn loads_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let smaller = DEMO_FIXTURES.replacen(
            "patients: [patient-1, patient-2, patient-3]",
            "patients: [patient-3]",
            1,
        );
        file.write_all(smaller.as_bytes()).unwrap();

        let store = FixtureStore::from_path(file.path()).unwrap();
        let doctor = store.clinician("doctor-1").unwrap();
        let panel = store.panel(doctor);
        assert_eq!(panel.len(), 1);
        assert_eq!(panel[0].id.as_str(), "patient-3");
    }

    #[test]
    fn missing_override_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureStore::from_path(&dir.path().join("absent.yaml"))
            .expect_err("file does not exist");
        assert!(matches!(err, CoreError::FixtureRead { .. }));
    }
}
