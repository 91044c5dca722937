use clap::{Parser, Subcommand};
use longevity_core::{
    analytics::compute_cohort_breakdown, compute_cohort_view, link_vendor, CoreConfig,
    FilterCriteria, FixtureStore, Vendor,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "longevity")]
#[command(about = "Longevity dashboard CLI")]
struct Cli {
    /// Fixture document to read instead of the built-in demo data
    #[arg(long, global = true, env = "LONGEVITY_FIXTURES")]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a clinician's filtered panel with summary statistics
    Panel {
        /// Clinician id (defaults to LONGEVITY_DEFAULT_CLINICIAN, then doctor-1)
        #[arg(long)]
        doctor_id: Option<String>,
        /// `all`, `female`, `male` or `other`
        #[arg(long)]
        sex: Option<String>,
        /// `all`, `low`, `moderate` or `high`
        #[arg(long)]
        risk_level: Option<String>,
        /// `all`, `active`, `inactive`, `partial`, `pending` or `error`
        #[arg(long)]
        wearable_status: Option<String>,
    },
    /// Print registry-wide cohort breakdowns
    Analytics,
    /// Print the authorisation redirect for linking a vendor to a patient
    LinkVendor {
        /// Patient id
        patient_id: String,
        /// Vendor id, for example `fitbit`
        vendor: String,
    },
    /// List supported wearable vendors
    Vendors,
}

#[derive(Serialize)]
struct VendorRow {
    id: &'static str,
    name: &'static str,
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = CoreConfig::from_env_values(
        cli.fixtures.map(|p| p.display().to_string()),
        std::env::var("LONGEVITY_DEFAULT_CLINICIAN").ok(),
    )?;

    match cli.command {
        Some(Commands::Panel {
            doctor_id,
            sex,
            risk_level,
            wearable_status,
        }) => {
            let store = FixtureStore::from_config(&cfg)?;
            let criteria = FilterCriteria::from_params(
                sex.as_deref(),
                risk_level.as_deref(),
                wearable_status.as_deref(),
            )?;
            let doctor =
                store.clinician(doctor_id.as_deref().unwrap_or(cfg.default_clinician_id()))?;
            let view = compute_cohort_view(store.panel(doctor), &criteria);
            print_json(&serde_json::json!({
                "doctor": doctor.name,
                "filters": criteria,
                "patients": view.matched,
                "summary": view.summary,
            }))?;
        }
        Some(Commands::Analytics) => {
            let store = FixtureStore::from_config(&cfg)?;
            let distribution = store.cohort_distribution();
            print_json(&serde_json::json!({
                "summary": distribution,
                "breakdown": compute_cohort_breakdown(distribution),
            }))?;
        }
        Some(Commands::LinkVendor { patient_id, vendor }) => {
            let store = FixtureStore::from_config(&cfg)?;
            let vendor: Vendor = vendor.parse()?;
            let record = store.patient_record(&patient_id)?;
            let link = link_vendor(record.id().clone(), vendor);
            print_json(&link)?;
        }
        Some(Commands::Vendors) => {
            let rows: Vec<VendorRow> = Vendor::ALL
                .iter()
                .map(|v| VendorRow {
                    id: v.id(),
                    name: v.display_name(),
                })
                .collect();
            print_json(&rows)?;
        }
        None => {
            println!("Use 'longevity --help' for commands");
        }
    }

    Ok(())
}
