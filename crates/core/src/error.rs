use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid {field} filter value: {value:?}")]
    InvalidCriterion { field: &'static str, value: String },
    #[error("unsupported vendor: {0:?}")]
    UnsupportedVendor(String),
    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("clinician not found: {0}")]
    ClinicianNotFound(String),
    #[error("failed to read fixture file {path}: {source}", path = path.display())]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fixture schema mismatch at {path}: {message}")]
    FixtureSchema { path: String, message: String },
    #[error("invalid fixture data: {0}")]
    FixtureInvalid(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
