//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and
//! request handlers. Nothing in request handling reads process-wide environment variables.

use crate::constants::DEFAULT_CLINICIAN_ID;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    fixtures_path: Option<PathBuf>,
    default_clinician_id: String,
}

impl CoreConfig {
    pub fn new(fixtures_path: Option<PathBuf>, default_clinician_id: String) -> CoreResult<Self> {
        if default_clinician_id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "default clinician id cannot be empty".into(),
            ));
        }

        if let Some(path) = &fixtures_path {
            if !path.is_file() {
                return Err(CoreError::InvalidInput(format!(
                    "fixtures path is not a file: {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            fixtures_path,
            default_clinician_id,
        })
    }

    /// Build a configuration from optional raw values, as read from the environment.
    ///
    /// Empty or whitespace values are treated as unset.
    pub fn from_env_values(
        fixtures_path: Option<String>,
        default_clinician_id: Option<String>,
    ) -> CoreResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self::new(
            non_blank(fixtures_path).map(PathBuf::from),
            non_blank(default_clinician_id).unwrap_or_else(|| DEFAULT_CLINICIAN_ID.into()),
        )
    }

    pub fn fixtures_path(&self) -> Option<&Path> {
        self.fixtures_path.as_deref()
    }

    pub fn default_clinician_id(&self) -> &str {
        &self.default_clinician_id
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            fixtures_path: None,
            default_clinician_id: DEFAULT_CLINICIAN_ID.into(),
        }
    }
}
