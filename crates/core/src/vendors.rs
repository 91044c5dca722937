//! Wearable vendor catalogue and account-linking redirects.
//!
//! OAuth flows are not performed here: linking a vendor only resolves the authorisation
//! URL the patient would be redirected to.

use crate::models::PatientId;
use crate::{CoreError, CoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Supported wearable and health-data vendors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Vendor {
    Fitbit,
    AppleHealth,
    Oura,
    Whoop,
    Garmin,
    GoogleFit,
}

impl Vendor {
    pub const ALL: [Vendor; 6] = [
        Vendor::AppleHealth,
        Vendor::Fitbit,
        Vendor::Oura,
        Vendor::Whoop,
        Vendor::Garmin,
        Vendor::GoogleFit,
    ];

    /// Stable identifier used in requests and fixtures.
    pub fn id(self) -> &'static str {
        match self {
            Vendor::Fitbit => "fitbit",
            Vendor::AppleHealth => "apple-health",
            Vendor::Oura => "oura",
            Vendor::Whoop => "whoop",
            Vendor::Garmin => "garmin",
            Vendor::GoogleFit => "google-fit",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Vendor::Fitbit => "Fitbit",
            Vendor::AppleHealth => "Apple Health",
            Vendor::Oura => "Oura Ring",
            Vendor::Whoop => "WHOOP",
            Vendor::Garmin => "Garmin",
            Vendor::GoogleFit => "Google Fit",
        }
    }

    /// Authorisation endpoint the patient is sent to when linking this vendor.
    pub fn oauth_url(self) -> &'static str {
        match self {
            Vendor::Fitbit => {
                "https://www.fitbit.com/oauth2/authorize?client_id=mock&response_type=code"
            }
            Vendor::AppleHealth => "https://developer.apple.com/health-records/mock-auth",
            Vendor::Oura => "https://cloud.ouraring.com/oauth/authorize?client_id=mock",
            Vendor::Whoop => "https://api.whoop.com/oauth/authorize?client_id=mock",
            Vendor::Garmin => "https://connect.garmin.com/oauth/authorize?client_id=mock",
            Vendor::GoogleFit => "https://accounts.google.com/oauth/authorize?scope=fitness",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Vendor {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Vendor::ALL
            .into_iter()
            .find(|v| v.id() == s)
            .ok_or_else(|| CoreError::UnsupportedVendor(s.to_owned()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Linked,
    NotLinked,
}

/// A patient's connection state for one vendor, as stored in fixtures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VendorConnection {
    pub id: Vendor,
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<NaiveDate>,
}

/// A vendor connection as presented to clients, with the display name resolved.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    pub id: Vendor,
    #[schema(value_type = String)]
    pub name: &'static str,
    pub status: LinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<NaiveDate>,
}

impl From<&VendorConnection> for VendorSummary {
    fn from(conn: &VendorConnection) -> Self {
        Self {
            id: conn.id,
            name: conn.id.display_name(),
            status: conn.status,
            linked_at: conn.linked_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorLink {
    #[schema(value_type = String)]
    pub oauth_url: &'static str,
    pub vendor: Vendor,
    pub patient_id: PatientId,
    pub message: String,
}

/// Resolve the redirect a patient needs to authorise `vendor`.
pub fn link_vendor(patient_id: PatientId, vendor: Vendor) -> VendorLink {
    tracing::debug!(patient = %patient_id, %vendor, "resolving vendor link");
    VendorLink {
        oauth_url: vendor.oauth_url(),
        vendor,
        patient_id,
        message: format!("Redirect to {vendor} for authorization"),
    }
}
