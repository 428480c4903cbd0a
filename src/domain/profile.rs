//! Onboarding profiles collected after the first successful checkout.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Roles the profile form offers. Submissions outside this list are
/// rejected rather than stored.
pub const VALID_ROLES: &[&str] = &[
    "CPA",
    "Partner",
    "Senior Associate",
    "Staff Accountant",
    "Controller",
    "Bookkeeper",
    "CFO",
    "IT/Technology",
    "Other",
];

pub const VALID_FIRM_SIZES: &[&str] = &["Solo practitioner", "2-5", "6-15", "16-50", "51-200", "200+"];

pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

pub fn is_valid_firm_size(size: &str) -> bool {
    VALID_FIRM_SIZES.contains(&size)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    pub full_name: String,
    pub company: String,
    pub role: String,
    pub firm_size: String,
    pub city: String,
    pub state: String,
    pub industries: Vec<String>,
    pub engagement_types: Vec<String>,
    pub biggest_pain_point: String,
    pub referral_source: String,
    pub tool_interests: String,
    /// Set on first save and preserved across later edits.
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
