//! Onboarding profiles. Presence of a record doubles as the "onboarding
//! complete" signal consumed by session minting and the access gate.

use crate::domain::Profile;
use crate::error::AppError;
use crate::storage::Kv;

fn profile_key(email: &str) -> String {
    format!("profile:{email}")
}

pub async fn get(kv: &Kv, email: &str) -> Result<Option<Profile>, AppError> {
    kv.get_json(&profile_key(email)).await
}

/// Overwrite the profile wholesale. Preserving `completed_at` across
/// edits is the caller's job, since only it sees the submitted fields.
pub async fn save(kv: &Kv, profile: &Profile) -> Result<(), AppError> {
    kv.set_json(&profile_key(&profile.email), profile, None).await
}

pub async fn exists(kv: &Kv, email: &str) -> Result<bool, AppError> {
    Ok(get(kv, email).await?.is_some())
}
