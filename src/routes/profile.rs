use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::cookie::session_cookie;
use crate::auth::jwt;
use crate::domain::profile::{is_valid_firm_size, is_valid_role};
use crate::domain::Profile;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{Session, ValidatedJson};
use crate::services::profiles;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ProfileEnvelope {
    profile: Option<Profile>,
}

async fn get_profile(
    session: Session,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = profiles::get(&app_state.kv, &session.email).await?;
    Ok(HttpResponse::Ok().json(ProfileEnvelope { profile }))
}

/// Everything the onboarding form submits. Unknown strings are kept
/// verbatim except where the form promises a trimmed value.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileForm {
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
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            company: String::new(),
            role: String::new(),
            firm_size: String::new(),
            city: String::new(),
            state: String::new(),
            industries: Vec::new(),
            engagement_types: Vec::new(),
            biggest_pain_point: String::new(),
            referral_source: String::new(),
            tool_interests: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    success: bool,
}

/// Save the onboarding profile and re-mint the session so the access
/// gate stops routing this subscriber to `/onboarding`.
async fn save_profile(
    session: Session,
    body: ValidatedJson<ProfileForm>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = body.into_inner();

    let full_name = form.full_name.trim();
    let company = form.company.trim();
    if full_name.is_empty() || company.is_empty() {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            "Full name and company are required",
        ));
    }
    if !is_valid_role(&form.role) {
        return Err(AppError::validation(ErrorCode::ValidationError, "Invalid role"));
    }
    if !is_valid_firm_size(&form.firm_size) {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            "Invalid firm size",
        ));
    }

    let now = OffsetDateTime::now_utc();
    let existing = profiles::get(&app_state.kv, &session.email).await?;
    let completed_at = existing.map_or(now, |p| p.completed_at);

    let profile = Profile {
        email: session.email.clone(),
        full_name: full_name.to_string(),
        company: company.to_string(),
        role: form.role,
        firm_size: form.firm_size,
        city: form.city.trim().to_string(),
        state: form.state.trim().to_string(),
        industries: form.industries,
        engagement_types: form.engagement_types,
        biggest_pain_point: form.biggest_pain_point,
        referral_source: form.referral_source,
        tool_interests: form.tool_interests.trim().to_string(),
        completed_at,
        updated_at: now,
    };
    profiles::save(&app_state.kv, &profile).await?;

    let token = jwt::mint_session(
        &session.email,
        &session.stripe_customer_id,
        Some(true),
        SystemTime::now(),
        &app_state.security,
    )?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, app_state.config.cookie_secure()))
        .json(SaveResponse { success: true }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/profile")
            .route(web::get().to(get_profile))
            .route(web::post().to(save_profile)),
    );
}
