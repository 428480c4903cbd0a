//! Page endpoints behind the access gate.
//!
//! Rendering happens in the external frontend layer; these handlers exist
//! so the gate has something to protect and answer 200 for allowed
//! requests.

use actix_web::{web, HttpResponse};

use crate::error::AppError;

async fn root() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("Toolgate backend"))
}

async fn page() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(root)))
        .service(web::resource("/login").route(web::get().to(page)))
        .service(web::resource("/expired").route(web::get().to(page)))
        .service(web::resource("/dashboard").route(web::get().to(page)))
        .service(web::resource("/onboarding").route(web::get().to(page)))
        .service(web::resource("/tools").route(web::get().to(page)))
        .service(web::resource("/tools/{slug}").route(web::get().to(page)));
}
