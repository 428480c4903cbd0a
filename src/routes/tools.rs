use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::state::AppState;

/// The public catalog listing, served as a bare array.
async fn list_tools(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(app_state.catalog.all()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/tools").route(web::get().to(list_tools)));
}
