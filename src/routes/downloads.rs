use std::io::ErrorKind;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::Session;
use crate::services::subscribers;
use crate::state::AppState;

/// Serve a tool archive to an active subscriber.
///
/// The catalog lookup doubles as the path guard: only slugs from the
/// loaded registry ever reach the filesystem.
async fn download(
    session: Session,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    if !subscribers::is_active(&app_state.kv, &session.email).await? {
        return Err(AppError::subscription_required());
    }

    if app_state.catalog.by_slug(&slug).is_none() {
        return Err(AppError::not_found(ErrorCode::ToolNotFound, "Tool not found"));
    }

    let zip_path = app_state
        .config
        .downloads_dir
        .join(&slug)
        .join(format!("{slug}.zip"));

    let bytes = match tokio::fs::read(&zip_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::not_found(
                ErrorCode::FileNotFound,
                "Download not available",
            ));
        }
        Err(e) => {
            return Err(AppError::storage(format!("failed to read archive: {e}")));
        }
    };

    log_download(&app_state, &session.email, &slug).await;

    Ok(HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{slug}.zip\""),
        ))
        .body(bytes))
}

/// Append one line to the download log. Best-effort: a failed write is
/// logged and the download still goes out.
async fn log_download(app_state: &AppState, email: &str, slug: &str) {
    let Ok(stamp) = OffsetDateTime::now_utc().format(&Rfc3339) else {
        return;
    };
    let line = format!("{stamp} | {email} | {slug}\n");
    let log_path = app_state.config.data_dir.join("downloads.log");

    let result = async {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, line.as_bytes()).await?;
        // tokio's File buffers writes; flush so the line is on disk before
        // the response goes out.
        tokio::io::AsyncWriteExt::flush(&mut file).await
    }
    .await;

    if let Err(e) = result {
        warn!(error = %e, "download log write failed");
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/download/{slug}").route(web::get().to(download)));
}
