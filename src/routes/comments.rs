use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::MAX_COMMENT_LENGTH;
use crate::domain::{Comment, CommentWithTool};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{Session, ValidatedJson};
use crate::logging::security;
use crate::services::{comments, profiles, rate_limit};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tool: Option<String>,
    pub slugs: Option<String>,
    pub recent: Option<usize>,
}

#[derive(Debug, Serialize)]
struct CommentsEnvelope {
    comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
struct CountsEnvelope {
    counts: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
struct RecentEnvelope {
    comments: Vec<CommentWithTool>,
}

/// Three views over the same store: one tool's thread, counts for a set
/// of slugs, or the newest comments across every tool.
async fn list_comments(
    _session: Session,
    query: web::Query<ListQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(tool) = &query.tool {
        let comments = comments::list(&app_state.kv, tool).await?;
        return Ok(HttpResponse::Ok().json(CommentsEnvelope { comments }));
    }

    if let Some(slugs) = &query.slugs {
        let slugs: Vec<String> = slugs
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let counts = comments::counts(&app_state.kv, &slugs).await?;
        return Ok(HttpResponse::Ok().json(CountsEnvelope { counts }));
    }

    if let Some(limit) = query.recent {
        let comments = comments::recent(&app_state.kv, limit).await?;
        return Ok(HttpResponse::Ok().json(RecentEnvelope { comments }));
    }

    Err(AppError::bad_request(
        ErrorCode::BadRequest,
        "Missing tool parameter",
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentRequest {
    #[serde(default)]
    pub tool_slug: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
struct CommentEnvelope {
    comment: Comment,
}

async fn post_comment(
    session: Session,
    body: ValidatedJson<PostCommentRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = body.into_inner();

    if form.tool_slug.is_empty() {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            "Missing tool slug",
        ));
    }
    if app_state.catalog.by_slug(&form.tool_slug).is_none() {
        return Err(AppError::bad_request(ErrorCode::ToolNotFound, "Tool not found"));
    }
    if form.content.is_empty() {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            "Comment content is required",
        ));
    }

    let sanitized = comments::strip_html(&form.content).trim().to_string();
    let length = sanitized.chars().count();
    if length == 0 || length > MAX_COMMENT_LENGTH {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            "Comment must be between 1 and 2000 characters",
        ));
    }

    let now = OffsetDateTime::now_utc();
    if !rate_limit::allow(&app_state.kv, &rate_limit::COMMENT, &session.email, now).await? {
        security::rate_limit_hit("/api/comments");
        return Err(AppError::rate_limited(
            "Too many comments. Please wait before posting again.",
        ));
    }

    // Author fields are denormalized at post time; later profile edits do
    // not rewrite old comments.
    let profile = profiles::get(&app_state.kv, &session.email).await?;
    let (author_name, author_company, author_role) = match profile {
        Some(p) => (p.full_name, p.company, p.role),
        None => (session.email.clone(), String::new(), String::new()),
    };

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        email: session.email.clone(),
        author_name,
        author_company,
        author_role,
        content: sanitized,
        created_at: now,
    };

    comments::add(&app_state.kv, &form.tool_slug, comment.clone()).await?;
    rate_limit::record(&app_state.kv, &rate_limit::COMMENT, &session.email, now).await?;

    Ok(HttpResponse::Ok().json(CommentEnvelope { comment }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/comments")
            .route(web::get().to(list_comments))
            .route(web::post().to(post_comment)),
    );
}
