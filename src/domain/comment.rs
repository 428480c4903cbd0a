//! Per-tool comments.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub email: String,
    pub author_name: String,
    pub author_company: String,
    pub author_role: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A comment joined with the tool it was posted on, as served by the
/// recent-comments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithTool {
    #[serde(flatten)]
    pub comment: Comment,
    pub tool_slug: String,
}
