//! Comment storage: a per-tool list, a count index and a rolling
//! recent-comments feed, all kept in step by `add`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Comment, CommentWithTool};
use crate::error::AppError;
use crate::storage::Kv;

const RECENT_KEY: &str = "comments-recent";
const MAX_RECENT: usize = 50;

fn comments_key(slug: &str) -> String {
    format!("comments:{slug}")
}

fn index_key(slug: &str) -> String {
    format!("comments-index:{slug}")
}

/// Remove HTML tags from user content before storing it.
pub fn strip_html(content: &str) -> String {
    static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
    HTML_TAG.replace_all(content, "").into_owned()
}

/// Comments for one tool, oldest first.
pub async fn list(kv: &Kv, slug: &str) -> Result<Vec<Comment>, AppError> {
    Ok(kv.get_json(&comments_key(slug)).await?.unwrap_or_default())
}

/// Append a comment, bump the count index and roll the recent feed.
pub async fn add(kv: &Kv, slug: &str, comment: Comment) -> Result<(), AppError> {
    let mut comments = list(kv, slug).await?;
    comments.push(comment.clone());
    kv.set_json(&comments_key(slug), &comments, None).await?;
    kv.set_json(&index_key(slug), &comments.len(), None).await?;

    let mut recent: Vec<CommentWithTool> = kv.get_json(RECENT_KEY).await?.unwrap_or_default();
    recent.push(CommentWithTool {
        comment,
        tool_slug: slug.to_string(),
    });
    if recent.len() > MAX_RECENT {
        recent.remove(0);
    }
    kv.set_json(RECENT_KEY, &recent, None).await
}

pub async fn count(kv: &Kv, slug: &str) -> Result<usize, AppError> {
    Ok(kv.get_json(&index_key(slug)).await?.unwrap_or(0))
}

pub async fn counts(kv: &Kv, slugs: &[String]) -> Result<BTreeMap<String, usize>, AppError> {
    let mut out = BTreeMap::new();
    for slug in slugs {
        out.insert(slug.clone(), count(kv, slug).await?);
    }
    Ok(out)
}

/// The last `limit` comments across all tools, oldest first.
pub async fn recent(kv: &Kv, limit: usize) -> Result<Vec<CommentWithTool>, AppError> {
    let feed: Vec<CommentWithTool> = kv.get_json(RECENT_KEY).await?.unwrap_or_default();
    let skip = feed.len().saturating_sub(limit);
    Ok(feed.into_iter().skip(skip).collect())
}
