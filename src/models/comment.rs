// src/models/comment.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Represents a (possibly threaded) comment on a solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "super::string_id")]
    pub id: String,
    #[serde(deserialize_with = "super::string_id")]
    pub solution_id: String,
    #[serde(deserialize_with = "super::string_id")]
    pub author_id: String,
    #[serde(default, deserialize_with = "super::opt_string_id")]
    pub parent_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub author_username: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    /// Nested replies.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentList {
    pub items: Vec<Comment>,
    pub total: i64,
}

/// DTO for creating a comment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub solution_id: String,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}
