// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A CodeForge user as returned by `/users/...` and `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "super::string_id")]
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,

    /// Reputation score accumulated from votes on the user's solutions.
    #[serde(default)]
    pub score: i64,

    #[serde(default)]
    pub solutions_count: i64,

    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Response of `GET /users/leaderboard/top`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUsers {
    pub users: Vec<User>,
    pub total: i64,
}

/// Response of `GET /users/me/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub solutions_count: i64,
    #[serde(default)]
    pub total_votes: i64,
    #[serde(default)]
    pub avg_speedup: Option<f64>,
    #[serde(default)]
    pub best_speedup: Option<f64>,
    #[serde(default)]
    pub rank: Option<i64>,
}

/// Sort orders accepted by `GET /users`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSort {
    #[default]
    Score,
    Solutions,
    Recent,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<UserSort>,
}

/// DTO for `PATCH /users/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(url)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Response of `GET /auth/github`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubAuthUrl {
    pub url: String,
}
