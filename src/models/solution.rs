// src/models/solution.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Classification tag assigned to a solution by the backend.
///
/// Badges are derived labels; the client only reads them. Tags this build
/// does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Badge {
    Fastest,
    MemoryEfficient,
    MostEfficient,
    Readable,
    Verified,
    CommunityFavorite,
    Minimal,
    Other(String),
}

impl Badge {
    pub fn as_str(&self) -> &str {
        match self {
            Badge::Fastest => "fastest",
            Badge::MemoryEfficient => "memory-efficient",
            Badge::MostEfficient => "most-efficient",
            Badge::Readable => "readable",
            Badge::Verified => "verified",
            Badge::CommunityFavorite => "community-favorite",
            Badge::Minimal => "minimal",
            Badge::Other(tag) => tag,
        }
    }
}

impl From<String> for Badge {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fastest" => Badge::Fastest,
            "memory-efficient" => Badge::MemoryEfficient,
            "most-efficient" => Badge::MostEfficient,
            "readable" => Badge::Readable,
            "verified" => Badge::Verified,
            "community-favorite" => Badge::CommunityFavorite,
            "minimal" => Badge::Minimal,
            _ => Badge::Other(tag),
        }
    }
}

impl From<&str> for Badge {
    fn from(tag: &str) -> Self {
        Badge::from(tag.to_string())
    }
}

impl From<Badge> for String {
    fn from(badge: Badge) -> Self {
        badge.as_str().to_string()
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorBrief {
    #[serde(deserialize_with = "super::string_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A crowd-submitted optimized solution. Belongs to exactly one problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    #[serde(deserialize_with = "super::string_id")]
    pub id: String,
    #[serde(deserialize_with = "super::string_id")]
    pub problem_id: String,
    pub title: String,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "time_complexity")]
    pub complexity_time: Option<String>,
    #[serde(default, alias = "space_complexity")]
    pub complexity_space: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorBrief>,

    // Performance metrics
    #[serde(default)]
    pub speedup: Option<f64>,
    #[serde(default)]
    pub memory_reduction: Option<f64>,
    #[serde(default)]
    pub efficiency_score: Option<f64>,
    #[serde(default)]
    pub readability_score: Option<f64>,
    #[serde(default)]
    pub lines_of_code: Option<i64>,
    #[serde(default)]
    pub cyclomatic_complexity: Option<i64>,

    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default, alias = "votes_count")]
    pub vote_count: i64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub type SolutionList = super::Page<Solution>;

/// Sort orders accepted by `GET /solutions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionSort {
    #[default]
    Votes,
    Speedup,
    Memory,
    Efficiency,
    Recent,
}

/// DTO for submitting a new solution.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSolutionRequest {
    #[validate(length(min = 1))]
    pub problem_id: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 100000))]
    pub code: String,
    #[validate(length(min = 1, max = 50))]
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_space: Option<String>,
}

/// Response body of `POST /solutions/{id}/vote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub vote_count: i64,
}

/// Aggregate row of `GET /solutions/stats/by-category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub solutions_count: i64,
    pub avg_speedup: f64,
    pub max_speedup: f64,
    pub total_votes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badges_keep_unknown_tags() {
        let badges: Vec<Badge> =
            serde_json::from_value(serde_json::json!(["fastest", "memory_efficient", "gpu-ready"]))
                .unwrap();
        assert_eq!(
            badges,
            vec![
                Badge::Fastest,
                Badge::MemoryEfficient,
                Badge::Other("gpu-ready".to_string())
            ]
        );
        let back = serde_json::to_value(&badges).unwrap();
        assert_eq!(back, serde_json::json!(["fastest", "memory-efficient", "gpu-ready"]));
    }

    #[test]
    fn solution_accepts_legacy_field_names() {
        let solution: Solution = serde_json::from_value(serde_json::json!({
            "id": 7,
            "problem_id": 3,
            "title": "Hash set",
            "code": "seen = set()",
            "language": "python",
            "time_complexity": "O(n)",
            "votes_count": 12
        }))
        .unwrap();
        assert_eq!(solution.id, "7");
        assert_eq!(solution.complexity_time.as_deref(), Some("O(n)"));
        assert_eq!(solution.vote_count, 12);
        assert!(solution.badges.is_empty());
    }
}
