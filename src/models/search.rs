// src/models/search.rs

use serde::{Deserialize, Serialize};

use super::solution::Badge;

/// One hit of a semantic search or category listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(deserialize_with = "super::string_id")]
    pub id: String,
    pub title: String,
    pub code_preview: String,
    pub language: String,

    #[serde(default)]
    pub speedup: Option<f64>,
    #[serde(default)]
    pub memory_reduction: Option<f64>,
    #[serde(default)]
    pub efficiency_score: Option<f64>,

    #[serde(default)]
    pub badges: Vec<Badge>,

    #[serde(default, alias = "votes_count")]
    pub vote_count: i64,
    pub author_username: String,
    #[serde(default, deserialize_with = "super::opt_string_id")]
    pub problem_id: Option<String>,
    pub problem_title: String,
    #[serde(default)]
    pub problem_category: Option<String>,
    /// Absent for category listings, which are not ranked by similarity.
    #[serde(default)]
    pub similarity_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<SearchResultItem>,
    pub total: i64,
    #[serde(default)]
    pub query: String,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Response of `GET /search/suggestions`.
///
/// The backend returns matching problem and solution titles separately; some
/// deployments return a flat `suggestions` list instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestions {
    #[serde(default)]
    pub problems: Vec<String>,
    #[serde(default)]
    pub solutions: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl Suggestions {
    /// All suggestions, problems first, without duplicates.
    pub fn all(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in self
            .problems
            .iter()
            .chain(&self.solutions)
            .chain(&self.suggestions)
        {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        out
    }
}
