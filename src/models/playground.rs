// src/models/playground.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::search::SearchResultItem;

/// DTO for `POST /playground/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 100000, message = "Code must not be empty."))]
    pub code: String,
    #[validate(length(min = 1, max = 50))]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complexity {
    pub time: String,
    pub space: String,
}

/// Backend analysis of playground code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaygroundAnalysis {
    pub optimized_code: String,
    pub speedup: f64,
    pub complexity: Complexity,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub similar_solutions: Option<Vec<SearchResultItem>>,
}
