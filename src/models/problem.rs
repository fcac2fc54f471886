// src/models/problem.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::AppError;

/// Problem category, matching the backend's PostgreSQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sorting,
    Searching,
    Graphs,
    Strings,
    Math,
    DataStructures,
    Io,
    Memory,
    Crypto,
    Ml,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Sorting,
        Category::Searching,
        Category::Graphs,
        Category::Strings,
        Category::Math,
        Category::DataStructures,
        Category::Io,
        Category::Memory,
        Category::Crypto,
        Category::Ml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sorting => "sorting",
            Category::Searching => "searching",
            Category::Graphs => "graphs",
            Category::Strings => "strings",
            Category::Math => "math",
            Category::DataStructures => "data_structures",
            Category::Io => "io",
            Category::Memory => "memory",
            Category::Crypto => "crypto",
            Category::Ml => "ml",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown category '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// An algorithmic problem with its unoptimized baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(deserialize_with = "super::string_id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    pub difficulty: Difficulty,
    pub baseline_code: String,
    pub baseline_language: String,
    #[serde(default)]
    pub baseline_complexity_time: Option<String>,
    #[serde(default)]
    pub baseline_complexity_space: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub type ProblemList = super::Page<Problem>;

/// Query parameters for `GET /problems`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProblemFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_ui_labels() {
        assert_eq!("Data Structures".parse::<Category>().unwrap(), Category::DataStructures);
        assert_eq!("data-structures".parse::<Category>().unwrap(), Category::DataStructures);
        assert_eq!("ML".parse::<Category>().unwrap(), Category::Ml);
        assert!("cooking".parse::<Category>().is_err());
    }

    #[test]
    fn problem_accepts_integer_ids() {
        let problem: Problem = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Find Duplicates",
            "category": "searching",
            "difficulty": "easy",
            "baseline_code": "def f(a): pass",
            "baseline_language": "python"
        }))
        .unwrap();
        assert_eq!(problem.id, "42");
        assert_eq!(problem.category, Category::Searching);
    }
}
