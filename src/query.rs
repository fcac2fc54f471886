// src/query.rs

//! Turns UI-level search and listing parameters into concrete backend requests.
//!
//! A search is either a semantic text search (`POST /search`) or a category
//! listing (`GET /search/by-category`). Which one is decided here, together
//! with the wildcard fallback, default paging and sort-label mapping.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    problem::Category,
    search::SearchResultItem,
    solution::{Badge, SolutionSort},
};

/// Query string that stands for "no text query".
pub const WILDCARD: &str = "*";
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;
/// Shortest prefix for which suggestions are requested.
pub const MIN_SUGGESTION_LEN: usize = 2;

/// Sort orders understood by the search endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    Speedup,
    Memory,
    Efficiency,
    Votes,
    Recent,
}

impl SortKey {
    /// Maps a UI label ("Speedup", " votes ") to its sort key.
    /// Unknown labels fall back to relevance.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "speedup" | "speed" => SortKey::Speedup,
            "memory" => SortKey::Memory,
            "efficiency" => SortKey::Efficiency,
            "votes" => SortKey::Votes,
            "recent" => SortKey::Recent,
            _ => SortKey::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Speedup => "speedup",
            SortKey::Memory => "memory",
            SortKey::Efficiency => "efficiency",
            SortKey::Votes => "votes",
            SortKey::Recent => "recent",
        }
    }
}

/// Maps a language picker label to the backend filter value. "All" means no filter.
pub fn language_filter(label: Option<&str>) -> Option<String> {
    let label = label?.trim();
    if label.is_empty() || label.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(label.to_lowercase())
    }
}

/// Whether a prefix is long enough to ask the backend for suggestions.
pub fn should_suggest(prefix: &str) -> bool {
    prefix.trim().chars().count() >= MIN_SUGGESTION_LEN
}

/// Search parameters as the UI (or an MCP tool) provides them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub language: Option<String>,
    pub category: Option<Category>,
    pub min_speedup: Option<f64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<SortKey>,
}

impl SearchParams {
    /// True when the query carries actual text, not blank and not the wildcard.
    pub fn has_text_query(&self) -> bool {
        self.query
            .as_deref()
            .map(str::trim)
            .is_some_and(|q| !q.is_empty() && q != WILDCARD)
    }

    /// True when nothing at all was asked for: no query (blank counts as
    /// none), no category and no filter.
    pub fn is_empty(&self) -> bool {
        let no_query = self.query.as_deref().is_none_or(|q| q.trim().is_empty());
        no_query
            && self.category.is_none()
            && language_filter(self.language.as_deref()).is_none()
            && self.min_speedup.is_none()
    }

    fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct SemanticQuery {
    #[validate(length(min = 1, max = 500))]
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speedup: Option<f64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    pub offset: u32,
    pub sort: SortKey,
}

/// Query string of `GET /search/by-category`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryQuery {
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub sort: SortKey,
}

/// The request a set of search parameters resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    /// Neither text nor category: nothing to ask the backend.
    Disabled,
    ByCategory(CategoryQuery),
    Semantic(SemanticQuery),
}

/// Decides between category listing and semantic search.
///
/// Without a text query but with a category, the category listing is used.
/// Otherwise a semantic search is issued, with `*` standing in for a missing
/// query when only filters were given. An explicit `*` is searched as is.
pub fn build(params: &SearchParams) -> SearchRequest {
    if params.is_empty() {
        return SearchRequest::Disabled;
    }

    let has_text = params.has_text_query();

    let language = language_filter(params.language.as_deref());
    let sort = params.sort.unwrap_or_default();

    if let (false, Some(category)) = (has_text, params.category) {
        return SearchRequest::ByCategory(CategoryQuery {
            category,
            language,
            limit: params.limit(),
            offset: params.offset(),
            sort,
        });
    }

    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(WILDCARD)
        .to_string();

    SearchRequest::Semantic(SemanticQuery {
        query,
        language,
        category: params.category,
        min_speedup: params.min_speedup,
        limit: params.limit(),
        offset: params.offset(),
        sort,
    })
}

/// Filters for `GET /solutions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub problem_id: Option<String>,
    pub language: Option<String>,
    pub min_speedup: Option<f64>,
    pub min_memory_reduction: Option<f64>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    pub sort_by: Option<SolutionSort>,
}

impl SolutionFilters {
    /// Query pairs for the backend; list filters repeat their key.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.unwrap_or(1).max(1).to_string()),
            ("size", self.size.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT).to_string()),
            (
                "sort_by",
                match self.sort_by.unwrap_or_default() {
                    SolutionSort::Votes => "votes",
                    SolutionSort::Speedup => "speedup",
                    SolutionSort::Memory => "memory",
                    SolutionSort::Efficiency => "efficiency",
                    SolutionSort::Recent => "recent",
                }
                .to_string(),
            ),
        ];
        if let Some(id) = &self.problem_id {
            pairs.push(("problem_id", id.clone()));
        }
        if let Some(lang) = language_filter(self.language.as_deref()) {
            pairs.push(("language", lang));
        }
        if let Some(v) = self.min_speedup {
            pairs.push(("min_speedup", v.to_string()));
        }
        if let Some(v) = self.min_memory_reduction {
            pairs.push(("min_memory_reduction", v.to_string()));
        }
        for badge in &self.badges {
            pairs.push(("badges", badge.to_string()));
        }
        pairs
    }
}

/// Solutions of one problem inside a category listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemGroup {
    pub problem_id: String,
    pub problem_title: String,
    pub solutions: Vec<SearchResultItem>,
}

/// Groups listing items by problem, keeping first-seen problem order.
pub fn group_by_problem(items: Vec<SearchResultItem>) -> Vec<ProblemGroup> {
    let mut groups: Vec<ProblemGroup> = Vec::new();
    for item in items {
        let key = item
            .problem_id
            .clone()
            .unwrap_or_else(|| item.problem_title.clone());
        match groups.iter_mut().find(|g| g.problem_id == key) {
            Some(group) => group.solutions.push(item),
            None => groups.push(ProblemGroup {
                problem_id: key,
                problem_title: item.problem_title.clone(),
                solutions: vec![item],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, problem: &str) -> SearchResultItem {
        SearchResultItem {
            id: id.to_string(),
            title: format!("solution {id}"),
            code_preview: String::new(),
            language: "python".to_string(),
            speedup: None,
            memory_reduction: None,
            efficiency_score: None,
            badges: vec![],
            vote_count: 0,
            author_username: "anon".to_string(),
            problem_id: Some(problem.to_string()),
            problem_title: format!("problem {problem}"),
            problem_category: None,
            similarity_score: None,
        }
    }

    #[test]
    fn category_without_query_lists_category() {
        let params = SearchParams {
            category: Some(Category::Sorting),
            language: Some("Python".into()),
            sort: Some(SortKey::Speedup),
            ..Default::default()
        };
        match build(&params) {
            SearchRequest::ByCategory(q) => {
                assert_eq!(q.category, Category::Sorting);
                assert_eq!(q.language.as_deref(), Some("python"));
                assert_eq!(q.limit, DEFAULT_LIMIT);
                assert_eq!(q.offset, 0);
                assert_eq!(q.sort, SortKey::Speedup);
            }
            other => panic!("expected category listing, got {other:?}"),
        }
    }

    #[test]
    fn wildcard_query_counts_as_no_text() {
        let params = SearchParams {
            query: Some(" * ".into()),
            category: Some(Category::Graphs),
            ..Default::default()
        };
        assert!(matches!(build(&params), SearchRequest::ByCategory(_)));
    }

    #[test]
    fn text_query_with_category_is_semantic() {
        let params = SearchParams {
            query: Some("  fast sort  ".into()),
            category: Some(Category::Sorting),
            min_speedup: Some(10.0),
            limit: Some(500),
            ..Default::default()
        };
        match build(&params) {
            SearchRequest::Semantic(q) => {
                assert_eq!(q.query, "fast sort");
                assert_eq!(q.category, Some(Category::Sorting));
                assert_eq!(q.min_speedup, Some(10.0));
                assert_eq!(q.limit, MAX_LIMIT);
                assert_eq!(q.sort, SortKey::Relevance);
            }
            other => panic!("expected semantic search, got {other:?}"),
        }
    }

    #[test]
    fn nothing_to_search_is_disabled() {
        assert_eq!(build(&SearchParams::default()), SearchRequest::Disabled);
        let blank = SearchParams {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(build(&blank), SearchRequest::Disabled);
        let all_languages = SearchParams {
            language: Some("All".into()),
            ..Default::default()
        };
        assert_eq!(build(&all_languages), SearchRequest::Disabled);
    }

    #[test]
    fn bare_wildcard_is_a_semantic_search() {
        let params = SearchParams {
            query: Some("*".into()),
            language: Some("Python".into()),
            ..Default::default()
        };
        match build(&params) {
            SearchRequest::Semantic(q) => {
                assert_eq!(q.query, WILDCARD);
                assert_eq!(q.language.as_deref(), Some("python"));
                assert_eq!(q.category, None);
            }
            other => panic!("expected semantic search, got {other:?}"),
        }
    }

    #[test]
    fn filters_alone_search_the_wildcard() {
        let params = SearchParams {
            min_speedup: Some(5.0),
            ..Default::default()
        };
        match build(&params) {
            SearchRequest::Semantic(q) => {
                assert_eq!(q.query, WILDCARD);
                assert_eq!(q.min_speedup, Some(5.0));
            }
            other => panic!("expected semantic search, got {other:?}"),
        }
    }

    #[test]
    fn sort_labels_map_case_insensitively() {
        assert_eq!(SortKey::from_label("Speedup"), SortKey::Speedup);
        assert_eq!(SortKey::from_label(" VOTES "), SortKey::Votes);
        assert_eq!(SortKey::from_label("Efficiency"), SortKey::Efficiency);
        assert_eq!(SortKey::from_label("Recent"), SortKey::Recent);
        assert_eq!(SortKey::from_label("Relevance"), SortKey::Relevance);
        assert_eq!(SortKey::from_label("popularity"), SortKey::Relevance);
    }

    #[test]
    fn language_all_means_no_filter() {
        assert_eq!(language_filter(Some("All")), None);
        assert_eq!(language_filter(Some("C++")), Some("c++".to_string()));
        assert_eq!(language_filter(None), None);
    }

    #[test]
    fn suggestions_need_two_chars() {
        assert!(!should_suggest("a"));
        assert!(!should_suggest(" a "));
        assert!(should_suggest("so"));
    }

    #[test]
    fn solution_filters_repeat_badges() {
        let filters = SolutionFilters {
            badges: vec![Badge::Fastest, Badge::Readable],
            sort_by: Some(SolutionSort::Efficiency),
            language: Some("All".into()),
            ..Default::default()
        };
        let pairs = filters.to_query();
        assert!(pairs.contains(&("sort_by", "efficiency".to_string())));
        assert!(pairs.contains(&("page", "1".to_string())));
        assert_eq!(pairs.iter().filter(|(k, _)| *k == "badges").count(), 2);
        assert!(!pairs.iter().any(|(k, _)| *k == "language"));
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let groups = group_by_problem(vec![item("1", "b"), item("2", "a"), item("3", "b")]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].problem_id, "b");
        let ids: Vec<_> = groups[0].solutions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(groups[1].problem_id, "a");
    }
}
