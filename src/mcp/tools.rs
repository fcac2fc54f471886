// src/mcp/tools.rs

//! Bodies of the CodeForge tools. Each takes validated arguments and the
//! backend to use, and returns markdown.

use rmcp::schemars;
use serde::Deserialize;
use validator::Validate;

use crate::{
    client::CodeForgeApi,
    compare,
    error::AppError,
    models::problem::Category,
    query::{self, SearchParams},
};

use super::{analyze, render};

const DEFAULT_SEARCH_LIMIT: u32 = 5;
const OPTIMIZE_SEARCH_LIMIT: u32 = 3;
const DEFAULT_VARIANTS: u8 = 3;

/// Catalogue of common optimizations, handed to the caller when it is asked to
/// write variants itself.
pub const OPTIMIZATION_PATTERNS: &str = "\
## Optimization Patterns

### Data structures
1. **List -> set/map**: O(n) membership test becomes O(1)
2. **Nested loops -> hash join**: O(n^2) becomes O(n)
3. **Array front removal -> deque**: O(n) pop from the front becomes O(1)
4. **Manual grouping -> counter/default map**: fewer branches, one pass

### Algorithms
1. **Linear scan -> binary search** on sorted data: O(n) becomes O(log n)
2. **Plain recursion -> memoization**: exponential becomes polynomial
3. **Several passes -> one pass**: fewer iterations over the input
4. **Sort then take k -> heap**: O(n log n) becomes O(n log k)

### Memory
1. **Materialized list -> iterator/generator**: O(n) space becomes O(1)
2. **Repeated string concatenation -> join/builder**: O(n^2) becomes O(n)
3. **Copy -> in-place update**: fewer allocations

### Antipatterns
- Indexing loops over `range(len(arr))` instead of iterating items
- Rebuilding a collection on every append (`arr = arr + [x]`)
- Calling `.count()` repeatedly instead of counting once
";

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize, schemars::JsonSchema, Validate)]
pub struct SearchArgs {
    #[schemars(description = "What the code should do, e.g. \"find duplicates in array\"")]
    #[validate(length(min = 1, max = 500))]
    pub query: String,
    #[schemars(description = "Programming language filter")]
    #[serde(default)]
    pub language: Option<String>,
    #[schemars(
        description = "Algorithm category: sorting, searching, graphs, strings, math, data_structures, io, memory, crypto or ml"
    )]
    #[serde(default)]
    pub category: Option<String>,
    #[schemars(description = "Minimum speedup factor")]
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub min_speedup: Option<f64>,
    #[schemars(description = "Maximum number of results (default 5)")]
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema, Validate)]
pub struct AnalyzeArgs {
    #[schemars(description = "The code to analyze")]
    #[validate(length(min = 1))]
    pub code: String,
    #[schemars(description = "Programming language of the code")]
    #[validate(length(min = 1))]
    pub language: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema, Validate)]
pub struct OptimizeArgs {
    #[schemars(description = "The code to optimize")]
    #[validate(length(min = 1))]
    pub code: String,
    #[schemars(description = "Programming language of the code")]
    #[validate(length(min = 1))]
    pub language: String,
    #[schemars(description = "What the code does; improves matching")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Ask for this many new optimized variants (1-5) instead of searching")]
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub generate_variants: Option<u8>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema, Validate)]
pub struct BenchmarkArgs {
    #[schemars(with = "Option<String>", description = "Solution to show benchmarks for")]
    #[serde(default, deserialize_with = "crate::models::opt_string_id")]
    pub solution_id: Option<String>,
    #[schemars(with = "Option<Vec<String>>", description = "2-3 solutions to compare")]
    #[serde(default, deserialize_with = "crate::models::opt_string_ids")]
    pub compare_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema, Validate)]
pub struct CompareArgs {
    #[schemars(with = "Vec<String>", description = "2-3 solution ids")]
    #[serde(deserialize_with = "crate::models::string_ids")]
    #[validate(length(min = 2, max = 3))]
    pub solution_ids: Vec<String>,
}

pub async fn search(api: &dyn CodeForgeApi, args: SearchArgs) -> Result<String, AppError> {
    args.validate()?;
    let category = args
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::parse::<Category>)
        .transpose()?;

    let params = SearchParams {
        query: Some(args.query.clone()),
        language: args.language,
        category,
        min_speedup: args.min_speedup,
        limit: Some(args.limit),
        ..Default::default()
    };

    match api.search(&query::build(&params)).await {
        Ok(result) => Ok(render::search_results(&args.query, &result)),
        Err(e) if e.is_unavailable() => {
            tracing::warn!("Search for '{}' skipped, backend unavailable: {}", args.query, e);
            Ok(render::offline_notice(&args.query))
        }
        Err(e) => Err(e),
    }
}

fn variants_prompt(code: &str, language: &str, intent: &str, variants: u8) -> String {
    let fence = language.to_lowercase();
    format!(
        "## Generate {variants} optimized variants\n\n\
         **Original code** ({language}):\n```{fence}\n{code}\n```\n\n\
         **Detected intent**: {intent}\n\n---\n\n{OPTIMIZATION_PATTERNS}\n---\n\n\
         ## Task\n\n\
         Write {variants} different optimized versions of the code above. For each one give:\n\n\
         1. **Name**: a descriptive title, e.g. \"Hash-based O(n) solution\"\n\
         2. **Approach**: the pattern applied\n\
         3. **Complexity**: time and space, before and after\n\
         4. **Speedup**: estimated speedup over the original\n\
         5. **Code**: a complete, working implementation in a ```{fence} block\n\
         6. **Trade-offs**: limitations and when not to use it\n\n\
         Prefer diverse approaches: different data structures, algorithms or libraries.\n"
    )
}

pub fn analyze(args: AnalyzeArgs) -> Result<String, AppError> {
    args.validate()?;
    Ok(render::analysis(&analyze::analyze_code(&args.code), &args.language))
}

pub async fn optimize(api: &dyn CodeForgeApi, args: OptimizeArgs) -> Result<String, AppError> {
    args.validate()?;
    let intent = args
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| analyze::extract_intent(&args.code, &args.language));

    if let Some(n) = args.generate_variants {
        return Ok(variants_prompt(&args.code, &args.language, &intent, n));
    }

    let params = SearchParams {
        query: Some(intent.clone()),
        language: Some(args.language.clone()),
        limit: Some(OPTIMIZE_SEARCH_LIMIT),
        ..Default::default()
    };

    let suggestion = format!(
        "To get new variants instead, call `codeforge_optimize` with `generate_variants: {}`, \
         or try `codeforge_search` with a more specific query than \"{}\".",
        DEFAULT_VARIANTS, intent
    );

    match api.search(&query::build(&params)).await {
        Ok(result) if !result.items.is_empty() => Ok(format!(
            "## Optimized versions\n\n**Your code intent**: {}\n\n{}\n---\n{}",
            intent,
            render::search_results(&intent, &result),
            suggestion
        )),
        Ok(_) => Ok(format!(
            "No optimized versions found in CodeForge for this code pattern.\n\n{}",
            suggestion
        )),
        Err(e) => {
            tracing::warn!("Optimize search for '{}' failed: {}", intent, e);
            Ok(format!(
                "## CodeForge API unavailable\n\n{}\n\n{}",
                suggestion, OPTIMIZATION_PATTERNS
            ))
        }
    }
}

pub async fn benchmark(api: &dyn CodeForgeApi, args: BenchmarkArgs) -> Result<String, AppError> {
    let outcome = match (&args.compare_ids, &args.solution_id) {
        (Some(ids), _) if ids.len() >= compare::MIN_COMPARE => {
            compare::validate_ids(ids)?;
            api.compare(ids, false)
                .await
                .map(|response| render::benchmark_comparison(ids, &response))
        }
        (_, Some(id)) => api
            .solution_benchmarks(id)
            .await
            .map(|rows| render::benchmarks(id, &rows)),
        (None, None) => return Ok(render::benchmark_help()),
        (Some(_), None) => {
            return Err(AppError::BadRequest(format!(
                "compare_ids needs {} or {} solution ids",
                compare::MIN_COMPARE,
                compare::MAX_COMPARE
            )));
        }
    };

    match outcome {
        Err(e) if e.is_unavailable() => {
            tracing::warn!("Benchmark lookup skipped, backend unavailable: {}", e);
            Ok(render::reference_table())
        }
        other => other,
    }
}

pub async fn compare_solutions(api: &dyn CodeForgeApi, args: CompareArgs) -> Result<String, AppError> {
    args.validate()?;
    compare::validate_ids(&args.solution_ids)?;
    let response = api.compare(&args.solution_ids, true).await?;
    let comparison = compare::from_response(&args.solution_ids, &response)?;
    Ok(render::comparison(
        &comparison,
        response.solutions.as_deref().unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn parse<T: serde::de::DeserializeOwned + Validate>(arguments: Value) -> Result<T, AppError> {
        let args: T = serde_json::from_value(arguments)?;
        args.validate()?;
        Ok(args)
    }

    #[test]
    fn search_args_default_limit_and_validate() {
        let args: SearchArgs = parse(json!({"query": "two sum"})).unwrap();
        assert_eq!(args.limit, DEFAULT_SEARCH_LIMIT);
        assert!(parse::<SearchArgs>(json!({"query": ""})).is_err());
        assert!(parse::<SearchArgs>(json!({"query": "x", "limit": 0})).is_err());
        assert!(parse::<SearchArgs>(json!({})).is_err());
    }

    #[test]
    fn variants_are_bounded() {
        let ok = json!({"code": "x", "language": "Python", "generate_variants": 5});
        assert!(parse::<OptimizeArgs>(ok).is_ok());
        let too_many = json!({"code": "x", "language": "Python", "generate_variants": 6});
        assert!(parse::<OptimizeArgs>(too_many).is_err());
    }

    #[test]
    fn ids_accept_numbers_and_strings() {
        let args: BenchmarkArgs = parse(json!({"solution_id": 12, "compare_ids": [1, "b"]})).unwrap();
        assert_eq!(args.solution_id.as_deref(), Some("12"));
        assert_eq!(args.compare_ids, Some(vec!["1".to_string(), "b".to_string()]));
        assert!(parse::<CompareArgs>(json!({"solution_ids": [1]})).is_err());
    }

    #[test]
    fn argument_schemas_describe_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(SearchArgs)).unwrap();
        assert!(schema["properties"]["query"].is_object());
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[test]
    fn analyze_rejects_empty_code() {
        let args = AnalyzeArgs {
            code: String::new(),
            language: "Python".into(),
        };
        assert!(matches!(analyze(args), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn variants_prompt_carries_code_and_patterns() {
        let prompt = variants_prompt("print(1)", "Python", "sorting in Python", 2);
        assert!(prompt.starts_with("## Generate 2 optimized variants"));
        assert!(prompt.contains("```python\nprint(1)\n```"));
        assert!(prompt.contains("### Data structures"));
    }
}
