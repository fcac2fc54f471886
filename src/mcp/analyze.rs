// src/mcp/analyze.rs

//! Local, backend-free heuristics over a code snippet.
//!
//! These are deliberately coarse: keyword counts, not parsing. They give an
//! MCP client something useful to say about code even when the backend is
//! down.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static FOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bfor\b").expect("valid regex"));
static WHILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhile\b").expect("valid regex"));
static FN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bdef|\bfunction|\bfn|\bfunc)\s+([A-Za-z_]\w*)").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub time_complexity: &'static str,
    pub space_complexity: &'static str,
    pub issues: Vec<&'static str>,
    pub suggestions: Vec<&'static str>,
    pub patterns: Vec<&'static str>,
}

pub fn loop_count(code: &str) -> usize {
    FOR_RE.find_iter(code).count() + WHILE_RE.find_iter(code).count()
}

/// Name of the first declared function that calls itself, if any.
pub fn recursive_function(code: &str) -> Option<String> {
    let name = FN_RE.captures(code)?.get(1)?.as_str();
    let uses = Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()?;
    (uses.find_iter(code).count() > 1).then(|| name.to_string())
}

pub fn analyze_code(code: &str) -> Analysis {
    let lower = code.to_lowercase();
    let loops = loop_count(code);

    let mut issues = Vec::new();
    let mut suggestions = Vec::new();
    let mut patterns = Vec::new();

    if loops >= 2 {
        issues.push("Nested loops detected - possible O(n^2) or worse complexity");
        suggestions.push("Consider using hash maps/sets for O(1) lookups");
        suggestions.push("Look for opportunities to reduce loop iterations");
    }

    if loops > 0 && (lower.contains("append") || lower.contains("push")) {
        suggestions.push("Pre-allocate arrays when size is known to avoid repeated allocations");
    }

    if loops > 0 && (lower.contains('\'') || lower.contains('"')) && lower.contains('+') {
        issues.push("String concatenation in loop detected");
        suggestions.push("Use string builder or join() for better performance");
    }

    if lower.contains(" in ") && lower.contains("list") {
        issues.push("Linear search in list detected");
        suggestions.push("Use set or dict for O(1) membership testing");
    }

    if lower.contains("sort") {
        patterns.push("Sorting operation detected - O(n log n)");
        suggestions.push("Consider if partial sorting or selection would suffice");
    }

    if recursive_function(code).is_some() {
        patterns.push("Recursive function detected");
        suggestions.push("Consider memoization or dynamic programming for overlapping subproblems");
    }

    let time_complexity = match loops {
        n if n >= 3 => "O(n^3)",
        2 => "O(n^2)",
        _ if lower.contains("sort") => "O(n log n)",
        _ => "O(n)",
    };

    let space_complexity = if ["dict", "map", "set"].iter().any(|k| lower.contains(k)) {
        "O(n)"
    } else {
        "O(1)"
    };

    Analysis {
        time_complexity,
        space_complexity,
        issues,
        suggestions,
        patterns,
    }
}

/// Guesses what the code is for, to seed a search. Falls back to a generic intent.
pub fn extract_intent(code: &str, language: &str) -> String {
    const HINTS: &[(&[&str], &str)] = &[
        (&["sort"], "sorting"),
        (&["search", "find"], "searching"),
        (&["duplicate"], "find duplicates"),
        (&["reverse"], "reverse array"),
        (&["sum"], "sum calculation"),
        (&["max", "min"], "find max/min"),
        (&["matrix", "multiply"], "matrix operations"),
        (&["fibonacci"], "fibonacci"),
        (&["prime"], "prime numbers"),
        (&["path", "graph"], "graph traversal"),
    ];

    let lower = code.to_lowercase();
    let mut intents: Vec<&str> = HINTS
        .iter()
        .filter(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, intent)| *intent)
        .collect();

    if intents.is_empty() {
        intents.push("algorithm optimization");
    }

    format!("{} in {}", intents.join(", "), language)
}
