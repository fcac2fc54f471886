// src/mcp/render.rs

//! Markdown rendering of tool results.

use std::fmt::Write;

use crate::{
    compare::{BenchmarkRow, Comparison, Metric, Outcome},
    models::{
        benchmark::{Benchmark, CompareResponse},
        search::SearchResult,
        solution::Solution,
    },
    presentation::{
        BadgeList, DEFAULT_MAX_VISIBLE_BADGES, efficiency_cell, format_count, format_kb,
        format_ms, format_speedup,
    },
};

use super::analyze::Analysis;

pub fn search_results(query: &str, result: &SearchResult) -> String {
    if result.items.is_empty() {
        return no_results(query);
    }

    let entries: Vec<String> = result
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut entry = format!("## {}. {}\n", i + 1, item.title);
            let _ = writeln!(entry, "- **Problem**: {}", item.problem_title);
            let _ = writeln!(entry, "- **Language**: {}", item.language);
            let _ = writeln!(entry, "- **Speedup**: {}", format_speedup(item.speedup));
            let _ = writeln!(entry, "- **Votes**: {}", item.vote_count);
            let _ = writeln!(entry, "- **Author**: @{}", item.author_username);
            if !item.badges.is_empty() {
                let badges = BadgeList::new(&item.badges, DEFAULT_MAX_VISIBLE_BADGES).render();
                if !badges.is_empty() {
                    let _ = writeln!(entry, "- **Badges**: {}", badges);
                }
            }
            let _ = write!(
                entry,
                "\n```{}\n{}\n```\n",
                item.language.to_lowercase(),
                item.code_preview.trim_end()
            );
            entry
        })
        .collect();

    format!(
        "Found {} results for \"{}\":\n\n{}",
        result.total.max(result.items.len() as i64),
        query,
        entries.join("\n---\n\n")
    )
}

pub fn no_results(query: &str) -> String {
    format!(
        "No results found for \"{}\". Try different keywords or broaden the filters.",
        query
    )
}

pub fn offline_notice(query: &str) -> String {
    format!(
        "CodeForge API is offline, so \"{}\" could not be searched. \
         Start the backend or check CODEFORGE_API_URL, then try again.",
        query
    )
}

pub fn analysis(report: &Analysis, language: &str) -> String {
    let mut out = format!("## Code Analysis ({})\n\n", language);
    let _ = writeln!(out, "**Estimated Time Complexity**: {}", report.time_complexity);
    let _ = writeln!(out, "**Estimated Space Complexity**: {}", report.space_complexity);

    let sections = [
        ("Issues Found", &report.issues),
        ("Patterns Detected", &report.patterns),
        ("Suggestions", &report.suggestions),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n### {}", heading);
        for item in items.iter() {
            let _ = writeln!(out, "- {}", item);
        }
    }

    if report.issues.is_empty() && report.suggestions.is_empty() {
        out.push_str("\nNo obvious performance issues found.\n");
    }
    out
}

pub fn benchmarks(solution_id: &str, rows: &[Benchmark]) -> String {
    if rows.is_empty() {
        return format!("No benchmarks available for solution #{}.", solution_id);
    }

    let mut out = format!("## Benchmarks for solution #{}\n\n", solution_id);
    out.push_str("| Input Size | Execution Time | Memory | Runs |\n");
    out.push_str("|---|---|---|---|\n");
    let mut sorted: Vec<&Benchmark> = rows.iter().collect();
    sorted.sort_by_key(|b| b.input_size);
    for b in sorted {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            format_count(b.input_size),
            format_ms(b.execution_time_ms, 3),
            b.memory_bytes.map(format_kb).unwrap_or_else(|| "-".to_string()),
            b.runs_count.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
    out
}

/// One benchmark table per solution, in the order asked for.
pub fn benchmark_comparison(ids: &[String], response: &CompareResponse) -> String {
    let mut out = String::from("## Benchmark Comparison\n");
    for id in ids {
        let _ = writeln!(out, "\n### Solution #{}", id);
        match response.benchmarks.get(id).filter(|rows| !rows.is_empty()) {
            None => out.push_str("No benchmark data.\n"),
            Some(rows) => {
                out.push_str("| Input Size | Time | Memory |\n|---|---|---|\n");
                let mut rows = rows.clone();
                rows.sort_by_key(|r| r.input_size);
                for r in rows {
                    let _ = writeln!(
                        out,
                        "| {} | {} | {} |",
                        format_count(r.input_size),
                        format_ms(r.execution_time_ms, 3),
                        r.memory_bytes.map(format_kb).unwrap_or_else(|| "-".to_string()),
                    );
                }
            }
        }
    }
    out
}

/// Typical costs by complexity class, shown when live data is unavailable.
pub fn reference_table() -> String {
    let mut out = String::from(
        "CodeForge API is offline. Reference figures, not live benchmark data:\n\n",
    );
    out.push_str("| Complexity | n = 1,000 | n = 100,000 | Typical cause |\n");
    out.push_str("|---|---|---|---|\n");
    out.push_str("| O(1) | ~1 op | ~1 op | hash lookup |\n");
    out.push_str("| O(log n) | ~10 ops | ~17 ops | binary search |\n");
    out.push_str("| O(n) | 1,000 ops | 100,000 ops | single pass |\n");
    out.push_str("| O(n log n) | ~10,000 ops | ~1.7M ops | sorting |\n");
    out.push_str("| O(n^2) | 1M ops | 10B ops | nested loops |\n");
    out
}

pub fn benchmark_help() -> String {
    "Provide `solution_id` to see the benchmarks of one solution, or \
     `compare_ids` with 2-3 solution ids to compare them side by side."
        .to_string()
}

fn outcome_line(comparison: &Comparison, outcome: &Outcome) -> String {
    let title = |id: &str| {
        comparison
            .solution_ids
            .iter()
            .position(|s| s == id)
            .map(|i| format!("{} (#{})", comparison.titles[i], id))
            .unwrap_or_else(|| format!("#{}", id))
    };
    match outcome {
        Outcome::Winner(id) => title(id),
        Outcome::Tie(ids) => format!(
            "Tie between {}",
            ids.iter().map(|id| title(id)).collect::<Vec<_>>().join(" and ")
        ),
        Outcome::NoData => "No data".to_string(),
    }
}

fn row_cells(comparison: &Comparison, row: &BenchmarkRow) -> Vec<String> {
    row.cells
        .iter()
        .zip(&comparison.solution_ids)
        .map(|(cell, id)| match cell {
            None => "-".to_string(),
            Some(cell) => {
                let mut text = format_ms(cell.execution_time_ms, 3);
                if let Some(mem) = cell.memory_bytes {
                    let _ = write!(text, " ({})", format_kb(mem));
                }
                if row.fastest.winner() == Some(id.as_str()) {
                    text.push_str(" ⚡");
                }
                text
            }
        })
        .collect()
}

/// Metrics, winners and the per-size benchmark table of a comparison.
pub fn comparison(comparison: &Comparison, solutions: &[Solution]) -> String {
    let find = |id: &str| solutions.iter().find(|s| s.id == id);
    let columns = comparison.solution_ids.len();

    let mut out = String::from("## Solution Comparison\n\n");
    let _ = writeln!(out, "| | {} |", comparison.titles.join(" | "));
    let _ = writeln!(out, "|---|{}", "---|".repeat(columns));

    let metric_row = |label: &str, value: &dyn Fn(&Solution) -> String| {
        let cells: Vec<String> = comparison
            .solution_ids
            .iter()
            .map(|id| find(id).map(value).unwrap_or_else(|| "-".to_string()))
            .collect();
        format!("| {} | {} |\n", label, cells.join(" | "))
    };
    out.push_str(&metric_row("Speedup", &|s| format_speedup(s.speedup)));
    out.push_str(&metric_row("Memory reduction", &|s| {
        s.memory_reduction
            .map(|m| format!("{:.1}x", m))
            .unwrap_or_else(|| "-".to_string())
    }));
    out.push_str(&metric_row("Efficiency", &|s| {
        s.efficiency_score
            .map(efficiency_cell)
            .unwrap_or_else(|| "-".to_string())
    }));
    out.push_str(&metric_row("Language", &|s| s.language.clone()));
    out.push_str(&metric_row("Badges", &|s| {
        let rendered = BadgeList::new(&s.badges, DEFAULT_MAX_VISIBLE_BADGES).render();
        if rendered.is_empty() { "-".to_string() } else { rendered }
    }));

    out.push_str("\n### Winners\n");
    for metric in [Metric::Speed, Metric::Memory, Metric::Balanced] {
        let _ = writeln!(
            out,
            "- **{}**: {}",
            metric.label(),
            outcome_line(comparison, comparison.outcome(metric))
        );
    }

    if !comparison.rows.is_empty() {
        out.push_str("\n### Benchmark Results\n\n");
        let _ = writeln!(out, "| Input Size | {} |", comparison.titles.join(" | "));
        let _ = writeln!(out, "|---|{}", "---|".repeat(columns));
        for row in &comparison.rows {
            let _ = writeln!(
                out,
                "| {} | {} |",
                format_count(row.input_size),
                row_cells(comparison, row).join(" | ")
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compare::{SolutionMetrics, compare},
        models::benchmark::BenchmarkPoint,
    };

    #[test]
    fn empty_search_renders_hint() {
        let text = search_results("bloom filter", &SearchResult::empty());
        assert!(text.starts_with("No results found for \"bloom filter\""));
    }

    #[test]
    fn benchmark_rows_sorted_by_size() {
        let rows: Vec<Benchmark> = serde_json::from_value(serde_json::json!([
            {"solution_id": "7", "input_size": 10000, "execution_time_ms": 4.5, "memory_bytes": 2048},
            {"solution_id": "7", "input_size": 100, "execution_time_ms": 0.25}
        ]))
        .unwrap();
        let text = benchmarks("7", &rows);
        let first = text.find("| 100 |").unwrap();
        let second = text.find("| 10,000 |").unwrap();
        assert!(first < second);
        assert!(text.contains("| 4.500ms | 2.0KB | - |"));
        assert_eq!(benchmarks("7", &[]), "No benchmarks available for solution #7.");
    }

    #[test]
    fn comparison_marks_winners_and_fastest_cells() {
        let a = SolutionMetrics {
            id: "a".into(),
            title: "Hash set".into(),
            speedup: Some(40.0),
            benchmarks: vec![BenchmarkPoint {
                input_size: 1000,
                execution_time_ms: 0.5,
                memory_bytes: None,
            }],
            ..Default::default()
        };
        let b = SolutionMetrics {
            id: "b".into(),
            title: "Sorting".into(),
            speedup: Some(8.0),
            benchmarks: vec![BenchmarkPoint {
                input_size: 1000,
                execution_time_ms: 2.0,
                memory_bytes: None,
            }],
            ..Default::default()
        };
        let cmp = compare(&[a, b]).unwrap();
        let text = comparison(&cmp, &[]);
        assert!(text.contains("- **Fastest**: Hash set (#a)"));
        assert!(text.contains("- **Best Overall**: No data"));
        assert!(text.contains("| 1,000 | 0.500ms ⚡ | 2.000ms |"));
    }

    #[test]
    fn efficiency_row_shows_tier() {
        let metrics = |id: &str| SolutionMetrics {
            id: id.into(),
            title: format!("Solution {id}"),
            ..Default::default()
        };
        let solutions: Vec<Solution> = serde_json::from_value(serde_json::json!([
            {"id": "a", "problem_id": "1", "title": "A", "code": "", "language": "Rust", "efficiency_score": 91.2},
            {"id": "b", "problem_id": "1", "title": "B", "code": "", "language": "Rust", "efficiency_score": 45.0}
        ]))
        .unwrap();
        let cmp = compare(&[metrics("a"), metrics("b")]).unwrap();
        let text = comparison(&cmp, &solutions);
        assert!(text.contains("| Efficiency | 91/100 🟢 Excellent | 45/100 🟡 Fair |"));
    }
}
