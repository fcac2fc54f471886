// src/compare.rs

//! Side-by-side comparison of 2-3 solutions.
//!
//! Winners are recomputed from the raw metrics rather than taken from the
//! backend. A tie for the best value is reported as such; there is no
//! tie-break.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::{
    error::AppError,
    models::{
        benchmark::{BenchmarkPoint, CompareResponse},
        solution::Solution,
    },
};

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 3;

const REL_EPSILON: f64 = 1e-9;

/// The metric a winner is picked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Speed,
    Memory,
    Balanced,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Speed => "Fastest",
            Metric::Memory => "Best Memory",
            Metric::Balanced => "Best Overall",
        }
    }
}

/// Result of picking the best solution on one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum Outcome {
    Winner(String),
    /// Several solutions share the best value, in input order.
    Tie(Vec<String>),
    /// No solution reported the metric.
    NoData,
}

impl Outcome {
    pub fn winner(&self) -> Option<&str> {
        match self {
            Outcome::Winner(id) => Some(id),
            _ => None,
        }
    }

    pub fn includes(&self, id: &str) -> bool {
        match self {
            Outcome::Winner(w) => w == id,
            Outcome::Tie(ids) => ids.iter().any(|t| t == id),
            Outcome::NoData => false,
        }
    }
}

/// The numbers of one solution that take part in a comparison.
#[derive(Debug, Clone, Default)]
pub struct SolutionMetrics {
    pub id: String,
    pub title: String,
    pub speedup: Option<f64>,
    pub memory_reduction: Option<f64>,
    pub efficiency_score: Option<f64>,
    pub benchmarks: Vec<BenchmarkPoint>,
}

impl SolutionMetrics {
    pub fn from_solution(solution: &Solution, benchmarks: Vec<BenchmarkPoint>) -> Self {
        Self {
            id: solution.id.clone(),
            title: solution.title.clone(),
            speedup: solution.speedup,
            memory_reduction: solution.memory_reduction,
            efficiency_score: solution.efficiency_score,
            benchmarks,
        }
    }

    /// Mean measured memory across the benchmark rows that report it.
    pub fn mean_memory_bytes(&self) -> Option<f64> {
        let measured: Vec<f64> = self
            .benchmarks
            .iter()
            .filter_map(|b| b.memory_bytes)
            .map(|m| m as f64)
            .collect();
        if measured.is_empty() {
            None
        } else {
            Some(measured.iter().sum::<f64>() / measured.len() as f64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkCell {
    pub execution_time_ms: f64,
    pub memory_bytes: Option<u64>,
}

/// One input size across all compared solutions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub input_size: u64,
    /// One cell per solution, in comparison order.
    pub cells: Vec<Option<BenchmarkCell>>,
    pub fastest: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub solution_ids: Vec<String>,
    pub titles: Vec<String>,
    pub speed: Outcome,
    pub memory: Outcome,
    pub balanced: Outcome,
    pub rows: Vec<BenchmarkRow>,
}

impl Comparison {
    /// Winner labels a solution earned, e.g. `["Fastest", "Best Overall"]`.
    /// Tied solutions get no label.
    pub fn labels_for(&self, id: &str) -> Vec<&'static str> {
        [
            (Metric::Speed, &self.speed),
            (Metric::Memory, &self.memory),
            (Metric::Balanced, &self.balanced),
        ]
        .into_iter()
        .filter(|(_, outcome)| outcome.winner() == Some(id))
        .map(|(metric, _)| metric.label())
        .collect()
    }

    pub fn outcome(&self, metric: Metric) -> &Outcome {
        match metric {
            Metric::Speed => &self.speed,
            Metric::Memory => &self.memory,
            Metric::Balanced => &self.balanced,
        }
    }
}

/// Checks that 2-3 distinct solution ids were given.
pub fn validate_ids<S: AsRef<str>>(ids: &[S]) -> Result<(), AppError> {
    if ids.len() < MIN_COMPARE || ids.len() > MAX_COMPARE {
        return Err(AppError::BadRequest(format!(
            "Must compare {} or {} solutions, got {}",
            MIN_COMPARE,
            MAX_COMPARE,
            ids.len()
        )));
    }
    let mut seen = HashSet::new();
    for id in ids {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(AppError::BadRequest("Solution id must not be empty".to_string()));
        }
        if !seen.insert(id) {
            return Err(AppError::BadRequest(format!(
                "Solution '{}' listed more than once",
                id
            )));
        }
    }
    Ok(())
}

/// Picks per-metric winners and tabulates benchmarks by input size.
pub fn compare(solutions: &[SolutionMetrics]) -> Result<Comparison, AppError> {
    let ids: Vec<&str> = solutions.iter().map(|s| s.id.as_str()).collect();
    validate_ids(&ids)?;

    let speed = best(solutions.iter().map(|s| (s.id.as_str(), s.speedup)), Direction::Max);

    let balanced = best(
        solutions.iter().map(|s| (s.id.as_str(), s.efficiency_score)),
        Direction::Max,
    );

    let measured = solutions.iter().any(|s| s.mean_memory_bytes().is_some());
    let memory = if measured {
        best(
            solutions.iter().map(|s| (s.id.as_str(), s.mean_memory_bytes())),
            Direction::Min,
        )
    } else {
        best(
            solutions.iter().map(|s| (s.id.as_str(), s.memory_reduction)),
            Direction::Max,
        )
    };

    Ok(Comparison {
        solution_ids: solutions.iter().map(|s| s.id.clone()).collect(),
        titles: solutions.iter().map(|s| s.title.clone()).collect(),
        speed,
        memory,
        balanced,
        rows: benchmark_rows(solutions),
    })
}

/// Builds a comparison for `ids` out of a `/benchmarks/compare` response.
///
/// Solutions missing from the response still take part, without metrics.
pub fn from_response(ids: &[String], response: &CompareResponse) -> Result<Comparison, AppError> {
    validate_ids(ids)?;

    let metrics: Vec<SolutionMetrics> = ids
        .iter()
        .map(|id| {
            let benchmarks = response.benchmarks.get(id).cloned().unwrap_or_default();
            let solution = response
                .solutions
                .as_deref()
                .and_then(|all| all.iter().find(|s| &s.id == id));
            match solution {
                Some(s) => SolutionMetrics::from_solution(s, benchmarks),
                None => SolutionMetrics {
                    id: id.clone(),
                    title: format!("Solution #{}", id),
                    benchmarks,
                    ..Default::default()
                },
            }
        })
        .collect();

    let comparison = compare(&metrics)?;

    if let Some(claimed) = &response.winner_speed {
        if comparison.speed.winner() != Some(claimed.as_str()) {
            tracing::debug!(
                "Backend speed winner {} differs from recomputed {:?}",
                claimed,
                comparison.speed
            );
        }
    }

    Ok(comparison)
}

fn benchmark_rows(solutions: &[SolutionMetrics]) -> Vec<BenchmarkRow> {
    let sizes: BTreeSet<u64> = solutions
        .iter()
        .flat_map(|s| s.benchmarks.iter().map(|b| b.input_size))
        .collect();

    sizes
        .into_iter()
        .map(|input_size| {
            let cells: Vec<Option<BenchmarkCell>> = solutions
                .iter()
                .map(|s| {
                    s.benchmarks
                        .iter()
                        .find(|b| b.input_size == input_size)
                        .map(|b| BenchmarkCell {
                            execution_time_ms: b.execution_time_ms,
                            memory_bytes: b.memory_bytes,
                        })
                })
                .collect();
            let fastest = best(
                solutions
                    .iter()
                    .zip(&cells)
                    .map(|(s, c)| (s.id.as_str(), c.map(|c| c.execution_time_ms))),
                Direction::Min,
            );
            BenchmarkRow {
                input_size,
                cells,
                fastest,
            }
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Direction {
    Max,
    Min,
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= REL_EPSILON * a.abs().max(b.abs()).max(1.0)
}

fn best<'a>(values: impl Iterator<Item = (&'a str, Option<f64>)>, direction: Direction) -> Outcome {
    let present: Vec<(&str, f64)> = values
        .filter_map(|(id, v)| v.filter(|v| v.is_finite()).map(|v| (id, v)))
        .collect();

    let top = present.iter().map(|(_, v)| *v).reduce(|a, b| match direction {
        Direction::Max => a.max(b),
        Direction::Min => a.min(b),
    });

    let Some(top) = top else {
        return Outcome::NoData;
    };

    let mut leaders: Vec<String> = present
        .iter()
        .filter(|(_, v)| approx_eq(*v, top))
        .map(|(id, _)| id.to_string())
        .collect();

    if leaders.len() == 1 {
        Outcome::Winner(leaders.remove(0))
    } else {
        Outcome::Tie(leaders)
    }
}
