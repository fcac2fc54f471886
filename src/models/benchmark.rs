// src/models/benchmark.rs

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::solution::Solution;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One measured run of a solution at a given input size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BenchmarkWire")]
pub struct Benchmark {
    pub id: Option<String>,
    pub solution_id: String,
    pub hardware_profile: Option<String>,
    pub input_size: u64,
    pub execution_time_ms: f64,
    pub memory_bytes: Option<u64>,
    pub runs_count: Option<u32>,
    pub baseline_time_ms: Option<f64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Benchmark rows as the backend sends them. Memory comes either as
/// `memory_bytes` or as fractional `memory_mb`.
#[derive(Deserialize)]
struct BenchmarkWire {
    #[serde(default, deserialize_with = "super::opt_string_id")]
    id: Option<String>,
    #[serde(deserialize_with = "super::string_id")]
    solution_id: String,
    #[serde(default, alias = "cpu_info")]
    hardware_profile: Option<String>,
    #[serde(deserialize_with = "de_input_size")]
    input_size: u64,
    execution_time_ms: f64,
    #[serde(default)]
    memory_bytes: Option<u64>,
    #[serde(default)]
    memory_mb: Option<f64>,
    #[serde(default, alias = "iterations")]
    runs_count: Option<u32>,
    #[serde(default)]
    baseline_time_ms: Option<f64>,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<BenchmarkWire> for Benchmark {
    fn from(w: BenchmarkWire) -> Self {
        Self {
            id: w.id,
            solution_id: w.solution_id,
            hardware_profile: w.hardware_profile,
            input_size: w.input_size,
            execution_time_ms: w.execution_time_ms,
            memory_bytes: memory_bytes(w.memory_bytes, w.memory_mb),
            runs_count: w.runs_count,
            baseline_time_ms: w.baseline_time_ms,
            created_at: w.created_at,
        }
    }
}

/// Row shape used inside `/benchmarks/compare` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointWire")]
pub struct BenchmarkPoint {
    pub input_size: u64,
    pub execution_time_ms: f64,
    pub memory_bytes: Option<u64>,
}

#[derive(Deserialize)]
struct PointWire {
    #[serde(deserialize_with = "de_input_size")]
    input_size: u64,
    execution_time_ms: f64,
    #[serde(default)]
    memory_bytes: Option<u64>,
    #[serde(default)]
    memory_mb: Option<f64>,
}

impl From<PointWire> for BenchmarkPoint {
    fn from(w: PointWire) -> Self {
        Self {
            input_size: w.input_size,
            execution_time_ms: w.execution_time_ms,
            memory_bytes: memory_bytes(w.memory_bytes, w.memory_mb),
        }
    }
}

impl From<&Benchmark> for BenchmarkPoint {
    fn from(b: &Benchmark) -> Self {
        Self {
            input_size: b.input_size,
            execution_time_ms: b.execution_time_ms,
            memory_bytes: b.memory_bytes,
        }
    }
}

/// Byte count from either unit; `memory_bytes` wins when both are present.
fn memory_bytes(bytes: Option<u64>, mb: Option<f64>) -> Option<u64> {
    bytes.or_else(|| {
        mb.filter(|mb| mb.is_finite() && *mb >= 0.0)
            .map(|mb| (mb * BYTES_PER_MB).round() as u64)
    })
}

/// Response of `GET /benchmarks/compare`.
///
/// Older backends return the bare `{solution_id: [rows]}` map; newer ones wrap
/// it together with the solutions and precomputed winners.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompareResponse {
    pub benchmarks: HashMap<String, Vec<BenchmarkPoint>>,
    pub solutions: Option<Vec<Solution>>,
    pub winner_speed: Option<String>,
    pub winner_memory: Option<String>,
    pub winner_balanced: Option<String>,
}

#[derive(Deserialize)]
struct WrappedCompare {
    benchmarks: HashMap<String, Vec<BenchmarkPoint>>,
    #[serde(default)]
    solutions: Option<Vec<Solution>>,
    #[serde(default, deserialize_with = "super::opt_string_id")]
    winner_speed: Option<String>,
    #[serde(default, deserialize_with = "super::opt_string_id")]
    winner_memory: Option<String>,
    #[serde(default, deserialize_with = "super::opt_string_id")]
    winner_balanced: Option<String>,
}

impl<'de> Deserialize<'de> for CompareResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Wrapped(WrappedCompare),
            Bare(HashMap<String, Vec<BenchmarkPoint>>),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Wrapped(w) => CompareResponse {
                benchmarks: w.benchmarks,
                solutions: w.solutions,
                winner_speed: w.winner_speed,
                winner_memory: w.winner_memory,
                winner_balanced: w.winner_balanced,
            },
            Shape::Bare(benchmarks) => CompareResponse {
                benchmarks,
                ..Default::default()
            },
        })
    }
}

/// Body of `POST /benchmarks/run` and `/benchmarks/run/async`.
#[derive(Debug, Clone, Serialize)]
pub struct RunBenchmarkRequest {
    pub solution_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_sizes: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBenchmarkRow {
    #[serde(deserialize_with = "de_input_size")]
    pub input_size: u64,
    pub baseline_time_ms: f64,
    pub optimized_time_ms: f64,
    pub speedup: f64,
}

/// Result of a synchronous benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBenchmarkResult {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub speedup: Option<f64>,
    #[serde(default)]
    pub results: Vec<RunBenchmarkRow>,
}

/// Handle returned by `POST /benchmarks/run/async`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkTask {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Status of a queued benchmark task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub result: Option<RunBenchmarkResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "success" | "completed" | "failure" | "failed"
        )
    }
}

/// Input sizes are numbers in the current API and numeric strings ("10000") in older ones.
fn de_input_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Float(f64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        Raw::Float(f) => Err(serde::de::Error::custom(format!("invalid input size {}", f))),
        Raw::Str(s) => s
            .replace([',', '_'], "")
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid input size '{}'", s))),
    }
}
