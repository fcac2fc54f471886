// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use codeforge::{config::Config, routes, state::AppState};
use serde_json::{Value, json};

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub auth: Option<String>,
}

/// In-process stand-in for the CodeForge REST API.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }
}

async fn record(State(backend): State<Arc<FakeBackend>>, req: Request<Body>, next: Next) -> Response {
    let call = Call {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        auth: req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    backend.calls.lock().unwrap().push(call);
    next.run(req).await
}

pub fn search_item(id: &str, title: &str, speedup: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "code_preview": "def solve(a):\n    return len(set(a)) != len(a)",
        "language": "Python",
        "speedup": speedup,
        "badges": ["fastest", "gpu-ready"],
        "vote_count": 12,
        "author_username": "ada",
        "problem_id": 3,
        "problem_title": "Find duplicates",
        "similarity_score": 0.91
    })
}

pub fn solution(id: &str, title: &str, speedup: f64, efficiency: f64) -> Value {
    json!({
        "id": id,
        "problem_id": "3",
        "title": title,
        "code": "pass",
        "language": "Python",
        "speedup": speedup,
        "efficiency_score": efficiency,
        "badges": [],
        "vote_count": 4
    })
}

async fn search(Json(body): Json<Value>) -> Response {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    match query.as_str() {
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "search exploded"})),
        )
            .into_response(),
        "locked" => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Token expired"}))).into_response(),
        "nothing" => Json(json!({"items": [], "total": 0, "query": query})).into_response(),
        _ => Json(json!({
            "items": [
                search_item("1", "Hash set duplicates", 147.0),
                search_item("2", "Sort and scan", 12.5)
            ],
            "total": 2,
            "query": query
        }))
        .into_response(),
    }
}

async fn by_category(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let category = params.get("category").cloned().unwrap_or_default();
    Json(json!({
        "items": [search_item("9", &format!("Best of {}", category), 3.0)],
        "total": 1
    }))
}

async fn compare(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let benchmarks = json!({
        "1": [{"input_size": 1000, "execution_time_ms": 0.5, "memory_bytes": 2048}],
        "2": [{"input_size": 1000, "execution_time_ms": 2.0, "memory_bytes": 1024}]
    });
    if params.get("include_solutions").map(String::as_str) == Some("true") {
        Json(json!({
            "benchmarks": benchmarks,
            "solutions": [
                solution("1", "Hash set", 40.0, 70.0),
                solution("2", "Sorting", 8.0, 90.0)
            ],
            "winner_speed": 1
        }))
    } else {
        Json(benchmarks)
    }
}

async fn solution_benchmarks(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "404" => (StatusCode::NOT_FOUND, Json(json!({"detail": "Solution not found"}))).into_response(),
        "empty" => Json(json!([])).into_response(),
        "legacy" => Json(json!([
            {"id": 3, "solution_id": 11, "input_size": "10000", "execution_time_ms": 2.5, "memory_mb": 1.5, "iterations": 10, "created_at": "2024-03-01T12:00:00Z"}
        ]))
        .into_response(),
        _ => Json(json!([
            {"id": 1, "solution_id": id, "input_size": "100,000", "execution_time_ms": 12.25, "memory_bytes": 4096, "runs_count": 5},
            {"id": 2, "solution_id": id, "input_size": 1000, "execution_time_ms": 0.125}
        ]))
        .into_response(),
    }
}

async fn get_solution(Path(id): Path<String>) -> Json<Value> {
    Json(solution(&id, "Hash set", 40.0, 70.0))
}

async fn create_solution(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let title = body["title"].as_str().unwrap_or("untitled");
    (StatusCode::CREATED, Json(solution("99", title, 1.0, 50.0)))
}

async fn run_benchmark(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "success": true,
        "speedup": 4.0,
        "results": [{
            "input_size": "1000",
            "baseline_time_ms": 8.0,
            "optimized_time_ms": 2.0,
            "speedup": 4.0
        }],
        "solution_id": body["solution_id"]
    }))
}

async fn task_status(Path(id): Path<String>) -> Json<Value> {
    let status = if id == "running" { "PENDING" } else { "SUCCESS" };
    Json(json!({"task_id": id, "status": status}))
}

async fn vote(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let delta: i64 = params.get("value").and_then(|v| v.parse().ok()).unwrap_or(0);
    Json(json!({"vote_count": 10 + delta}))
}

async fn me(req: Request<Body>) -> Response {
    match req.headers().get(header::AUTHORIZATION) {
        Some(v) if v == "Bearer good-token" => {
            Json(json!({"id": 5, "username": "ada", "score": 42})).into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"}))).into_response(),
    }
}

async fn logout() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

/// Spawns the fake backend. Returns its API base URL and the call recorder.
pub async fn spawn_backend() -> (String, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::default());

    let api = Router::new()
        .route("/search", post(search))
        .route("/search/by-category", get(by_category))
        .route("/benchmarks/compare", get(compare))
        .route("/benchmarks/solution/{id}", get(solution_benchmarks))
        .route("/benchmarks/run", post(run_benchmark))
        .route("/benchmarks/task/{id}", get(task_status))
        .route("/solutions", post(create_solution))
        .route("/solutions/{id}", get(get_solution))
        .route("/solutions/{id}/vote", post(vote))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout));

    let app = Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{}/api/v1", port), backend)
}

/// Base URL of an address nothing listens on.
pub async fn dead_api_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/v1", port)
}

/// Spawns the MCP HTTP transport against `api_url` on a random port.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(api_url: &str) -> String {
    let config = Config::for_api(api_url).expect("valid test config");
    let state = AppState::new(config).expect("Failed to build app state");
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Posts one JSON-RPC message to `/mcp` the way streamable-HTTP clients do.
pub async fn post_mcp(address: &str, body: Value, token: Option<&str>) -> reqwest::Response {
    let mut request = reqwest::Client::new()
        .post(format!("{}/mcp", address))
        .header(reqwest::header::ACCEPT, "application/json, text/event-stream")
        .json(&body);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    request.send().await.expect("Failed to execute request")
}

/// Decodes a streamable-HTTP reply: a JSON body, or the JSON-RPC message
/// carried in an event stream's `data:` lines.
pub async fn read_reply(response: reqwest::Response) -> Value {
    let event_stream = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream"));
    let body = response.text().await.expect("reply body");

    if !event_stream {
        return serde_json::from_str(&body).expect("JSON-RPC reply");
    }
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter_map(|data| serde_json::from_str::<Value>(data).ok())
        .find(|message| message.get("jsonrpc").is_some())
        .expect("JSON-RPC message in event stream")
}

/// Sends one JSON-RPC request to `/mcp` and returns the decoded reply.
pub async fn rpc(address: &str, method: &str, params: Value) -> Value {
    rpc_with_token(address, method, params, None).await
}

pub async fn rpc_with_token(address: &str, method: &str, params: Value, token: Option<&str>) -> Value {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    });
    let response = post_mcp(address, body, token).await;
    assert_eq!(response.status().as_u16(), 200);
    read_reply(response).await
}

/// Calls a tool and returns `(text, is_error)`.
pub async fn call_tool(address: &str, name: &str, arguments: Value) -> (String, bool) {
    let reply = rpc(address, "tools/call", json!({"name": name, "arguments": arguments})).await;
    tool_text(&reply)
}

pub fn tool_text(reply: &Value) -> (String, bool) {
    let result = &reply["result"];
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    (text, result["isError"].as_bool().unwrap_or(false))
}
