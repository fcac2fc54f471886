// src/client/mod.rs

//! Typed client for the CodeForge REST API.

pub mod cache;
pub mod token;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use url::Url;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        benchmark::{
            Benchmark, BenchmarkTask, CompareResponse, RunBenchmarkRequest, RunBenchmarkResult,
            TaskStatus,
        },
        comment::{Comment, CommentList, CreateCommentRequest},
        playground::{AnalyzeRequest, PlaygroundAnalysis},
        problem::{Problem, ProblemFilters, ProblemList},
        search::{SearchResult, Suggestions},
        solution::{CategoryStats, CreateSolutionRequest, Solution, SolutionList, VoteResult},
        user::{GithubAuthUrl, TopUsers, UpdateMeRequest, User, UserFilters, UserStats},
    },
    query::{self, SearchParams, SearchRequest, SolutionFilters},
};

use cache::{QueryKey, ResponseCache};
use token::TokenStore;

const NO_QUERY: &[(&str, &str)] = &[];

/// The backend calls the MCP tools rely on.
#[async_trait]
pub trait CodeForgeApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, AppError>;

    async fn solution_benchmarks(&self, solution_id: &str) -> Result<Vec<Benchmark>, AppError>;

    async fn compare(
        &self,
        solution_ids: &[String],
        include_solutions: bool,
    ) -> Result<CompareResponse, AppError>;

    /// The same backend acting with a caller's own token. `None` when the
    /// implementation has no notion of tokens.
    fn with_bearer(&self, _token: &str) -> Option<Arc<dyn CodeForgeApi>> {
        None
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    tokens: Arc<TokenStore>,
    cache: Arc<ResponseCache>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .user_agent(concat!("codeforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tokens = TokenStore::open(config.token.clone(), config.token_file.clone())?;

        Ok(Self {
            http,
            base: config.api_url.clone(),
            tokens: Arc::new(tokens),
            cache: Arc::new(ResponseCache::new(config.cache_ttl)),
        })
    }

    /// A client acting with `token` instead of the stored one.
    ///
    /// Shares the connection pool. The cache is shared too, so only public
    /// reads are ever cached.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            http: self.http.clone(),
            base: self.base.clone(),
            tokens: Arc::new(TokenStore::in_memory(Some(token))),
            cache: self.cache.clone(),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // ---- plumbing ----

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InternalServerError("API base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, AppError> {
        let mut builder = self.http.request(method, self.url(path)?);
        if let Some(token) = self.tokens.get() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Sends a request and decodes the JSON body, mapping failures to `AppError`.
    async fn send(&self, builder: RequestBuilder) -> Result<Value, AppError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!("CodeForge API request failed: {}", e);
            AppError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            if body.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&body).map_err(|e| {
                AppError::InternalServerError(format!("Malformed response body: {}", e))
            })?);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("Backend rejected credentials, clearing stored token");
            self.tokens.clear();
        }

        let message = error_message(status, &body);
        tracing::debug!("CodeForge API returned {}: {}", status, message);
        Err(AppError::from_status(status.as_u16(), message))
    }

    async fn fetch<T, Q>(&self, path: &[&str], query: &Q, key: Option<QueryKey>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        if let Some(hit) = key.as_ref().and_then(|k| self.cache.get(k)) {
            tracing::trace!("Cache hit for /{}", path.join("/"));
            return Ok(serde_json::from_value(hit).map_err(decode_error)?);
        }

        let value = self.send(self.request(Method::GET, path)?.query(query)).await?;

        if let Some(key) = key {
            self.cache.insert(key, value.clone());
        }
        serde_json::from_value(value).map_err(decode_error)
    }

    async fn post<T, B>(&self, path: &[&str], body: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.send(self.request(Method::POST, path)?.json(body)).await?;
        serde_json::from_value(value).map_err(decode_error)
    }

    // ---- search ----

    /// Runs a search, choosing semantic search or category listing.
    pub async fn search_with(&self, params: &SearchParams) -> Result<SearchResult, AppError> {
        self.run_search(&query::build(params)).await
    }

    pub async fn run_search(&self, request: &SearchRequest) -> Result<SearchResult, AppError> {
        match request {
            SearchRequest::Disabled => Ok(SearchResult::empty()),
            SearchRequest::Semantic(q) => {
                q.validate()?;
                let key = QueryKey::new(["search".to_string(), cache_part(q)]);
                if let Some(hit) = self.cache.get(&key) {
                    return serde_json::from_value(hit).map_err(decode_error);
                }
                let value = self.send(self.request(Method::POST, &["search"])?.json(q)).await?;
                self.cache.insert(key, value.clone());
                serde_json::from_value(value).map_err(decode_error)
            }
            SearchRequest::ByCategory(q) => {
                let key = QueryKey::new(["search".to_string(), cache_part(q)]);
                let mut result: SearchResult = self.fetch(&["search", "by-category"], q, Some(key)).await?;
                if result.query.is_empty() {
                    result.query = q.category.to_string();
                }
                Ok(result)
            }
        }
    }

    /// Suggestions for a prefix; short prefixes return nothing without a call.
    pub async fn suggestions(&self, prefix: &str) -> Result<Suggestions, AppError> {
        if !query::should_suggest(prefix) {
            return Ok(Suggestions::default());
        }
        let key = QueryKey::new(["searchSuggestions", prefix.trim()]);
        self.fetch(&["search", "suggestions"], &[("q", prefix.trim())], Some(key))
            .await
    }

    // ---- problems ----

    pub async fn list_problems(&self, filters: &ProblemFilters) -> Result<ProblemList, AppError> {
        let key = QueryKey::new(["problems".to_string(), cache_part(filters)]);
        self.fetch(&["problems"], filters, Some(key)).await
    }

    pub async fn get_problem(&self, id: &str) -> Result<Problem, AppError> {
        let key = QueryKey::new(["problems", "id", id]);
        self.fetch(&["problems", id], NO_QUERY, Some(key))
            .await
    }

    pub async fn get_problem_by_slug(&self, slug: &str) -> Result<Problem, AppError> {
        let key = QueryKey::new(["problems", "slug", slug]);
        self.fetch(&["problems", "slug", slug], NO_QUERY, Some(key))
            .await
    }

    // ---- solutions ----

    pub async fn list_solutions(&self, filters: &SolutionFilters) -> Result<SolutionList, AppError> {
        let pairs = filters.to_query();
        let key = QueryKey::new(["solutions".to_string(), cache_part(&pairs)]);
        self.fetch(&["solutions"], &pairs, Some(key)).await
    }

    pub async fn get_solution(&self, id: &str) -> Result<Solution, AppError> {
        let key = QueryKey::new(["solutions", "id", id]);
        self.fetch(&["solutions", id], NO_QUERY, Some(key))
            .await
    }

    pub async fn create_solution(&self, request: &CreateSolutionRequest) -> Result<Solution, AppError> {
        request.validate()?;
        let solution: Solution = self.post(&["solutions"], request).await?;
        self.cache.invalidate("solutions");
        self.cache.invalidate("search");
        tracing::info!("Created solution {}", solution.id);
        Ok(solution)
    }

    /// Casts an up (+1) or down (-1) vote.
    pub async fn vote(&self, solution_id: &str, value: i8) -> Result<VoteResult, AppError> {
        if value != 1 && value != -1 {
            return Err(AppError::BadRequest(format!(
                "Vote value must be +1 or -1, got {}",
                value
            )));
        }
        let builder = self
            .request(Method::POST, &["solutions", solution_id, "vote"])?
            .query(&[("value", value)]);
        let result: VoteResult = serde_json::from_value(self.send(builder).await?).map_err(decode_error)?;
        self.cache.invalidate("solutions");
        self.cache.invalidate("search");
        Ok(result)
    }

    pub async fn category_stats(&self) -> Result<Vec<CategoryStats>, AppError> {
        let key = QueryKey::new(["solutions", "categoryStats"]);
        self.fetch(&["solutions", "stats", "by-category"], NO_QUERY, Some(key)).await
    }

    // ---- users ----

    pub async fn list_users(&self, filters: &UserFilters) -> Result<Vec<User>, AppError> {
        let key = QueryKey::new(["users".to_string(), cache_part(filters)]);
        self.fetch(&["users"], filters, Some(key)).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, AppError> {
        let key = QueryKey::new(["users", "id", id]);
        self.fetch(&["users", id], NO_QUERY, Some(key))
            .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, AppError> {
        let key = QueryKey::new(["users", "username", username]);
        self.fetch(&["users", "username", username], NO_QUERY, Some(key))
            .await
    }

    pub async fn top_users(&self, limit: Option<u32>) -> Result<TopUsers, AppError> {
        let key = QueryKey::new(["users".to_string(), "top".to_string(), format!("{:?}", limit)]);
        let query: Vec<(&str, u32)> = limit.map(|l| ("limit", l)).into_iter().collect();
        self.fetch(&["users", "leaderboard", "top"], &query, Some(key)).await
    }

    pub async fn update_me(&self, request: &UpdateMeRequest) -> Result<User, AppError> {
        request.validate()?;
        let value = self
            .send(self.request(Method::PATCH, &["users", "me"])?.json(request))
            .await?;
        self.cache.invalidate("users");
        serde_json::from_value(value).map_err(decode_error)
    }

    pub async fn my_stats(&self) -> Result<UserStats, AppError> {
        self.fetch(&["users", "me", "stats"], NO_QUERY, None).await
    }

    // ---- benchmarks ----

    pub async fn solution_benchmarks(&self, solution_id: &str) -> Result<Vec<Benchmark>, AppError> {
        let key = QueryKey::new(["benchmarks", "solution", solution_id]);
        self.fetch(
            &["benchmarks", "solution", solution_id],
            NO_QUERY,
            Some(key),
        )
        .await
    }

    pub async fn compare_benchmarks(
        &self,
        solution_ids: &[String],
        include_solutions: bool,
    ) -> Result<CompareResponse, AppError> {
        crate::compare::validate_ids(solution_ids)?;
        let joined = solution_ids.join(",");
        let key = QueryKey::new([
            "benchmarks".to_string(),
            "compare".to_string(),
            joined.clone(),
            include_solutions.to_string(),
        ]);
        let mut query = vec![("solution_ids", joined)];
        if include_solutions {
            query.push(("include_solutions", "true".to_string()));
        }
        self.fetch(&["benchmarks", "compare"], &query, Some(key)).await
    }

    pub async fn run_benchmark(&self, request: &RunBenchmarkRequest) -> Result<RunBenchmarkResult, AppError> {
        let result: RunBenchmarkResult = self.post(&["benchmarks", "run"], request).await?;
        self.cache.invalidate("benchmarks");
        self.cache.invalidate("solutions");
        if result.success {
            tracing::info!("Benchmark run for {} finished", request.solution_id);
        } else {
            tracing::warn!(
                "Benchmark run for {} failed: {}",
                request.solution_id,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(result)
    }

    pub async fn run_benchmark_async(&self, request: &RunBenchmarkRequest) -> Result<BenchmarkTask, AppError> {
        self.post(&["benchmarks", "run", "async"], request).await
    }

    /// Polls a queued run. A finished task invalidates benchmark data.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus, AppError> {
        let status: TaskStatus = self
            .fetch(&["benchmarks", "task", task_id], NO_QUERY, None)
            .await?;
        if status.is_finished() {
            self.cache.invalidate("benchmarks");
            self.cache.invalidate("solutions");
        }
        Ok(status)
    }

    // ---- comments ----

    pub async fn solution_comments(&self, solution_id: &str, page: u32, size: u32) -> Result<CommentList, AppError> {
        let key = QueryKey::new([
            "comments".to_string(),
            solution_id.to_string(),
            format!("{}:{}", page, size),
        ]);
        self.fetch(
            &["comments", "solution", solution_id],
            &[("page", page), ("size", size)],
            Some(key),
        )
        .await
    }

    pub async fn create_comment(&self, request: &CreateCommentRequest) -> Result<Comment, AppError> {
        request.validate()?;
        let comment = self.post(&["comments"], request).await?;
        self.cache.invalidate("comments");
        Ok(comment)
    }

    // ---- playground ----

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<PlaygroundAnalysis, AppError> {
        request.validate()?;
        self.post(&["playground", "analyze"], request).await
    }

    // ---- auth ----

    pub async fn github_auth_url(&self) -> Result<GithubAuthUrl, AppError> {
        self.fetch(&["auth", "github"], NO_QUERY, None).await
    }

    /// The logged-in user. Fails with `AuthError` when no token is stored.
    pub async fn me(&self) -> Result<User, AppError> {
        if !self.tokens.is_set() {
            return Err(AppError::AuthError("Not logged in".to_string()));
        }
        self.fetch(&["auth", "me"], NO_QUERY, None).await
    }

    /// Stores a token obtained from the OAuth callback.
    pub fn login_with_token(&self, token: String) -> Result<(), AppError> {
        self.tokens.set(token)?;
        self.cache.clear();
        Ok(())
    }

    /// Logs out locally; the backend call is best effort.
    pub async fn logout(&self) {
        if self.tokens.is_set() {
            let outcome = match self.request(Method::POST, &["auth", "logout"]) {
                Ok(builder) => self.send(builder).await.map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                tracing::debug!("Backend logout failed, ignoring: {}", e);
            }
        }
        self.tokens.clear();
        self.cache.clear();
    }
}

#[async_trait]
impl CodeForgeApi for ApiClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, AppError> {
        self.run_search(request).await
    }

    async fn solution_benchmarks(&self, solution_id: &str) -> Result<Vec<Benchmark>, AppError> {
        ApiClient::solution_benchmarks(self, solution_id).await
    }

    async fn compare(
        &self,
        solution_ids: &[String],
        include_solutions: bool,
    ) -> Result<CompareResponse, AppError> {
        self.compare_benchmarks(solution_ids, include_solutions).await
    }

    fn with_bearer(&self, token: &str) -> Option<Arc<dyn CodeForgeApi>> {
        Some(Arc::new(self.with_token(token.to_string())))
    }
}

/// Picks the most useful message out of an error body.
///
/// FastAPI puts it in `detail` (a string, or a list of validation errors);
/// other layers use `message` or `error`.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| "An error occurred".to_string())
    };

    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        return fallback();
    };

    match json.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        Some(Value::Array(items)) if !items.is_empty() => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if !msgs.is_empty() {
                return msgs.join("; ");
            }
        }
        _ => {}
    }

    ["message", "error"]
        .iter()
        .find_map(|k| json.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

fn decode_error(err: serde_json::Error) -> AppError {
    AppError::InternalServerError(format!("Unexpected response shape: {}", err))
}

fn cache_part<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| json!(null).to_string())
}
