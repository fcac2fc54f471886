// src/mcp/server.rs

use std::sync::Arc;

use axum::http::request::Parts;
use rmcp::{
    RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router,
};

use crate::{client::CodeForgeApi, error::AppError, utils::jwt::bearer_token};

use super::{
    SERVER_NAME,
    tools::{self, AnalyzeArgs, BenchmarkArgs, CompareArgs, OptimizeArgs, SearchArgs},
};

const INSTRUCTIONS: &str = "CodeForge: crowd-sourced, benchmarked optimized code.\n\
    - codeforge_search: find faster implementations by describing what the code does\n\
    - codeforge_analyze: local complexity estimate and performance hints\n\
    - codeforge_optimize: optimized versions of your code, or a prompt to write variants\n\
    - codeforge_benchmark: measured timings per input size\n\
    - codeforge_compare: side-by-side winners for 2-3 solutions";

/// MCP server exposing the CodeForge tools.
#[derive(Clone)]
pub struct CodeForgeServer {
    api: Arc<dyn CodeForgeApi>,
    tool_router: ToolRouter<Self>,
}

impl CodeForgeServer {
    /// Backend for one call. Over HTTP a caller's bearer token replaces the
    /// server's own, for that call only.
    fn api_for(&self, context: &RequestContext<RoleServer>) -> Arc<dyn CodeForgeApi> {
        context
            .extensions
            .get::<Parts>()
            .and_then(|parts| bearer_token(&parts.headers))
            .and_then(|token| self.api.with_bearer(&token))
            .unwrap_or_else(|| self.api.clone())
    }
}

/// Failures become `isError` results reading `Error: <message>`.
fn reply(tool: &str, outcome: Result<String, AppError>) -> Result<String, String> {
    outcome.map_err(|e| {
        tracing::warn!("Tool {} failed: {}", tool, e);
        format!("Error: {}", e)
    })
}

#[tool_router]
impl CodeForgeServer {
    pub fn new(api: Arc<dyn CodeForgeApi>) -> Self {
        Self {
            api,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "codeforge_search",
        description = "Search CodeForge for optimized code solutions. Finds faster implementations of algorithms with measured speedups."
    )]
    async fn search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<String, String> {
        let api = self.api_for(&context);
        reply("codeforge_search", tools::search(api.as_ref(), args).await)
    }

    #[tool(
        name = "codeforge_analyze",
        description = "Analyze code for performance issues and estimate its time and space complexity."
    )]
    async fn analyze(&self, Parameters(args): Parameters<AnalyzeArgs>) -> Result<String, String> {
        reply("codeforge_analyze", tools::analyze(args))
    }

    #[tool(
        name = "codeforge_optimize",
        description = "Get an optimized version of your code. Searches CodeForge for faster implementations of similar algorithms, or asks for new variants."
    )]
    async fn optimize(
        &self,
        Parameters(args): Parameters<OptimizeArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<String, String> {
        let api = self.api_for(&context);
        reply("codeforge_optimize", tools::optimize(api.as_ref(), args).await)
    }

    #[tool(
        name = "codeforge_benchmark",
        description = "Get benchmark data for CodeForge solutions across input sizes, or compare 2-3 solutions."
    )]
    async fn benchmark(
        &self,
        Parameters(args): Parameters<BenchmarkArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<String, String> {
        let api = self.api_for(&context);
        reply("codeforge_benchmark", tools::benchmark(api.as_ref(), args).await)
    }

    #[tool(
        name = "codeforge_compare",
        description = "Compare 2-3 CodeForge solutions side by side and pick the fastest, the most memory efficient and the best overall."
    )]
    async fn compare(
        &self,
        Parameters(args): Parameters<CompareArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<String, String> {
        let api = self.api_for(&context);
        reply("codeforge_compare", tools::compare_solutions(api.as_ref(), args).await)
    }
}

#[tool_handler]
impl ServerHandler for CodeForgeServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}
