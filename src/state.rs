// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{client::ApiClient, config::Config, mcp::CodeForgeServer};

#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, crate::error::AppError> {
        let client = ApiClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// MCP server acting with the configured token.
    pub fn server(&self) -> CodeForgeServer {
        CodeForgeServer::new(Arc::new(self.client.clone()))
    }
}

impl FromRef<AppState> for ApiClient {
    fn from_ref(state: &AppState) -> Self {
        state.client.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
