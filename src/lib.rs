// src/lib.rs

pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod models;
pub mod presentation;
pub mod query;
pub mod routes;
pub mod state;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
