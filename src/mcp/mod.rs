// src/mcp/mod.rs

//! Model Context Protocol server for the CodeForge tools, built on `rmcp`.
//!
//! The same [`CodeForgeServer`] runs over stdio ([`stdio`]) and over
//! streamable HTTP (mounted at `/mcp` by [`crate::routes`]).

pub mod analyze;
pub mod render;
pub mod server;
pub mod stdio;
pub mod tools;

pub use server::CodeForgeServer;

pub const SERVER_NAME: &str = "codeforge-mcp";
