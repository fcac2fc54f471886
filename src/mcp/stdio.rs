// src/mcp/stdio.rs

//! Newline-delimited JSON-RPC over stdin and stdout.
//!
//! `rmcp`'s byte-stream transport ends the session on the first line it
//! cannot decode. Input is screened first: lines that are not valid UTF-8,
//! not JSON or not a request the server understands are answered with a
//! JSON-RPC error here, and only decodable messages reach the session.

use std::sync::Arc;

use rmcp::{
    ServiceExt,
    model::{ClientJsonRpcMessage, ErrorCode, ErrorData},
};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::Mutex,
};

use crate::error::AppError;

use super::CodeForgeServer;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Methods the server handles. A malformed call to one of them gets
/// invalid-params rather than method-not-found.
const KNOWN_METHODS: [&str; 4] = ["initialize", "ping", "tools/list", "tools/call"];

#[derive(Debug, PartialEq)]
enum Screened {
    Skip,
    Forward(String),
    Reject(Value),
}

fn error_reply(id: Value, code: ErrorCode, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": ErrorData::new(code, message, None),
    })
}

/// Decides what happens to one raw input line.
fn screen(raw: &[u8]) -> Screened {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        return Screened::Skip;
    }

    let message: Value = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(e) => {
            return Screened::Reject(error_reply(
                Value::Null,
                ErrorCode::PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };

    if serde_json::from_value::<ClientJsonRpcMessage>(message.clone()).is_ok() {
        return Screened::Forward(line.to_string());
    }

    let id = message.get("id").cloned();
    let version_ok = message.get("jsonrpc").and_then(Value::as_str) == Some("2.0");
    let method = message.get("method").and_then(Value::as_str);

    let (code, text) = match (method, &id) {
        (Some(method), None) if version_ok => {
            tracing::debug!("Dropping notification {}", method);
            return Screened::Skip;
        }
        _ if !version_ok => (
            ErrorCode::INVALID_REQUEST,
            "Invalid request: jsonrpc must be \"2.0\"".to_string(),
        ),
        (None, _) => (
            ErrorCode::INVALID_REQUEST,
            "Invalid request: missing method".to_string(),
        ),
        (Some(_), Some(id)) if !(id.is_string() || id.is_number()) => (
            ErrorCode::INVALID_REQUEST,
            "Invalid request: id must be a string or a number".to_string(),
        ),
        (Some(method), _) if KNOWN_METHODS.contains(&method) => (
            ErrorCode::INVALID_PARAMS,
            format!("Invalid params for {}", method),
        ),
        (Some(method), _) => (
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        ),
    };
    Screened::Reject(error_reply(id.unwrap_or(Value::Null), code, text))
}

async fn write_line<W: AsyncWrite + Unpin>(output: &Mutex<W>, line: &[u8]) -> std::io::Result<()> {
    let mut out = output.lock().await;
    out.write_all(line).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Feeds screened input to the session; answers rejected lines directly.
async fn pump_input<R, T, W>(input: R, mut to_session: T, output: Arc<Mutex<W>>) -> Result<(), AppError>
where
    R: AsyncRead + Unpin,
    T: AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        match screen(&raw) {
            Screened::Skip => {}
            Screened::Forward(line) => {
                to_session.write_all(line.as_bytes()).await?;
                to_session.write_all(b"\n").await?;
                to_session.flush().await?;
            }
            Screened::Reject(reply) => {
                tracing::debug!("Rejected stdin message: {}", reply["error"]["message"]);
                write_line(&output, &serde_json::to_vec(&reply)?).await?;
            }
        }
    }

    tracing::info!("stdin closed, stopping MCP server");
    to_session.shutdown().await?;
    Ok(())
}

/// Copies the session's replies to the output, one line at a time.
async fn pump_replies<T, W>(from_session: T, output: Arc<Mutex<W>>) -> Result<(), AppError>
where
    T: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(from_session);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(());
        }
        write_line(&output, line.trim_ascii_end()).await?;
    }
}

/// Serves MCP on a line-delimited byte stream until the input closes.
pub async fn serve<R, W>(server: CodeForgeServer, input: R, output: W) -> Result<(), AppError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let output = Arc::new(Mutex::new(output));
    let (ours, theirs) = tokio::io::duplex(PIPE_CAPACITY);
    let (from_session, to_session) = tokio::io::split(ours);

    let input_task = tokio::spawn(pump_input(input, to_session, output.clone()));
    let reply_task = tokio::spawn(pump_replies(from_session, output));

    let outcome = match server.serve(tokio::io::split(theirs)).await {
        Ok(session) => session
            .waiting()
            .await
            .map(|reason| tracing::info!("MCP session ended: {:?}", reason))
            .map_err(|e| AppError::InternalServerError(format!("MCP session failed: {}", e))),
        Err(e) => Err(AppError::InternalServerError(format!(
            "MCP initialization failed: {}",
            e
        ))),
    };

    input_task.abort();
    match reply_task.await {
        Ok(Err(e)) => tracing::warn!("Writing MCP replies failed: {}", e),
        Err(e) => tracing::warn!("MCP reply writer stopped: {}", e),
        Ok(Ok(())) => {}
    }
    outcome
}

/// Runs the server on the process's stdin and stdout.
pub async fn run(server: CodeForgeServer) -> Result<(), AppError> {
    tracing::info!("MCP server listening on stdio");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}
