//! Builtin tools
//!
//! One module per provider. Each module keeps request building and response
//! parsing in pure functions, separated from the single I/O call.

pub mod arxiv;
pub mod filesystem;
pub mod weather;
pub mod web_search;
pub mod wikipedia;

pub use arxiv::ArxivTool;
pub use filesystem::{ListFilesTool, ReadFileTool, WriteFileTool};
pub use weather::WeatherTool;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

use crate::error::{ToolError, ToolOutcome};

/// Cap on how much of an upstream error body is echoed back
const ERROR_BODY_PREVIEW: usize = 200;

/// Build the HTTP client shared by all provider tools
pub fn build_http_client() -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .map_err(|e| ToolError::Initialization(e.to_string()))
}

/// Turn a non-2xx response into an upstream error
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> ToolOutcome<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ToolError::upstream(
        provider,
        format!("HTTP {}: {}", status.as_u16(), preview(&body)),
    ))
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reject blank query strings before any request is made
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> ToolOutcome<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidParameters(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Attention Is\n  All You   Need "),
            "Attention Is All You Need"
        );
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("query", "  rust  ").unwrap(), "rust");
        assert!(matches!(
            require_text("query", "   "),
            Err(ToolError::InvalidParameters(msg)) if msg == "query must not be empty"
        ));
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = "e".repeat(500);
        let shown = preview(&body);
        assert_eq!(shown.len(), ERROR_BODY_PREVIEW + 3);
        assert!(shown.ends_with("..."));
        assert_eq!(preview(" short "), "short");
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }
}
