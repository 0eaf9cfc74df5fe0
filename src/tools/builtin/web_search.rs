//! Web search tool implementation
//!
//! Queries the DuckDuckGo HTML endpoint, which needs no API key, and scrapes
//! the organic results in the order the provider ranked them.

use super::{collapse_whitespace, ensure_success, require_text};
use crate::config::WebSearchSection;
use crate::error::{ToolError, ToolOutcome};
use crate::tools::{
    parameter_schema, parse_parameters, SearchHit, Tool, ToolDescription, ToolPayload,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

const PROVIDER: &str = "DuckDuckGo";

/// Fixed cap on returned results
pub const MAX_RESULTS: usize = 5;

static RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("result selector is valid"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("title selector is valid"));
static SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("snippet selector is valid"));

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct WebSearchParams {
    /// Search query
    query: String,
}

/// Web search tool - builtin implementation
pub struct WebSearchTool {
    client: reqwest::Client,
    base_url: String,
}

impl WebSearchTool {
    pub fn new(client: reqwest::Client, config: &WebSearchSection) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Unwrap DuckDuckGo redirect links to their target (pure function)
    fn resolve_href(raw: &str) -> Option<String> {
        let absolute = if raw.starts_with("//") {
            format!("https:{raw}")
        } else if raw.starts_with('/') {
            format!("https://duckduckgo.com{raw}")
        } else {
            raw.to_string()
        };

        let url = Url::parse(&absolute).ok()?;
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return Some(target.into_owned());
        }
        Some(absolute)
    }

    fn is_ad(result: &ElementRef<'_>, href: &str) -> bool {
        result
            .value()
            .classes()
            .any(|class| class == "result--ad")
            || href.contains("duckduckgo.com/y.js")
    }

    /// Parse search response HTML (pure function)
    fn parse_search_response(html: &str, limit: usize) -> Vec<SearchHit> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut hits = Vec::new();

        for result in document.select(&RESULT) {
            if hits.len() >= limit {
                break;
            }

            let Some(link) = result.select(&TITLE_LINK).next() else {
                continue;
            };
            let Some(raw_href) = link.value().attr("href") else {
                continue;
            };
            if Self::is_ad(&result, raw_href) {
                continue;
            }
            let Some(href) = Self::resolve_href(raw_href) else {
                continue;
            };

            let title = collapse_whitespace(&link.text().collect::<String>());
            if title.is_empty() || !seen.insert(href.clone()) {
                continue;
            }

            let body = result
                .select(&SNIPPET)
                .next()
                .map(|snippet| collapse_whitespace(&snippet.text().collect::<String>()))
                .unwrap_or_default();

            hits.push(SearchHit { title, href, body });
        }

        hits
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "web_search".to_string(),
            description: format!("Search the web and return up to {MAX_RESULTS} results"),
            parameters: parameter_schema::<WebSearchParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let params: WebSearchParams = parse_parameters(parameters)?;
        let query = require_text("query", &params.query)?;

        let response = self
            .client
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        // The HTML endpoint answers 202 with a challenge page when throttling.
        if response.status() == reqwest::StatusCode::ACCEPTED {
            return Err(ToolError::upstream(
                PROVIDER,
                "rate limited by provider, try again later",
            ));
        }

        let html = ensure_success(PROVIDER, response)
            .await?
            .text()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        let results = Self::parse_search_response(&html, MAX_RESULTS);
        tracing::debug!(count = results.len(), "Parsed search results");

        Ok(ToolPayload::SearchResults { results })
    }
}
