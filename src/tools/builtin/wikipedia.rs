//! Wikipedia summaries through the MediaWiki Action API
//!
//! The query is first looked up as an exact page title, following
//! redirects. Pages flagged with the `disambiguation` page property are
//! reported as ambiguous, with the articles they link to as options. Only
//! when no page has that exact title does the tool fall back to full-text
//! search and summarize the top hit.

use super::{ensure_success, require_text};
use crate::config::WikipediaSection;
use crate::error::{ToolError, ToolOutcome};
use crate::tools::{parameter_schema, parse_parameters, Tool, ToolDescription, ToolPayload};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

const PROVIDER: &str = "Wikipedia";

/// Sentences requested for each summary
pub const SUMMARY_SENTENCES: u32 = 5;

/// Upper bound on `continue` round trips when collecting disambiguation links
const MAX_LINK_BATCHES: usize = 10;

/// Separates titles in a multi-page `titles=` lookup
const TITLE_SEPARATOR: char = '|';

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct WikipediaParams {
    /// Topic or page title to summarize
    query: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
    #[serde(default, rename = "continue")]
    continuation: Option<HashMap<String, Value>>,
    #[serde(default)]
    error: Option<ApiError>,
}

/// One decoded API response
#[derive(Debug, Default)]
struct Batch {
    query: QueryBlock,
    /// Parameters to send for the next batch, empty when complete
    continuation: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    search: Vec<SearchEntry>,
    #[serde(default)]
    searchinfo: Option<SearchInfo>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: HashMap<String, Value>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SearchInfo {
    #[serde(default)]
    suggestion: Option<String>,
}

/// What an exact-title lookup found
#[derive(Debug, PartialEq)]
enum PageLookup {
    Missing,
    Disambiguation { title: String },
    Article { title: String, summary: String },
}

/// Wikipedia summary tool
pub struct WikipediaTool {
    client: reqwest::Client,
    api_url: String,
}

impl WikipediaTool {
    pub fn new(client: reqwest::Client, config: &WikipediaSection) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
        }
    }

    /// Decode an API response body, surfacing MediaWiki errors (pure function)
    fn parse_api_response(body: &str) -> ToolOutcome<Batch> {
        let response: ApiResponse = serde_json::from_str(body)
            .map_err(|e| ToolError::upstream(PROVIDER, format!("malformed response: {e}")))?;

        if let Some(error) = response.error {
            return Err(ToolError::upstream(
                PROVIDER,
                format!("{} ({})", error.info, error.code),
            ));
        }

        let continuation = response
            .continuation
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => (key, text),
                other => (key, other.to_string()),
            })
            .collect();

        Ok(Batch {
            query: response.query.unwrap_or_default(),
            continuation,
        })
    }

    /// Classify the page returned by a title lookup (pure function)
    fn classify_page(block: QueryBlock) -> PageLookup {
        // A title lookup names one page; anything else is not an exact match
        if block.pages.len() != 1 {
            return PageLookup::Missing;
        }
        let Some(page) = block.pages.into_iter().next() else {
            return PageLookup::Missing;
        };

        if page.missing || page.invalid {
            PageLookup::Missing
        } else if page.pageprops.contains_key("disambiguation") {
            PageLookup::Disambiguation { title: page.title }
        } else {
            PageLookup::Article {
                title: page.title,
                summary: page.extract.unwrap_or_default().trim().to_string(),
            }
        }
    }

    /// Title of the best search match, preferring the spelling suggestion
    /// only when nothing matched (pure function)
    fn best_search_title(block: QueryBlock) -> Option<String> {
        block
            .search
            .into_iter()
            .next()
            .map(|entry| entry.title)
            .or_else(|| block.searchinfo.and_then(|info| info.suggestion))
    }

    /// Article links listed on a disambiguation page (pure function)
    fn collect_options(block: QueryBlock) -> Vec<String> {
        block
            .pages
            .into_iter()
            .flat_map(|page| page.links)
            .map(|link| link.title)
            .filter(|title| !title.trim().is_empty())
            .collect()
    }

    async fn call_api(&self, params: &[(&str, &str)]) -> ToolOutcome<Batch> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        let body = ensure_success(PROVIDER, response)
            .await?
            .text()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        Self::parse_api_response(&body)
    }

    async fn lookup(&self, title: &str) -> ToolOutcome<PageLookup> {
        let sentences = SUMMARY_SENTENCES.to_string();
        let block = self
            .call_api(&[
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        Ok(Self::classify_page(block.query))
    }

    async fn search(&self, query: &str) -> ToolOutcome<Option<String>> {
        let block = self
            .call_api(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "1"),
                ("srinfo", "suggestion"),
                ("srprop", ""),
            ])
            .await?;
        Ok(Self::best_search_title(block.query))
    }

    /// Article links of a disambiguation page, following `continue`
    async fn disambiguation_options(&self, title: &str) -> ToolOutcome<Vec<String>> {
        let mut options = Vec::new();
        let mut continuation: Vec<(String, String)> = Vec::new();

        for _ in 0..MAX_LINK_BATCHES {
            let batch = {
                let mut params = vec![
                    ("prop", "links"),
                    ("plnamespace", "0"),
                    ("pllimit", "max"),
                    ("titles", title),
                ];
                params.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                self.call_api(&params).await?
            };

            options.extend(Self::collect_options(batch.query));
            if batch.continuation.is_empty() {
                return Ok(options);
            }
            continuation = batch.continuation;
        }

        warn!(
            title,
            collected = options.len(),
            "Stopped following disambiguation links after {MAX_LINK_BATCHES} batches"
        );
        Ok(options)
    }

    async fn resolve(&self, query: &str) -> ToolOutcome<PageLookup> {
        let exact = if query.contains(TITLE_SEPARATOR) {
            PageLookup::Missing
        } else {
            self.lookup(query).await?
        };

        match exact {
            PageLookup::Missing => match self.search(query).await? {
                Some(title) => self.lookup(&title).await,
                None => Ok(PageLookup::Missing),
            },
            found => Ok(found),
        }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "search_wikipedia".to_string(),
            description: format!(
                "Summarize a Wikipedia article in {SUMMARY_SENTENCES} sentences; ambiguous topics return candidate titles"
            ),
            parameters: parameter_schema::<WikipediaParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let params: WikipediaParams = parse_parameters(parameters)?;
        let query = require_text("query", &params.query)?;

        match self.resolve(query).await? {
            PageLookup::Article { title, summary } => Ok(ToolPayload::Summary { title, summary }),
            PageLookup::Disambiguation { title } => {
                let options = self.disambiguation_options(&title).await?;
                if options.is_empty() {
                    return Err(ToolError::upstream(
                        PROVIDER,
                        format!("\"{title}\" is a disambiguation page with no listed articles"),
                    ));
                }
                Err(ToolError::Ambiguous {
                    query: query.to_string(),
                    options,
                })
            }
            PageLookup::Missing => Err(ToolError::NotFound(format!(
                "no Wikipedia page matches \"{query}\""
            ))),
        }
    }
}
