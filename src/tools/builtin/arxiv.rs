//! arXiv paper search
//!
//! The arXiv API answers with an Atom feed. Query failures come back as a
//! feed holding one entry whose id points at `/api/errors`, not as an HTTP
//! error, so those entries are turned into upstream errors here.

use super::{collapse_whitespace, ensure_success, require_text};
use crate::config::ArxivSection;
use crate::error::{ToolError, ToolOutcome};
use crate::tools::{
    parameter_schema, parse_parameters, Paper, Tool, ToolDescription, ToolPayload,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

const PROVIDER: &str = "arXiv";

/// Fixed cap on returned papers
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct ArxivParams {
    /// arXiv search query, e.g. "transformer attention" or "au:hinton"
    query: String,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
}

/// arXiv search tool
pub struct ArxivTool {
    client: reqwest::Client,
    api_url: String,
}

impl ArxivTool {
    pub fn new(client: reqwest::Client, config: &ArxivSection) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
        }
    }

    /// PDF link when the entry has one, otherwise the abstract page
    fn paper_url(entry: &Entry) -> Option<String> {
        let candidate = entry
            .links
            .iter()
            .find(|link| link.title.as_deref() == Some("pdf"))
            .map(|link| link.href.trim())
            .filter(|href| !href.is_empty())
            .unwrap_or_else(|| entry.id.trim());

        Url::parse(candidate).ok().map(|_| candidate.to_string())
    }

    /// Parse the Atom feed into papers (pure function)
    fn parse_feed(xml: &str, limit: usize) -> ToolOutcome<Vec<Paper>> {
        let feed: Feed = quick_xml::de::from_str(xml)
            .map_err(|e| ToolError::upstream(PROVIDER, format!("malformed feed: {e}")))?;

        if let Some(error) = feed.entries.iter().find(|e| e.id.contains("/api/errors")) {
            return Err(ToolError::upstream(
                PROVIDER,
                collapse_whitespace(&error.summary),
            ));
        }

        let papers = feed
            .entries
            .iter()
            .filter_map(|entry| {
                let title = collapse_whitespace(&entry.title);
                if title.is_empty() {
                    return None;
                }
                let url = Self::paper_url(entry)?;
                Some(Paper {
                    title,
                    authors: entry
                        .authors
                        .iter()
                        .map(|a| collapse_whitespace(&a.name))
                        .filter(|name| !name.is_empty())
                        .collect(),
                    summary: collapse_whitespace(&entry.summary),
                    url,
                })
            })
            .take(limit)
            .collect();

        Ok(papers)
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "search_arxiv".to_string(),
            description: format!(
                "Search arXiv for up to {MAX_RESULTS} papers ranked by relevance"
            ),
            parameters: parameter_schema::<ArxivParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let params: ArxivParams = parse_parameters(parameters)?;
        let query = require_text("query", &params.query)?;
        let max_results = MAX_RESULTS.to_string();

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        let xml = ensure_success(PROVIDER, response)
            .await?
            .text()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        let papers = Self::parse_feed(&xml, MAX_RESULTS)?;
        Ok(ToolPayload::Papers { papers })
    }
}
