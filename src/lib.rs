//! Multi-tool agent toolkit
//!
//! A uniform tool-calling layer for agent frameworks. Seven operations
//! (`list_files`, `read_file`, `write_file`, `web_search`, `get_weather`,
//! `search_wikipedia`, `search_arxiv`) share one result contract: every call
//! returns a [`ToolResult`] tagged with `status` (`success`, `error` or
//! `disambiguation`) and never fails past its own boundary.
//!
//! # Quick Start
//!
//! ```no_run
//! use multi_tool_agent::{ToolInvoker, ToolkitConfig};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let invoker = ToolInvoker::from_config(&ToolkitConfig::default())?;
//!
//! // Typed convenience call
//! let listing = invoker.list_files("").await;
//! println!("{}", listing.to_json());
//!
//! // Name-based dispatch, as an orchestrator would do it
//! let papers = invoker
//!     .invoke("search_arxiv", &json!({"query": "attention is all you need"}))
//!     .await;
//! assert!(matches!(papers.status(), "success" | "error"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod tools;

pub use config::{ConfigError, ToolkitConfig};
pub use error::{ErrorKind, ToolError, ToolOutcome};
pub use tools::{
    Paper, SearchHit, Tool, ToolDescription, ToolInvoker, ToolPayload, ToolResult, WeatherReport,
};
