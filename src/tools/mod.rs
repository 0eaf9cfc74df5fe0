//! Tool system: the uniform dispatch layer exposed to an orchestrator
//!
//! Each operation is a [`Tool`] registered under a fixed name. The
//! [`ToolInvoker`] validates parameters against the tool's JSON Schema, runs
//! it, and folds every outcome into a [`ToolResult`]. Callers never see an
//! `Err` or a panic from a tool, only a status-tagged record.

use crate::config::{ToolkitConfig, KNOWN_TOOLS};
use crate::error::{ToolError, ToolOutcome};
use crate::tool_span;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{info, warn, Instrument};

pub mod builtin;
pub mod result;

pub use result::{Paper, SearchHit, ToolPayload, ToolResult, WeatherReport};

/// A single named operation
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and JSON Schema of the parameters
    fn describe(&self) -> ToolDescription;

    /// Run the operation. Parameters have already been validated against
    /// the schema returned by [`Tool::describe`].
    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload>;
}

/// Tool description advertised to the orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// JSON Schema for a typed parameter struct
pub fn parameter_schema<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"}))
}

/// Decode validated parameters into their typed form
pub fn parse_parameters<T: DeserializeOwned>(parameters: &Value) -> ToolOutcome<T> {
    serde_json::from_value(parameters.clone())
        .map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

/// Dispatcher for the registered tools
pub struct ToolInvoker {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolInvoker {
    /// Create an invoker with no tools registered
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Build the invoker with every tool enabled in `config`.
    ///
    /// Startup work happens here exactly once: the filesystem root is
    /// created if requested, the weather credential is read from the
    /// environment, and one HTTP client is shared by all provider tools.
    pub fn from_config(config: &ToolkitConfig) -> Result<Self, ToolError> {
        let root = &config.filesystem.root;
        if config.filesystem.create_root && !root.exists() {
            info!("Creating filesystem root: {}", root.display());
            std::fs::create_dir_all(root).map_err(|e| {
                ToolError::Initialization(format!("cannot create {}: {e}", root.display()))
            })?;
        }

        let client = builtin::build_http_client()?;
        let weather_api_key = config.resolve_weather_api_key();
        if weather_api_key.is_none() && config.is_enabled("get_weather") {
            warn!(
                "{} is not set; get_weather will return errors",
                config.weather.api_key_env
            );
        }

        let mut invoker = Self::new();
        for name in KNOWN_TOOLS.iter().filter(|name| config.is_enabled(name)) {
            let tool = Self::create_builtin_tool(name, config, &client, weather_api_key.clone())?;
            invoker.register(tool);
        }

        info!(tools = ?invoker.list_tools(), "Tool invoker ready");
        Ok(invoker)
    }

    /// Create builtin tool instances
    fn create_builtin_tool(
        name: &str,
        config: &ToolkitConfig,
        client: &reqwest::Client,
        weather_api_key: Option<String>,
    ) -> Result<Box<dyn Tool>, ToolError> {
        let fs = &config.filesystem;
        match name {
            "list_files" => Ok(Box::new(builtin::ListFilesTool::new(fs.root.clone()))),
            "read_file" => Ok(Box::new(builtin::ReadFileTool::new(
                fs.root.clone(),
                fs.max_file_size,
            ))),
            "write_file" => Ok(Box::new(builtin::WriteFileTool::new(
                fs.root.clone(),
                fs.max_file_size,
            ))),
            "web_search" => Ok(Box::new(builtin::WebSearchTool::new(
                client.clone(),
                &config.web_search,
            ))),
            "get_weather" => Ok(Box::new(builtin::WeatherTool::new(
                client.clone(),
                &config.weather,
                weather_api_key,
            ))),
            "search_wikipedia" => Ok(Box::new(builtin::WikipediaTool::new(
                client.clone(),
                &config.wikipedia,
            ))),
            "search_arxiv" => Ok(Box::new(builtin::ArxivTool::new(
                client.clone(),
                &config.arxiv,
            ))),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }

    /// Register a tool under the name it describes itself with
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.describe().name;
        self.tools.insert(name, tool);
    }

    /// Get tool description
    pub fn describe_tool(&self, tool_name: &str) -> Option<ToolDescription> {
        self.tools.get(tool_name).map(|tool| tool.describe())
    }

    /// Descriptions of every registered tool, sorted by name
    pub fn describe_tools(&self) -> Vec<ToolDescription> {
        let mut descriptions: Vec<ToolDescription> =
            self.tools.values().map(|tool| tool.describe()).collect();
        descriptions.sort_by(|a, b| a.name.cmp(&b.name));
        descriptions
    }

    /// Names of the registered tools, sorted
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke `tool_name` and fold the outcome into a [`ToolResult`]
    pub async fn invoke(&self, tool_name: &str, parameters: &Value) -> ToolResult {
        let span = tool_span!(tool = %tool_name);
        async {
            let outcome = self.execute_tool(tool_name, parameters).await;
            match &outcome {
                Ok(_) => info!("Tool call succeeded"),
                Err(ToolError::Ambiguous { options, .. }) => {
                    info!(candidates = options.len(), "Tool call ambiguous")
                }
                Err(e) => warn!(kind = e.kind().as_str(), error = %e.user_message(), "Tool call failed"),
            }
            ToolResult::from(outcome)
        }
        .instrument(span)
        .await
    }

    /// Execute tool with validated parameters
    async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: &Value,
    ) -> ToolOutcome<ToolPayload> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        Self::validate_parameters(&tool.describe(), parameters)?;

        tool.execute(parameters).await
    }

    /// Validate parameters against the tool schema
    fn validate_parameters(description: &ToolDescription, parameters: &Value) -> ToolOutcome<()> {
        let validator = jsonschema::validator_for(&description.parameters).map_err(|e| {
            ToolError::Initialization(format!("schema for {} is invalid: {e}", description.name))
        })?;

        validator.validate(parameters).map_err(|errors| {
            let error_messages: Vec<String> = errors
                .map(|e| format!("At '{}': {}", e.instance_path, e))
                .collect();
            ToolError::InvalidParameters(error_messages.join("; "))
        })
    }

    /// List the entries of `path`, or of the configured root when empty
    pub async fn list_files(&self, path: &str) -> ToolResult {
        self.invoke("list_files", &json!({ "path": path })).await
    }

    pub async fn read_file(&self, path: &str) -> ToolResult {
        self.invoke("read_file", &json!({ "path": path })).await
    }

    pub async fn write_file(&self, path: &str, content: &str) -> ToolResult {
        self.invoke("write_file", &json!({ "path": path, "content": content }))
            .await
    }

    pub async fn web_search(&self, query: &str) -> ToolResult {
        self.invoke("web_search", &json!({ "query": query })).await
    }

    pub async fn get_weather(&self, location: &str) -> ToolResult {
        self.invoke("get_weather", &json!({ "location": location }))
            .await
    }

    pub async fn search_wikipedia(&self, query: &str) -> ToolResult {
        self.invoke("search_wikipedia", &json!({ "query": query }))
            .await
    }

    pub async fn search_arxiv(&self, query: &str) -> ToolResult {
        self.invoke("search_arxiv", &json!({ "query": query })).await
    }
}

impl Default for ToolInvoker {
    fn default() -> Self {
        Self::new()
    }
}
