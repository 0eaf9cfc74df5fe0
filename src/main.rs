//! Operator CLI for the multi-tool agent toolkit
//!
//! Lists the registered tools and invokes one at a time, printing the
//! status-tagged result as JSON on stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use multi_tool_agent::config::ToolkitConfig;
use multi_tool_agent::observability::init_default_logging;
use multi_tool_agent::ToolInvoker;
use serde_json::Value;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Uniform tool-calling layer for agents
#[derive(Parser)]
#[command(name = "multi-tool-agent")]
#[command(about = "Invoke filesystem, search, weather, Wikipedia and arXiv tools")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MULTI_TOOL_AGENT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered tools with their parameter schemas
    Tools,
    /// Invoke a single tool
    Call {
        /// Tool name, e.g. read_file
        tool: String,
        /// Parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Tools => list_tools(&config),
        Commands::Call { tool, params } => call_tool(&config, &tool, &params).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<ToolkitConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(ToolkitConfig::load_from_file(path)?);
    }

    let default_paths = ["toolkit.toml", "config/toolkit.toml"];
    for path_str in default_paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(ToolkitConfig::load_from_file(&path)?);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(ToolkitConfig::default())
}

fn list_tools(config: &ToolkitConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let invoker = ToolInvoker::from_config(config)?;
    let descriptions = invoker.describe_tools();
    println!("{}", serde_json::to_string_pretty(&descriptions)?);
    Ok(0)
}

async fn call_tool(
    config: &ToolkitConfig,
    tool: &str,
    params: &str,
) -> Result<i32, Box<dyn std::error::Error>> {
    let parameters: Value = serde_json::from_str(params)
        .map_err(|e| format!("--params is not valid JSON: {e}"))?;

    let invoker = ToolInvoker::from_config(config)?;
    let result = invoker.invoke(tool, &parameters).await;

    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(if result.status() == "error" { 1 } else { 0 })
}

fn handle_config_command(
    config: &ToolkitConfig,
    show: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    config.validate()?;
    info!("Configuration is valid");

    if show {
        println!("{}", toml::to_string_pretty(config)?);
    }
    Ok(0)
}
