//! Toolkit configuration
//!
//! Loaded once from TOML at startup and passed to the invoker. Every section
//! is optional; missing sections fall back to the public provider endpoints
//! and the current directory as filesystem root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Names of every operation the invoker can expose
pub const KNOWN_TOOLS: [&str; 7] = [
    "list_files",
    "read_file",
    "write_file",
    "web_search",
    "get_weather",
    "search_wikipedia",
    "search_arxiv",
];

/// Main toolkit configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ToolkitConfig {
    /// Subset of tools to register; all tools when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(default)]
    pub filesystem: FilesystemSection,
    #[serde(default)]
    pub weather: WeatherSection,
    #[serde(default)]
    pub web_search: WebSearchSection,
    #[serde(default)]
    pub wikipedia: WikipediaSection,
    #[serde(default)]
    pub arxiv: ArxivSection,
}

/// Filesystem tools
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilesystemSection {
    /// Default directory for `list_files` and base for relative paths
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Create `root` when the invoker is built
    #[serde(default)]
    pub create_root: bool,
    /// Largest file `read_file` returns or `write_file` accepts
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for FilesystemSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            create_root: false,
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

/// OpenWeatherMap current weather
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSection {
    /// Environment variable holding the API key
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            api_key_env: default_weather_key_env(),
            base_url: default_weather_url(),
        }
    }
}

fn default_weather_key_env() -> String {
    "OPENWEATHER_API_KEY".to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org".to_string()
}

/// DuckDuckGo HTML search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchSection {
    #[serde(default = "default_search_url")]
    pub base_url: String,
}

impl Default for WebSearchSection {
    fn default() -> Self {
        Self {
            base_url: default_search_url(),
        }
    }
}

fn default_search_url() -> String {
    "https://html.duckduckgo.com".to_string()
}

/// MediaWiki Action API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WikipediaSection {
    #[serde(default = "default_wikipedia_url")]
    pub api_url: String,
}

impl Default for WikipediaSection {
    fn default() -> Self {
        Self {
            api_url: default_wikipedia_url(),
        }
    }
}

fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

/// arXiv Atom API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArxivSection {
    #[serde(default = "default_arxiv_url")]
    pub api_url: String,
}

impl Default for ArxivSection {
    fn default() -> Self {
        Self {
            api_url: default_arxiv_url(),
        }
    }
}

fn default_arxiv_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid URL for {field}: {url}")]
    InvalidUrl { field: &'static str, url: String },
    #[error("Unknown tool in config: {0}")]
    UnknownTool(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ToolkitConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ToolkitConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field that would otherwise fail on first use
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("weather.base_url", &self.weather.base_url)?;
        validate_url("web_search.base_url", &self.web_search.base_url)?;
        validate_url("wikipedia.api_url", &self.wikipedia.api_url)?;
        validate_url("arxiv.api_url", &self.arxiv.api_url)?;

        if self.filesystem.max_file_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "filesystem.max_file_size must be greater than zero".to_string(),
            ));
        }

        if self.weather.api_key_env.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "weather.api_key_env must name an environment variable".to_string(),
            ));
        }

        if let Some(tools) = &self.tools {
            for name in tools {
                if !KNOWN_TOOLS.contains(&name.as_str()) {
                    return Err(ConfigError::UnknownTool(name.clone()));
                }
            }
        }

        Ok(())
    }

    /// Whether `name` should be registered with the invoker
    pub fn is_enabled(&self, name: &str) -> bool {
        match &self.tools {
            Some(tools) => tools.iter().any(|t| t == name),
            None => KNOWN_TOOLS.contains(&name),
        }
    }

    /// Read the weather API key from the environment
    pub fn resolve_weather_api_key(&self) -> Option<String> {
        std::env::var(&self.weather.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Create a test configuration rooted at `root`
    #[cfg(test)]
    pub fn test_config(root: &Path) -> Self {
        Self {
            filesystem: FilesystemSection {
                root: root.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn validate_url(field: &'static str, raw: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        url: raw.to_string(),
    };
    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ToolkitConfig::from_toml_str("").unwrap();

        assert_eq!(config, ToolkitConfig::default());
        assert_eq!(config.filesystem.root, PathBuf::from("."));
        assert_eq!(config.filesystem.max_file_size, 1024 * 1024);
        assert_eq!(config.weather.api_key_env, "OPENWEATHER_API_KEY");
        assert!(config.tools.is_none());
    }

    #[test]
    fn test_full_config() {
        let toml_content = r#"
tools = ["read_file", "get_weather"]

[filesystem]
root = "/srv/agent"
create_root = true
max_file_size = 2048

[weather]
api_key_env = "WEATHER_KEY"
base_url = "http://localhost:9000"

[wikipedia]
api_url = "https://de.wikipedia.org/w/api.php"
"#;

        let config = ToolkitConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.filesystem.root, PathBuf::from("/srv/agent"));
        assert!(config.filesystem.create_root);
        assert_eq!(config.filesystem.max_file_size, 2048);
        assert_eq!(config.weather.api_key_env, "WEATHER_KEY");
        assert_eq!(config.wikipedia.api_url, "https://de.wikipedia.org/w/api.php");
        assert_eq!(config.arxiv, ArxivSection::default());
        assert!(config.is_enabled("read_file"));
        assert!(!config.is_enabled("web_search"));
    }

    #[test]
    fn test_all_tools_enabled_by_default() {
        let config = ToolkitConfig::default();
        for name in KNOWN_TOOLS {
            assert!(config.is_enabled(name));
        }
        assert!(!config.is_enabled("http_request"));
    }

    #[test]
    fn test_unknown_tool_rejected() {
        let result = ToolkitConfig::from_toml_str(r#"tools = ["read_file", "teleport"]"#);
        assert!(matches!(result, Err(ConfigError::UnknownTool(name)) if name == "teleport"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = ToolkitConfig::from_toml_str(
            r#"
[arxiv]
api_url = "not a url"
"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl { field: "arxiv.api_url", .. })
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let result = ToolkitConfig::from_toml_str(
            r#"
[web_search]
base_url = "ftp://example.com"
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_zero_file_size_rejected() {
        let result = ToolkitConfig::from_toml_str(
            r#"
[filesystem]
max_file_size = 0
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = ToolkitConfig::from_toml_str("[filesystem\nroot = ");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_unset_weather_key_resolves_to_none() {
        let mut config = ToolkitConfig::default();
        config.weather.api_key_env = "MULTI_TOOL_AGENT_UNIT_TEST_UNSET".to_string();
        assert_eq!(config.resolve_weather_api_key(), None);
    }
}
