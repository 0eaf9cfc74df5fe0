//! Configuration file loading tests

use multi_tool_agent::config::{ConfigError, ToolkitConfig};
use multi_tool_agent::ToolInvoker;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
tools = ["list_files", "read_file", "search_arxiv"]

[filesystem]
root = "/tmp/agent"
max_file_size = 4096

[arxiv]
api_url = "http://localhost:8080/api/query"
"#,
    );

    let config = ToolkitConfig::load_from_file(file.path()).unwrap();

    assert_eq!(config.filesystem.root, PathBuf::from("/tmp/agent"));
    assert_eq!(config.filesystem.max_file_size, 4096);
    assert!(!config.filesystem.create_root);
    assert_eq!(config.arxiv.api_url, "http://localhost:8080/api/query");
    assert_eq!(config.weather.base_url, "https://api.openweathermap.org");
    assert!(config.is_enabled("search_arxiv"));
    assert!(!config.is_enabled("get_weather"));
}

#[test]
fn test_missing_file() {
    let result = ToolkitConfig::load_from_file(Path::new("/nonexistent/toolkit.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_invalid_file_reports_field() {
    let file = write_config(
        r#"
[wikipedia]
api_url = "en.wikipedia.org/w/api.php"
"#,
    );

    let error = ToolkitConfig::load_from_file(file.path()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Invalid URL for wikipedia.api_url: en.wikipedia.org/w/api.php"
    );
}

#[test]
fn test_wrong_value_type() {
    let file = write_config(
        r#"
[filesystem]
max_file_size = "big"
"#,
    );

    let result = ToolkitConfig::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_shown_config_round_trips() {
    let file = write_config(
        r#"
tools = ["web_search"]

[web_search]
base_url = "http://127.0.0.1:9999"
"#,
    );
    let config = ToolkitConfig::load_from_file(file.path()).unwrap();

    let rendered = toml::to_string_pretty(&config).unwrap();
    let reparsed = ToolkitConfig::from_toml_str(&rendered).unwrap();

    assert_eq!(reparsed, config);
}

#[test]
fn test_loaded_config_builds_subset_invoker() {
    let root = tempfile::TempDir::new().unwrap();
    let file = write_config(&format!(
        r#"
tools = ["read_file", "write_file"]

[filesystem]
root = "{}"
"#,
        root.path().display()
    ));

    let config = ToolkitConfig::load_from_file(file.path()).unwrap();
    let invoker = ToolInvoker::from_config(&config).unwrap();

    assert_eq!(invoker.list_tools(), vec!["read_file", "write_file"]);
}
