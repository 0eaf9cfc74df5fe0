//! Filesystem tools: list_files, read_file, write_file
//!
//! Relative paths resolve against the configured root, absolute paths are
//! used as given. Writes are plain overwrites with no locking, so concurrent
//! writers to one path race and the last one wins.

use crate::error::{ToolError, ToolOutcome};
use crate::tools::{parameter_schema, parse_parameters, Tool, ToolDescription, ToolPayload};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Resolve a caller-supplied path against `root` (pure function).
///
/// A blank path means `root`; any other path is used byte for byte.
fn resolve_path(root: &Path, raw: Option<&str>) -> PathBuf {
    match raw {
        None => root.to_path_buf(),
        Some(raw) if raw.trim().is_empty() => root.to_path_buf(),
        Some(raw) => {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        }
    }
}

/// Check size constraints (pure function)
fn check_size(what: &str, size: u64, max_size: u64) -> ToolOutcome<()> {
    if size > max_size {
        return Err(ToolError::TooLarge {
            what: what.to_string(),
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Sort entries and build the listing payload (pure function)
fn format_listing(dir: &Path, mut files: Vec<String>, mut directories: Vec<String>) -> ToolPayload {
    files.sort();
    directories.sort();
    ToolPayload::Listing {
        path: dir.display().to_string(),
        files,
        directories,
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct ListFilesParams {
    /// Directory to list. Empty or omitted lists the default root.
    #[serde(default)]
    path: Option<String>,
}

/// Directory listing tool
pub struct ListFilesTool {
    root: PathBuf,
}

impl ListFilesTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "list_files".to_string(),
            description: "List the files and sub-directories of a directory".to_string(),
            parameters: parameter_schema::<ListFilesParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let params: ListFilesParams = parse_parameters(parameters)?;
        let dir = resolve_path(&self.root, params.path.as_deref());

        let metadata = tokio::fs::metadata(&dir)
            .await
            .map_err(|e| ToolError::from_io(&dir, e))?;
        if !metadata.is_dir() {
            return Err(ToolError::InvalidParameters(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| ToolError::from_io(&dir, e))?;

        let mut files = Vec::new();
        let mut directories = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ToolError::from_io(&dir, e))?
        {
            let path = entry.path();
            // Follows symlinks; dangling links are skipped.
            let Ok(meta) = tokio::fs::metadata(&path).await else {
                tracing::debug!("Skipping unreadable entry {}", path.display());
                continue;
            };
            if meta.is_dir() {
                directories.push(path.display().to_string());
            } else if meta.is_file() {
                files.push(path.display().to_string());
            }
        }

        Ok(format_listing(&dir, files, directories))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct ReadFileParams {
    /// File to read
    path: String,
}

/// File read tool
pub struct ReadFileTool {
    root: PathBuf,
    max_file_size: u64,
}

impl ReadFileTool {
    pub fn new(root: PathBuf, max_file_size: u64) -> Self {
        Self {
            root,
            max_file_size,
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "read_file".to_string(),
            description: "Read the full text content of a UTF-8 file".to_string(),
            parameters: parameter_schema::<ReadFileParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let params: ReadFileParams = parse_parameters(parameters)?;
        super::require_text("path", &params.path)?;
        let path = resolve_path(&self.root, Some(&params.path));

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::from_io(&path, e))?;
        if !metadata.is_file() {
            return Err(ToolError::InvalidParameters(format!(
                "{} is not a file",
                path.display()
            )));
        }
        check_size("File", metadata.len(), self.max_file_size)?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ToolError::from_io(&path, e))?;
        let content =
            String::from_utf8(bytes).map_err(|_| ToolError::Decode(path.display().to_string()))?;

        Ok(ToolPayload::Content { content })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct WriteFileParams {
    /// File to create or overwrite
    path: String,
    /// Text to write
    content: String,
}

/// File write tool
pub struct WriteFileTool {
    root: PathBuf,
    max_file_size: u64,
}

impl WriteFileTool {
    pub fn new(root: PathBuf, max_file_size: u64) -> Self {
        Self {
            root,
            max_file_size,
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "write_file".to_string(),
            description: "Create or overwrite a file with the given text".to_string(),
            parameters: parameter_schema::<WriteFileParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let params: WriteFileParams = parse_parameters(parameters)?;
        super::require_text("path", &params.path)?;
        check_size("Content", params.content.len() as u64, self.max_file_size)?;

        let path = resolve_path(&self.root, Some(&params.path));

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::from_io(parent, e))?;
        }

        tokio::fs::write(&path, &params.content)
            .await
            .map_err(|e| ToolError::from_io(&path, e))?;

        Ok(ToolPayload::Written {
            message: format!("File {} written successfully", path.display()),
            bytes_written: params.content.len(),
        })
    }
}
