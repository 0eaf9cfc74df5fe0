//! Error taxonomy for tool operations
//!
//! Every failure an operation can hit is classified into a [`ToolError`]
//! variant at the call site. The invoker turns these into `status: error`
//! (or `status: disambiguation`) results, so nothing here ever reaches the
//! orchestrator as a fault.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Maximum length of an error message handed back to the orchestrator
pub const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors produced by tools and by the dispatch layer
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Cannot decode {0} as UTF-8 text")]
    Decode(String),

    #[error("{what} too large: {size} bytes (max: {max})")]
    TooLarge { what: String, size: u64, max: u64 },

    #[error("{0} environment variable not set")]
    MissingCredential(String),

    #[error("{provider} error: {message}")]
    Upstream { provider: String, message: String },

    #[error("Ambiguous query \"{query}\" may refer to: {}", options.join(", "))]
    Ambiguous { query: String, options: Vec<String> },

    #[error("Parameter validation failed: {0}")]
    InvalidParameters(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Tool initialization failed: {0}")]
    Initialization(String),
}

/// Coarse classification of a [`ToolError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionOrDecode,
    MissingCredential,
    Upstream,
    Ambiguous,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionOrDecode => "permission_or_decode",
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        }
    }
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::NotFound(_) => ErrorKind::NotFound,
            ToolError::PermissionDenied(_) | ToolError::Decode(_) => {
                ErrorKind::PermissionOrDecode
            }
            ToolError::MissingCredential(_) => ErrorKind::MissingCredential,
            ToolError::Upstream { .. } => ErrorKind::Upstream,
            ToolError::Ambiguous { .. } => ErrorKind::Ambiguous,
            ToolError::InvalidParameters(_)
            | ToolError::UnknownTool(_)
            | ToolError::TooLarge { .. } => ErrorKind::InvalidInput,
            ToolError::Io { .. } | ToolError::Initialization(_) => ErrorKind::Internal,
        }
    }

    /// Classify a filesystem error for `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => ToolError::NotFound(shown),
            io::ErrorKind::PermissionDenied => ToolError::PermissionDenied(shown),
            io::ErrorKind::InvalidData => ToolError::Decode(shown),
            _ => ToolError::Io {
                path: shown,
                message: err.to_string(),
            },
        }
    }

    /// Create an upstream provider error
    pub fn upstream<P: Into<String>, M: Into<String>>(provider: P, message: M) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an upstream error from a failed HTTP exchange.
    ///
    /// The request URL is dropped because query strings may carry credentials.
    pub fn http<P: Into<String>>(provider: P, err: reqwest::Error) -> Self {
        Self::upstream(provider, err.without_url().to_string())
    }

    /// Message suitable for the `error_message` field of a result
    pub fn user_message(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

static SECRET_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(appid|api_key|apikey|password|token|key|secret)[=:]\s*[^\s&]+")
        .expect("secret pattern is valid")
});

/// Redact credential-looking pairs, then cap the length
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PAIR.replace_all(message, "${1}=***").to_string();

    if sanitized.len() > MAX_ERROR_MESSAGE_LEN {
        let suffix = "...[truncated]";
        let mut cut = MAX_ERROR_MESSAGE_LEN - suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], suffix);
    }

    sanitized
}

/// Result type for tool operations
pub type ToolOutcome<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_io_not_found_is_classified() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let classified = ToolError::from_io(Path::new("/tmp/missing.txt"), err);

        assert!(matches!(classified, ToolError::NotFound(_)));
        assert_eq!(classified.kind(), ErrorKind::NotFound);
        assert_eq!(classified.to_string(), "Not found: /tmp/missing.txt");
    }

    #[test]
    fn test_io_invalid_data_is_decode_failure() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        let classified = ToolError::from_io(Path::new("blob.bin"), err);

        assert!(matches!(classified, ToolError::Decode(_)));
        assert_eq!(classified.kind(), ErrorKind::PermissionOrDecode);
    }

    #[test]
    fn test_io_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let classified = ToolError::from_io(Path::new("/root/x"), err);
        assert_eq!(classified.kind(), ErrorKind::PermissionOrDecode);
    }

    #[test]
    fn test_io_other_is_internal() {
        let err = io::Error::new(io::ErrorKind::Other, "disk on fire");
        let classified = ToolError::from_io(Path::new("a.txt"), err);

        assert_eq!(classified.kind(), ErrorKind::Internal);
        assert!(classified.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = ToolError::MissingCredential("OPENWEATHER_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "OPENWEATHER_API_KEY environment variable not set"
        );
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_ambiguous_lists_options() {
        let err = ToolError::Ambiguous {
            query: "Mercury".to_string(),
            options: vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()],
        };
        assert!(err.to_string().contains("Mercury (planet), Mercury (element)"));
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
    }

    #[test]
    fn test_upstream_constructor() {
        let err = ToolError::upstream("OpenWeatherMap", "city not found");
        assert_eq!(err.to_string(), "OpenWeatherMap error: city not found");
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_sanitize_redacts_appid() {
        let message = "request to /data/2.5/weather?q=Paris&appid=abc123secret&units=metric failed";
        let sanitized = sanitize_error_message(message);

        assert!(!sanitized.contains("abc123secret"));
        assert!(sanitized.contains("appid=***"));
        assert!(sanitized.contains("units=metric"));
    }

    #[test]
    fn test_sanitize_multiple_secrets() {
        let message = "Auth failed: password=pass1 api_key=key123 token=tok456";
        let sanitized = sanitize_error_message(message);

        assert!(!sanitized.contains("pass1"));
        assert!(!sanitized.contains("key123"));
        assert!(!sanitized.contains("tok456"));
    }

    #[test]
    fn test_sanitize_keeps_paths() {
        let message = "Not found: /home/user/.ssh/config.d/work.conf";
        assert_eq!(sanitize_error_message(message), message);

        let err = ToolError::NotFound("/home/u/.config/app/settings.toml".to_string());
        assert_eq!(
            err.user_message(),
            "Not found: /home/u/.config/app/settings.toml"
        );
    }

    #[test]
    fn test_sanitize_ignores_key_inside_words() {
        let message = "Not found: /data/monkey=1.txt";
        assert_eq!(sanitize_error_message(message), message);

        let sanitized = sanitize_error_message("rejected: key=abc123 for request");
        assert!(!sanitized.contains("abc123"));
    }

    #[test]
    fn test_sanitize_empty_message() {
        assert_eq!(sanitize_error_message(""), "");
    }

    #[test]
    fn test_long_message_truncation() {
        let sanitized = sanitize_error_message(&"x".repeat(600));
        assert!(sanitized.len() <= MAX_ERROR_MESSAGE_LEN);
        assert!(sanitized.ends_with("...[truncated]"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let sanitized = sanitize_error_message(&"é".repeat(400));
        assert!(sanitized.len() <= MAX_ERROR_MESSAGE_LEN);
        assert!(sanitized.ends_with("...[truncated]"));
    }

    proptest! {
        #[test]
        fn prop_sanitized_messages_are_bounded(message in ".{0,800}") {
            let sanitized = sanitize_error_message(&message);
            prop_assert!(sanitized.len() <= MAX_ERROR_MESSAGE_LEN);
        }

        #[test]
        fn prop_appid_value_never_survives(secret in "[A-Za-z0-9]{8,32}") {
            let message = format!("GET /weather?q=Oslo&appid={secret} failed");
            let sanitized = sanitize_error_message(&message);
            prop_assert!(!sanitized.contains(&secret));
        }
    }
}
