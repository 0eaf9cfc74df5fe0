//! Structured logging using the tracing crate
//!
//! Output always goes to stderr so that the CLI can print tool results on
//! stdout as clean JSON.
//!
//! ## Environment Variables
//!
//! - `LOG_LEVEL`: Log level (ERROR, WARN, INFO, DEBUG, TRACE) - defaults to INFO
//! - `LOG_FORMAT`: Output format (json, pretty, compact) - defaults to json
//! - `LOG_SPANS`: Include span open/close events (true/false) - defaults to false
//! - `RUST_LOG`: Override log filtering (follows env_logger format)
//!
//! ## Examples
//!
//! ```bash
//! # Machine-readable logs next to the JSON result
//! LOG_FORMAT=json LOG_LEVEL=INFO multi-tool-agent call web_search --params '{"query":"rust"}'
//!
//! # Development with colors
//! LOG_FORMAT=pretty LOG_LEVEL=DEBUG multi-tool-agent tools
//! ```

use std::env;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Dependencies whose INFO/DEBUG output drowns out tool events
const QUIET_TARGETS: [&str; 4] = ["hyper=warn", "reqwest=warn", "html5ever=warn", "selectors=warn"];

/// Log output format options
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// JSON format for structured logging (machine-readable)
    Json,
    /// Pretty format with colors and indentation (human-readable)
    Pretty,
    /// Compact format with colors but minimal spacing (terminal-friendly)
    Compact,
}

impl LogFormat {
    /// Parse log format from string
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

/// Parse a level name, falling back to INFO
pub fn parse_level(s: &str) -> Level {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Only a literal "true" (any case) enables a flag
pub fn parse_flag(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

fn span_events(include_spans: bool) -> FmtSpan {
    if include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    QUIET_TARGETS
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(EnvFilter::new(level.to_string()), |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Initialize logging with manual configuration.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(level: Level, format: LogFormat, include_spans: bool) {
    let subscriber = tracing_subscriber::registry().with(build_filter(level));

    let installed = match format {
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(span_events(include_spans)),
            )
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(true)
                    .with_writer(std::io::stderr)
                    .with_span_events(span_events(include_spans)),
            )
            .try_init(),
        LogFormat::Compact => subscriber
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_span_events(span_events(include_spans)),
            )
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already set; keeping it");
    }
}

/// Initialize logging from environment variables
pub fn init_default_logging() {
    let level = parse_level(&env::var("LOG_LEVEL").unwrap_or_default());
    let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default());
    let include_spans = parse_flag(&env::var("LOG_SPANS").unwrap_or_default());

    init_logging(level, format, include_spans);
}

/// Create a tool execution span
#[macro_export]
macro_rules! tool_span {
    ($($field:tt)*) => {
        tracing::info_span!("tool_execution", $($field)*)
    };
}

pub use tool_span;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert!(matches!(LogFormat::parse("json"), LogFormat::Json));
        assert!(matches!(LogFormat::parse("PRETTY"), LogFormat::Pretty));
        assert!(matches!(LogFormat::parse("Compact"), LogFormat::Compact));
        assert!(matches!(LogFormat::parse("  compact\n"), LogFormat::Compact));
    }

    #[test]
    fn test_log_format_parse_invalid_defaults_to_json() {
        assert!(matches!(LogFormat::parse(""), LogFormat::Json));
        assert!(matches!(LogFormat::parse("xml"), LogFormat::Json));
    }

    #[test]
    fn test_parse_level() {
        let cases = [
            ("ERROR", Level::ERROR),
            ("warn", Level::WARN),
            ("Info", Level::INFO),
            ("debug", Level::DEBUG),
            ("TRACE", Level::TRACE),
            ("", Level::INFO),
            ("verbose", Level::INFO),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_level(input), expected, "Failed for input: {input}");
        }
    }

    #[test]
    fn test_parse_flag() {
        let cases = [
            ("true", true),
            ("TRUE", true),
            (" True ", true),
            ("false", false),
            ("", false),
            ("yes", false),
            ("1", false),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_flag(input), expected, "Failed for input: '{input}'");
        }
    }

    #[test]
    fn test_span_events() {
        assert_eq!(span_events(false), FmtSpan::NONE);
        assert_eq!(span_events(true), FmtSpan::NEW | FmtSpan::CLOSE);
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(Level::WARN, LogFormat::Compact, false);
        init_logging(Level::DEBUG, LogFormat::Json, true);
    }
}
