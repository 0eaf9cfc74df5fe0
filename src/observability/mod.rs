//! Observability: structured logging for tool invocations

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
pub use logging::tool_span;
