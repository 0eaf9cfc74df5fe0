//! Uniform result contract shared by every tool
//!
//! A [`ToolResult`] serializes as a flat JSON object whose `status` field
//! selects which other fields are present:
//!
//! ```json
//! {"status": "success", "content": "hello"}
//! {"status": "error", "error_message": "Not found: notes.txt"}
//! {"status": "disambiguation", "options": ["Mercury (planet)", "Mercury (element)"]}
//! ```

use crate::error::{ToolError, ToolOutcome};
use serde::{Deserialize, Serialize};

/// Status-tagged record returned by every operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success(ToolPayload),
    Error { error_message: String },
    Disambiguation { options: Vec<String> },
}

/// Operation-specific success payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Listing {
        path: String,
        files: Vec<String>,
        directories: Vec<String>,
    },
    Content {
        content: String,
    },
    Written {
        message: String,
        bytes_written: usize,
    },
    SearchResults {
        results: Vec<SearchHit>,
    },
    Weather(WeatherReport),
    Summary {
        title: String,
        summary: String,
    },
    Papers {
        papers: Vec<Paper>,
    },
}

/// One web search result, in provider order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// Current conditions normalized from the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Degrees Celsius
    pub feels_like: f64,
    /// Percent
    pub humidity: f64,
    /// Metres per second
    pub wind_speed: f64,
    pub description: String,
}

/// One arXiv paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub url: String,
}

impl ToolResult {
    pub fn success(payload: ToolPayload) -> Self {
        ToolResult::Success(payload)
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        ToolResult::Error {
            error_message: message.into(),
        }
    }

    /// Wire name of this result's status
    pub fn status(&self) -> &'static str {
        match self {
            ToolResult::Success(_) => "success",
            ToolResult::Error { .. } => "error",
            ToolResult::Disambiguation { .. } => "disambiguation",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success(_))
    }

    pub fn payload(&self) -> Option<&ToolPayload> {
        match self {
            ToolResult::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResult::Error { error_message } => Some(error_message),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Every variant is a map of strings, numbers and arrays.
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({"status": "error", "error_message": e.to_string()})
        })
    }
}

impl From<ToolOutcome<ToolPayload>> for ToolResult {
    fn from(outcome: ToolOutcome<ToolPayload>) -> Self {
        match outcome {
            Ok(payload) => ToolResult::Success(payload),
            Err(ToolError::Ambiguous { options, .. }) => ToolResult::Disambiguation { options },
            Err(err) => ToolResult::error(err.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &serde_json::Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_success_flattens_payload() {
        let result = ToolResult::success(ToolPayload::Content {
            content: "hello".to_string(),
        });

        assert_eq!(result.to_json(), json!({"status": "success", "content": "hello"}));
    }

    #[test]
    fn test_error_has_only_message() {
        let result = ToolResult::error("Not found: a.txt");
        let value = result.to_json();

        assert_eq!(keys(&value), vec!["error_message", "status"]);
        assert_eq!(value["status"], "error");
    }

    #[test]
    fn test_disambiguation_has_only_options() {
        let result = ToolResult::Disambiguation {
            options: vec!["A".to_string(), "B".to_string()],
        };
        let value = result.to_json();

        assert_eq!(keys(&value), vec!["options", "status"]);
        assert_eq!(value["status"], "disambiguation");
    }

    #[test]
    fn test_weather_payload_fields() {
        let result = ToolResult::success(ToolPayload::Weather(WeatherReport {
            location: "London".to_string(),
            temperature: 11.5,
            feels_like: 10.2,
            humidity: 81.0,
            wind_speed: 4.1,
            description: "light rain".to_string(),
        }));
        let value = result.to_json();

        assert_eq!(
            keys(&value),
            vec![
                "description",
                "feels_like",
                "humidity",
                "location",
                "status",
                "temperature",
                "wind_speed"
            ]
        );
    }

    #[test]
    fn test_listing_deserializes_from_wire() {
        let value = json!({
            "status": "success",
            "path": "/data",
            "files": ["/data/a.txt"],
            "directories": []
        });
        let result: ToolResult = serde_json::from_value(value).unwrap();

        assert!(matches!(
            result.payload(),
            Some(ToolPayload::Listing { files, .. }) if files.len() == 1
        ));
    }

    #[test]
    fn test_ambiguous_error_becomes_disambiguation() {
        let outcome: ToolOutcome<ToolPayload> = Err(ToolError::Ambiguous {
            query: "Mercury".to_string(),
            options: vec!["Mercury (planet)".to_string()],
        });
        let result = ToolResult::from(outcome);

        assert_eq!(result.status(), "disambiguation");
        assert!(result.error_message().is_none());
    }

    #[test]
    fn test_other_errors_become_error_status() {
        let outcome: ToolOutcome<ToolPayload> =
            Err(ToolError::MissingCredential("OPENWEATHER_API_KEY".to_string()));
        let result = ToolResult::from(outcome);

        assert_eq!(result.status(), "error");
        assert_eq!(
            result.error_message(),
            Some("OPENWEATHER_API_KEY environment variable not set")
        );
    }
}
