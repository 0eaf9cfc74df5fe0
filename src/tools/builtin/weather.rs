//! Current weather from OpenWeatherMap
//!
//! The API key is resolved from the environment once, when the invoker is
//! built. Without it every call fails fast with an error naming the variable.

use super::require_text;
use crate::config::WeatherSection;
use crate::error::{ToolError, ToolOutcome};
use crate::tools::{
    parameter_schema, parse_parameters, Tool, ToolDescription, ToolPayload, WeatherReport,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

const PROVIDER: &str = "OpenWeatherMap";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct WeatherParams {
    /// City name, optionally with country code (e.g. "Paris,FR")
    location: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    name: String,
    main: MainReadings,
    wind: Wind,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

/// Weather lookup tool
pub struct WeatherTool {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl WeatherTool {
    pub fn new(client: reqwest::Client, config: &WeatherSection, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Application status code of a response body. The provider sends it as
    /// a number on success and as a string on failure.
    fn response_code(body: &Value) -> Option<u64> {
        match body.get("cod")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Map a provider response onto the normalized report (pure function)
    fn parse_weather_response(body: Value) -> ToolOutcome<WeatherReport> {
        if Self::response_code(&body) != Some(200) {
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or("Unknown error");
            return Err(ToolError::upstream(PROVIDER, message));
        }

        let current: CurrentWeather = serde_json::from_value(body)
            .map_err(|e| ToolError::upstream(PROVIDER, format!("malformed response: {e}")))?;

        let description = current
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| ToolError::upstream(PROVIDER, "response has no weather conditions"))?;

        Ok(WeatherReport {
            location: current.name,
            temperature: current.main.temp,
            feels_like: current.main.feels_like,
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
            description,
        })
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "get_weather".to_string(),
            description: "Get current weather (metric units) for a city".to_string(),
            parameters: parameter_schema::<WeatherParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolOutcome<ToolPayload> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::MissingCredential(self.api_key_env.clone()))?;

        let params: WeatherParams = parse_parameters(parameters)?;
        let location = require_text("location", &params.location)?;

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;

        // Failures carry a JSON body with `cod` and `message` whatever the
        // HTTP status, so the body is inspected before the status.
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::http(PROVIDER, e))?;
        let body: Value = serde_json::from_str(&text).map_err(|_| {
            ToolError::upstream(
                PROVIDER,
                format!("unexpected non-JSON response (HTTP {})", status.as_u16()),
            )
        })?;

        Self::parse_weather_response(body).map(ToolPayload::Weather)
    }
}
