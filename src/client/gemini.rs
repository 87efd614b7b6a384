//! Generative Language API client.

use crate::client::traits::{CompletionClient, CompletionRequest};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::time::Duration;

/// Error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 500;

/// Blocking client for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a client from configuration, reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is set or the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(
            &api_key,
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Model this client talks to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl CompletionClient for GeminiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = request_body(request);
        tracing::debug!(model = %self.model, turns = request.turns.len(), "sending completion request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            let text: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(Error::Completion(format!("{status} - {text}")));
        }

        let data: Value = response.json()?;
        extract_text(&data).ok_or(Error::EmptyCompletion)
    }
}

/// Build the JSON body for a request.
#[must_use]
pub fn request_body(request: &CompletionRequest) -> Value {
    let contents: Vec<Value> = request
        .turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role,
                "parts": [{ "text": turn.text }]
            })
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": request.params.temperature,
            "maxOutputTokens": request.params.max_output_tokens,
        }
    });

    if let Some(system) = &request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    body
}

/// Concatenate the text parts of the first candidate.
///
/// Returns `None` when the response carries no non-blank text.
#[must_use]
pub fn extract_text(response: &Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.trim().is_empty() { None } else { Some(text) }
}
