//! HTTP client for the Gemini generateContent endpoint

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::*;
use crate::config::CommentaryConfig;
use crate::error::{Error, Result};

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &CommentaryConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Some(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }))
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("x-goog-api-key", value);
        }

        headers
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Sends one prompt and returns the model's text verbatim.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Requesting commentary from {}", self.model);

        let response = self
            .client
            .post(self.url())
            .headers(self.headers())
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Commentary(format!(
                "API error: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.text().await?;
        parse_generate_body(&body)
    }
}

/// Extracts the model's text from a generateContent response body.
fn parse_generate_body(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    response
        .text()
        .ok_or_else(|| Error::Commentary("response contained no text".into()))
}
