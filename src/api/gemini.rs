//! Implements the `Completion` trait against the Gemini `generateContent` REST API.

use crate::api::Completion;
use crate::{Config, Result};
use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::trace;
use url::Url;

/// Calls `POST {endpoint}/v1beta/models/{model}:generateContent` with structured JSON output.
pub(crate) struct GeminiCompletion {
    client: reqwest::Client,
    url: Url,
    api_key: String,
}

impl GeminiCompletion {
    pub(crate) fn new(config: &Config, api_key: Option<&str>) -> Result<Self> {
        let api_key = match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => bail!(
                "A Gemini API key is required to ask for suggestions. Pass --api-key or set \
                GEMINI_API_KEY."
            ),
        };
        let url = generate_content_url(config.endpoint(), config.model())?;
        let client = reqwest::Client::builder()
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self {
            client,
            url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl Completion for GeminiCompletion {
    async fn complete(&self, prompt: &str, schema: &serde_json::Value) -> Result<Option<String>> {
        trace!("POST {}", self.url);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseJsonSchema": schema,
            }
        });

        let response = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send the request to the Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("The Gemini API failed with status {status}: {body}");
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse the Gemini API response")?;
        Ok(parsed.text())
    }
}

/// Builds the `generateContent` URL for `model` under `endpoint`.
fn generate_content_url(endpoint: &str, model: &str) -> Result<Url> {
    let base = Url::parse(endpoint)
        .with_context(|| format!("Invalid Gemini endpoint URL '{endpoint}'"))?;
    let base = if base.path().ends_with('/') {
        base
    } else {
        Url::parse(&format!("{base}/"))?
    };
    base.join(&format!("v1beta/models/{model}:generateContent"))
        .with_context(|| format!("Unable to build the request URL for model '{model}'"))
}

/// The parts of a `generateContent` response that we read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// The concatenated text of the first candidate, if it has any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
