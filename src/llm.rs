use async_trait::async_trait;
use serde::Serialize;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{AppError, GenerationError};

/// Anything able to turn a prompt into generated text.
///
/// Controllers hold an `Arc<dyn TextGenerator>` so the Gemini client can be
/// swapped for an in-process generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String, GenerationError>;
}

/// Collapses a generation result into text that can be shown to a reader.
pub fn reply_text(result: Result<String, GenerationError>) -> String {
    match result {
        Ok(text) => text,
        Err(err) => err.user_message().to_string(),
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, system_instruction: Option<&'a str>) -> Self {
        Self {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            system_instruction: system_instruction
                .filter(|text| !text.trim().is_empty())
                .map(|text| Content { parts: vec![Part { text }] }),
        }
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        // No request timeout: the transport defaults apply.
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn send_request(
        &self,
        api_key: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<String, GenerationError> {
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let json: serde_json::Value = res.json().await?;
        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(GenerationError::EmptyCandidate)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String, GenerationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Gemini API key missing, skipping request");
            return Err(GenerationError::NotConfigured);
        };

        let body = GenerateContentRequest::new(prompt, system_instruction);
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Calling Gemini API");

        let result = self.send_request(api_key, &body).await;
        if let Err(err) = &result {
            error!("Gemini API error: {}", err);
        }
        result
    }
}
