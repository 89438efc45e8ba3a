use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app_config::LlmConfig;
use crate::errors::ProviderError;

use super::{TranslationResponse, Translator, batch_limit_for, build_prompt, estimate_tokens, translation_response_schema};

/// Default base URL of the Gemini API
const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Translator backed by the Google Gemini generateContent API
pub struct GeminiTranslator {
    /// Provider configuration
    config: LlmConfig,
    /// Prompt template with $TARGET_LANG$ / $SUBTITLES$ placeholders
    prompt_template: String,
    /// Target language
    target_lang: String,
    /// HTTP client for making requests
    client: Client,
}

/// One part of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    /// Text payload
    #[serde(default)]
    pub text: String,
}

/// Content block of a request or candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Ordered parts
    pub parts: Vec<ContentPart>,
}

/// generateContent request
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    /// Input contents
    pub contents: Vec<Content>,
    /// Generation parameters
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

/// Generation parameters for the Gemini API
#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    /// MIME type of the response
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    /// JSON schema the response must satisfy
    #[serde(rename = "responseJsonSchema", skip_serializing_if = "Option::is_none")]
    pub response_json_schema: Option<Value>,
}

/// One response candidate
#[derive(Debug, Deserialize)]
pub struct Candidate {
    /// Candidate content
    pub content: Content,
}

/// generateContent response
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    /// Response candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GeminiTranslator {
    /// Create a new Gemini translator
    pub fn new(config: LlmConfig, prompt_template: String, target_lang: String) -> Self {
        GeminiTranslator {
            config,
            prompt_template,
            target_lang,
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    fn generate_url(&self) -> String {
        let base = if self.config.api_url.is_empty() {
            DEFAULT_API_URL
        } else {
            self.config.api_url.trim_end_matches('/')
        };
        format!("{}/v1beta/models/{}:generateContent", base, self.config.model)
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(&self.prompt_template, &self.target_lang, texts)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![ContentPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_json_schema: Some(translation_response_schema()),
            },
        };

        debug!("Sending {} texts to {}", texts.len(), self.generate_url());

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let candidate = generated.candidates.first().ok_or(ProviderError::EmptyResponse)?;
        let content = candidate
            .content
            .parts
            .first()
            .filter(|part| !part.text.is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        TranslationResponse::parse(&content.text, texts.len())
    }

    fn measure_length(&self, text: &str) -> usize {
        estimate_tokens(text)
    }

    fn max_batch_length(&self) -> usize {
        batch_limit_for(&self.config)
    }
}
