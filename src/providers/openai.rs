use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::app_config::{LlmConfig, StructureOutput};
use crate::errors::ProviderError;

use super::{TranslationResponse, Translator, batch_limit_for, build_prompt, estimate_tokens, translation_response_schema};

/// Translator backed by any OpenAI-compatible chat-completions server
pub struct OpenAITranslator {
    /// Provider configuration
    config: LlmConfig,
    /// Prompt template with $TARGET_LANG$ / $SUBTITLES$ placeholders
    prompt_template: String,
    /// Target language
    target_lang: String,
    /// HTTP client for making requests
    client: Client,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model name
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Structured output constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The completion message
    pub message: ChatMessage,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices
    pub choices: Vec<ChatChoice>,
}

impl OpenAITranslator {
    /// Create a new OpenAI-compatible translator
    pub fn new(config: LlmConfig, prompt_template: String, target_lang: String) -> Self {
        OpenAITranslator {
            config,
            prompt_template,
            target_lang,
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    /// The structured-output constraint for this provider's configured mode
    fn response_format(&self) -> Value {
        match self.config.structure_output {
            StructureOutput::JsonObject => json!({ "type": "json_object" }),
            StructureOutput::JsonSchema => json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "translation_response",
                    "schema": translation_response_schema(),
                }
            }),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Translator for OpenAITranslator {
    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(&self.prompt_template, &self.target_lang, texts)?;

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            response_format: Some(self.response_format()),
        };

        debug!("Sending {} texts to {}", texts.len(), self.completions_url());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
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

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let choice = completion.choices.first().ok_or(ProviderError::EmptyResponse)?;

        TranslationResponse::parse(&choice.message.content, texts.len())
    }

    fn measure_length(&self, text: &str) -> usize {
        estimate_tokens(text)
    }

    fn max_batch_length(&self) -> usize {
        batch_limit_for(&self.config)
    }
}
