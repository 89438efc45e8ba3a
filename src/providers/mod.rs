/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI-compatible: any server speaking the chat-completions API
 * - Gemini: Google generative language API
 * - Dry-run: offline echo provider, no network calls
 */

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app_config::{Config, LlmApi, LlmConfig};
use crate::errors::ProviderError;

pub mod gemini;
pub mod mock;
pub mod openai;

/// Prompt key that falls back to the built-in template when not configured
pub const DEFAULT_PROMPT_KEY: &str = "default";

/// Built-in prompt template, used when the config does not override "default"
const DEFAULT_PROMPT_TEMPLATE: &str = r#"Translate the following subtitle texts to $TARGET_LANG$. Return a JSON object with a "translations" array containing the translated texts in the same order:

Return format:
{
  "translations": ["translation1", "translation2", ...]
}

Subtitle texts:
$SUBTITLES$
"#;

/// Common trait for all LLM translators
///
/// This trait defines the capability the translation pipeline consumes,
/// allowing provider implementations to be used interchangeably.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch of texts.
    ///
    /// # Returns
    /// The translated texts, same length and same order as the input,
    /// or a `ProviderError` (transport failure, unparseable response,
    /// count mismatch).
    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError>;

    /// Size metric used for batching decisions.
    ///
    /// An approximate token count; not additive across concatenation.
    fn measure_length(&self, text: &str) -> usize;

    /// The packing limit for one translate call, in `measure_length` units
    fn max_batch_length(&self) -> usize;
}

/// Create a translator from configuration.
///
/// `provider_name` selects an entry from the config's `llms` map ("default"
/// picks the configured default provider). `prompt_key` selects a prompt
/// template from the config's `prompts` map. With `dry_run` set, a no-network
/// echo translator is returned instead of an API client.
pub fn create_translator(
    config: &Config,
    prompt_key: &str,
    provider_name: &str,
    dry_run: bool,
) -> anyhow::Result<Box<dyn Translator>> {
    let provider = if provider_name == "default" {
        config.default_llm()?
    } else {
        config.get_llm(provider_name)?
    };

    if dry_run {
        return Ok(Box::new(mock::DryRunTranslator::new(provider.max_tokens)));
    }

    let prompt_template = resolve_prompt_template(config, prompt_key)?;

    match provider.api {
        LlmApi::OpenAI => Ok(Box::new(openai::OpenAITranslator::new(
            provider.clone(),
            prompt_template,
            config.target_lang.clone(),
        ))),
        LlmApi::Gemini => Ok(Box::new(gemini::GeminiTranslator::new(
            provider.clone(),
            prompt_template,
            config.target_lang.clone(),
        ))),
    }
}

/// Look up a prompt template by key, falling back to the built-in default
pub fn resolve_prompt_template(config: &Config, prompt_key: &str) -> anyhow::Result<String> {
    if let Some(template) = config.prompts.get(prompt_key) {
        return Ok(template.clone());
    }
    if prompt_key == DEFAULT_PROMPT_KEY {
        return Ok(DEFAULT_PROMPT_TEMPLATE.to_string());
    }
    Err(anyhow::anyhow!("prompt {:?} not found in config", prompt_key))
}

/// Expand a prompt template for one batch.
///
/// `$TARGET_LANG$` is replaced with the target language and `$SUBTITLES$`
/// with the JSON array of the batch's texts.
pub fn build_prompt(template: &str, target_lang: &str, texts: &[String]) -> Result<String, ProviderError> {
    let subtitles_json = serde_json::to_string(texts)
        .map_err(|e| ProviderError::ParseError(format!("failed to serialize input texts: {}", e)))?;

    Ok(template
        .replace("$TARGET_LANG$", target_lang)
        .replace("$SUBTITLES$", &subtitles_json))
}

/// Structured translation payload expected back from every provider
#[derive(Debug, Deserialize)]
pub struct TranslationResponse {
    /// Translated texts, same order as the request
    pub translations: Vec<String>,
}

impl TranslationResponse {
    /// Parse a provider's completion text and enforce the count contract
    pub fn parse(content: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
        let response: TranslationResponse = serde_json::from_str(content)
            .map_err(|e| ProviderError::ParseError(format!("failed to parse translation response: {}", e)))?;

        if response.translations.len() != expected {
            return Err(ProviderError::CountMismatch {
                expected,
                got: response.translations.len(),
            });
        }

        Ok(response.translations)
    }
}

/// JSON schema for `TranslationResponse`, for providers with structured output
pub fn translation_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "translations": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["translations"],
        "additionalProperties": false
    })
}

/// Estimate token count for text (rough approximation).
///
/// ~4 chars per token for English. Good enough for batching decisions;
/// never used for billing or hard limits.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Packing limit derived from a provider's configured max tokens,
/// with headroom for prompt scaffolding and response growth
pub(crate) fn batch_limit_for(provider: &LlmConfig) -> usize {
    (provider.max_tokens as f64 * 0.95) as usize
}
