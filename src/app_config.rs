/*!
 * Application configuration module
 *
 * This module handles loading, validating and locating the application
 * configuration: LLM provider entries, target language and prompt templates.
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// API family an LLM provider speaks
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmApi {
    // @provider: OpenAI-compatible chat completions
    #[default]
    OpenAI,
    // @provider: Google Gemini
    Gemini,
}

impl std::fmt::Display for LlmApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Structured-output mode for OpenAI-compatible providers
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StructureOutput {
    /// Ask for a free-form JSON object
    JsonObject,
    /// Ask for a response constrained by a JSON schema
    #[default]
    JsonSchema,
}

/// One LLM provider entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    // @field: API family
    pub api: LlmApi,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Base URL of the service
    #[serde(default = "String::new")]
    pub api_url: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Context budget the batcher packs against
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    // @field: Structured output mode (OpenAI only)
    #[serde(default)]
    pub structure_output: StructureOutput,
}

// LLMs usually work better on small context
fn default_max_tokens() -> usize {
    128_000
}

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Name of the provider used when none is requested explicitly
    #[serde(default)]
    pub default_llm: String,

    /// Available LLM providers, by name
    #[serde(default)]
    pub llms: HashMap<String, LlmConfig>,

    /// Target language
    #[serde(default)]
    pub target_lang: String,

    /// Prompt templates, by key ("default" overrides the built-in template)
    #[serde(default)]
    pub prompts: HashMap<String, String>,
}

impl Config {
    /// Load and validate a configuration file (JSON)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.llms.is_empty() {
            return Err(anyhow!("at least one LLM provider is required"));
        }

        if self.default_llm.is_empty() {
            return Err(anyhow!("default LLM provider is required"));
        }

        if !self.llms.contains_key(&self.default_llm) {
            return Err(anyhow!("default LLM provider not found in llms map"));
        }

        for (name, provider) in &self.llms {
            Self::validate_llm(name, provider)?;
        }

        Ok(())
    }

    fn validate_llm(name: &str, provider: &LlmConfig) -> Result<()> {
        if provider.api_key.is_empty() {
            return Err(anyhow!("api_key is required for LLM provider '{}'", name));
        }
        if provider.model.is_empty() {
            return Err(anyhow!("model is required for LLM provider '{}'", name));
        }
        if provider.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be positive for LLM provider '{}'", name));
        }
        Ok(())
    }

    /// Returns the default LLM provider
    pub fn default_llm(&self) -> Result<&LlmConfig> {
        self.llms
            .get(&self.default_llm)
            .ok_or_else(|| anyhow!("default LLM provider not found"))
    }

    /// Returns a specific LLM provider by name
    pub fn get_llm(&self, name: &str) -> Result<&LlmConfig> {
        self.llms
            .get(name)
            .ok_or_else(|| anyhow!("LLM provider '{}' not found", name))
    }
}

/// Locate the configuration file.
///
/// Search order: the explicit path if given, then `./subtrans.json`,
/// then `<user config dir>/subtrans/config.json`.
pub fn find_config(explicit: Option<&str>) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(path) = explicit {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(PathBuf::from("subtrans.json"));
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("subtrans").join("config.json"));
    }

    for candidate in candidates {
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(anyhow!("config file not found"))
}
