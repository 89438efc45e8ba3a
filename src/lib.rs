/*!
 * # subtrans - LLM-backed subtitle translation
 *
 * A Rust library for translating subtitle files with LLM providers.
 *
 * ## Features
 *
 * - Parse and write SRT subtitle files with inline style tags
 * - Translate subtitle text with interchangeable LLM providers:
 *   - OpenAI-compatible chat-completions APIs
 *   - Google Gemini
 * - Size-bounded sequential batching against the provider's token budget
 * - Partial-failure persistence and address-based resumption (`--from`)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle document model and SRT handling
 * - `translation`: The batch translation pipeline:
 *   - `translation::batch`: Text unit extraction and batching
 *   - `translation::pipeline`: Sequential driver and resume logic
 * - `providers`: Client implementations for the LLM providers:
 *   - `providers::openai`: OpenAI-compatible client
 *   - `providers::gemini`: Gemini client
 *   - `providers::mock`: Dry-run echo translator
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, PipelineError, ProviderError, SubtitleError};
pub use providers::Translator;
pub use subtitle_processor::{SubtitleDocument, SubtitleItem, SubtitleLine, SubtitleSegment};
pub use translation::{TextUnit, translate_file, translate_file_from_index};
