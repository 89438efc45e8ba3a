/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to an LLM provider API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider returned no usable completion
    #[error("Empty response from provider")]
    EmptyResponse,

    /// The provider returned a different number of translations than requested
    #[error("translation count mismatch: got {got} translations for {expected} input texts")]
    CountMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of translations received
        got: usize,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors that can occur during subtitle file processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The file could not be read or written
    #[error("Subtitle file error: {0}")]
    Io(#[from] std::io::Error),

    /// The content did not contain any valid subtitle entries
    #[error("No valid subtitle entries were found in {path}")]
    NoEntries {
        /// The offending file
        path: String,
    },

    /// The document could not be written out
    #[error("Failed to write subtitle file {path}: {source}")]
    WriteFailed {
        /// Destination path
        path: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// An address does not exist in the document
    #[error("No segment at address {item},{line},{seg}")]
    InvalidAddress {
        /// Item index
        item: usize,
        /// Line index within the item
        line: usize,
        /// Segment index within the line
        seg: usize,
    },
}

/// Errors that can occur while driving the translation pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A translator call failed partway through the run.
    ///
    /// Carries everything a caller needs to resume with `--from` without
    /// re-translating completed work.
    #[error("batch {batch_number} failed: {source} (completed {completed_units} units, first failed at {failed_item},{failed_line},{failed_seg})")]
    BatchFailed {
        /// 1-based number of the batch whose translator call failed
        batch_number: usize,
        /// Units successfully written so far, including any prior-run baseline
        completed_units: usize,
        /// Item index of the first unit in the failed batch
        failed_item: usize,
        /// Line index of the first unit in the failed batch
        failed_line: usize,
        /// Segment index of the first unit in the failed batch
        failed_seg: usize,
        /// Original text of the first unit in the failed batch
        failed_text: String,
        /// The underlying provider error
        #[source]
        source: ProviderError,
    },

    /// A resume address does not match any extracted unit
    #[error("index {item},{line},{seg} not found in input file")]
    AddressNotFound {
        /// Requested item index
        item: usize,
        /// Requested line index
        line: usize,
        /// Requested segment index
        seg: usize,
    },

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the translation pipeline
    #[error("Translation error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
