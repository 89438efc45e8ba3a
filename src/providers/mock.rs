/*!
 * Dry-run translator.
 *
 * Used by `--dry-run` to exercise the whole pipeline (extraction, batching,
 * write-back, persistence) without any network calls. Texts pass through
 * unchanged.
 */

use async_trait::async_trait;
use log::info;

use crate::errors::ProviderError;

use super::{Translator, estimate_tokens};

/// No-network translator that echoes its input
pub struct DryRunTranslator {
    /// Context budget to pack batches against, as a real provider would
    max_tokens: usize,
}

impl DryRunTranslator {
    /// Create a new dry-run translator with the given token budget
    pub fn new(max_tokens: usize) -> Self {
        DryRunTranslator { max_tokens }
    }
}

#[async_trait]
impl Translator for DryRunTranslator {
    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        info!("Dry run: would translate {} texts", texts.len());
        Ok(texts.to_vec())
    }

    fn measure_length(&self, text: &str) -> usize {
        estimate_tokens(text)
    }

    fn max_batch_length(&self) -> usize {
        (self.max_tokens as f64 * 0.95) as usize
    }
}
