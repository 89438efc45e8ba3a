/*!
 * Batch translation of subtitle documents.
 *
 * Split into two submodules:
 *
 * - `batch`: text unit extraction and greedy size-bounded batching
 * - `pipeline`: the sequential driver, with partial-failure persistence
 *   and address-based resumption
 */

// Re-export main types for easier usage
pub use self::batch::{TextUnit, batch_length, create_batches, extract_units};
pub use self::pipeline::{
    find_resume_offset, parse_from_index, translate_file, translate_file_from_index,
};

// Submodules
pub mod batch;
pub mod pipeline;
