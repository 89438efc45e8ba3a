/*!
 * Text unit extraction and batching.
 *
 * The extractor walks a subtitle document in native order (items, then lines
 * within an item, then segments within a line) and produces addressable text
 * units; the batcher greedily packs them under the translator's size limit.
 */

use log::debug;

use crate::providers::Translator;
use crate::subtitle_processor::SubtitleDocument;

/// One translatable fragment, addressed by its position in the document.
///
/// `length` is measured once at extraction time with the translator's own
/// size metric, so the batching cost matches the limit it is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnit {
    /// Item index within the document
    pub item_index: usize,
    /// Line index within the item
    pub line_index: usize,
    /// Segment index within the line
    pub seg_index: usize,
    /// Size in the translator's metric
    pub length: usize,
    /// Original segment text
    pub text: String,
}

/// Extract the ordered sequence of translatable units from a document.
///
/// Segments with empty text never become units; whitespace-only segments do,
/// since they carry spacing the translation must preserve.
pub fn extract_units(document: &SubtitleDocument, translator: &dyn Translator) -> Vec<TextUnit> {
    let mut units = Vec::new();

    for (item_index, item) in document.items.iter().enumerate() {
        for (line_index, line) in item.lines.iter().enumerate() {
            for (seg_index, segment) in line.segments.iter().enumerate() {
                if segment.text.is_empty() {
                    continue;
                }
                units.push(TextUnit {
                    item_index,
                    line_index,
                    seg_index,
                    length: translator.measure_length(&segment.text),
                    text: segment.text.clone(),
                });
            }
        }
    }

    debug!("Extracted {} text units from {} items", units.len(), document.items.len());
    units
}

/// Greedily pack units into ordered batches of texts.
///
/// A unit is appended to the current batch while the running length sum stays
/// within `max_length`; otherwise the batch is closed and a new one starts.
/// A single unit longer than `max_length` is never split or dropped: it ends
/// up alone in its own batch. Concatenating the batches reproduces the input
/// order exactly.
pub fn create_batches(units: &[TextUnit], max_length: usize) -> Vec<Vec<String>> {
    let mut batches = Vec::new();
    let mut current_batch: Vec<String> = Vec::new();
    let mut current_length = 0;

    for unit in units {
        if current_length + unit.length > max_length && !current_batch.is_empty() {
            batches.push(current_batch);
            current_batch = Vec::new();
            current_length = 0;
        }
        current_batch.push(unit.text.clone());
        current_length += unit.length;
    }

    if !current_batch.is_empty() {
        batches.push(current_batch);
    }

    batches
}

/// Total character length of a batch, for log output
pub fn batch_length(batch: &[String]) -> usize {
    batch.iter().map(|text| text.len()).sum()
}
