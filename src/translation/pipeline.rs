/*!
 * The translation pipeline driver.
 *
 * Drives sequential batch translation over a subtitle document: slice the
 * unit sequence at a starting offset, batch the remainder, call the
 * translator one batch at a time in order, write translations back by
 * address, and persist. A failed batch terminates the run after persisting
 * whatever completed; the returned error carries the exact state needed to
 * resume with `--from` without re-translating finished work.
 */

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::errors::PipelineError;
use crate::providers::Translator;
use crate::subtitle_processor::SubtitleDocument;

use super::batch::{TextUnit, batch_length, create_batches, extract_units};

/// Translate every non-empty segment of `input` and write the result to `output`.
///
/// Returns the number of units translated.
pub async fn translate_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    translator: &dyn Translator,
) -> Result<usize, PipelineError> {
    let mut document = SubtitleDocument::open(input)?;
    let units = extract_units(&document, translator);

    run(&mut document, &units, 0, 0, translator, output.as_ref()).await
}

/// Resume a previous partial run from the unit at the given address.
///
/// The unit sequence (positions, lengths, original texts) is re-extracted
/// from the original `input` so addresses stay meaningful; the document that
/// gets mutated and persisted is reloaded from the previous partial `output`
/// so already-completed translations are preserved.
pub async fn translate_file_from_index(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    translator: &dyn Translator,
    from_item: usize,
    from_line: usize,
    from_seg: usize,
) -> Result<usize, PipelineError> {
    let input_document = SubtitleDocument::open(input)?;
    let units = extract_units(&input_document, translator);
    let offset = find_resume_offset(&units, from_item, from_line, from_seg)?;

    let mut document = SubtitleDocument::open(output.as_ref())?;

    info!("Resuming at unit {} of {}", offset + 1, units.len());
    run(&mut document, &units, offset, offset, translator, output.as_ref()).await
}

/// Find the offset into the extracted unit sequence matching an address.
///
/// Fails if no unit carries exactly that address — the address points at an
/// empty segment (never extracted) or is out of range.
pub fn find_resume_offset(
    units: &[TextUnit],
    item: usize,
    line: usize,
    seg: usize,
) -> Result<usize, PipelineError> {
    units
        .iter()
        .position(|unit| {
            unit.item_index == item && unit.line_index == line && unit.seg_index == seg
        })
        .ok_or(PipelineError::AddressNotFound { item, line, seg })
}

/// Parse a `--from` argument of the form `item,line,seg`
pub fn parse_from_index(from_index: &str) -> Result<(usize, usize, usize)> {
    let parts: Vec<&str> = from_index.split(',').collect();
    if parts.len() != 3 {
        bail!("--from must be in format item,line,seg");
    }

    let item = parts[0].trim().parse().context("error parsing item index")?;
    let line = parts[1].trim().parse().context("error parsing line index")?;
    let seg = parts[2].trim().parse().context("error parsing seg index")?;

    Ok((item, line, seg))
}

/// Drive batched translation of `units[start_offset..]` against `document`.
///
/// `baseline` is the count of units completed in a prior run, reported on
/// failure on top of this run's progress. Batches are translated strictly in
/// order, one call in flight at a time.
async fn run(
    document: &mut SubtitleDocument,
    units: &[TextUnit],
    start_offset: usize,
    baseline: usize,
    translator: &dyn Translator,
    output: &Path,
) -> Result<usize, PipelineError> {
    let batches = create_batches(&units[start_offset..], translator.max_batch_length());

    // Units completed during this run
    let mut offset = 0;

    for (i, batch) in batches.iter().enumerate() {
        info!(
            "Translating batch {} of {} ({} units, length {})",
            i + 1,
            batches.len(),
            batch.len(),
            batch_length(batch)
        );

        let translations = match translator.translate(batch).await {
            Ok(translations) => translations,
            Err(e) => {
                // Keep what we have: a partial output is strictly better than
                // losing completed translations, and a failed partial write
                // must not mask the translation error.
                if offset > 0 {
                    match document.write_to_srt(output) {
                        Ok(()) => info!("Wrote partial translation with {} completed units", offset),
                        Err(write_err) => {
                            warn!("Failed to write partial translation: {}", write_err)
                        }
                    }
                }

                let first = &units[start_offset + offset];
                return Err(PipelineError::BatchFailed {
                    batch_number: i + 1,
                    completed_units: baseline + offset,
                    failed_item: first.item_index,
                    failed_line: first.line_index,
                    failed_seg: first.seg_index,
                    failed_text: first.text.clone(),
                    source: e,
                });
            }
        };

        for (j, translation) in translations.into_iter().enumerate() {
            let unit = &units[start_offset + offset + j];
            document.set_text(unit.item_index, unit.line_index, unit.seg_index, translation)?;
        }
        offset += batch.len();
    }

    info!("Translation completed: {} units translated", offset);
    document.write_to_srt(output)?;

    Ok(offset)
}
