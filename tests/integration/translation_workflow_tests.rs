/*!
 * End-to-end tests for the translate / fail / resume workflow over real
 * files, driven by the mock translator
 */

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use subtrans::errors::PipelineError;
use subtrans::translation::{translate_file, translate_file_from_index};

use crate::common::mock_translators::MockTranslator;
use crate::common::{four_line_srt, four_line_srt_output};

fn write_input(dir: &TempDir, content: &str) -> Result<(PathBuf, PathBuf)> {
    let input = dir.path().join("input.srt");
    let output = dir.path().join("output.srt");
    fs::write(&input, content)?;
    Ok((input, output))
}

fn four_line_mock(max_length: usize) -> MockTranslator {
    MockTranslator::new(max_length)
        .with_translation("Line 1", "Trans 1")
        .with_translation("Line 2", "Trans 2")
        .with_translation("Line 3", "Trans 3")
        .with_translation("Line 4", "Trans 4")
}

/// Test a straightforward full translation of a two-entry file
#[tokio::test]
async fn test_translate_file_withSimpleInput_shouldWriteTranslatedSrt() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(
        &dir,
        "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nHow are you?\n",
    )?;

    let translator = MockTranslator::new(10)
        .with_translation("Hello world", "Hola mundo")
        .with_translation("How are you?", "\u{bf}C\u{f3}mo est\u{e1}s?");

    let translated = translate_file(&input, &output, &translator).await?;
    assert_eq!(translated, 2);

    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        "\u{feff}1\n00:00:01,000 --> 00:00:04,000\nHola mundo\n\n2\n00:00:05,000 --> 00:00:08,000\n\u{bf}C\u{f3}mo est\u{e1}s?\n\n"
    );

    Ok(())
}

/// Test that the size limit splits a run into multiple sequential calls
#[tokio::test]
async fn test_translate_file_withSmallLimit_shouldTranslateInTwoBatches() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(&dir, &four_line_srt())?;

    // Unit length 1 and limit 2: two batches of two
    let translator = four_line_mock(2);

    let translated = translate_file(&input, &output, &translator).await?;
    assert_eq!(translated, 4);
    assert_eq!(translator.call_count(), 2);
    assert_eq!(
        translator.calls(),
        vec![vec!["Line 1", "Line 2"], vec!["Line 3", "Line 4"]]
    );

    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        four_line_srt_output(["Trans 1", "Trans 2", "Trans 3", "Trans 4"])
    );

    Ok(())
}

/// Test translation of styled multi-segment lines
#[tokio::test]
async fn test_translate_file_withStyledSegments_shouldTranslateEachSegment() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(
        &dir,
        "1\n00:00:01,000 --> 00:00:04,000\n<b>Hello</b> <i>world</i>\n\n2\n00:00:05,000 --> 00:00:08,000\n<font color=\"red\">How</font> are you?\n",
    )?;

    let translator = MockTranslator::new(100)
        .with_translation("Hello", "Hola")
        .with_translation("world", "mundo")
        .with_translation("How", "C\u{f3}mo")
        .with_translation(" are you?", " est\u{e1}s?");

    translate_file(&input, &output, &translator).await?;

    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        "\u{feff}1\n00:00:01,000 --> 00:00:04,000\n<b>Hola</b> <i>mundo</i>\n\n2\n00:00:05,000 --> 00:00:08,000\n<font color=\"red\">C\u{f3}mo</font> est\u{e1}s?\n\n"
    );

    Ok(())
}

/// Test the partial-failure checkpoint: batch 2 fails, batch 1 is kept
#[tokio::test]
async fn test_translate_file_withSecondBatchFailing_shouldPersistPartialProgress() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(&dir, &four_line_srt())?;

    let translator = four_line_mock(2).fail_on_call(2);

    let err = translate_file(&input, &output, &translator).await.unwrap_err();

    match err {
        PipelineError::BatchFailed {
            batch_number,
            completed_units,
            failed_item,
            failed_line,
            failed_seg,
            ref failed_text,
            ref source,
        } => {
            assert_eq!(batch_number, 2);
            assert_eq!(completed_units, 2);
            assert_eq!((failed_item, failed_line, failed_seg), (2, 0, 0));
            assert_eq!(failed_text, "Line 3");
            assert!(source.to_string().contains("translation service unavailable"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The output contains exactly the completed units translated
    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        four_line_srt_output(["Trans 1", "Trans 2", "Line 3", "Line 4"])
    );

    Ok(())
}

/// Test that a first-batch failure leaves no output file behind
#[tokio::test]
async fn test_translate_file_withFirstBatchFailing_shouldNotWriteOutput() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(&dir, &four_line_srt())?;

    let translator = four_line_mock(2).fail_on_call(1);

    let err = translate_file(&input, &output, &translator).await.unwrap_err();
    match err {
        PipelineError::BatchFailed { batch_number, completed_units, .. } => {
            assert_eq!(batch_number, 1);
            assert_eq!(completed_units, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(!output.exists());
    Ok(())
}

/// Test resuming a partial run: units before the address are untouched,
/// and translation is never re-invoked for them
#[tokio::test]
async fn test_translate_file_from_index_withPartialOutput_shouldCompleteRun() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(&dir, &four_line_srt())?;

    // Previous partial run: units 1-2 done ("Translated 1" proves the
    // resumed run keeps the output's text rather than re-translating)
    fs::write(
        &output,
        four_line_srt_output(["Translated 1", "Trans 2", "Line 3", "Line 4"]),
    )?;

    let translator = four_line_mock(10);

    let translated = translate_file_from_index(&input, &output, &translator, 2, 0, 0).await?;
    assert_eq!(translated, 2);

    assert_eq!(translator.calls(), vec![vec!["Line 3", "Line 4"]]);

    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        four_line_srt_output(["Translated 1", "Trans 2", "Trans 3", "Trans 4"])
    );

    Ok(())
}

/// Test that an interrupted-then-resumed run converges to the same output
/// as an uninterrupted one
#[tokio::test]
async fn test_resume_afterFailure_shouldMatchUninterruptedRun() -> Result<()> {
    // Uninterrupted reference run
    let dir = TempDir::new()?;
    let (input, reference_output) = write_input(&dir, &four_line_srt())?;
    translate_file(&input, &reference_output, &four_line_mock(2)).await?;
    let reference = fs::read_to_string(&reference_output)?;

    // Interrupted run: single-unit batches, failure on call 3
    let resumed_output = dir.path().join("resumed.srt");
    let failing = MockTranslator::new(1)
        .with_translation("Line 1", "Trans 1")
        .with_translation("Line 2", "Trans 2")
        .fail_on_call(3);

    let err = translate_file(&input, &resumed_output, &failing)
        .await
        .unwrap_err();

    let (item, line, seg) = match err {
        PipelineError::BatchFailed { completed_units, failed_item, failed_line, failed_seg, .. } => {
            assert_eq!(completed_units, 2);
            (failed_item, failed_line, failed_seg)
        }
        other => panic!("unexpected error: {:?}", other),
    };

    // Resume from the reported address
    let resuming = four_line_mock(2);
    translate_file_from_index(&input, &resumed_output, &resuming, item, line, seg).await?;
    assert_eq!(resuming.calls(), vec![vec!["Line 3", "Line 4"]]);

    assert_eq!(fs::read_to_string(&resumed_output)?, reference);
    Ok(())
}

/// Test a failure during a resumed run: the reported completed count is the
/// resume offset plus this run's progress, and that progress is persisted
#[tokio::test]
async fn test_resume_withFailureMidRun_shouldReportBaselinePlusLocalProgress() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(&dir, &four_line_srt())?;

    // Previous partial run: units 1-2 done
    fs::write(
        &output,
        four_line_srt_output(["Trans 1", "Trans 2", "Line 3", "Line 4"]),
    )?;

    // Single-unit batches; the second call of the resumed run fails
    let translator = MockTranslator::new(1)
        .with_translation("Line 3", "Trans 3")
        .with_translation("Line 4", "Trans 4")
        .fail_on_call(2);

    let err = translate_file_from_index(&input, &output, &translator, 2, 0, 0)
        .await
        .unwrap_err();

    match err {
        PipelineError::BatchFailed {
            batch_number,
            completed_units,
            failed_item,
            failed_line,
            failed_seg,
            ..
        } => {
            // 2 units from the prior run plus 1 completed in this one
            assert_eq!(batch_number, 2);
            assert_eq!(completed_units, 3);
            assert_eq!((failed_item, failed_line, failed_seg), (3, 0, 0));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // This run's completed unit is persisted on top of the prior progress
    let written = fs::read_to_string(&output)?;
    assert_eq!(
        written,
        four_line_srt_output(["Trans 1", "Trans 2", "Trans 3", "Line 4"])
    );

    Ok(())
}

/// Test resuming with an address that does not exist in the input
#[tokio::test]
async fn test_translate_file_from_index_withInvalidAddress_shouldFail() -> Result<()> {
    let dir = TempDir::new()?;
    let (input, output) = write_input(
        &dir,
        "1\n00:00:01,000 --> 00:00:04,000\nLine 1\n\n2\n00:00:05,000 --> 00:00:08,000\nLine 2\n",
    )?;
    fs::write(
        &output,
        "\u{feff}1\n00:00:01,000 --> 00:00:04,000\nTrans 1\n\n2\n00:00:05,000 --> 00:00:08,000\nLine 2\n\n",
    )?;

    let translator = MockTranslator::new(10);

    let err = translate_file_from_index(&input, &output, &translator, 99, 0, 0)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("not found in input file"));
    assert_eq!(translator.call_count(), 0);

    Ok(())
}
