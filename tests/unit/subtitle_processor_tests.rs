/*!
 * Tests for the subtitle document model and SRT handling
 */

use std::fmt::Write;

use anyhow::Result;
use tempfile::TempDir;

use subtrans::errors::SubtitleError;
use subtrans::subtitle_processor::{SubtitleDocument, SubtitleItem, SubtitleLine, SubtitleSegment};

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleItem::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleItem::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Test rejecting malformed timestamps
#[test]
fn test_timestamp_parsing_withInvalidComponents_shouldFail() {
    assert!(SubtitleItem::parse_timestamp("00:65:00,000").is_err());
    assert!(SubtitleItem::parse_timestamp("00:00:75,000").is_err());
    assert!(SubtitleItem::parse_timestamp("not a timestamp").is_err());
}

/// Test lexing a line with inline style tags into segments
#[test]
fn test_line_parse_withStyleTags_shouldSplitIntoSegments() {
    let line = SubtitleLine::parse("<b>Hello</b> <i>world</i>");

    assert_eq!(
        line.segments,
        vec![
            SubtitleSegment::tagged("b", "Hello"),
            SubtitleSegment::plain(" "),
            SubtitleSegment::tagged("i", "world"),
        ]
    );
}

/// Test that a tag with attributes keeps them on the opening tag only
#[test]
fn test_line_parse_withTagAttributes_shouldCloseWithTagName() {
    let line = SubtitleLine::parse(r#"<font color="red">How</font> are you?"#);

    assert_eq!(
        line.segments,
        vec![
            SubtitleSegment::tagged(r#"font color="red""#, "How"),
            SubtitleSegment::plain(" are you?"),
        ]
    );

    let mut rendered = String::new();
    write!(rendered, "{}", line).unwrap();
    assert_eq!(rendered, r#"<font color="red">How</font> are you?"#);
}

/// Test that untagged lines round-trip as a single plain segment
#[test]
fn test_line_parse_withPlainText_shouldRoundTrip() {
    let raw = "Just plain text";
    let line = SubtitleLine::parse(raw);

    assert_eq!(line.segments, vec![SubtitleSegment::plain(raw)]);

    let mut rendered = String::new();
    write!(rendered, "{}", line).unwrap();
    assert_eq!(rendered, raw);
}

/// Test parsing SRT string content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseCorrectly() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nTest subtitle\nSecond line\n\n";

    let items = SubtitleDocument::parse_srt_string(srt_content)?;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].start_time_ms, 1000);
    assert_eq!(items[0].end_time_ms, 4000);
    assert_eq!(items[0].lines.len(), 1);
    assert_eq!(items[1].lines.len(), 2);
    assert_eq!(items[1].lines[1].segments[0].text, "Second line");

    Ok(())
}

/// Test that a UTF-8 BOM is stripped when parsing
#[test]
fn test_parse_srt_string_withBom_shouldStripIt() -> Result<()> {
    let srt_content = "\u{feff}1\n00:00:01,000 --> 00:00:04,000\nHello\n";

    let items = SubtitleDocument::parse_srt_string(srt_content)?;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].lines[0].segments[0].text, "Hello");
    Ok(())
}

/// Test that invalid entries are skipped while valid ones survive
#[test]
fn test_parse_srt_string_withInvalidEntry_shouldSkipIt() -> Result<()> {
    // Second entry has end <= start
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nGood\n\n2\n00:00:08,000 --> 00:00:05,000\nBad\n\n3\n00:00:09,000 --> 00:00:12,000\nAlso good\n\n";

    let items = SubtitleDocument::parse_srt_string(srt_content)?;

    assert_eq!(items.len(), 2);
    // Items are renumbered sequentially after the skip
    assert_eq!(items[0].seq_num, 1);
    assert_eq!(items[1].seq_num, 2);
    assert_eq!(items[1].lines[0].segments[0].text, "Also good");
    Ok(())
}

/// Test that content without any valid entry is an error
#[test]
fn test_parse_srt_string_withNoValidEntries_shouldFail() {
    assert!(SubtitleDocument::parse_srt_string("not an srt file at all").is_err());
    assert!(SubtitleDocument::parse_srt_string("").is_err());
}

/// Test reading and writing segment text by address
#[test]
fn test_document_addressing_withValidAndInvalidAddresses_shouldBehave() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\n<b>Hello</b> world\n\n";
    let mut document = SubtitleDocument {
        source_file: "test.srt".into(),
        items: SubtitleDocument::parse_srt_string(srt_content)?,
    };

    assert_eq!(document.text_at(0, 0, 0), Some("Hello"));
    assert_eq!(document.text_at(0, 0, 1), Some(" world"));
    assert_eq!(document.text_at(0, 1, 0), None);

    document.set_text(0, 0, 0, "Hola".to_string())?;
    assert_eq!(document.text_at(0, 0, 0), Some("Hola"));

    let err = document.set_text(5, 0, 0, "x".to_string()).unwrap_err();
    assert!(matches!(err, SubtitleError::InvalidAddress { item: 5, line: 0, seg: 0 }));

    Ok(())
}

/// Test writing a document: BOM prefix, timestamps and tags preserved
#[test]
fn test_write_to_srt_withStyledDocument_shouldRoundTrip() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\n<i>Hello</i>\nPlain line\n\n";
    let document = SubtitleDocument {
        source_file: "test.srt".into(),
        items: SubtitleDocument::parse_srt_string(srt_content)?,
    };

    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("out.srt");
    document.write_to_srt(&path)?;

    let written = std::fs::read_to_string(&path)?;
    assert_eq!(
        written,
        "\u{feff}1\n00:00:01,000 --> 00:00:04,000\n<i>Hello</i>\nPlain line\n\n"
    );

    // Re-parsing the output yields the same structure
    let reparsed = SubtitleDocument::open(&path)?;
    assert_eq!(reparsed.items.len(), 1);
    assert_eq!(reparsed.items[0].lines[0].segments[0].text, "Hello");

    Ok(())
}

/// Test that opening a file without valid entries reports the path
#[test]
fn test_open_withGarbageFile_shouldReportNoEntries() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("garbage.srt");
    std::fs::write(&path, "no subtitles here")?;

    let err = SubtitleDocument::open(&path).unwrap_err();
    assert!(matches!(err, SubtitleError::NoEntries { .. }));
    assert!(err.to_string().contains("garbage.srt"));

    Ok(())
}
