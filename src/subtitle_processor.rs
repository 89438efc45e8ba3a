use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: Subtitle document model and SRT parsing/serialization

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @const: Inline style tag regex, e.g. <b>..</b> or <font color="red">..</font>
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([A-Za-z][^>/]*)>(.*?)</[^>]*>").unwrap()
});

/// One styled run of text inside a subtitle line.
///
/// `tag` holds the raw opening-tag content (`b`, `i`, `font color="red"`, ...)
/// for styled runs, or `None` for plain text between tags.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleSegment {
    // @field: Raw opening tag content, if the run is styled
    pub tag: Option<String>,

    // @field: Segment text
    pub text: String,
}

impl SubtitleSegment {
    /// Create a plain (untagged) segment
    pub fn plain(text: impl Into<String>) -> Self {
        SubtitleSegment { tag: None, text: text.into() }
    }

    /// Create a styled segment
    pub fn tagged(tag: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleSegment { tag: Some(tag.into()), text: text.into() }
    }
}

impl fmt::Display for SubtitleSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.tag {
            Some(tag) => {
                // Closing tag uses only the tag name, not its attributes
                let name = tag.split_whitespace().next().unwrap_or(tag);
                write!(f, "<{}>{}</{}>", tag, self.text, name)
            }
            None => write!(f, "{}", self.text),
        }
    }
}

/// One visual line of a subtitle item, as an ordered list of styled segments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubtitleLine {
    // @field: Ordered styled runs
    pub segments: Vec<SubtitleSegment>,
}

impl SubtitleLine {
    /// Lex a raw SRT text line into styled segments.
    ///
    /// Text outside recognized `<tag>..</tag>` pairs becomes plain segments.
    /// Nested tags are not interpreted; the inner text is kept as-is.
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for caps in TAG_REGEX.captures_iter(raw) {
            let whole = caps.get(0).unwrap();
            if whole.start() > cursor {
                segments.push(SubtitleSegment::plain(&raw[cursor..whole.start()]));
            }
            segments.push(SubtitleSegment::tagged(&caps[1], &caps[2]));
            cursor = whole.end();
        }

        if cursor < raw.len() {
            segments.push(SubtitleSegment::plain(&raw[cursor..]));
        }

        SubtitleLine { segments }
    }
}

impl fmt::Display for SubtitleLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

// @struct: Single subtitle item (one timed cue)
#[derive(Debug, Clone)]
pub struct SubtitleItem {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Ordered visual lines
    pub lines: Vec<SubtitleLine>,
}

impl SubtitleItem {
    /// Creates a new subtitle item from raw text lines
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, raw_lines: &[String]) -> Self {
        SubtitleItem {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines: raw_lines.iter().map(|l| SubtitleLine::parse(l)).collect(),
        }
    }

    // @creates: Validated subtitle item
    // @validates: Time range and non-empty text
    pub fn new_validated(
        seq_num: usize,
        start_time_ms: u64,
        end_time_ms: u64,
        raw_lines: &[String],
    ) -> Result<Self> {
        if end_time_ms <= start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} <= start time {}",
                end_time_ms,
                start_time_ms
            ));
        }

        if raw_lines.iter().all(|l| l.trim().is_empty()) {
            return Err(anyhow!("Empty subtitle text for entry {}", seq_num));
        }

        Ok(Self::new(seq_num, start_time_ms, end_time_ms, raw_lines))
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }
}

impl fmt::Display for SubtitleItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// A parsed subtitle document: ordered items, each with ordered lines of
/// ordered styled segments. Segment text is addressable by
/// (item, line, segment) index triple.
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    /// Source filename
    pub source_file: PathBuf,

    /// Ordered subtitle items
    pub items: Vec<SubtitleItem>,
}

impl SubtitleDocument {
    /// Open and parse an SRT file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let items = Self::parse_srt_string(&content).map_err(|_| SubtitleError::NoEntries {
            path: path.display().to_string(),
        })?;

        Ok(SubtitleDocument {
            source_file: path.to_path_buf(),
            items,
        })
    }

    /// Read the text of the segment at the given address
    pub fn text_at(&self, item: usize, line: usize, seg: usize) -> Option<&str> {
        self.items
            .get(item)
            .and_then(|i| i.lines.get(line))
            .and_then(|l| l.segments.get(seg))
            .map(|s| s.text.as_str())
    }

    /// Replace the text of the segment at the given address
    pub fn set_text(
        &mut self,
        item: usize,
        line: usize,
        seg: usize,
        text: String,
    ) -> Result<(), SubtitleError> {
        let segment = self
            .items
            .get_mut(item)
            .and_then(|i| i.lines.get_mut(line))
            .and_then(|l| l.segments.get_mut(seg))
            .ok_or(SubtitleError::InvalidAddress { item, line, seg })?;
        segment.text = text;
        Ok(())
    }

    /// Write the document to an SRT file, creating parent directories if needed.
    ///
    /// Output is UTF-8 with a BOM prefix, matching what most players expect
    /// from translated SRT files.
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        self.write_inner(path).map_err(|source| SubtitleError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_inner(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        file.write_all("\u{feff}".as_bytes())?;
        for item in &self.items {
            write!(file, "{}", item)?;
        }

        Ok(())
    }

    /// Parse SRT format string into subtitle items
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleItem>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut items = Vec::new();

        // State variables for parsing
        let mut current_seq_num: Option<usize> = None;
        let mut current_start_time_ms: Option<u64> = None;
        let mut current_end_time_ms: Option<u64> = None;
        let mut current_lines: Vec<String> = Vec::new();
        let mut line_count = 0;

        let mut add_current_item =
            |seq_num: usize, start_ms: u64, end_ms: u64, raw_lines: &[String]| {
                match SubtitleItem::new_validated(seq_num, start_ms, end_ms, raw_lines) {
                    Ok(item) => items.push(item),
                    Err(e) => warn!("Skipping invalid subtitle entry {}: {}", seq_num, e),
                }
            };

        for line in content.lines() {
            line_count += 1;
            let trimmed = line.trim_end_matches('\r');

            // An empty line terminates the current entry
            if trimmed.trim().is_empty() {
                if let (Some(seq_num), Some(start_ms), Some(end_ms)) =
                    (current_seq_num, current_start_time_ms, current_end_time_ms)
                {
                    if !current_lines.is_empty() {
                        add_current_item(seq_num, start_ms, end_ms, &current_lines);

                        current_seq_num = None;
                        current_start_time_ms = None;
                        current_end_time_ms = None;
                        current_lines.clear();
                    }
                }
                continue;
            }

            // Try to parse as sequence number (only when starting a new entry)
            if current_seq_num.is_none() && current_lines.is_empty() {
                if let Ok(num) = trimmed.trim().parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            // Try to parse as timestamp
            if current_seq_num.is_some()
                && current_start_time_ms.is_none()
                && current_end_time_ms.is_none()
            {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    match (
                        Self::parse_timestamp_to_ms(&caps, 1),
                        Self::parse_timestamp_to_ms(&caps, 5),
                    ) {
                        (Ok(start_ms), Ok(end_ms)) => {
                            current_start_time_ms = Some(start_ms);
                            current_end_time_ms = Some(end_ms);
                            continue;
                        }
                        _ => {
                            warn!("Invalid timestamp format at line {}: {}", line_count, trimmed);
                        }
                    }
                }
            }

            // With sequence number and timestamps in hand, this is subtitle text
            if current_seq_num.is_some()
                && current_start_time_ms.is_some()
                && current_end_time_ms.is_some()
            {
                current_lines.push(trimmed.to_string());
            } else {
                warn!(
                    "Unexpected text at line {} before sequence number or timestamp: {}",
                    line_count, trimmed
                );
            }
        }

        // Add the last entry if there is one
        if let (Some(seq_num), Some(start_ms), Some(end_ms)) =
            (current_seq_num, current_start_time_ms, current_end_time_ms)
        {
            if !current_lines.is_empty() {
                add_current_item(seq_num, start_ms, end_ms, &current_lines);
            }
        }

        if items.is_empty() {
            warn!("No valid subtitle entries found in content");
            return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
        }

        // Sort by start time (stable, so ties keep document order) and renumber
        items.sort_by_key(|item| item.start_time_ms);
        for (i, item) in items.iter_mut().enumerate() {
            item.seq_num = i + 1;
        }

        Ok(items)
    }

    /// Parse captured timestamp components to milliseconds
    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
        let hours: u64 = caps.get(start_idx).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let minutes: u64 = caps.get(start_idx + 1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let seconds: u64 = caps.get(start_idx + 2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let millis: u64 = caps.get(start_idx + 3).map_or(0, |m| m.as_str().parse().unwrap_or(0));

        Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Document")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Items: {}", self.items.len())?;
        Ok(())
    }
}
