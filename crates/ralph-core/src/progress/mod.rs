//! Progress log parsing.
//!
//! Recovers structured iteration records from `progress.txt`, the
//! append-only narrative the agent writes while it works:
//!
//! ```text
//! === ITERATION 1 ===
//! Timestamp: 2025-01-08T10:30:00Z
//! Story: story-1 - Add login form
//! Status: STARTED
//! [10:30:15] Creating component
//! Files Changed:
//! - src/Login.tsx (+42/-0)
//! Learnings:
//! - Use existing Button component
//! ---
//! ```
//!
//! Parsing happens in two stages:
//! 1. **Scanning** tags each line (marker, field, bullet, blank, terminator, text)
//! 2. **Assembly** splits tagged lines into blocks at markers and extracts each
//!    field independently from the block's tagged lines
//!
//! The parser never fails. Fields that can't be recovered fall back to empty
//! values, and blocks without a usable iteration number are dropped.

mod scanner;

use tracing::trace;

use ralph_models::{IterationRecord, IterationStatus};

use self::scanner::{scan, Field, LineKind, ScannedLine};

/// Statuses recognised after `Status:`, matched as case-insensitive prefixes.
const STATUSES: [IterationStatus; 3] = [
    IterationStatus::Started,
    IterationStatus::Completed,
    IterationStatus::Failed,
];

/// Parse `progress.txt` content into iteration records, in document order.
///
/// # Example
/// ```
/// use ralph_core::progress::parse_progress;
/// use ralph_models::IterationStatus;
///
/// let log = "=== ITERATION 1 ===\nStory: story-1 - Add login form\nStatus: completed\n";
/// let records = parse_progress(log);
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].story_id, "story-1");
/// assert_eq!(records[0].status, IterationStatus::Completed);
/// ```
pub fn parse_progress(text: &str) -> Vec<IterationRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let lines = scan(text);
    let records: Vec<IterationRecord> = split_blocks(&lines)
        .into_iter()
        .filter_map(assemble)
        .collect();

    trace!(lines = lines.len(), records = records.len(), "parsed progress log");
    records
}

/// Split tagged lines into blocks, each starting at a marker line.
///
/// Lines before the first marker belong to no block and are discarded.
fn split_blocks<'s, 'a>(lines: &'s [ScannedLine<'a>]) -> Vec<&'s [ScannedLine<'a>]> {
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_marker())
        .map(|(i, _)| i)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            &lines[start..end]
        })
        .collect()
}

/// Build a record from one block. The first line is always the marker.
fn assemble(block: &[ScannedLine<'_>]) -> Option<IterationRecord> {
    let iteration = match block.first().map(|line| line.kind) {
        Some(LineKind::Marker(Some(n))) => n,
        _ => {
            trace!("skipping block without a usable iteration number");
            return None;
        }
    };

    let mut record = IterationRecord::new(iteration);

    if let Some(timestamp) = extract_timestamp(block) {
        record.timestamp = timestamp.to_string();
    }
    if let Some((id, title)) = extract_story(block) {
        record.story_id = id.to_string();
        record.story_title = title.to_string();
    }
    if let Some(status) = extract_status(block) {
        record.status = status;
    }
    record.log_lines = block
        .iter()
        .filter_map(|line| line.log_line())
        .map(str::to_string)
        .collect();
    record.files_changed = extract_files_changed(block);
    record.learnings = extract_learnings(block);

    Some(record)
}

/// Values of every line carrying `field`, in order.
fn field_values<'s, 'a: 's>(
    block: &'s [ScannedLine<'a>],
    field: Field,
) -> impl Iterator<Item = &'a str> + 's {
    block.iter().filter_map(move |line| line.field_value(field))
}

/// First non-empty `Timestamp:` value, trimmed.
fn extract_timestamp<'a>(block: &[ScannedLine<'a>]) -> Option<&'a str> {
    field_values(block, Field::Timestamp)
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// First well-formed `Story: <id> - <title>` line.
fn extract_story<'a>(block: &[ScannedLine<'a>]) -> Option<(&'a str, &'a str)> {
    field_values(block, Field::Story).find_map(split_story)
}

/// Split a story value on the first ` - `.
///
/// The id must be a single non-empty word and the title non-empty.
fn split_story(value: &str) -> Option<(&str, &str)> {
    let (id, title) = value.trim().split_once(" - ")?;
    let (id, title) = (id.trim(), title.trim());

    if id.is_empty() || id.contains(char::is_whitespace) || title.is_empty() {
        return None;
    }
    Some((id, title))
}

/// First `Status:` label, anywhere in a line, naming a known status.
fn extract_status(block: &[ScannedLine<'_>]) -> Option<IterationStatus> {
    field_values(block, Field::Status).find_map(|value| {
        let value = value.trim_start().to_ascii_uppercase();
        STATUSES
            .into_iter()
            .find(|status| value.starts_with(status.as_str()))
    })
}

/// Lines belonging to the first section opened by `field`.
///
/// The section holds the text after the label (if any) followed by the lines
/// up to the first line for which `ends` returns true. `skip_leading_blanks`
/// lets blank lines directly after the label through before content starts.
fn section<'s, 'a>(
    block: &'s [ScannedLine<'a>],
    field: Field,
    skip_leading_blanks: bool,
    ends: impl Fn(&LineKind<'a>) -> bool,
) -> Vec<LineKind<'a>> {
    let Some(header) = block
        .iter()
        .position(|line| matches!(line.kind, LineKind::Field(f, _) if f == field))
    else {
        return Vec::new();
    };

    let mut body = Vec::new();

    if let LineKind::Field(_, inline) = block[header].kind {
        if !inline.trim().is_empty() {
            body.push(scanner::classify(inline));
        }
    }

    for line in &block[header + 1..] {
        if skip_leading_blanks && body.is_empty() && line.kind == LineKind::Blank {
            continue;
        }
        if ends(&line.kind) {
            break;
        }
        body.push(line.kind);
    }

    body
}

/// Bullets of the "Files Changed:" section with annotations removed.
///
/// The section ends at a blank line, a "Learnings:" line, a `---` line, or
/// the end of the block.
fn extract_files_changed(block: &[ScannedLine<'_>]) -> Vec<String> {
    section(block, Field::FilesChanged, true, |kind| {
        matches!(
            kind,
            LineKind::Blank | LineKind::Terminator | LineKind::Field(Field::Learnings, _)
        )
    })
    .into_iter()
    .filter_map(|kind| match kind {
        LineKind::Bullet(body) => Some(strip_annotation(body)),
        _ => None,
    })
    .filter(|path| !path.is_empty())
    .map(str::to_string)
    .collect()
}

/// Bullets of the "Learnings:" section, up to a `---` line or block end.
fn extract_learnings(block: &[ScannedLine<'_>]) -> Vec<String> {
    section(block, Field::Learnings, false, |kind| {
        matches!(kind, LineKind::Terminator)
    })
    .into_iter()
    .filter_map(|kind| match kind {
        LineKind::Bullet(body) if !body.is_empty() => Some(body.to_string()),
        _ => None,
    })
    .collect()
}

/// Cut a file entry at the first whitespace-preceded `(`.
///
/// `src/Login.tsx (+42/-0)` becomes `src/Login.tsx`. A path that itself
/// contains ` (` is cut as well.
fn strip_annotation(entry: &str) -> &str {
    entry
        .match_indices('(')
        .find(|(i, _)| entry[..*i].ends_with(char::is_whitespace))
        .map_or(entry, |(i, _)| &entry[..i])
        .trim()
}
