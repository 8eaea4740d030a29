//! Line scanner for `progress.txt`.
//!
//! Tags every line with a category in one pass. Block assembly in the parent
//! module groups sections by tag alone. Timestamped log lines and the
//! `Timestamp:`, `Story:` and `Status:` labels are also looked up inside any
//! kind of line, without changing its tag.

use regex::Regex;
use std::sync::LazyLock;

/// Block header: `=== ITERATION <n> ===`.
static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^=== ITERATION (\d+) ===").expect("Invalid marker regex"));

/// Timestamped log line: `[HH:MM:SS] ...` through end of line.
static LOG_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d{2}:\d{2}:\d{2}\].*").expect("Invalid log line regex"));

/// Labelled field lines recognised at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Timestamp,
    Story,
    Status,
    FilesChanged,
    Learnings,
}

/// Case-sensitive field labels, checked in order.
const FIELD_LABELS: [(&str, Field); 4] = [
    ("Timestamp:", Field::Timestamp),
    ("Story:", Field::Story),
    ("Files Changed:", Field::FilesChanged),
    ("Learnings:", Field::Learnings),
];

/// Status is the only label matched case-insensitively.
const STATUS_LABEL: &str = "status:";

/// Labels whose value is found wherever they occur in a line.
const INLINE_FIELDS: [Field; 3] = [Field::Timestamp, Field::Story, Field::Status];

/// Category of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// Block header. `None` when the number does not fit in a `u32`.
    Marker(Option<u32>),
    /// A labelled field with the text after the colon (untrimmed).
    Field(Field, &'a str),
    /// A `-` bullet with the marker and surrounding whitespace removed.
    Bullet(&'a str),
    /// A `---` separator closing an iteration's narrative.
    Terminator,
    /// Empty or whitespace-only.
    Blank,
    /// Anything else.
    Text,
}

/// A tagged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScannedLine<'a> {
    pub raw: &'a str,
    pub kind: LineKind<'a>,
}

impl<'a> ScannedLine<'a> {
    /// The `[HH:MM:SS] ...` portion of the line, if any.
    pub fn log_line(&self) -> Option<&'a str> {
        LOG_LINE_REGEX.find(self.raw).map(|m| m.as_str())
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, LineKind::Marker(_))
    }

    /// Text after `field`'s label on this line (untrimmed).
    ///
    /// A line tagged with `field` yields its tagged value. Timestamp, story and
    /// status labels are otherwise searched for anywhere in the raw line, so
    /// `[10:40:00] Status: COMPLETED` still carries a status.
    pub fn field_value(&self, field: Field) -> Option<&'a str> {
        if let LineKind::Field(tagged, value) = self.kind {
            if tagged == field {
                return Some(value);
            }
        }
        if !INLINE_FIELDS.contains(&field) {
            return None;
        }
        find_label(self.raw, field)
    }
}

/// Text after the first occurrence of `field`'s label in `raw`.
fn find_label(raw: &str, field: Field) -> Option<&str> {
    if field == Field::Status {
        // ASCII lowercasing keeps byte offsets, so `at` indexes `raw` too.
        let at = raw.to_ascii_lowercase().find(STATUS_LABEL)?;
        return Some(&raw[at + STATUS_LABEL.len()..]);
    }

    let (label, _) = FIELD_LABELS.iter().find(|(_, f)| *f == field)?;
    raw.find(label).map(|at| &raw[at + label.len()..])
}

/// Tag every line of `text`.
pub(crate) fn scan(text: &str) -> Vec<ScannedLine<'_>> {
    text.lines()
        .map(|raw| ScannedLine {
            raw,
            kind: classify(raw),
        })
        .collect()
}

/// Classify a single line.
pub(crate) fn classify(raw: &str) -> LineKind<'_> {
    let line = raw.trim();

    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some(cap) = MARKER_REGEX.captures(line) {
        let number = cap.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        return LineKind::Marker(number);
    }

    if line.len() >= 3 && line.chars().all(|c| c == '-') {
        return LineKind::Terminator;
    }

    for (label, field) in FIELD_LABELS {
        if let Some(rest) = line.strip_prefix(label) {
            return LineKind::Field(field, rest);
        }
    }

    if line
        .get(..STATUS_LABEL.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(STATUS_LABEL))
    {
        return LineKind::Field(Field::Status, &line[STATUS_LABEL.len()..]);
    }

    if let Some(body) = line.strip_prefix('-') {
        return LineKind::Bullet(body.trim());
    }

    LineKind::Text
}
