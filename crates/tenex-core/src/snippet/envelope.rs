//! Metadata/code envelope used to round-trip a snippet through a text editor.
//!
//! ```text
//! ---METADATA---
//! # comment lines are ignored
//!
//! Title: My Title
//! Description: My description goes here...
//! Language: javascript
//! Tags: tag1, tag2, tag3
//! ---CODE---
//! <code, verbatim>
//! ```
//!
//! The metadata section is read by one line-oriented state machine. `Title:`,
//! `Language:` and `Tags:` are single-line fields anchored at column 0 where
//! the first non-empty occurrence wins. `Description:` opens a capture that
//! runs until a line whose trimmed form starts with `Language:` or `Tags:`.

use serde::Serialize;
use thiserror::Error;

pub const METADATA_MARKER: &str = "---METADATA---";
pub const CODE_MARKER: &str = "---CODE---";

const TITLE_FIELD: &str = "Title:";
const DESCRIPTION_FIELD: &str = "Description:";
const LANGUAGE_FIELD: &str = "Language:";
const TAGS_FIELD: &str = "Tags:";

/// Number of tags an edited envelope must carry before its tag list replaces
/// the original one.
pub const MIN_TAGS: usize = 5;

/// Minimum description length requested by the template header.
pub const MIN_DESCRIPTION_CHARS: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Invalid file format: metadata section not found")]
    MissingMarkers,
}

/// Structured fields from the metadata section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub language: String,
    pub tags: Vec<String>,
}

/// A parsed envelope: metadata plus the raw code body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub metadata: Metadata,
    pub code: String,
}

/// Parse an envelope. Fails when the two markers are not present in order.
pub fn parse_envelope(file_content: &str) -> Result<Envelope, FormatError> {
    let (metadata_section, code_section) = split_sections(file_content)?;

    let code = code_section
        .strip_prefix("\r\n")
        .or_else(|| code_section.strip_prefix('\n'))
        .unwrap_or(code_section);

    Ok(Envelope {
        metadata: parse_metadata_section(metadata_section),
        code: code.to_string(),
    })
}

/// Render the editable template for a snippet.
pub fn serialize_envelope(
    title: &str,
    description: &str,
    language: &str,
    tags: &[String],
    code: &str,
) -> String {
    format!(
        "{METADATA_MARKER}
# Edit the metadata below. Keep the format exactly as shown (Title:, Description:, Language:, Tags:)
# Description needs to be at least {MIN_DESCRIPTION_CHARS} characters and Tags need at least {MIN_TAGS} entries
# Don't remove the {METADATA_MARKER} and {CODE_MARKER} markers!

{TITLE_FIELD} {title}
{DESCRIPTION_FIELD} {description}
{LANGUAGE_FIELD} {language}
{TAGS_FIELD} {tags}
{CODE_MARKER}
{code}",
        tags = tags.join(", "),
    )
}

/// Locate the marker lines and return `(metadata, code)` slices.
///
/// The metadata marker must start a line; the code marker must be a whole
/// line (a trailing `\r` is tolerated). The code slice begins right after the
/// code marker text, so it still carries the marker's line terminator.
fn split_sections(content: &str) -> Result<(&str, &str), FormatError> {
    let mut offset = 0;
    let mut metadata_start = None;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let bare = line.trim_end_matches('\n');

        match metadata_start {
            None => {
                if bare.starts_with(METADATA_MARKER) {
                    metadata_start = Some(line_start + METADATA_MARKER.len());
                }
            }
            Some(start) => {
                if bare.trim_end_matches('\r') == CODE_MARKER {
                    let code_start = line_start + CODE_MARKER.len();
                    return Ok((&content[start..line_start], &content[code_start..]));
                }
            }
        }
    }

    Err(FormatError::MissingMarkers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Fields,
    Description,
}

fn parse_metadata_section(section: &str) -> Metadata {
    let mut title: Option<String> = None;
    let mut language: Option<String> = None;
    let mut tags: Option<Vec<String>> = None;
    let mut description_lines: Vec<&str> = Vec::new();
    let mut state = ScanState::Fields;

    for line in section.split('\n') {
        if title.is_none() {
            title = field_value(line, TITLE_FIELD).map(str::to_string);
        }
        if language.is_none() {
            language = field_value(line, LANGUAGE_FIELD).map(str::to_string);
        }
        if tags.is_none() {
            tags = field_value(line, TAGS_FIELD).map(split_tags);
        }

        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(DESCRIPTION_FIELD) {
            state = ScanState::Description;
            let inline = rest.trim();
            if !inline.is_empty() {
                description_lines.push(inline);
            }
        } else if trimmed.starts_with(LANGUAGE_FIELD) || trimmed.starts_with(TAGS_FIELD) {
            state = ScanState::Fields;
        } else if state == ScanState::Description {
            description_lines.push(line);
        }
    }

    Metadata {
        title: title.unwrap_or_default(),
        description: description_lines.join("\n").trim().to_string(),
        language: language.unwrap_or_default(),
        tags: tags.unwrap_or_default(),
    }
}

/// Value of a column-0 `Name:` field, trimmed. Empty values do not count.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let value = line.strip_prefix(field)?.trim();
    (!value.is_empty()).then_some(value)
}

/// Comma split, trim each entry, drop empties. Order is kept, duplicates too.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
