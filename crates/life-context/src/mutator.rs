/// Line-addressed section edits.
///
/// A section starts at its heading line (an H2/H3 heading or a bold key) and
/// ends before the next heading or `---` separator, leaving one trailing blank
/// line in place. Edits inside one partition are applied bottom-up so that line
/// indices still pending stay valid.
use regex::Regex;
use tracing::{debug, warn};

use crate::grammar;
use crate::model::HeadlineLocator;
use crate::normalize::{normalize_headline, same_name};

/// What to do at a resolved line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineOp<'a> {
    /// Add content after the section's last non-blank line.
    Append(&'a str),
    /// Rebuild the section body. `locator_text` is the raw headline the caller
    /// targeted; bold keys take their `**Key**:` prefix from it.
    Replace {
        content: &'a str,
        locator_text: &'a str,
    },
    /// Add pre-rendered lines at the end of a heading's whole extent,
    /// including the bold keys nested under it.
    Extend(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineEdit<'a> {
    pub edit_index: usize,
    /// Index within the partition the edit is applied to
    pub line_index: usize,
    pub op: LineOp<'a>,
}

/// Find the line a locator points at.
///
/// The locator's own line wins when it holds a heading with the same name.
/// Otherwise the nearest heading with that name is used, which absorbs line
/// numbers that went stale.
pub(crate) fn resolve_target(lines: &[String], locator: &HeadlineLocator) -> Option<usize> {
    let index = locator.line_index();
    let wanted = normalize_headline(&locator.text);

    if let Some(line) = lines.get(index) {
        if grammar::is_heading(line) && (wanted.is_empty() || same_name(&normalize_headline(line), &wanted)) {
            return Some(index);
        }
    }
    if wanted.is_empty() {
        return None;
    }

    let nearest = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| grammar::is_heading(line) && same_name(&normalize_headline(line), &wanted))
        .min_by_key(|(i, _)| i.abs_diff(index))
        .map(|(i, _)| i);

    if let Some(found) = nearest {
        debug!(
            requested_line = locator.line_number,
            resolved_line = found + 1,
            headline = %wanted,
            "locator line was stale, using nearest matching headline"
        );
    }
    nearest
}

/// Apply edits to one partition, highest line first.
pub(crate) fn apply_line_edits(lines: &mut Vec<String>, mut edits: Vec<LineEdit<'_>>) {
    edits.sort_by(|a, b| {
        b.line_index
            .cmp(&a.line_index)
            .then(a.edit_index.cmp(&b.edit_index))
    });

    for edit in edits {
        if edit.line_index >= lines.len() {
            warn!(
                edit_index = edit.edit_index,
                line_index = edit.line_index,
                "edit target beyond end of document, skipping"
            );
            continue;
        }
        match edit.op {
            LineOp::Append(content) => append(lines, edit.line_index, content),
            LineOp::Replace {
                content,
                locator_text,
            } => replace_section(lines, edit.line_index, content, locator_text),
            LineOp::Extend(block) => extend(lines, edit.line_index, block),
        }
    }
}

/// Exclusive end of the section headed at `index`.
pub(crate) fn section_end(lines: &[String], index: usize) -> usize {
    let boundary = (index + 1..lines.len())
        .find(|&i| grammar::is_heading(&lines[i]) || grammar::is_separator(&lines[i]));
    match boundary {
        Some(b) if b - 1 > index && grammar::is_blank(&lines[b - 1]) => b - 1,
        Some(b) => b,
        None => lines.len(),
    }
}

/// Exclusive end of everything owned by the H2/H3 heading at `index`.
pub(crate) fn extent_end(lines: &[String], index: usize) -> usize {
    (index + 1..lines.len())
        .find(|&i| {
            grammar::is_section_heading(&lines[i])
                || grammar::is_top_heading(&lines[i])
                || grammar::is_separator(&lines[i])
        })
        .unwrap_or(lines.len())
}

/// Position right after the last non-blank line in `(index, end)`.
fn insertion_point(lines: &[String], index: usize, end: usize) -> usize {
    (index + 1..end)
        .rev()
        .find(|&i| !grammar::is_blank(&lines[i]))
        .map_or(index + 1, |i| i + 1)
}

fn content_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content.lines().map(|l| l.trim_end().to_string())
}

fn append(lines: &mut Vec<String>, index: usize, content: &str) {
    let content = content.trim();
    if content.is_empty() {
        return;
    }

    let end = section_end(lines, index);
    let at = insertion_point(lines, index, end);

    let mut new_lines = Vec::new();
    if grammar::is_bare_bold_key(&lines[at - 1]) {
        new_lines.push(String::new());
    }
    new_lines.extend(content_lines(content));
    if lines.get(at).is_some_and(|l| !grammar::is_blank(l)) {
        new_lines.push(String::new());
    }
    lines.splice(at..at, new_lines);
}

fn replace_section(lines: &mut Vec<String>, index: usize, content: &str, locator_text: &str) {
    let end = section_end(lines, index);

    let replacement = if grammar::is_bold_key(&lines[index]) {
        let key = grammar::bold_key_prefix(locator_text)
            .or_else(|| grammar::bold_key_prefix(&lines[index]))
            .map(str::to_string)
            .unwrap_or_else(|| format!("**{}**:", normalize_headline(&lines[index])));
        let value = strip_repeated_key(content.trim(), &normalize_headline(&key));
        key_with_value(&key, value)
    } else {
        heading_with_body(lines, index, end, content)
    };

    lines.splice(index..end, replacement);
}

/// Heading (and subtitle) kept, body replaced. Empty content leaves the shell.
fn heading_with_body(lines: &[String], index: usize, end: usize, content: &str) -> Vec<String> {
    let mut replacement = vec![lines[index].clone()];
    if index + 1 < end && grammar::is_subtitle(&lines[index + 1]) {
        replacement.push(lines[index + 1].clone());
        replacement.push(String::new());
    }

    let content = content.trim();
    if !content.is_empty() {
        if replacement.last().is_some_and(|l| !grammar::is_blank(l)) {
            replacement.push(String::new());
        }
        replacement.extend(content_lines(content));
        if lines.get(end).is_some_and(|l| !grammar::is_blank(l)) {
            replacement.push(String::new());
        }
    }
    replacement
}

fn extend(lines: &mut Vec<String>, index: usize, block: Vec<String>) {
    if block.iter().all(|l| grammar::is_blank(l)) {
        return;
    }

    let end = extent_end(lines, index);
    let at = insertion_point(lines, index, end);

    let mut new_lines = vec![String::new()];
    new_lines.extend(block);
    if lines.get(at).is_some_and(|l| !grammar::is_blank(l)) {
        new_lines.push(String::new());
    }
    lines.splice(at..at, new_lines);
}

/// Render a bold key with its value.
///
/// Inline values share the key's line; bullet lists go on the lines below so
/// they render as a list under the key.
pub(crate) fn key_with_value(key: &str, value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        vec![key.to_string()]
    } else if grammar::is_bullet(value) {
        std::iter::once(key.to_string())
            .chain(content_lines(value))
            .collect()
    } else {
        content_lines(&format!("{key} {value}")).collect()
    }
}

/// Drop a leading `**Key**:` / `Key:` the model repeated inside the value.
fn strip_repeated_key<'a>(value: &'a str, key_name: &str) -> &'a str {
    if key_name.is_empty() {
        return value;
    }
    let pattern = format!(
        r"(?i)^\s*(?:\*\*\s*)?{}\s*(?:\*\*\s*:|:\s*\*\*|:)",
        regex::escape(key_name)
    );
    match Regex::new(&pattern) {
        Ok(re) => match re.find(value) {
            Some(m) => value[m.end()..].trim(),
            None => value,
        },
        Err(e) => {
            warn!(error = %e, key = key_name, "could not build key pattern");
            value
        }
    }
}
