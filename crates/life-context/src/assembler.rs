/// Recombine the partitions of an edited document.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::next_steps::trim_decoration;

static EXCESS_NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

const PINNED_SEPARATOR: &str = "\n\n---\n\n";

/// Edited partitions, ready to be joined.
#[derive(Debug, Clone, Default)]
pub(crate) struct Partitions {
    pub head: Vec<String>,
    pub next_steps: Vec<String>,
    pub tail: Vec<String>,
    /// Rendered `create_headline` blocks
    pub created: Vec<String>,
}

/// Join the partitions into the final document.
///
/// New blocks go to the end of the main text (after the tail when there is
/// one). The pinned section follows the head behind a `---` separator. Runs of
/// blank lines collapse to one, and the result ends in exactly one newline
/// unless it is empty.
pub(crate) fn assemble(parts: Partitions) -> String {
    let mut head = parts.head.join("\n").trim_end().to_string();
    let mut tail = parts.tail.join("\n").trim().to_string();

    let created = parts.created.join("\n\n");
    if !created.trim().is_empty() {
        if tail.is_empty() {
            head = join_with_blank_line(head, &created);
        } else {
            tail = join_with_blank_line(tail, &created);
        }
    }

    let pinned = trim_decoration(parts.next_steps).join("\n");
    let mut document = head;
    if !pinned.trim().is_empty() {
        document = if document.trim().is_empty() {
            pinned
        } else {
            format!("{document}{PINNED_SEPARATOR}{pinned}")
        };
    }
    if !tail.is_empty() {
        document = join_with_blank_line(document, &tail);
    }

    finish(&document)
}

fn join_with_blank_line(text: String, addition: &str) -> String {
    let text = text.trim_end();
    if text.is_empty() {
        addition.to_string()
    } else {
        format!("{text}\n\n{addition}")
    }
}

/// Collapse blank-line runs and apply the trailing-newline contract.
pub(crate) fn finish(document: &str) -> String {
    let collapsed = EXCESS_NEWLINES_RE.replace_all(document, "\n\n");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
