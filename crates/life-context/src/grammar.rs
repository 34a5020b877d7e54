/// Line grammar for Life Context documents.
///
/// The documents are line-oriented markdown with a small fixed structure:
/// - Parent headings: `## Name` / `### Name`
/// - Child keys: `**Key**: value`
/// - Section separators: `---`
/// - Italic subtitles directly under a heading: `*Some description.*`
///
/// No markdown parser is involved; every classifier is a line-anchored regex.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::HeadingKind;

static SECTION_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#{2,3}\s.+").expect("valid regex"));
static SUBSECTION_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*###\s").expect("valid regex"));
static BOLD_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\*\*.*?\*\*:").expect("valid regex"));
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{3,}\s*$").expect("valid regex"));
static TOP_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#{1,2}\s").expect("valid regex"));
static SUBTITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\*[^*\s].*\*\s*$").expect("valid regex"));
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[*-]\s").expect("valid regex"));

/// Split a document into lines on `\n`, dropping a trailing `\r` from each.
///
/// The scanner and the merge engine both use this, so 1-based line numbers
/// handed out by one are valid for the other.
pub fn split_lines(document: &str) -> Vec<&str> {
    document
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// `##` or `###` heading.
pub fn is_section_heading(line: &str) -> bool {
    SECTION_HEADING_RE.is_match(line)
}

/// `**Key**:` line, with or without an inline value.
pub fn is_bold_key(line: &str) -> bool {
    BOLD_KEY_RE.is_match(line)
}

/// Anything a user can target: an H2/H3 heading or a bold key.
pub fn is_heading(line: &str) -> bool {
    is_section_heading(line) || is_bold_key(line)
}

pub fn classify(line: &str) -> Option<HeadingKind> {
    if is_section_heading(line) {
        if SUBSECTION_HEADING_RE.is_match(line) {
            Some(HeadingKind::Subsection)
        } else {
            Some(HeadingKind::Section)
        }
    } else if is_bold_key(line) {
        Some(HeadingKind::Key)
    } else {
        None
    }
}

pub fn is_separator(line: &str) -> bool {
    SEPARATOR_RE.is_match(line)
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// `#` or `##` heading; ends a pinned section.
pub fn is_top_heading(line: &str) -> bool {
    TOP_HEADING_RE.is_match(line)
}

/// Italic descriptive line (`*...*`), which is neither a bullet nor bold.
pub fn is_subtitle(line: &str) -> bool {
    SUBTITLE_RE.is_match(line)
}

pub fn is_bullet(line: &str) -> bool {
    BULLET_RE.is_match(line)
}

/// The `**Key**:` prefix of a bold-key line.
pub fn bold_key_prefix(line: &str) -> Option<&str> {
    BOLD_KEY_RE.find(line).map(|m| m.as_str().trim_start())
}

/// Whether a bold-key line carries nothing after its `**Key**:` prefix.
pub fn is_bare_bold_key(line: &str) -> bool {
    BOLD_KEY_RE
        .find(line)
        .is_some_and(|m| line[m.end()..].trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_heading_levels() {
        assert_eq!(classify("## 👤 Core Profile"), Some(HeadingKind::Section));
        assert_eq!(classify("  ### 💼 Career & Work"), Some(HeadingKind::Subsection));
        assert_eq!(classify("**Goals**: ship it"), Some(HeadingKind::Key));
        assert_eq!(classify("# My Life Context"), None);
        assert_eq!(classify("#### Too deep"), None);
        assert_eq!(classify("##NoSpace"), None);
        assert_eq!(classify("* **Goals**: in a bullet"), None);
        assert_eq!(classify("Plain text"), None);
    }

    #[test]
    fn separates_subtitles_from_bullets_and_bold() {
        assert!(is_subtitle("*Specific, actionable tasks I have committed to.*"));
        assert!(!is_subtitle("* Talk to my manager"));
        assert!(!is_subtitle("**Goals**:"));
        assert!(is_bullet("* Talk to my manager"));
        assert!(is_bullet("  - nested"));
        assert!(!is_bullet("*emphasis*"));
    }

    #[test]
    fn recognizes_separators_and_top_headings() {
        assert!(is_separator("---"));
        assert!(is_separator("  -----  "));
        assert!(!is_separator("--"));
        assert!(!is_separator("- item"));
        assert!(is_top_heading("# Title"));
        assert!(is_top_heading("## Section"));
        assert!(!is_top_heading("### Sub"));
    }

    #[test]
    fn extracts_bold_key_prefix() {
        assert_eq!(
            bold_key_prefix("  **Current Situation**: busy"),
            Some("**Current Situation**:")
        );
        assert_eq!(bold_key_prefix("## Heading"), None);
        assert!(is_bare_bold_key("**Routines & Systems**:   "));
        assert!(!is_bare_bold_key("**Routines & Systems**: gym"));
    }

    #[test]
    fn split_lines_drops_carriage_returns() {
        assert_eq!(split_lines("a\r\nb\n\nc"), vec!["a", "b", "", "c"]);
        assert_eq!(split_lines(""), vec![""]);
    }
}
