/// Headline normalization: reduce a decorated heading to its display name.
///
/// `"## ✅ Achievable Next Steps|12"` → `"Achievable Next Steps"`,
/// `"**Current Situation**: busy"` → `"Current Situation"`.
use once_cell::sync::Lazy;
use regex::Regex;

/// Character class covering the emoji blocks that appear in headings:
/// pictographs, misc symbols and dingbats, misc technical, arrows/stars
/// supplement, regional indicators, variation selectors, ZWJ, keycap and tags.
pub(crate) const EMOJI_CLASS: &str = r"[\x{1F000}-\x{1FAFF}\x{2600}-\x{27BF}\x{2300}-\x{23FF}\x{2B00}-\x{2BFF}\x{FE00}-\x{FE0F}\x{200D}\x{20E3}\x{E0020}-\x{E007F}]";

static LOCATOR_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\d+\s*$").expect("valid regex"));
static LEADING_HASHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s*").expect("valid regex"));
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EMOJI_CLASS).expect("valid regex"));
static BOLD_KEY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*(.+?)\*\*").expect("valid regex"));

/// Canonical display name of a raw heading.
///
/// Strips a `|<line>` locator suffix, the leading `#` run, emoji, and the bold
/// markers of a `**Key**: value` line (dropping the value). Empty input yields
/// an empty string. The result is a fixed point: normalizing it again changes
/// nothing.
pub fn normalize_headline(raw: &str) -> String {
    let mut current = normalize_once(raw);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() {
        return String::new();
    }

    let text = LOCATOR_SUFFIX_RE.replace(text, "");
    let text = LEADING_HASHES_RE.replace(text.trim(), "");
    let text = EMOJI_RE.replace_all(&text, "");
    let text = text.trim();

    match BOLD_KEY_NAME_RE.captures(text) {
        Some(caps) => caps[1].trim().trim_end_matches(':').trim().to_string(),
        None => text.to_string(),
    }
}

/// Case-insensitive equality of two already-normalized names.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_heading_markers_and_emoji() {
        assert_eq!(normalize_headline("## ✅ Achievable Next Steps"), "Achievable Next Steps");
        assert_eq!(normalize_headline("### 💼 Career & Work"), "Career & Work");
        assert_eq!(normalize_headline("### 🛠️ Side Projects"), "Side Projects");
        assert_eq!(
            normalize_headline("### 👨‍👩‍👧‍👦 Relationships & Social Life"),
            "Relationships & Social Life"
        );
    }

    #[test]
    fn strips_line_locator_suffix() {
        assert_eq!(normalize_headline("## 👤 Core Profile|3"), "Core Profile");
        assert_eq!(normalize_headline("Achievable Next Steps|7"), "Achievable Next Steps");
    }

    #[test]
    fn extracts_bold_key_without_value() {
        assert_eq!(normalize_headline("**Current Situation**: busy at work"), "Current Situation");
        assert_eq!(normalize_headline("**I am...**: A software developer|4"), "I am...");
        assert_eq!(normalize_headline("**Goals:**"), "Goals");
    }

    #[test]
    fn empty_and_plain_input() {
        assert_eq!(normalize_headline(""), "");
        assert_eq!(normalize_headline("   "), "");
        assert_eq!(normalize_headline("Plain name"), "Plain name");
    }

    #[test]
    fn keeps_german_text_intact() {
        assert_eq!(
            normalize_headline("## ✅ Realisierbare nächste Schritte"),
            "Realisierbare nächste Schritte"
        );
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "## ✅ # nested hashes",
            "Goals|1|2",
            "**✅ **Key**:**: value",
            "### 🎨 **Bold** inside",
            "  ##   ",
            "| 12",
            "**Ziele**:",
            "😀😀",
        ];
        for sample in samples {
            let once = normalize_headline(sample);
            assert_eq!(normalize_headline(&once), once, "not idempotent for {sample:?}");
        }
    }
}
