/// The pinned "Next Steps" section.
///
/// Once a document has this section, its heading and italic subtitle survive
/// every edit; only the task lines below them are appended to or replaced.
/// The matcher is a value (`PinnedSection`) rather than a hardcoded pattern, so
/// hosts can pin a differently named section or add languages. The default is
/// the bilingual "Achievable Next Steps" / "Realisierbare nächste Schritte".
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ContextError;
use crate::grammar;
use crate::model::{DocumentLanguage, UpdateKind};
use crate::normalize::same_name;

pub const DEFAULT_MARKER: &str = "✅";

static GERMAN_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*#\s+(?:Mein\s+)?Lebenskontext\b").expect("valid regex"));

impl DocumentLanguage {
    /// German when the document carries a `# Mein Lebenskontext` or
    /// `# Lebenskontext` title, English otherwise.
    pub fn detect(document: &str) -> Self {
        if GERMAN_TITLE_RE.is_match(document) {
            DocumentLanguage::German
        } else {
            DocumentLanguage::English
        }
    }
}

/// One language rendition of a pinned section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SectionVariant {
    pub language: DocumentLanguage,
    /// Heading text without `##` and marker, e.g. "Achievable Next Steps"
    pub title: String,
    /// Italic line under the heading, without the surrounding `*`
    pub subtitle: String,
}

/// Serializable description of a pinned section, as loaded from host config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PinnedSectionConfig {
    #[serde(default = "default_marker")]
    pub marker: String,
    pub variants: Vec<SectionVariant>,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

/// Matcher and renderer for the pinned section.
#[derive(Debug, Clone)]
pub struct PinnedSection {
    marker: String,
    variants: Vec<SectionVariant>,
    heading_re: Regex,
}

impl PinnedSection {
    pub fn new(marker: impl Into<String>, variants: Vec<SectionVariant>) -> Result<Self, ContextError> {
        if variants.is_empty() {
            return Err(ContextError::EmptyPinnedSection);
        }
        if variants.iter().any(|v| v.title.trim().is_empty()) {
            return Err(ContextError::EmptyPinnedTitle);
        }

        let marker = marker.into();
        let titles: Vec<String> = variants
            .iter()
            .map(|v| regex::escape(v.title.trim()))
            .collect();
        let heading_re = Regex::new(&format!(
            r"^\s*##\s*{}\s*(?:{})",
            regex::escape(marker.trim()),
            titles.join("|")
        ))?;

        Ok(Self {
            marker,
            variants,
            heading_re,
        })
    }

    pub fn variants(&self) -> &[SectionVariant] {
        &self.variants
    }

    /// Whether `line` is the pinned section's heading in any language.
    pub fn is_heading(&self, line: &str) -> bool {
        self.heading_re.is_match(line)
    }

    /// Whether a normalized headline names the pinned section.
    pub fn matches_title(&self, normalized: &str) -> bool {
        !normalized.is_empty() && self.variants.iter().any(|v| same_name(v.title.trim(), normalized))
    }

    /// The variant for `language`, falling back to the first configured one.
    pub fn variant_for(&self, language: DocumentLanguage) -> &SectionVariant {
        self.variants
            .iter()
            .find(|v| v.language == language)
            .unwrap_or(&self.variants[0])
    }

    /// Heading and subtitle lines for a section that does not exist yet.
    pub fn shell(&self, language: DocumentLanguage) -> Vec<String> {
        let variant = self.variant_for(language);
        vec![
            format!("## {} {}", self.marker.trim(), variant.title.trim()),
            format!("*{}*", variant.subtitle.trim()),
        ]
    }

    /// Split `lines` into the part before the pinned section, the section
    /// itself, and whatever follows it.
    ///
    /// The last matching heading wins. The section owns a `---` separator that
    /// precedes it (across blank lines) and runs until the next `---` or H1/H2
    /// heading. Lines after that point only form a tail when they hold more
    /// than blank lines and separators.
    pub fn isolate(&self, mut lines: Vec<String>) -> IsolatedDocument {
        let Some(heading) = lines.iter().rposition(|l| self.is_heading(l)) else {
            let tail_offset = lines.len();
            return IsolatedDocument {
                head: lines,
                next_steps: Vec::new(),
                tail: Vec::new(),
                tail_offset,
            };
        };

        let mut probe = heading;
        while probe > 0 && grammar::is_blank(&lines[probe - 1]) {
            probe -= 1;
        }
        let start = if probe > 0 && grammar::is_separator(&lines[probe - 1]) {
            probe - 1
        } else {
            heading
        };

        let end = (heading + 1..lines.len())
            .find(|&i| grammar::is_separator(&lines[i]) || grammar::is_top_heading(&lines[i]))
            .unwrap_or(lines.len());
        let has_tail = lines[end..]
            .iter()
            .any(|l| !grammar::is_blank(l) && !grammar::is_separator(l));

        let (tail, tail_offset) = if has_tail {
            (lines.split_off(end), end)
        } else {
            (Vec::new(), lines.len())
        };
        let next_steps = lines.split_off(start);

        debug!(
            heading_line = heading + 1,
            start_line = start + 1,
            tail_lines = tail.len(),
            "isolated pinned section"
        );

        IsolatedDocument {
            head: lines,
            next_steps,
            tail,
            tail_offset,
        }
    }

    /// Apply edits to the pinned partition, synthesizing the section first when
    /// it is missing. Edits apply in the order given.
    pub fn apply_edits(
        &self,
        section: Vec<String>,
        edits: &[NextStepsEdit<'_>],
        language: DocumentLanguage,
    ) -> Vec<String> {
        if edits.is_empty() {
            return section;
        }

        let mut lines = trim_decoration(section);
        if lines.is_empty() {
            debug!(?language, "synthesizing missing pinned section");
            lines = self.shell(language);
        }

        for edit in edits {
            match edit.kind {
                UpdateKind::ReplaceSection => replace_tasks(&mut lines, edit.content),
                UpdateKind::Append | UpdateKind::CreateHeadline => append_tasks(&mut lines, edit.content),
            }
        }
        lines
    }
}

impl Default for PinnedSection {
    fn default() -> Self {
        Self::new(
            DEFAULT_MARKER,
            vec![
                SectionVariant {
                    language: DocumentLanguage::English,
                    title: "Achievable Next Steps".to_string(),
                    subtitle: "Specific, actionable tasks I have committed to.".to_string(),
                },
                SectionVariant {
                    language: DocumentLanguage::German,
                    title: "Realisierbare nächste Schritte".to_string(),
                    subtitle: "Spezifische, umsetzbare Aufgaben, zu denen ich mich verpflichtet habe."
                        .to_string(),
                },
            ],
        )
        .expect("default pinned section is valid")
    }
}

impl TryFrom<PinnedSectionConfig> for PinnedSection {
    type Error = ContextError;

    fn try_from(config: PinnedSectionConfig) -> Result<Self, Self::Error> {
        Self::new(config.marker, config.variants)
    }
}

/// A document split around its pinned section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsolatedDocument {
    /// Lines before the section; indices equal original indices
    pub head: Vec<String>,
    /// The section, including the `---` separator that introduced it
    pub next_steps: Vec<String>,
    /// Lines after the section
    pub tail: Vec<String>,
    /// Original index of `tail[0]`
    pub tail_offset: usize,
}

impl IsolatedDocument {
    /// Whether the original line `index` falls inside the pinned section.
    pub fn in_pinned_span(&self, index: usize) -> bool {
        index >= self.head.len() && index < self.tail_offset
    }
}

/// An edit routed to the pinned section.
#[derive(Debug, Clone, Copy)]
pub struct NextStepsEdit<'a> {
    pub kind: UpdateKind,
    pub content: &'a str,
}

/// Drop leading and trailing separators and blank lines.
pub(crate) fn trim_decoration(mut lines: Vec<String>) -> Vec<String> {
    let is_decoration = |l: &String| grammar::is_blank(l) || grammar::is_separator(l);
    while lines.last().is_some_and(is_decoration) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| is_decoration(*l)).count();
    lines.drain(..leading);
    lines
}

/// Keep heading and subtitle, rebuild the tasks from `content`.
fn replace_tasks(lines: &mut Vec<String>, content: &str) {
    let keep = if lines.get(1).is_some_and(|l| grammar::is_subtitle(l)) {
        2
    } else {
        1
    };
    lines.truncate(keep);

    let tasks: Vec<String> = content
        .trim()
        .lines()
        .filter(|l| !grammar::is_blank(l))
        .map(|l| l.trim_end().to_string())
        .collect();
    if !tasks.is_empty() {
        lines.push(String::new());
        lines.extend(tasks);
    }
}

fn append_tasks(lines: &mut Vec<String>, content: &str) {
    let content = content.trim();
    if content.is_empty() {
        return;
    }

    while lines.last().is_some_and(|l| grammar::is_blank(l)) {
        lines.pop();
    }

    let new_lines: Vec<&str> = content.lines().map(str::trim_end).collect();
    let continues_list = lines.last().is_some_and(|l| grammar::is_bullet(l))
        && new_lines.first().is_some_and(|l| grammar::is_bullet(l));
    if lines.last().is_some_and(|l| !grammar::is_blank(l)) && !continues_list {
        lines.push(String::new());
    }
    lines.extend(new_lines.into_iter().map(str::to_string));
}
