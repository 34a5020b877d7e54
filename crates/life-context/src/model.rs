use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ContextError;

/// The three edit operations an analysis step can propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Add content at the end of an existing section.
    Append,
    /// Replace the body of an existing section, keeping its heading.
    ReplaceSection,
    /// Introduce new structure addressed by a hierarchical key.
    CreateHeadline,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateKind::Append => "append",
            UpdateKind::ReplaceSection => "replace_section",
            UpdateKind::CreateHeadline => "create_headline",
        };
        f.write_str(name)
    }
}

/// One candidate edit produced by the external analysis step.
///
/// The input is untrusted: `null` or missing text fields deserialize to empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProposedUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    /// Headline the model suggested, e.g. "Achievable Next Steps" or "Career > Goals"
    #[serde(default, deserialize_with = "nullable_string")]
    #[schemars(with = "Option<String>")]
    pub headline: String,
    /// Markdown body, possibly multi-line
    #[serde(default, deserialize_with = "nullable_string")]
    #[schemars(with = "Option<String>")]
    pub content: String,
}

impl ProposedUpdate {
    pub fn new(kind: UpdateKind, headline: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            headline: headline.into(),
            content: content.into(),
        }
    }
}

/// The caller's resolved choice of where a [`ProposedUpdate`] lands.
///
/// `target_headline` is a `"<text>|<line>"` locator for `append` and
/// `replace_section`, and a hierarchical key (`"Parent > Child"`) or bare name
/// for `create_headline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    #[serde(default, deserialize_with = "nullable_string")]
    #[schemars(with = "Option<String>")]
    pub target_headline: String,
}

impl AppliedUpdate {
    pub fn new(kind: UpdateKind, target_headline: impl Into<String>) -> Self {
        Self {
            kind,
            target_headline: target_headline.into(),
        }
    }
}

/// Position of a headline inside one specific version of a document.
///
/// Two headlines with the same text are told apart by their 1-based line number.
/// The wire form is `"<text>|<line>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HeadlineLocator {
    /// Raw heading line as it appeared in the document
    pub text: String,
    /// 1-based line number
    pub line_number: usize,
}

impl HeadlineLocator {
    pub fn new(text: impl Into<String>, line_number: usize) -> Self {
        Self {
            text: text.into(),
            line_number,
        }
    }

    /// 0-based index into the document's line array.
    pub fn line_index(&self) -> usize {
        self.line_number.saturating_sub(1)
    }
}

impl fmt::Display for HeadlineLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.text, self.line_number)
    }
}

impl FromStr for HeadlineLocator {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (text, line) = s
            .trim_end()
            .rsplit_once('|')
            .ok_or_else(|| ContextError::InvalidLocator(s.to_string()))?;

        if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ContextError::InvalidLocator(s.to_string()));
        }

        match line.parse::<usize>() {
            Ok(line_number) if line_number > 0 => Ok(Self::new(text, line_number)),
            _ => Err(ContextError::InvalidLocator(s.to_string())),
        }
    }
}

impl From<HeadlineLocator> for String {
    fn from(locator: HeadlineLocator) -> Self {
        locator.to_string()
    }
}

impl TryFrom<String> for HeadlineLocator {
    type Error = ContextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a headline line was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeadingKind {
    /// `## Heading`
    Section,
    /// `### Heading`
    Subsection,
    /// `**Key**: value`
    Key,
}

/// An addressable headline, as offered to a user picking an edit target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineOption {
    /// Unique within one scan
    #[schemars(with = "String")]
    pub value: HeadlineLocator,
    /// Display label, indented by hierarchy level
    pub label: String,
    /// `"Parent > Child"` for bold keys under a heading, otherwise the name
    pub hierarchical_key: String,
    /// Normalized display name
    pub name: String,
    pub kind: HeadingKind,
    /// Index of the owning heading within the same list, if it was kept
    pub parent_index: Option<usize>,
}

/// Language of a Life Context document, sniffed from its title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DocumentLanguage {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "de")]
    German,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
