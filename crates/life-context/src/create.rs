/// `create_headline` edits: new structure addressed by `"Parent > Child"`.
///
/// Edits are grouped by parent. A group either lands under an existing H2/H3
/// heading of that name, or becomes a new `### <emoji> <Parent>` block. Groups
/// whose children are all life-domain keys render the full four-key template.
use regex::Regex;
use tracing::warn;

use crate::grammar;
use crate::mutator::key_with_value;
use crate::normalize::{normalize_headline, same_name, EMOJI_CLASS};

/// The four keys of a life-domain block, in render order.
pub const LIFE_DOMAIN_KEYS: [&str; 4] = ["Current Situation", "Routines & Systems", "Goals", "Challenges"];
pub const LIFE_DOMAIN_KEYS_DE: [&str; 4] = [
    "Aktuelle Situation",
    "Routinen & Systeme",
    "Ziele",
    "Herausforderungen",
];

const FALLBACK_EMOJI: &str = "📌";

const DOMAIN_EMOJI: &[(&[&str], &str)] = &[
    (&["career", "work", "job", "karriere", "beruf", "arbeit"], "💼"),
    (&["growth", "learning", "wachstum", "lernen", "entwicklung"], "💡"),
    (
        &["relationship", "social", "family", "friend", "beziehung", "sozial", "familie", "freund"],
        "👨‍👩‍👧‍👦",
    ),
    (&["health", "wellness", "fitness", "gesundheit", "wohlbefinden"], "🌱"),
    (&["mindset", "belief", "denkweise", "überzeugung", "glaube"], "🧠"),
    (&["finance", "money", "finanz", "geld"], "💰"),
    (&["project", "projekt"], "🛠️"),
    (&["hobby", "hobbies", "leisure", "freizeit"], "🎨"),
];

/// Emoji for a new parent heading, chosen by keyword.
pub fn emoji_for(parent: &str) -> &'static str {
    let lowered = parent.to_lowercase();
    DOMAIN_EMOJI
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(*k)))
        .map_or(FALLBACK_EMOJI, |(_, emoji)| *emoji)
}

/// One `create_headline` edit with its target split into parent and child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreateRequest<'a> {
    pub parent: String,
    pub child: Option<String>,
    pub content: &'a str,
}

impl<'a> CreateRequest<'a> {
    pub fn parse(target: &str, content: &'a str) -> Option<Self> {
        let (parent, child) = match target.split_once(" > ") {
            Some((parent, child)) => (parent, Some(child)),
            None => (target, None),
        };

        let parent = normalize_headline(parent);
        if parent.is_empty() {
            return None;
        }
        let child = child.map(normalize_headline).filter(|c| !c.is_empty());

        Some(Self {
            parent,
            child,
            content,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreateGroup<'a> {
    pub parent: String,
    pub children: Vec<(Option<String>, &'a str)>,
}

/// Group requests by parent name (case-insensitive), in first-seen order.
pub(crate) fn group_by_parent(requests: Vec<CreateRequest<'_>>) -> Vec<CreateGroup<'_>> {
    let mut groups: Vec<CreateGroup<'_>> = Vec::new();
    for request in requests {
        match groups.iter().position(|g| same_name(&g.parent, &request.parent)) {
            Some(i) => groups[i].children.push((request.child, request.content)),
            None => groups.push(CreateGroup {
                parent: request.parent,
                children: vec![(request.child, request.content)],
            }),
        }
    }
    groups
}

impl CreateGroup<'_> {
    /// The life-domain key set every child belongs to, if any.
    fn life_domain_keys(&self) -> Option<&'static [&'static str; 4]> {
        let names: Option<Vec<&str>> = self.children.iter().map(|(c, _)| c.as_deref()).collect();
        let names = names.filter(|n| !n.is_empty())?;

        [&LIFE_DOMAIN_KEYS, &LIFE_DOMAIN_KEYS_DE]
            .into_iter()
            .find(|keys| names.iter().all(|n| keys.iter().any(|k| same_name(k, n))))
    }

    /// A new `### <emoji> <Parent>` block.
    pub fn render_block(&self) -> String {
        let mut lines = vec![format!("### {} {}", emoji_for(&self.parent), self.parent)];

        match self.life_domain_keys() {
            Some(keys) => {
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        lines.push(String::new());
                    }
                    let value = self.values_for(key);
                    lines.extend(key_with_value(&format!("**{key}**:"), &value));
                }
            }
            None => {
                for (_, content) in &self.children {
                    let body = strip_repeated_heading(content, &self.parent);
                    let body = body.trim();
                    if body.is_empty() {
                        continue;
                    }
                    if lines.len() > 1 {
                        lines.push(String::new());
                    }
                    lines.extend(body.lines().map(|l| l.trim_end().to_string()));
                }
            }
        }

        lines.join("\n")
    }

    /// Lines to add under an existing heading named like the parent.
    pub fn render_children(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        for (child, content) in &self.children {
            let rendered = match child {
                Some(name) => key_with_value(&format!("**{name}**:"), content),
                None => {
                    let body = strip_repeated_heading(content, &self.parent);
                    body.trim().lines().map(|l| l.trim_end().to_string()).collect()
                }
            };
            if rendered.iter().all(|l| grammar::is_blank(l)) {
                continue;
            }
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(rendered);
        }
        lines
    }

    fn values_for(&self, key: &str) -> String {
        self.children
            .iter()
            .filter(|(child, _)| child.as_deref().is_some_and(|c| same_name(c, key)))
            .map(|(_, content)| content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Remove lines that repeat the parent heading, e.g. `## 🎨 Side Projects`.
fn strip_repeated_heading(content: &str, parent: &str) -> String {
    let pattern = format!(
        r"(?im)^[ \t]*#{{1,6}}[ \t]*(?:{EMOJI_CLASS}[ \t]*)*{}[ \t]*\r?(?:\n|$)",
        regex::escape(parent)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(content, "").into_owned(),
        Err(e) => {
            warn!(error = %e, parent, "could not build heading pattern");
            content.to_string()
        }
    }
}
