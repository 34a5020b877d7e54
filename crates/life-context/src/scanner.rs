/// Headline scanner.
///
/// One linear pass over the document lines. H2/H3 headings open a parent
/// context; bold keys become children of the most recent heading. Every
/// option carries a locator with the 1-based line number, so headings that
/// share a display name stay individually addressable.
use crate::grammar;
use crate::model::{HeadingKind, HeadlineLocator, HeadlineOption};
use crate::normalize::normalize_headline;

/// Document titles and structural headings that are never edit targets.
pub const RESERVED_HEADLINES: &[&str] = &[
    "My Life Context",
    "Mein Lebenskontext",
    "Life Domains",
    "Lebensbereiche",
];

/// List every addressable headline in `document`, in document order.
pub fn get_existing_headlines(document: &str) -> Vec<HeadlineOption> {
    if document.is_empty() {
        return Vec::new();
    }

    let mut scanned: Vec<HeadlineOption> = Vec::new();
    // Index (into `scanned`) of the heading that owns subsequent bold keys.
    let mut parent: Option<usize> = None;

    for (index, line) in grammar::split_lines(document).into_iter().enumerate() {
        let Some(kind) = grammar::classify(line) else {
            continue;
        };

        let name = normalize_headline(line);
        let value = HeadlineLocator::new(line, index + 1);

        let option = match kind {
            HeadingKind::Section | HeadingKind::Subsection => {
                parent = Some(scanned.len());
                let label = match kind {
                    HeadingKind::Section => format!("- {name}"),
                    _ => format!("  - {name}"),
                };
                HeadlineOption {
                    value,
                    label,
                    hierarchical_key: name.clone(),
                    name,
                    kind,
                    parent_index: None,
                }
            }
            HeadingKind::Key => {
                let hierarchical_key = match parent {
                    Some(p) => format!("{} > {name}", scanned[p].name),
                    None => name.clone(),
                };
                HeadlineOption {
                    value,
                    label: format!("   {name}"),
                    hierarchical_key,
                    name,
                    kind,
                    parent_index: parent,
                }
            }
        };
        scanned.push(option);
    }

    drop_reserved(scanned)
}

/// Remove reserved headings and re-point parent indices at the kept list.
fn drop_reserved(scanned: Vec<HeadlineOption>) -> Vec<HeadlineOption> {
    let mut remap: Vec<Option<usize>> = Vec::with_capacity(scanned.len());
    let mut kept = 0usize;
    for option in &scanned {
        if RESERVED_HEADLINES.contains(&option.name.as_str()) {
            remap.push(None);
        } else {
            remap.push(Some(kept));
            kept += 1;
        }
    }

    scanned
        .into_iter()
        .zip(remap.iter().copied())
        .filter(|(_, new_index)| new_index.is_some())
        .map(|(mut option, _)| {
            option.parent_index = option.parent_index.and_then(|p| remap[p]);
            option
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# My Life Context

## 👤 Core Profile
*High-level, stable information about me.*

**I am...**: A software developer
**Core Values**: honesty

---

## 🧭 Life Domains
**Orphan**: under a reserved heading

### 💼 Career & Work
**Current Situation**: busy

**Goals**:

### 🌱 Health & Wellness
**Goals**:
";

    #[test]
    fn builds_hierarchy_and_labels() {
        let options = get_existing_headlines(DOC);
        let keys: Vec<&str> = options.iter().map(|o| o.hierarchical_key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Core Profile",
                "Core Profile > I am...",
                "Core Profile > Core Values",
                "Life Domains > Orphan",
                "Career & Work",
                "Career & Work > Current Situation",
                "Career & Work > Goals",
                "Health & Wellness",
                "Health & Wellness > Goals",
            ]
        );
        assert_eq!(options[0].label, "- Core Profile");
        assert_eq!(options[1].label, "   I am...");
        assert_eq!(options[4].label, "  - Career & Work");
        assert_eq!(options[4].kind, HeadingKind::Subsection);
    }

    #[test]
    fn reserved_headings_are_filtered_and_parents_remapped() {
        let options = get_existing_headlines(DOC);
        assert!(options.iter().all(|o| o.name != "Life Domains"));

        let orphan = options.iter().find(|o| o.name == "Orphan").unwrap();
        assert_eq!(orphan.parent_index, None);

        let goals = &options[6];
        assert_eq!(goals.parent_index, Some(4));
        assert_eq!(options[4].name, "Career & Work");
    }

    #[test]
    fn duplicate_names_get_distinct_locators() {
        let options = get_existing_headlines(DOC);
        let goals: Vec<&HeadlineOption> = options.iter().filter(|o| o.name == "Goals").collect();
        assert_eq!(goals.len(), 2);
        assert_ne!(goals[0].value, goals[1].value);
        assert_eq!(goals[0].value.to_string(), "**Goals**:|17");
        assert_eq!(goals[1].value.to_string(), "**Goals**:|20");
    }

    #[test]
    fn empty_document_has_no_headlines() {
        assert!(get_existing_headlines("").is_empty());
        assert!(get_existing_headlines("# My Life Context\n\nJust text.").is_empty());
    }
}
