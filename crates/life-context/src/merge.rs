/// The merge engine: applies resolved edits to a Life Context document.
///
/// One call runs `isolate -> mutate head/tail -> mutate pinned section ->
/// assemble`. The document is split once, on original line numbers, and each
/// edit only touches the partition its target lives in.
use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::assembler::{assemble, Partitions};
use crate::create::{group_by_parent, CreateGroup, CreateRequest};
use crate::grammar;
use crate::model::{AppliedUpdate, DocumentLanguage, HeadlineLocator, HeadlineOption, ProposedUpdate, UpdateKind};
use crate::mutator::{apply_line_edits, extent_end, resolve_target, LineEdit, LineOp};
use crate::next_steps::{IsolatedDocument, NextStepsEdit, PinnedSection};
use crate::normalize::{normalize_headline, same_name};
use crate::scanner;

/// Edits to new structure apply after line edits sharing the same line.
const EXTEND_EDIT_INDEX: usize = usize::MAX;

/// Merge engine bound to one pinned-section matcher.
///
/// Holds no per-call state; one instance can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ContextMerger {
    pinned: PinnedSection,
}

/// Edits sorted by the partition they apply to.
#[derive(Default)]
struct RoutedEdits<'a> {
    head: Vec<LineEdit<'a>>,
    tail: Vec<LineEdit<'a>>,
    next_steps: Vec<NextStepsEdit<'a>>,
    creates: Vec<CreateRequest<'a>>,
}

impl ContextMerger {
    pub fn new(pinned: PinnedSection) -> Self {
        Self { pinned }
    }

    pub fn pinned_section(&self) -> &PinnedSection {
        &self.pinned
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_headline(raw)
    }

    pub fn existing_headlines(&self, document: &str) -> Vec<HeadlineOption> {
        scanner::get_existing_headlines(document)
    }

    /// Apply the edits picked by `resolutions` (keyed by index into `updates`).
    ///
    /// Resolutions that point at no proposed update are ignored. When none is
    /// left, `original` comes back unchanged. Edits that cannot be placed are
    /// skipped with a warning; this never fails.
    pub fn build_updated_context(
        &self,
        original: &str,
        updates: &[ProposedUpdate],
        resolutions: &BTreeMap<usize, AppliedUpdate>,
    ) -> String {
        let selected: Vec<(usize, &ProposedUpdate, &AppliedUpdate)> = resolutions
            .iter()
            .filter_map(|(&index, resolution)| match updates.get(index) {
                Some(update) => Some((index, update, resolution)),
                None => {
                    warn!(edit_index = index, updates = updates.len(), "resolution for unknown edit, ignoring");
                    None
                }
            })
            .collect();
        if selected.is_empty() {
            debug!("no resolved edits, returning document unchanged");
            return original.to_string();
        }

        let lines: Vec<String> = grammar::split_lines(original)
            .into_iter()
            .map(str::to_string)
            .collect();
        let language = DocumentLanguage::detect(original);
        let isolated = self.pinned.isolate(lines.clone());

        let mut routed = self.route(&lines, &isolated, &selected);
        let created = self.place_creates(&lines, &isolated, &mut routed);

        let IsolatedDocument {
            mut head,
            next_steps,
            mut tail,
            ..
        } = isolated;

        info!(
            edits = selected.len(),
            head_edits = routed.head.len(),
            tail_edits = routed.tail.len(),
            next_steps_edits = routed.next_steps.len(),
            new_blocks = created.len(),
            ?language,
            "merging edits into life context"
        );

        apply_line_edits(&mut head, routed.head);
        apply_line_edits(&mut tail, routed.tail);
        let next_steps = self.pinned.apply_edits(next_steps, &routed.next_steps, language);

        assemble(Partitions {
            head,
            next_steps,
            tail,
            created,
        })
    }

    fn route<'a>(
        &self,
        lines: &[String],
        isolated: &IsolatedDocument,
        selected: &[(usize, &'a ProposedUpdate, &'a AppliedUpdate)],
    ) -> RoutedEdits<'a> {
        let mut routed = RoutedEdits::default();

        for &(edit_index, update, resolution) in selected {
            let target = resolution.target_headline.trim();
            let content = update.content.as_str();

            // A created child of the pinned section is a task for it.
            let addressed = match resolution.kind {
                UpdateKind::CreateHeadline => target.split_once(" > ").map_or(target, |(parent, _)| parent),
                _ => target,
            };
            if self.pinned.matches_title(&normalize_headline(addressed)) {
                routed.next_steps.push(NextStepsEdit {
                    kind: resolution.kind,
                    content,
                });
                continue;
            }

            let op = match resolution.kind {
                UpdateKind::CreateHeadline => {
                    match CreateRequest::parse(target, content) {
                        Some(request) => routed.creates.push(request),
                        None => warn!(edit_index, "create_headline without a target, skipping"),
                    }
                    continue;
                }
                UpdateKind::Append => LineOp::Append(content),
                UpdateKind::ReplaceSection => LineOp::Replace {
                    content,
                    locator_text: target.rsplit_once('|').map_or(target, |(text, _)| text),
                },
            };

            let locator: HeadlineLocator = match target.parse() {
                Ok(locator) => locator,
                Err(e) => {
                    warn!(edit_index, error = %e, "skipping edit");
                    continue;
                }
            };
            let Some(index) = resolve_target(lines, &locator) else {
                warn!(edit_index, headline = target, "no headline matches locator, skipping edit");
                continue;
            };

            routed.push_line_edit(isolated, edit_index, index, op);
        }

        routed
    }

    /// Turn `create_headline` groups into edits under an existing parent, or
    /// into new blocks returned for the assembler.
    ///
    /// Under an existing parent, a child whose bold key is already there gets
    /// its content appended to that key; the other children are added at the
    /// end of the parent's extent.
    fn place_creates<'a>(
        &self,
        lines: &[String],
        isolated: &IsolatedDocument,
        routed: &mut RoutedEdits<'a>,
    ) -> Vec<String> {
        let mut blocks = Vec::new();

        for group in group_by_parent(std::mem::take(&mut routed.creates)) {
            let Some(index) = existing_parent(lines, isolated, &group) else {
                debug!(parent = %group.parent, children = group.children.len(), "creating new block");
                blocks.push(group.render_block());
                continue;
            };

            debug!(parent = %group.parent, line = index + 1, "adding to existing heading");
            let end = extent_end(lines, index);
            let mut missing = CreateGroup {
                parent: group.parent.clone(),
                children: Vec::new(),
            };
            for (child, content) in group.children {
                let existing_key = child.as_deref().and_then(|name| {
                    (index + 1..end).find(|&i| {
                        grammar::is_bold_key(&lines[i]) && same_name(&normalize_headline(&lines[i]), name)
                    })
                });
                match existing_key {
                    Some(key_line) => {
                        routed.push_line_edit(isolated, EXTEND_EDIT_INDEX, key_line, LineOp::Append(content))
                    }
                    None => missing.children.push((child, content)),
                }
            }

            if !missing.children.is_empty() {
                let op = LineOp::Extend(missing.render_children());
                routed.push_line_edit(isolated, EXTEND_EDIT_INDEX, index, op);
            }
        }

        blocks
    }
}

impl<'a> RoutedEdits<'a> {
    /// Queue a line edit on the partition that owns original line `index`.
    fn push_line_edit(&mut self, isolated: &IsolatedDocument, edit_index: usize, index: usize, op: LineOp<'a>) {
        if index < isolated.head.len() {
            self.head.push(LineEdit {
                edit_index,
                line_index: index,
                op,
            });
        } else if index >= isolated.tail_offset {
            self.tail.push(LineEdit {
                edit_index,
                line_index: index - isolated.tail_offset,
                op,
            });
        } else {
            warn!(edit_index, line = index + 1, "target inside the pinned section, skipping edit");
        }
    }
}

/// First H2/H3 heading outside the pinned section named like the group's parent.
fn existing_parent(lines: &[String], isolated: &IsolatedDocument, group: &CreateGroup<'_>) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .find(|(i, line)| {
            !isolated.in_pinned_span(*i)
                && grammar::is_section_heading(line)
                && same_name(&normalize_headline(line), &group.parent)
        })
        .map(|(i, _)| i)
}
