//! Merge engine for Life Context documents.
//!
//! A Life Context document is a user's long-lived markdown profile. An
//! analysis step proposes edits against it, a user picks where each edit lands,
//! and [`build_updated_context`] writes the picked edits back into the
//! document without disturbing unrelated sections.

pub(crate) mod assembler;
pub mod create;
pub mod error;
pub mod grammar;
pub mod merge;
pub mod model;
pub(crate) mod mutator;
pub mod next_steps;
pub mod normalize;
pub mod scanner;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

pub use create::{emoji_for, LIFE_DOMAIN_KEYS, LIFE_DOMAIN_KEYS_DE};
pub use error::ContextError;
pub use merge::ContextMerger;
pub use model::{
    AppliedUpdate, DocumentLanguage, HeadingKind, HeadlineLocator, HeadlineOption, ProposedUpdate,
    UpdateKind,
};
pub use next_steps::{PinnedSection, PinnedSectionConfig, SectionVariant};
pub use normalize::normalize_headline;
pub use scanner::{get_existing_headlines, RESERVED_HEADLINES};

static DEFAULT_MERGER: Lazy<ContextMerger> = Lazy::new(ContextMerger::default);

/// [`ContextMerger::build_updated_context`] with the default bilingual
/// "Achievable Next Steps" section.
pub fn build_updated_context(
    original: &str,
    updates: &[ProposedUpdate],
    resolutions: &BTreeMap<usize, AppliedUpdate>,
) -> String {
    DEFAULT_MERGER.build_updated_context(original, updates, resolutions)
}
