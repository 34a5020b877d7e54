/// Errors raised by the fallible constructors of the merge engine.
///
/// A merge itself never fails: malformed input degrades to a skipped edit and a
/// `warn!` log line. These variants only surface when parsing a locator or
/// building a custom pinned-section matcher.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("invalid headline locator '{0}': expected '<text>|<line number>'")]
    InvalidLocator(String),

    #[error("pinned section needs at least one language variant")]
    EmptyPinnedSection,

    #[error("pinned section variant has an empty title")]
    EmptyPinnedTitle,

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}
