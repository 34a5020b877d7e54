use life_context::{HeadlineOption, ProposedUpdate, UpdateKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NormalizeHeadlineParams {
    /// Raw heading, bold key or locator, e.g. "## ✅ Achievable Next Steps|12".
    pub headline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeHeadlineResponse {
    pub normalized: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetExistingHeadlinesParams {
    /// Full Life Context markdown document.
    pub document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExistingHeadlinesResponse {
    pub headlines: Vec<HeadlineOption>,
}

/// Where one proposed update should land.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResolutionParams {
    /// Index into `proposed_updates`.
    pub edit_index: usize,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    /// "<text>|<line>" locator for append and replace_section, a "Parent > Child"
    /// key or bare name for create_headline.
    #[serde(default)]
    pub target_headline: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BuildUpdatedContextParams {
    /// Current Life Context markdown document.
    pub document: String,
    /// Edits proposed by the analysis step.
    pub proposed_updates: Vec<ProposedUpdate>,
    /// Resolved targets; edits without a resolution are not applied.
    #[serde(default)]
    pub resolutions: Vec<ResolutionParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildUpdatedContextResponse {
    pub document: String,
    /// Whether the document differs from the input.
    pub changed: bool,
    /// Resolutions that referred to an existing proposed update.
    pub applied_edits: usize,
}
