/// MCP server for the Life Context merge engine.
///
/// Exposes three tools:
/// - `normalize_headline`: Reduce a heading to its display name
/// - `get_existing_headlines`: List addressable headlines with their locators
/// - `build_updated_context`: Apply resolved edits to a document
use std::collections::BTreeMap;
use std::sync::Arc;

use life_context::{AppliedUpdate, ContextMerger};
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::mcp_api::{
    BuildUpdatedContextParams, BuildUpdatedContextResponse, ExistingHeadlinesResponse,
    GetExistingHeadlinesParams, NormalizeHeadlineParams, NormalizeHeadlineResponse,
};

#[derive(Clone)]
pub struct LifeContextServer {
    merger: Arc<ContextMerger>,
    max_document_bytes: usize,
    tool_router: ToolRouter<LifeContextServer>,
}

impl LifeContextServer {
    pub fn new(merger: Arc<ContextMerger>, max_document_bytes: usize) -> Self {
        Self {
            merger,
            max_document_bytes,
            tool_router: Self::tool_router(),
        }
    }

    fn check_document_size(&self, document: &str) -> Result<(), String> {
        if document.len() > self.max_document_bytes {
            return Err(format!(
                "document is {} bytes, limit is {}",
                document.len(),
                self.max_document_bytes
            ));
        }
        Ok(())
    }
}

#[tool_router]
impl LifeContextServer {
    #[tool(description = "Normalize a Life Context headline to its display name: strips '#' markers, emoji, bold markers with their value, and a trailing '|<line>' locator suffix.")]
    async fn normalize_headline(
        &self,
        Parameters(params): Parameters<NormalizeHeadlineParams>,
    ) -> Result<Json<NormalizeHeadlineResponse>, String> {
        Ok(Json(NormalizeHeadlineResponse {
            normalized: self.merger.normalize(&params.headline),
        }))
    }

    #[tool(description = "List every addressable headline (## and ### headings, **Key**: lines) of a Life Context document. Each entry's 'value' is a '<text>|<line>' locator to pass back as target_headline.")]
    async fn get_existing_headlines(
        &self,
        Parameters(params): Parameters<GetExistingHeadlinesParams>,
    ) -> Result<Json<ExistingHeadlinesResponse>, String> {
        self.check_document_size(&params.document)?;

        let headlines = self.merger.existing_headlines(&params.document);
        info!(headlines = headlines.len(), "listed existing headlines");
        Ok(Json(ExistingHeadlinesResponse { headlines }))
    }

    #[tool(description = "Apply resolved edits (append, replace_section, create_headline) to a Life Context document and return the updated document. The pinned 'Achievable Next Steps' section keeps its heading and subtitle even when all tasks are removed.")]
    async fn build_updated_context(
        &self,
        Parameters(params): Parameters<BuildUpdatedContextParams>,
    ) -> Result<Json<BuildUpdatedContextResponse>, String> {
        self.check_document_size(&params.document)?;

        let mut resolutions: BTreeMap<usize, AppliedUpdate> = BTreeMap::new();
        for resolution in params.resolutions {
            let applied = AppliedUpdate::new(resolution.kind, resolution.target_headline);
            if resolutions.insert(resolution.edit_index, applied).is_some() {
                return Err(format!(
                    "duplicate resolution for edit_index {}",
                    resolution.edit_index
                ));
            }
        }

        let applied_edits = resolutions
            .keys()
            .filter(|&&index| index < params.proposed_updates.len())
            .count();
        let document =
            self.merger
                .build_updated_context(&params.document, &params.proposed_updates, &resolutions);
        let changed = document != params.document;

        info!(
            proposed = params.proposed_updates.len(),
            applied_edits,
            changed,
            bytes = document.len(),
            "built updated context"
        );

        Ok(Json(BuildUpdatedContextResponse {
            document,
            changed,
            applied_edits,
        }))
    }
}

#[tool_handler]
impl ServerHandler for LifeContextServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "life-context".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Life Context merge server. Use get_existing_headlines to list edit \
                 targets in a user's Life Context document, then build_updated_context \
                 with the proposed updates and one resolution per edit to apply. \
                 normalize_headline shows how headings are matched."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use life_context::{ProposedUpdate, UpdateKind};

    use super::*;
    use crate::mcp_api::ResolutionParams;

    const DOCUMENT: &str = "# My Life Context

## 👤 Core Profile
**I am...**: A teacher

---

## ✅ Achievable Next Steps
*Specific, actionable tasks I have committed to.*

* Grade exams
";

    fn server(max_document_bytes: usize) -> LifeContextServer {
        LifeContextServer::new(Arc::new(ContextMerger::default()), max_document_bytes)
    }

    fn build_params(resolutions: Vec<ResolutionParams>) -> BuildUpdatedContextParams {
        BuildUpdatedContextParams {
            document: DOCUMENT.to_string(),
            proposed_updates: vec![ProposedUpdate::new(
                UpdateKind::ReplaceSection,
                "Achievable Next Steps",
                "* Plan field trip",
            )],
            resolutions,
        }
    }

    fn resolution(edit_index: usize) -> ResolutionParams {
        ResolutionParams {
            edit_index,
            kind: UpdateKind::ReplaceSection,
            target_headline: "## ✅ Achievable Next Steps|8".to_string(),
        }
    }

    #[test]
    fn tools_publish_output_schemas() {
        let tools = LifeContextServer::tool_router().list_all();
        for name in [
            "normalize_headline",
            "get_existing_headlines",
            "build_updated_context",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[tokio::test]
    async fn normalizes_headlines() {
        let Json(response) = server(1024)
            .normalize_headline(Parameters(NormalizeHeadlineParams {
                headline: "### 💼 Career & Work|14".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(response.normalized, "Career & Work");
    }

    #[tokio::test]
    async fn lists_headlines_with_locators() {
        let Json(response) = server(4096)
            .get_existing_headlines(Parameters(GetExistingHeadlinesParams {
                document: DOCUMENT.to_string(),
            }))
            .await
            .unwrap();
        let values: Vec<String> = response
            .headlines
            .iter()
            .map(|h| h.value.to_string())
            .collect();
        assert_eq!(
            values,
            vec![
                "## 👤 Core Profile|3".to_string(),
                "**I am...**: A teacher|4".to_string(),
                "## ✅ Achievable Next Steps|8".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn applies_resolved_edits() {
        let Json(response) = server(4096)
            .build_updated_context(Parameters(build_params(vec![resolution(0)])))
            .await
            .unwrap();
        assert!(response.changed);
        assert_eq!(response.applied_edits, 1);
        assert!(response.document.contains("* Plan field trip"));
        assert!(!response.document.contains("Grade exams"));
        assert!(response
            .document
            .contains("*Specific, actionable tasks I have committed to.*"));
    }

    #[tokio::test]
    async fn unresolved_edits_leave_document_unchanged() {
        let Json(response) = server(4096)
            .build_updated_context(Parameters(build_params(vec![resolution(5)])))
            .await
            .unwrap();
        assert!(!response.changed);
        assert_eq!(response.applied_edits, 0);
        assert_eq!(response.document, DOCUMENT);
    }

    #[tokio::test]
    async fn rejects_duplicate_edit_index() {
        let err = server(4096)
            .build_updated_context(Parameters(build_params(vec![resolution(0), resolution(0)])))
            .await
            .err()
            .expect("tool error");
        assert!(err.contains("duplicate resolution for edit_index 0"));
    }

    #[tokio::test]
    async fn rejects_oversized_documents() {
        let err = server(16)
            .build_updated_context(Parameters(build_params(vec![resolution(0)])))
            .await
            .err()
            .expect("tool error");
        assert!(err.contains("limit is 16"));

        let err = server(16)
            .get_existing_headlines(Parameters(GetExistingHeadlinesParams {
                document: DOCUMENT.to_string(),
            }))
            .await
            .err()
            .expect("tool error");
        assert!(err.contains("limit is 16"));
    }
}
