use std::path::{Path, PathBuf};

use life_context::{PinnedSection, PinnedSectionConfig};

use crate::error::AppError;

pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: Option<String>,
    pub max_document_bytes: usize,
    pub pinned_section_path: Option<PathBuf>,
}

impl Config {
    /// Optional:
    /// - `MCP_TCP_LISTEN_ADDR` (serve TCP instead of stdio)
    /// - `LIFE_CONTEXT_MAX_DOCUMENT_BYTES` (default: 1 MiB)
    /// - `LIFE_CONTEXT_PINNED_SECTION` (path to a JSON pinned-section definition)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let max_document_bytes = match lookup("LIFE_CONTEXT_MAX_DOCUMENT_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(AppError::Config(format!(
                        "LIFE_CONTEXT_MAX_DOCUMENT_BYTES must be a positive integer, got '{raw}'"
                    )))
                }
            },
            None => DEFAULT_MAX_DOCUMENT_BYTES,
        };

        let pinned_section_path = lookup("LIFE_CONTEXT_PINNED_SECTION")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        if let Some(path) = &pinned_section_path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "required file not found: {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            listen_addr: lookup("MCP_TCP_LISTEN_ADDR").filter(|a| !a.trim().is_empty()),
            max_document_bytes,
            pinned_section_path,
        })
    }

    /// The configured pinned section, or the bilingual "Achievable Next Steps" default.
    pub fn pinned_section(&self) -> Result<PinnedSection, AppError> {
        match &self.pinned_section_path {
            Some(path) => load_pinned_section(path),
            None => Ok(PinnedSection::default()),
        }
    }
}

fn load_pinned_section(path: &Path) -> Result<PinnedSection, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let config: PinnedSectionConfig = serde_json::from_str(&raw)?;
    Ok(PinnedSection::try_from(config)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use life_context::DocumentLanguage;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
        assert!(config.listen_addr.is_none());
        assert!(config.pinned_section_path.is_none());
        assert!(config
            .pinned_section()
            .unwrap()
            .is_heading("## ✅ Achievable Next Steps"));
    }

    #[test]
    fn rejects_invalid_document_limit() {
        for raw in ["0", "-5", "lots"] {
            let err = config_with(&[("LIFE_CONTEXT_MAX_DOCUMENT_BYTES", raw)]).unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "{raw}: {err}");
        }
        let config = config_with(&[("LIFE_CONTEXT_MAX_DOCUMENT_BYTES", " 2048 ")]).unwrap();
        assert_eq!(config.max_document_bytes, 2048);
    }

    #[test]
    fn rejects_missing_pinned_section_file() {
        let err = config_with(&[("LIFE_CONTEXT_PINNED_SECTION", "/nonexistent/pinned.json")]).unwrap_err();
        assert!(err.to_string().contains("required file not found"));
    }

    #[test]
    fn loads_pinned_section_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"variants": [{{"language": "de", "title": "Diese Woche", "subtitle": "Kurzfristige Zusagen."}}]}}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let pinned = config_with(&[("LIFE_CONTEXT_PINNED_SECTION", &path)])
            .unwrap()
            .pinned_section()
            .unwrap();
        assert!(pinned.is_heading("## ✅ Diese Woche"));
        assert_eq!(
            pinned.shell(DocumentLanguage::German),
            vec!["## ✅ Diese Woche".to_string(), "*Kurzfristige Zusagen.*".to_string()]
        );
    }

    #[test]
    fn reports_invalid_pinned_section_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"variants": []}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();
        let err = config_with(&[("LIFE_CONTEXT_PINNED_SECTION", &path)])
            .unwrap()
            .pinned_section()
            .unwrap_err();
        assert!(matches!(err, AppError::Context(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let err = config_with(&[("LIFE_CONTEXT_PINNED_SECTION", &path)])
            .unwrap()
            .pinned_section()
            .unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }
}
