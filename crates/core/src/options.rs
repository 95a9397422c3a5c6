use std::path::PathBuf;

use crate::error::ConvertError;

/// Conversion options, usually loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConvertOptions {
    /// Prefix for relative reference targets when the document sets no
    /// `baseTargetUri` of its own.
    #[serde(default, alias = "baseTargetUri")]
    pub base_target_uri: Option<String>,
    /// Directory that includes in in-memory input are resolved against.
    #[serde(default, alias = "includeRoot")]
    pub include_root: Option<PathBuf>,
    /// Whether `finish` writes the `<back>` element with reference lists.
    #[serde(default = "default_emit_back_matter", alias = "emitBackMatter")]
    pub emit_back_matter: bool,
}

fn default_emit_back_matter() -> bool {
    true
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            base_target_uri: None,
            include_root: None,
            emit_back_matter: default_emit_back_matter(),
        }
    }
}

impl ConvertOptions {
    /// Parse options from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let options = ConvertOptions::from_json("{}").unwrap();
        assert_eq!(options, ConvertOptions::default());
        assert!(options.emit_back_matter);
    }

    #[test]
    fn camel_case_keys() {
        let options = ConvertOptions::from_json(
            r#"{"baseTargetUri": "https://example.com", "includeRoot": "docs", "emitBackMatter": false}"#,
        )
        .unwrap();
        assert_eq!(options.base_target_uri.as_deref(), Some("https://example.com"));
        assert_eq!(options.include_root, Some(PathBuf::from("docs")));
        assert!(!options.emit_back_matter);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ConvertOptions::from_json("{").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
