use crate::error::{Result, SyncError};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::json_parser::JsonParser;
#[cfg(feature = "yaml")]
use super::yaml_parser::YamlParser;

/// Extensions recognized as locale catalogs.
pub const LOCALE_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// On-disk catalog format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format of `path`, or `None` if the extension is not a catalog one.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Like [`DocumentFormat::detect`] but fails with `UnsupportedFormat`.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::detect(path).ok_or_else(|| SyncError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
    }
}

/// True if the file name carries a catalog extension.
pub fn is_locale_file(path: &Path) -> bool {
    DocumentFormat::detect(path).is_some()
}

/// Parse catalog text, dispatching on the extension of `path`.
pub fn parse_document(path: &Path, content: &str) -> Result<Value> {
    match DocumentFormat::from_path(path)? {
        DocumentFormat::Json => JsonParser::parse_str(path, content),
        DocumentFormat::Yaml => parse_yaml(path, content),
    }
}

/// Serialize a catalog document in `format`.
pub fn render_document(path: &Path, format: DocumentFormat, value: &Value) -> Result<String> {
    match format {
        DocumentFormat::Json => JsonParser::render(value),
        DocumentFormat::Yaml => render_yaml(path, value),
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(path: &Path, content: &str) -> Result<Value> {
    YamlParser::parse_str(path, content)
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(path: &Path, _content: &str) -> Result<Value> {
    Err(missing_yaml(path))
}

#[cfg(feature = "yaml")]
fn render_yaml(path: &Path, value: &Value) -> Result<String> {
    YamlParser::render(path, value)
}

#[cfg(not(feature = "yaml"))]
fn render_yaml(path: &Path, _value: &Value) -> Result<String> {
    Err(missing_yaml(path))
}

#[cfg(not(feature = "yaml"))]
fn missing_yaml(path: &Path) -> SyncError {
    SyncError::MissingParser {
        file: path.to_path_buf(),
        capability: "yaml",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(DocumentFormat::detect(Path::new("en.json")), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::detect(Path::new("en.YML")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::detect(Path::new("en.toml")), None);
        assert_eq!(DocumentFormat::detect(Path::new("README")), None);
    }

    #[test]
    fn test_unsupported_format() {
        let err = parse_document(Path::new("locales/en.properties"), "a=b").unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_parse_json_document() {
        let value = parse_document(Path::new("en.json"), r#"{"a": {"b": "c"}}"#).unwrap();
        assert_eq!(value["a"]["b"], "c");
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_yaml_document() {
        let value = parse_document(Path::new("en.yaml"), "a:\n  b: c\n").unwrap();
        assert_eq!(value["a"]["b"], "c");
    }

    #[cfg(not(feature = "yaml"))]
    #[test]
    fn test_yaml_without_parser_names_capability() {
        let err = parse_document(Path::new("en.yaml"), "a: b").unwrap_err();
        match err {
            SyncError::MissingParser { capability, .. } => assert_eq!(capability, "yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
