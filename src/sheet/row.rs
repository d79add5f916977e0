use crate::config::BASE_COLUMN;
use indexmap::IndexMap;
use serde::Serialize;

/// One spreadsheet line as extracted: column header to cell text.
pub type RawRow = IndexMap<String, String>;

/// Where a synthesized or rewritten key came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProvenance {
    pub is_generated_key: bool,
    /// The key as written in the sheet before regeneration or suffixing
    pub original_key: String,
}

/// A spreadsheet row with its final key.
///
/// `values` holds only recognized, non-blank translation columns, keyed by
/// normalized column name; a missing column means the sheet had no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRow {
    pub key: String,
    pub en: String,
    #[serde(flatten)]
    pub values: IndexMap<String, String>,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<KeyProvenance>,
}

impl TranslationRow {
    pub fn new(key: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            en: en.into(),
            values: IndexMap::new(),
            meta: None,
        }
    }

    /// Builder-style helper, mostly for tests and fixtures
    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Text for a spreadsheet column; `en` reads the English source.
    pub fn value(&self, column: &str) -> Option<&str> {
        if column == BASE_COLUMN {
            Some(self.en.as_str())
        } else {
            self.values.get(column).map(String::as_str)
        }
    }

    pub fn is_generated_key(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.is_generated_key)
    }

    /// Record that `key` replaced `original`, keeping the earliest original.
    pub fn mark_rekeyed(&mut self, original: &str) {
        let original_key = self
            .meta
            .as_ref()
            .map(|m| m.original_key.clone())
            .unwrap_or_else(|| original.to_string());
        self.meta = Some(KeyProvenance {
            is_generated_key: true,
            original_key,
        });
    }
}
