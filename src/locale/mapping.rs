use crate::config::{default_column_for, normalize_column_name, normalize_locale_code, BASE_COLUMN};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

/// Several locale codes reading the same spreadsheet column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingConflict {
    pub column: String,
    /// Sorted locale codes
    pub locales: Vec<String>,
}

/// Bidirectional relation between catalog locale codes and spreadsheet columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleMapping {
    locale_to_column: IndexMap<String, String>,
    column_to_locales: IndexMap<String, Vec<String>>,
    conflicts: Vec<MappingConflict>,
}

impl LocaleMapping {
    /// Build the mapping for `locale_codes` from the default table overlaid by
    /// `overrides` (`locale -> column`). `base_locale` always reads the `en` column.
    pub fn build<S: AsRef<str>>(
        locale_codes: &[S],
        base_locale: &str,
        overrides: &IndexMap<String, String>,
    ) -> Self {
        let normalized_overrides: IndexMap<String, String> = overrides
            .iter()
            .map(|(locale, column)| (normalize_locale_code(locale), normalize_column_name(column)))
            .collect();
        let base_locale = normalize_locale_code(base_locale);

        let mut mapping = Self::default();
        for code in locale_codes {
            let locale = normalize_locale_code(code.as_ref());
            if mapping.locale_to_column.contains_key(&locale) {
                continue;
            }
            let column = if locale == base_locale {
                BASE_COLUMN.to_string()
            } else if let Some(column) = normalized_overrides.get(&locale) {
                column.clone()
            } else if let Some(column) = default_column_for(&locale) {
                column.to_string()
            } else {
                normalize_column_name(&locale)
            };

            mapping
                .column_to_locales
                .entry(column.clone())
                .or_default()
                .push(locale.clone());
            mapping.locale_to_column.insert(locale, column);
        }

        for (column, locales) in &mapping.column_to_locales {
            if locales.len() > 1 {
                let mut locales = locales.clone();
                locales.sort();
                warn!(column = %column, locales = ?locales, "locale mapping conflict");
                mapping.conflicts.push(MappingConflict {
                    column: column.clone(),
                    locales,
                });
            }
        }

        mapping
    }

    pub fn column_for(&self, locale: &str) -> Option<&str> {
        self.locale_to_column
            .get(&normalize_locale_code(locale))
            .map(String::as_str)
    }

    pub fn locales_for(&self, column: &str) -> &[String] {
        self.column_to_locales
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(locale, column)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.locale_to_column
            .iter()
            .map(|(l, c)| (l.as_str(), c.as_str()))
    }

    /// Distinct columns in first-seen order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.column_to_locales.keys().map(String::as_str)
    }

    pub fn conflicts(&self) -> &[MappingConflict] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let mapping = LocaleMapping::build(&["en", "zh-cn", "ja"], "en", &IndexMap::new());
        assert_eq!(mapping.column_for("en"), Some("en"));
        assert_eq!(mapping.column_for("zh-cn"), Some("zhcn"));
        assert_eq!(mapping.column_for("ZH_CN"), Some("zhcn"));
        assert!(!mapping.has_conflicts());
    }

    #[test]
    fn test_pt_conflict() {
        let mapping = LocaleMapping::build(&["en", "pt-br", "pt"], "en", &IndexMap::new());
        assert_eq!(
            mapping.conflicts(),
            &[MappingConflict {
                column: "ptbr".to_string(),
                locales: vec!["pt".to_string(), "pt-br".to_string()],
            }]
        );
        assert_eq!(mapping.locales_for("ptbr").len(), 2);
    }

    #[test]
    fn test_override_resolves_conflict() {
        let mut overrides = IndexMap::new();
        overrides.insert("PT".to_string(), "pt".to_string());
        let mapping = LocaleMapping::build(&["en", "pt-br", "pt"], "en", &overrides);
        assert!(!mapping.has_conflicts());
        assert_eq!(mapping.column_for("pt"), Some("pt"));
    }

    #[test]
    fn test_unknown_locale_uses_normalized_column() {
        let mapping = LocaleMapping::build(&["en", "it", "en-gb"], "en", &IndexMap::new());
        assert_eq!(mapping.column_for("it"), Some("it"));
        assert_eq!(mapping.column_for("en-gb"), Some("engb"));
    }

    #[test]
    fn test_base_locale_reads_en_column() {
        let mapping = LocaleMapping::build(&["en-us", "fr"], "en-US", &IndexMap::new());
        assert_eq!(mapping.column_for("en-us"), Some("en"));
        let columns: Vec<&str> = mapping.columns().collect();
        assert_eq!(columns, vec!["en", "fr"]);
    }
}
