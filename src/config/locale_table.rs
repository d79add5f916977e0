/// Default mapping from catalog locale code to spreadsheet column.
pub const DEFAULT_LOCALE_TO_COLUMN: &[(&str, &str)] = &[
    ("en", "en"),
    ("de", "de"),
    ("es", "es"),
    ("fr", "fr"),
    ("ja", "ja"),
    ("ko", "ko"),
    ("ru", "ru"),
    ("pt", "ptbr"),
    ("pt-br", "ptbr"),
    ("zhcn", "zhcn"),
    ("zh-cn", "zhcn"),
    ("zhtw", "zhtw"),
    ("zh-tw", "zhtw"),
    ("zh-cht", "zhtw"),
];

/// Spreadsheet columns copied onto a row besides `key` and `en`.
pub const RECOGNIZED_COLUMNS: &[&str] = &["de", "es", "fr", "ja", "ko", "ptbr", "ru", "zhcn", "zhtw"];

/// Column holding the English source text.
pub const BASE_COLUMN: &str = "en";

/// Column holding the translation key.
pub const KEY_COLUMN: &str = "key";

/// Normalize a locale code: trimmed, lower-cased, underscores become hyphens.
pub fn normalize_locale_code(value: &str) -> String {
    value.trim().to_lowercase().replace('_', "-")
}

/// Normalize a spreadsheet header so `PT-BR`, `pt_br` and `pt br` all read `ptbr`.
pub fn normalize_column_name(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !(c.is_whitespace() || *c == '_' || *c == '-'))
        .collect()
}

/// True for `en` and any `en-*` code.
pub fn is_english_locale(code: &str) -> bool {
    let normalized = normalize_locale_code(code);
    normalized == "en" || normalized.starts_with("en-")
}

/// Look up the default column for a normalized locale code.
pub fn default_column_for(locale: &str) -> Option<&'static str> {
    DEFAULT_LOCALE_TO_COLUMN
        .iter()
        .find(|(code, _)| *code == locale)
        .map(|(_, column)| *column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale_code() {
        assert_eq!(normalize_locale_code(" zh_CN "), "zh-cn");
        assert_eq!(normalize_locale_code("EN"), "en");
    }

    #[test]
    fn test_normalize_column_spellings_agree() {
        assert_eq!(normalize_column_name("PT-BR"), "ptbr");
        assert_eq!(normalize_column_name("pt_br"), "ptbr");
        assert_eq!(normalize_column_name(" pt br "), "ptbr");
        assert_eq!(normalize_column_name("ptbr"), "ptbr");
    }

    #[test]
    fn test_is_english_locale() {
        assert!(is_english_locale("en"));
        assert!(is_english_locale("en_US"));
        assert!(!is_english_locale("eng"));
        assert!(!is_english_locale("de"));
    }

    #[test]
    fn test_default_column_for() {
        assert_eq!(default_column_for("zh-cht"), Some("zhtw"));
        assert_eq!(default_column_for("it"), None);
    }
}
