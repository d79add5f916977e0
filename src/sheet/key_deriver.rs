use crate::config::{normalize_column_name, BASE_COLUMN, KEY_COLUMN, RECOGNIZED_COLUMNS};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::row::{RawRow, TranslationRow};

/// Generated keys keep at most this many `_`-separated words, prefix included.
pub const MAX_KEY_WORDS: usize = 5;

/// Fallback when the source text has no usable characters.
pub const GENERATED_KEY_FALLBACK: &str = "generated_key";

/// Sentinel key marking a row the sheet author wants skipped.
const IGNORE_SENTINEL: &str = "ignore";

static MODULE_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*]+)\*$").unwrap());
static QUOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"['"`]"#).unwrap());
static NON_ALNUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Slug a piece of text into `lower_snake` key form.
pub fn to_key_base(input: &str) -> String {
    let lowered = input.to_lowercase();
    let unquoted = QUOTES.replace_all(&lowered, "");
    let slug = NON_ALNUM_RUN.replace_all(&unquoted, "_");
    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        GENERATED_KEY_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Keep the first `max_words` words (at least one) of a slug.
pub fn trim_key_words(key_base: &str, max_words: usize) -> String {
    let words: Vec<&str> = key_base.split('_').filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return GENERATED_KEY_FALLBACK.to_string();
    }
    words[..max_words.max(1).min(words.len())].join("_")
}

fn word_count(value: &str) -> usize {
    value.split('_').filter(|w| !w.is_empty()).count()
}

/// Module name from a `*moduleName*` key, already slugged.
pub fn parse_module_prefix(raw_key: &str) -> Option<String> {
    let captures = MODULE_KEY_PATTERN.captures(raw_key)?;
    let module_name = captures.get(1)?.as_str().trim();
    if module_name.is_empty() {
        None
    } else {
        Some(to_key_base(module_name))
    }
}

/// The key text derives to before any collision handling.
pub fn base_key(en_text: &str, prefix: Option<&str>) -> String {
    let safe_prefix = prefix
        .filter(|p| !p.is_empty())
        .map(|p| trim_key_words(p, MAX_KEY_WORDS));
    let prefix_words = safe_prefix.as_deref().map(word_count).unwrap_or(0);
    let budget = MAX_KEY_WORDS.saturating_sub(prefix_words).max(1);
    let base = trim_key_words(&to_key_base(en_text), budget);
    match safe_prefix {
        Some(prefix) => format!("{}_{}", prefix, base),
        None => base,
    }
}

/// First of `key`, `key_2`, `key_3`, … for which `is_taken` is false.
pub fn disambiguate(key: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(key) {
        return key.to_string();
    }
    let mut index = 2;
    loop {
        let candidate = format!("{}_{}", key, index);
        if !is_taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Derive a key from `en_text` that is unique in `used_keys`, and claim it.
pub fn generate_unique_key(
    en_text: &str,
    used_keys: &mut HashSet<String>,
    prefix: Option<&str>,
) -> String {
    let key = disambiguate(&base_key(en_text, prefix), |k| used_keys.contains(k));
    used_keys.insert(key.clone());
    key
}

/// `KeyDeriver` turns raw spreadsheet rows into [`TranslationRow`]s with
/// stable, sheet-unique keys.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    columns: Vec<String>,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDeriver {
    pub fn new() -> Self {
        Self {
            columns: RECOGNIZED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Recognize extra translation columns (e.g. those a locale mapping reads).
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for column in columns {
            let column = normalize_column_name(column.as_ref());
            if column.is_empty() || column == BASE_COLUMN || column == KEY_COLUMN {
                continue;
            }
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Normalize, filter and key every row. Uniqueness is scoped to this call.
    pub fn derive_rows(&self, raw_rows: &[RawRow]) -> Vec<TranslationRow> {
        let mut used_keys: HashSet<String> = HashSet::new();
        let mut rows = Vec::with_capacity(raw_rows.len());

        for raw in raw_rows {
            let normalized: RawRow = raw
                .iter()
                .map(|(column, value)| (normalize_column_name(column), value.trim().to_string()))
                .collect();
            let cell = |column: &str| normalized.get(column).map(String::as_str).unwrap_or("");

            let raw_key = cell(KEY_COLUMN);
            let en = cell(BASE_COLUMN);
            if raw_key.eq_ignore_ascii_case(IGNORE_SENTINEL) || en.is_empty() {
                continue;
            }

            let mut row = TranslationRow::new(String::new(), en);
            let module_prefix = parse_module_prefix(raw_key);

            if raw_key.is_empty() || module_prefix.is_some() {
                row.key = generate_unique_key(en, &mut used_keys, module_prefix.as_deref());
                row.mark_rekeyed(raw_key);
                debug!(key = %row.key, original = raw_key, "generated key");
            } else if used_keys.contains(raw_key) {
                row.key = disambiguate(raw_key, |k| used_keys.contains(k));
                used_keys.insert(row.key.clone());
                row.mark_rekeyed(raw_key);
                debug!(key = %row.key, original = raw_key, "suffixed duplicate key");
            } else {
                row.key = raw_key.to_string();
                used_keys.insert(row.key.clone());
            }

            for column in &self.columns {
                let value = cell(column);
                if !value.is_empty() {
                    row.values.insert(column.clone(), value.to_string());
                }
            }
            rows.push(row);
        }

        rows
    }
}
