use crate::error::{Result, SyncError};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// What a newly added key receives in a locale the spreadsheet left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Explicit empty string
    #[default]
    Empty,
    /// Copy of the English text
    En,
}

impl FromStr for FallbackPolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Ok(Self::Empty),
            "en" => Ok(Self::En),
            other => Err(SyncError::invalid_option(
                "--fallback",
                format!("'{}' is not one of: empty, en", other),
            )),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::En => write!(f, "en"),
        }
    }
}

/// How override candidates are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideMode {
    /// `a`: accept every candidate
    AcceptAll,
    /// `n`: reject every candidate
    RejectAll,
    /// `y`: ask about each candidate in list order
    ConfirmEach,
    /// `s:1,3`: accept the listed candidates; stored 0-based
    Select(BTreeSet<usize>),
}

impl OverrideMode {
    /// Parse a mode string. Unknown input resolves to [`OverrideMode::RejectAll`],
    /// the non-destructive choice.
    pub fn parse(mode: &str) -> Self {
        let mode = mode.trim().to_lowercase();
        match mode.as_str() {
            "a" => Self::AcceptAll,
            "n" => Self::RejectAll,
            "y" => Self::ConfirmEach,
            _ => match mode.strip_prefix("s:") {
                Some(list) => Self::Select(parse_index_list(list)),
                None => Self::RejectAll,
            },
        }
    }
}

/// Parse `1,3, 8` into 0-based indexes. Non-positive and non-numeric items are ignored.
pub fn parse_index_list(list: &str) -> BTreeSet<usize> {
    list.split(',')
        .filter_map(|item| item.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map(|n| n - 1)
        .collect()
}

/// Parse the `--override-map` JSON object (`{"zh-cn": "zhcn"}`).
pub fn parse_override_map(json: &str) -> Result<IndexMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| SyncError::invalid_option("--override-map", e.to_string()))?;
    let object = value.as_object().ok_or_else(|| {
        SyncError::invalid_option("--override-map", "expected a JSON object")
    })?;

    let mut map = IndexMap::new();
    for (locale, column) in object {
        let column = match column {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        map.insert(locale.clone(), column);
    }
    Ok(map)
}

/// Lenient boolean parsing for `--flag=value` options.
pub fn parse_bool_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(format!("'{}' is not a boolean (true/false)", other)),
    }
}
