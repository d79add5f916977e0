use crate::config::normalize_locale_code;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

const SCORE_EXACT_EN: i64 = 1000;
const SCORE_EN_VARIANT: i64 = 700;
const SCORE_OTHER: i64 = 100;
const DEPTH_PENALTY: i64 = 15;
const SIBLING_BONUS: i64 = 6;

/// One discovered locale file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleCandidate {
    /// Normalized code taken from the file stem (e.g. `zh-cn`)
    pub locale_code: String,
    /// Absolute or caller-relative path of the file
    pub file_path: PathBuf,
    /// Path relative to the resolver root, always `/`-separated
    pub relative_path: String,
    /// Number of segments in `relative_path`
    pub depth: usize,
    /// Locale files in the same directory, this one included
    pub sibling_locale_count: usize,
    pub score: i64,
}

impl LocaleCandidate {
    pub fn new(
        locale_code: impl Into<String>,
        file_path: PathBuf,
        relative_path: impl Into<String>,
        sibling_locale_count: usize,
    ) -> Self {
        let locale_code = normalize_locale_code(&locale_code.into());
        let relative_path = relative_path.into().replace('\\', "/");
        let depth = path_depth(&relative_path);
        let score = score_candidate(&locale_code, &relative_path, sibling_locale_count);
        Self {
            locale_code,
            file_path,
            relative_path,
            depth,
            sibling_locale_count,
            score,
        }
    }

    /// File name without directories, lower-cased (e.g. `en.json`)
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| normalize_locale_code(&n.to_string_lossy()))
            .unwrap_or_default()
    }
}

pub fn path_depth(relative_path: &str) -> usize {
    relative_path.split('/').count()
}

/// Rank a locale file: English labels first, then shallow paths in shared directories.
pub fn score_candidate(locale_code: &str, relative_path: &str, sibling_locale_count: usize) -> i64 {
    let normalized = normalize_locale_code(locale_code);
    let base = if normalized == "en" {
        SCORE_EXACT_EN
    } else if normalized.starts_with("en-") {
        SCORE_EN_VARIANT
    } else {
        SCORE_OTHER
    };
    let depth_penalty = path_depth(relative_path) as i64 * DEPTH_PENALTY;
    let length_penalty = relative_path.chars().count() as i64;
    let sibling_bonus = sibling_locale_count as i64 * SIBLING_BONUS;
    base + sibling_bonus - depth_penalty - length_penalty
}

/// Score descending, then depth ascending, then relative path ascending.
pub fn compare_candidates(a: &LocaleCandidate, b: &LocaleCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.depth.cmp(&b.depth))
        .then_with(|| a.relative_path.cmp(&b.relative_path))
}
