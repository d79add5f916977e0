use crate::config::{is_backup_artifact, is_english_locale, is_excluded_dir, normalize_locale_code};
use crate::error::{Result, SyncError};
use crate::parse::{flatten, is_locale_file, parse_document, FlatCatalog};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::candidate::{compare_candidates, LocaleCandidate};

/// Outcome of picking the base locale under a directory
#[derive(Debug, Clone)]
pub struct LocaleResolution {
    pub root: PathBuf,
    pub selected: LocaleCandidate,
    /// Every discovered candidate, best first
    pub candidates: Vec<LocaleCandidate>,
    /// The selected file, flattened
    pub flat_catalog: FlatCatalog,
    /// True when no English file existed and the fallback code was used
    pub used_fallback: bool,
}

/// `LocaleResolver` discovers locale files under a root directory and picks the
/// canonical base catalog, preferring English.
#[derive(Debug, Default)]
pub struct LocaleResolver {
    exclusions: Vec<String>,
}

impl LocaleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra directory names to prune, on top of the defaults
    pub fn set_exclusions(&mut self, exclusions: Vec<String>) {
        self.exclusions = exclusions;
    }

    /// Discover, rank and select the base locale under `root`, then flatten it.
    pub fn resolve(&self, root: &Path, fallback_locale: Option<&str>) -> Result<LocaleResolution> {
        let candidates = self.discover(root)?;
        if candidates.is_empty() {
            return Err(SyncError::NoLocaleFilesFound {
                dir: root.to_path_buf(),
            });
        }

        let (selected, used_fallback) = pick_candidate(&candidates, fallback_locale)
            .ok_or_else(|| {
                SyncError::no_candidate_found(candidates.iter().map(|c| c.relative_path.as_str()))
            })?;
        let selected = selected.clone();
        info!(
            locale = %selected.locale_code,
            path = %selected.relative_path,
            used_fallback,
            "selected base locale"
        );

        let content = fs::read_to_string(&selected.file_path)?;
        let document = parse_document(&selected.file_path, &content)?;
        let flat_catalog = flatten(&document);

        Ok(LocaleResolution {
            root: root.to_path_buf(),
            selected,
            candidates,
            flat_catalog,
            used_fallback,
        })
    }

    /// Every locale file under `root`, ranked best first.
    pub fn discover(&self, root: &Path) -> Result<Vec<LocaleCandidate>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root).sort_by_file_name().into_iter();
        for entry in walker.filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !is_excluded_dir(&e.file_name().to_string_lossy(), &self.exclusions)
        }) {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file() && is_locale_file(path) && !is_backup_artifact(path) {
                files.push(path.to_path_buf());
            }
        }

        let mut per_dir: HashMap<PathBuf, usize> = HashMap::new();
        for file in &files {
            let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
            *per_dir.entry(parent).or_insert(0) += 1;
        }

        let mut candidates: Vec<LocaleCandidate> = files
            .into_iter()
            .map(|file| {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                let relative = file
                    .strip_prefix(root)
                    .unwrap_or(&file)
                    .to_string_lossy()
                    .to_string();
                let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
                let siblings = per_dir.get(&parent).copied().unwrap_or(1);
                LocaleCandidate::new(stem, file, relative, siblings)
            })
            .collect();
        candidates.sort_by(compare_candidates);

        debug!(count = candidates.len(), root = %root.display(), "discovered locale files");
        Ok(candidates)
    }
}

/// English candidates win outright; otherwise the fallback code is matched
/// against the locale code or the full file name.
fn pick_candidate<'a>(
    candidates: &'a [LocaleCandidate],
    fallback_locale: Option<&str>,
) -> Option<(&'a LocaleCandidate, bool)> {
    if let Some(english) = candidates
        .iter()
        .filter(|c| is_english_locale(&c.locale_code))
        .min_by(|a, b| compare_candidates(a, b))
    {
        return Some((english, false));
    }

    let fallback = normalize_locale_code(fallback_locale?);
    if fallback.is_empty() {
        return None;
    }
    candidates
        .iter()
        .filter(|c| c.locale_code == fallback || c.file_name() == fallback)
        .min_by(|a, b| compare_candidates(a, b))
        .map(|c| (c, true))
}
