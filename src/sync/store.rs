use crate::config::is_backup_artifact;
use crate::error::{Result, SyncError};
use crate::locale::LocaleCandidate;
use crate::parse::{parse_document, DocumentFormat};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::catalog::{Catalog, CatalogSet};
use super::plan::CatalogUpdate;

/// Extensions of workbooks that may be throwaway exports.
const TEMP_WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Path fragment of the generator's scratch directory.
const GENERATOR_SCRATCH_DIR: &str = ".cursor/skills/i18n-generator/";

/// What a successful write stage produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub written: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
}

/// Reads catalogs next to the base file and writes them back with backups.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    backup_dir: Option<PathBuf>,
}

impl CatalogStore {
    pub fn new(backup_dir: Option<PathBuf>) -> Self {
        Self { backup_dir }
    }

    /// Load every locale file sitting beside `base` in the same format family,
    /// keyed by normalized locale code.
    pub fn load_catalog_set(&self, base: &LocaleCandidate) -> Result<CatalogSet> {
        let base_format = DocumentFormat::from_path(&base.file_path)?;
        let dir = parent_dir(&base.file_path);

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && !is_backup_artifact(path))
            .filter(|path| DocumentFormat::detect(path) == Some(base_format))
            .collect();
        files.sort();

        let mut set = CatalogSet::new(&base.locale_code);
        for path in files {
            let locale = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let content = fs::read_to_string(&path)?;
            let document = parse_document(&path, &content)?;
            let catalog = Catalog::from_document(&locale, path, base_format, &document);
            debug!(locale = %catalog.locale, path = %catalog.path.display(), entries = catalog.entries.len(), "loaded catalog");
            set.insert(catalog);
        }

        info!(catalogs = set.len(), dir = %dir.display(), "loaded catalog set");
        Ok(set)
    }

    /// Where the backup of `file` taken at `timestamp` goes.
    pub fn backup_path(&self, file: &Path, timestamp: &str) -> PathBuf {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match &self.backup_dir {
            Some(dir) => {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                let ext = file
                    .extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_else(|| "json".to_string());
                dir.join(format!("{}.{}.bak.{}", stem, timestamp, ext))
            }
            None => file.with_file_name(format!("{}.{}.bak", file_name, timestamp)),
        }
    }

    /// Copy `file` to its backup location.
    pub fn backup(&self, file: &Path) -> Result<PathBuf> {
        let target = self.backup_path(file, &backup_timestamp());
        if let Some(dir) = &self.backup_dir {
            fs::create_dir_all(dir).map_err(|e| SyncError::backup_failed(file, e.to_string()))?;
        }
        fs::copy(file, &target).map_err(|e| SyncError::backup_failed(file, e.to_string()))?;
        debug!(file = %file.display(), backup = %target.display(), "backed up catalog");
        Ok(target)
    }

    /// Back up and rewrite every changed catalog.
    ///
    /// On failure every file already rewritten is restored from its backup and
    /// the created backups are removed before the error is returned.
    pub fn write_all(&self, updates: &[CatalogUpdate]) -> Result<WriteResult> {
        let mut result = WriteResult::default();

        for update in updates.iter().filter(|u| u.changed) {
            if let Err(err) = self.write_one(update, &mut result) {
                warn!(file = %update.catalog.path.display(), error = %err, "write failed, rolling back");
                self.rollback(&result);
                cleanup_backups(&result.backups);
                return Err(err);
            }
        }

        Ok(result)
    }

    fn write_one(&self, update: &CatalogUpdate, result: &mut WriteResult) -> Result<()> {
        let path = &update.catalog.path;
        let content = update.render()?;

        let backup = self.backup(path)?;
        result.backups.push(backup);

        let mut temp = NamedTempFile::new_in(parent_dir(path))?;
        temp.write_all(content.as_bytes())?;
        temp.persist(path).map_err(|e| SyncError::Io(e.error))?;

        result.written.push(path.clone());
        info!(file = %path.display(), entries = update.entries.len(), "wrote catalog");
        Ok(())
    }

    fn rollback(&self, result: &WriteResult) {
        for (path, backup) in result.written.iter().zip(&result.backups) {
            match fs::copy(backup, path) {
                Ok(_) => debug!(file = %path.display(), "restored from backup"),
                Err(e) => warn!(file = %path.display(), error = %e, "failed to restore from backup"),
            }
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

/// UTC instant with millisecond precision, `:` and `.` replaced by `-`.
pub fn backup_timestamp() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Remove backups, logging rather than failing on errors.
pub fn cleanup_backups(backups: &[PathBuf]) {
    for backup in backups {
        match fs::remove_file(backup) {
            Ok(()) => debug!(backup = %backup.display(), "removed backup"),
            Err(e) => warn!(backup = %backup.display(), error = %e, "failed to remove backup"),
        }
    }
}

/// True for a throwaway workbook export: an `.xlsx`/`.xls` named like a temp
/// file and living under the generator's scratch dir. Workbooks anywhere else,
/// the system temp dir included, belong to the user.
pub fn should_cleanup_temp_workbook(path: &Path) -> bool {
    let is_workbook = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| TEMP_WORKBOOK_EXTENSIONS.contains(&ext.as_str()));
    if !is_workbook {
        return false;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !(name.starts_with("tmp-") || name.contains("tmp")) {
        return false;
    }

    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .to_string_lossy()
        .replace('\\', "/")
        .contains(GENERATOR_SCRATCH_DIR)
}

/// Delete `path` if it looks like a throwaway workbook. Returns whether it was removed.
pub fn cleanup_temp_workbook(path: &Path) -> bool {
    if !should_cleanup_temp_workbook(path) {
        return false;
    }
    match fs::remove_file(path) {
        Ok(()) => {
            info!(file = %path.display(), "removed temporary workbook");
            true
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to remove temporary workbook");
            false
        }
    }
}
