pub mod config;
pub mod error;
pub mod locale;
pub mod output;
pub mod parse;
pub mod sheet;
pub mod sync;

use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{info, warn};

// Re-export commonly used types
pub use config::{FallbackPolicy, OverrideMode};
pub use error::{Result, SyncError};
pub use locale::{LocaleCandidate, LocaleMapping, LocaleResolution, LocaleResolver, MappingConflict};
pub use output::MarkdownFormatter;
pub use parse::{flatten, unflatten, FlatCatalog};
pub use sheet::{read_rows, KeyDeriver, RawRow, TranslationRow};
pub use sync::{
    resolve_decisions, CatalogSet, CatalogStore, ChangeReport, DecisionResolver, Decisions,
    OverrideCandidate, PromptResolver, RunMode, ScriptedResolver, SyncOutcome, SyncPlan,
    Synchronizer,
};

/// Parameters for one synchronization run
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Spreadsheet (or JSON row dump) to read
    pub excel_path: PathBuf,
    /// Directory searched for the base catalog
    pub locale_dir: PathBuf,
    pub write: bool,
    pub fallback: FallbackPolicy,
    /// `locale -> column` entries replacing the default table
    pub override_map: IndexMap<String, String>,
    /// `None` asks the decision resolver
    pub override_mode: Option<OverrideMode>,
    pub backup_dir: Option<PathBuf>,
    pub keep_backups: bool,
    pub cleanup_temp_excel: bool,
    /// Base locale to use when no English catalog exists
    pub base_fallback: Option<String>,
}

impl SyncRequest {
    pub fn new(excel_path: PathBuf, locale_dir: PathBuf) -> Self {
        Self {
            excel_path,
            locale_dir,
            write: false,
            fallback: FallbackPolicy::Empty,
            override_map: IndexMap::new(),
            override_mode: None,
            backup_dir: None,
            keep_backups: false,
            cleanup_temp_excel: true,
            base_fallback: None,
        }
    }

    pub fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_override_map(mut self, override_map: IndexMap<String, String>) -> Self {
        self.override_map = override_map;
        self
    }

    pub fn with_override_mode(mut self, mode: OverrideMode) -> Self {
        self.override_mode = Some(mode);
        self
    }

    pub fn with_backup_dir(mut self, backup_dir: PathBuf) -> Self {
        self.backup_dir = Some(backup_dir);
        self
    }

    pub fn with_keep_backups(mut self, keep_backups: bool) -> Self {
        self.keep_backups = keep_backups;
        self
    }

    pub fn with_cleanup_temp_excel(mut self, cleanup: bool) -> Self {
        self.cleanup_temp_excel = cleanup;
        self
    }

    pub fn with_base_fallback(mut self, locale: impl Into<String>) -> Self {
        self.base_fallback = Some(locale.into());
        self
    }

    pub fn run_mode(&self) -> RunMode {
        RunMode::from_write_flag(self.write)
    }
}

/// Result of a synchronization run
#[derive(Debug)]
pub struct SyncSummary {
    pub resolution: LocaleResolution,
    pub report: ChangeReport,
    /// Catalog files rewritten on disk
    pub written: Vec<PathBuf>,
    /// Backups left on disk (only with `keep_backups`)
    pub backups: Vec<PathBuf>,
    pub removed_temp_excel: bool,
}

/// Main orchestrator that runs one spreadsheet-to-catalog synchronization
///
/// This function:
/// 1. Resolves the base catalog under `locale_dir` and loads its siblings
/// 2. Builds the locale mapping and reads the spreadsheet rows
/// 3. Plans overrides and new entries, then asks `resolver` about overrides
/// 4. Applies the decisions and, in write mode, backs up and rewrites catalogs
/// 5. Cleans up backups and throwaway workbooks
///
/// Writing is skipped entirely when the locale mapping has conflicts.
///
/// # Rust Book Reference
///
/// **Chapter 17.2: Using Trait Objects That Allow for Values of Different Types**
/// https://doc.rust-lang.org/book/ch17-02-trait-objects.html
///
/// `resolver` is a `&mut dyn DecisionResolver`, so the CLI can pass a terminal
/// prompt while tests pass a [`ScriptedResolver`] without making this function
/// generic.
#[must_use = "this function returns a Result that should be handled"]
pub fn run_sync(request: SyncRequest, resolver: &mut dyn DecisionResolver) -> Result<SyncSummary> {
    // Step 1: locate the base catalog and everything next to it
    let resolution =
        LocaleResolver::new().resolve(&request.locale_dir, request.base_fallback.as_deref())?;
    let store = CatalogStore::new(request.backup_dir.clone());
    let catalogs = store.load_catalog_set(&resolution.selected)?;

    // Step 2: column attribution and spreadsheet rows
    let mapping = LocaleMapping::build(&catalogs.locales(), catalogs.base_locale(), &request.override_map);
    let raw_rows = read_rows(&request.excel_path)?;
    let rows = KeyDeriver::new()
        .with_columns(mapping.columns())
        .derive_rows(&raw_rows);
    info!(rows = rows.len(), file = %request.excel_path.display(), "read spreadsheet rows");

    // Step 3: plan and decide
    let synchronizer = Synchronizer::new(request.fallback);
    let plan = synchronizer.plan(rows, &catalogs, &mapping)?;
    let decisions = resolve_decisions(
        &plan.override_candidates,
        request.override_mode.as_ref(),
        resolver,
    )?;

    // Step 4: apply and write
    let mode = request.run_mode();
    let outcome = synchronizer.apply(&plan, &decisions, mode);

    let write_result = if !mode.is_write() {
        Ok(sync::WriteResult::default())
    } else if plan.write_blocked() {
        warn!(conflicts = plan.conflicts().len(), "mapping conflicts block writing");
        Ok(sync::WriteResult::default())
    } else {
        store.write_all(&outcome.catalogs)
    };

    // Step 5: cleanup runs whether or not the write stage succeeded
    let removed_temp_excel =
        request.cleanup_temp_excel && sync::cleanup_temp_workbook(&request.excel_path);
    let written = write_result?;

    let backups = if request.keep_backups {
        written.backups
    } else {
        sync::cleanup_backups(&written.backups);
        Vec::new()
    };

    Ok(SyncSummary {
        resolution,
        report: outcome.report,
        written: written.written,
        backups,
        removed_temp_excel,
    })
}
