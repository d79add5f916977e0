use crate::error::Result;
use crate::locale::MappingConflict;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::decision::Decisions;
use super::plan::{CatalogUpdate, GeneratedKey, SyncPlan};

/// Whether a run may touch the filesystem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Preview,
    Write,
}

impl RunMode {
    pub fn from_write_flag(write: bool) -> Self {
        if write {
            RunMode::Write
        } else {
            RunMode::Preview
        }
    }

    pub fn is_write(self) -> bool {
        self == RunMode::Write
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Preview => write!(f, "dry-run"),
            RunMode::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub override_candidates: usize,
    pub confirmed_overrides: usize,
    pub new_entries: usize,
    pub generated_keys: usize,
    pub mapping_conflicts: usize,
}

/// One override candidate as presented to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideItem {
    /// 1-based, matching the numbers used for selection
    pub number: usize,
    pub key: String,
    pub changed_locales: Vec<String>,
    pub accepted: bool,
}

/// Human-facing summary of a run.
///
/// Preview and write runs produce the same report apart from `mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    pub mode: RunMode,
    pub base_locale: String,
    /// Catalog file the run was keyed against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_file: Option<PathBuf>,
    /// Set whenever mapping conflicts exist; no file may be written then
    pub write_blocked: bool,
    pub summary: ReportSummary,
    pub conflicts: Vec<MappingConflict>,
    pub overrides: Vec<OverrideItem>,
    /// Sorted
    pub new_entries: Vec<String>,
    pub generated_keys: Vec<GeneratedKey>,
    /// Catalog files whose content differs from disk
    pub changed_files: Vec<PathBuf>,
}

impl ChangeReport {
    pub fn build(plan: &SyncPlan, decisions: &Decisions, catalogs: &[CatalogUpdate], mode: RunMode) -> Self {
        let overrides: Vec<OverrideItem> = plan
            .override_candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| OverrideItem {
                number: index + 1,
                key: candidate.key.clone(),
                changed_locales: candidate.changed_locales.clone(),
                accepted: decisions.is_accepted(index),
            })
            .collect();

        let mut new_entries = plan.new_entries.clone();
        new_entries.sort();

        Self {
            mode,
            base_locale: plan.base_locale().to_string(),
            base_file: plan.snapshot.base().ok().map(|catalog| catalog.path.clone()),
            write_blocked: plan.write_blocked(),
            summary: ReportSummary {
                override_candidates: overrides.len(),
                confirmed_overrides: overrides.iter().filter(|o| o.accepted).count(),
                new_entries: new_entries.len(),
                generated_keys: plan.generated_keys.len(),
                mapping_conflicts: plan.conflicts().len(),
            },
            conflicts: plan.conflicts().to_vec(),
            overrides,
            new_entries,
            generated_keys: plan.generated_keys.clone(),
            changed_files: catalogs
                .iter()
                .filter(|update| update.changed)
                .map(|update| update.catalog.path.clone())
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
