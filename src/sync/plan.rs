use crate::config::FallbackPolicy;
use crate::error::{Result, SyncError};
use crate::locale::{LocaleMapping, MappingConflict};
use crate::parse::{key_covers, FlatCatalog};
use crate::sheet::{disambiguate, TranslationRow};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::{Catalog, CatalogSet};
use super::decision::Decisions;
use super::ordering::{build_ordered_catalog, same_content};
use super::report::{ChangeReport, RunMode};

/// An existing key whose catalog text differs from the incoming row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideCandidate {
    pub key: String,
    /// Catalog text per changed locale (`""` when the locale lacked the key)
    pub before: IndexMap<String, String>,
    /// Spreadsheet text per changed locale
    pub after: IndexMap<String, String>,
    /// Sorted, unique
    pub changed_locales: Vec<String>,
}

/// A new entry whose key was synthesized rather than taken from the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedKey {
    pub key: String,
    pub en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_key: Option<String>,
}

/// Find every row whose key exists in the base catalog with different text in
/// at least one mapped locale.
///
/// Locales where the row has no text, or that have no catalog, are not compared.
pub fn build_override_candidates(
    rows: &[TranslationRow],
    catalogs: &CatalogSet,
    mapping: &LocaleMapping,
) -> Result<Vec<OverrideCandidate>> {
    let base = catalogs.base()?;
    let mut candidates = Vec::new();

    for row in rows {
        let Some(base_before) = base.entries.get(&row.key) else {
            continue;
        };

        let mut before = IndexMap::new();
        let mut after = IndexMap::new();
        if *base_before != row.en {
            before.insert(base.locale.clone(), base_before.clone());
            after.insert(base.locale.clone(), row.en.clone());
        }

        for (locale, column) in mapping.iter() {
            if locale == base.locale {
                continue;
            }
            let Some(next) = row.value(column) else {
                continue;
            };
            let Some(catalog) = catalogs.get(locale) else {
                continue;
            };
            let prev = catalog.entries.get(&row.key).map(String::as_str).unwrap_or("");
            if prev != next {
                before.insert(locale.to_string(), prev.to_string());
                after.insert(locale.to_string(), next.to_string());
            }
        }

        if !before.is_empty() {
            let mut changed_locales: Vec<String> = before.keys().cloned().collect();
            changed_locales.sort();
            changed_locales.dedup();
            candidates.push(OverrideCandidate {
                key: row.key.clone(),
                before,
                after,
                changed_locales,
            });
        }
    }

    Ok(candidates)
}

/// Everything a run would do, before any override decision is taken
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub snapshot: CatalogSet,
    pub mapping: LocaleMapping,
    /// Deduplicated rows with their final keys
    pub rows: Vec<TranslationRow>,
    pub override_candidates: Vec<OverrideCandidate>,
    /// Keys added to every catalog, in row order
    pub new_entries: Vec<String>,
    pub generated_keys: Vec<GeneratedKey>,
    /// Working copies holding the new entries, keyed by locale
    pub working: IndexMap<String, FlatCatalog>,
}

impl SyncPlan {
    pub fn base_locale(&self) -> &str {
        self.snapshot.base_locale()
    }

    pub fn conflicts(&self) -> &[MappingConflict] {
        self.mapping.conflicts()
    }

    /// Ambiguous column attribution forbids writing, whatever was decided.
    pub fn write_blocked(&self) -> bool {
        self.mapping.has_conflicts()
    }

    /// Fail with the first mapping conflict, for callers that treat it as fatal.
    pub fn ensure_writable(&self) -> Result<()> {
        match self.conflicts().first() {
            Some(conflict) => Err(SyncError::MappingConflict {
                column: conflict.column.clone(),
                locales: conflict.locales.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn row(&self, key: &str) -> Option<&TranslationRow> {
        self.rows.iter().find(|row| row.key == key)
    }
}

/// Final content for one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUpdate {
    pub catalog: Catalog,
    pub entries: FlatCatalog,
    /// False when the ordered result equals the snapshot
    pub changed: bool,
}

impl CatalogUpdate {
    pub fn render(&self) -> Result<String> {
        self.catalog.render(&self.entries)
    }
}

/// Result of applying decisions to a plan
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub catalogs: Vec<CatalogUpdate>,
    pub report: ChangeReport,
}

impl SyncOutcome {
    pub fn changed(&self) -> impl Iterator<Item = &CatalogUpdate> {
        self.catalogs.iter().filter(|update| update.changed)
    }
}

/// Diffs spreadsheet rows against the catalog set and merges them in.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    fallback: FallbackPolicy,
}

impl Synchronizer {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }

    /// Compute override candidates and seed new entries into working copies.
    pub fn plan(
        &self,
        rows: Vec<TranslationRow>,
        catalogs: &CatalogSet,
        mapping: &LocaleMapping,
    ) -> Result<SyncPlan> {
        let base = catalogs.base()?;
        let base_locale = base.locale.clone();

        let mut by_key: IndexMap<String, TranslationRow> = IndexMap::new();
        for row in rows {
            by_key.insert(row.key.clone(), row);
        }
        let mut rows: Vec<TranslationRow> = by_key.into_values().collect();

        let override_candidates = build_override_candidates(&rows, catalogs, mapping)?;

        let mut working: IndexMap<String, FlatCatalog> = catalogs
            .iter()
            .map(|catalog| (catalog.locale.clone(), catalog.entries.clone()))
            .collect();
        let mut new_entries = Vec::new();
        let mut generated_keys = Vec::new();

        for row in &mut rows {
            if base.entries.contains_key(&row.key) {
                continue;
            }

            // A new key must not name a base entry, a section of any catalog,
            // nor a key or section added earlier in this run.
            let final_key = disambiguate(&row.key, |k| {
                base.entries.contains_key(k)
                    || catalogs.iter().any(|catalog| catalog.has_section(k))
                    || new_entries.iter().any(|added: &String| key_covers(k, added))
            });
            if final_key != row.key {
                debug!(key = %final_key, original = %row.key, "key collides with catalog entry");
                let original = row.key.clone();
                row.mark_rekeyed(&original);
                row.key = final_key;
            }
            working
                .entry(base_locale.clone())
                .or_insert_with(FlatCatalog::new)
                .insert(row.key.clone(), row.en.clone());
            new_entries.push(row.key.clone());

            if row.is_generated_key() {
                generated_keys.push(GeneratedKey {
                    key: row.key.clone(),
                    en: row.en.clone(),
                    from_key: row
                        .meta
                        .as_ref()
                        .map(|m| m.original_key.clone())
                        .filter(|k| !k.is_empty()),
                });
            }

            for (locale, entries) in working.iter_mut() {
                let Some(column) = mapping.column_for(locale) else {
                    continue;
                };
                let value = match row.value(column) {
                    Some(value) => value.to_string(),
                    None if *locale == base_locale || self.fallback == FallbackPolicy::En => {
                        row.en.clone()
                    }
                    None => String::new(),
                };
                entries.insert(row.key.clone(), value);
            }
        }

        info!(
            rows = rows.len(),
            overrides = override_candidates.len(),
            new_entries = new_entries.len(),
            conflicts = mapping.conflicts().len(),
            "planned synchronization"
        );

        Ok(SyncPlan {
            snapshot: catalogs.clone(),
            mapping: mapping.clone(),
            rows,
            override_candidates,
            new_entries,
            generated_keys,
            working,
        })
    }

    /// Apply accepted overrides and lay out each catalog in its final order.
    pub fn apply(&self, plan: &SyncPlan, decisions: &Decisions, mode: RunMode) -> SyncOutcome {
        let mut working = plan.working.clone();

        for index in decisions.accepted() {
            let Some(candidate) = plan.override_candidates.get(index) else {
                continue;
            };
            let Some(row) = plan.row(&candidate.key) else {
                continue;
            };
            for (locale, entries) in working.iter_mut() {
                let Some(column) = plan.mapping.column_for(locale) else {
                    continue;
                };
                if let Some(value) = row.value(column) {
                    entries.insert(candidate.key.clone(), value.to_string());
                }
            }
        }

        let catalogs: Vec<CatalogUpdate> = plan
            .snapshot
            .iter()
            .map(|catalog| {
                let next = working.get(&catalog.locale).cloned().unwrap_or_default();
                let entries = build_ordered_catalog(&catalog.entries, &next, &plan.new_entries);
                let changed = !same_content(&catalog.entries, &entries);
                CatalogUpdate {
                    catalog: catalog.clone(),
                    entries,
                    changed,
                }
            })
            .collect();

        let report = ChangeReport::build(plan, decisions, &catalogs, mode);
        SyncOutcome { catalogs, report }
    }
}
