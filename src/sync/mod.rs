pub mod catalog;
pub mod decision;
pub mod ordering;
pub mod plan;
pub mod report;
pub mod store;

pub use catalog::{Catalog, CatalogSet, CatalogShape};
pub use decision::{resolve_decisions, DecisionResolver, Decisions, PromptResolver, ScriptedResolver};
pub use ordering::{build_ordered_catalog, leading_token};
pub use plan::{
    build_override_candidates, CatalogUpdate, GeneratedKey, OverrideCandidate, SyncOutcome, SyncPlan,
    Synchronizer,
};
pub use report::{ChangeReport, OverrideItem, ReportSummary, RunMode};
pub use store::{cleanup_backups, cleanup_temp_workbook, should_cleanup_temp_workbook, CatalogStore, WriteResult};
