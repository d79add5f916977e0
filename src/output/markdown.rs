use crate::sync::{ChangeReport, RunMode};

/// Formatter for the human-readable Markdown report printed after a run
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Render the whole report: summary table, mode, then one section per list.
    pub fn format(&self, report: &ChangeReport) -> String {
        let mut lines: Vec<String> = Vec::new();
        let summary = &report.summary;

        lines.push("## 🌍 i18n sync report".to_string());
        lines.push(String::new());
        lines.push("| Kind | Count | Notes |".to_string());
        lines.push("| --- | ---: | --- |".to_string());
        lines.push(format!(
            "| Override candidates | {} | {} confirmed |",
            summary.override_candidates, summary.confirmed_overrides
        ));
        lines.push(format!(
            "| New entries | {} | missing locales filled per fallback policy |",
            summary.new_entries
        ));
        lines.push(format!(
            "| Generated keys | {} | rows without a usable key |",
            summary.generated_keys
        ));
        lines.push(format!(
            "| Mapping conflicts | {} | several locales read one column |",
            summary.mapping_conflicts
        ));
        lines.push(String::new());

        lines.push(match report.mode {
            RunMode::Preview => "- Mode: dry-run (nothing written)".to_string(),
            RunMode::Write => "- Mode: write".to_string(),
        });
        if let Some(base_file) = &report.base_file {
            lines.push(format!("- Base: `{}` ({})", base_file.display(), report.base_locale));
        }
        if report.write_blocked {
            lines.push("- Write status: blocked by mapping conflicts".to_string());
        }
        lines.push(String::new());

        if !report.conflicts.is_empty() {
            lines.push("### ⚠️ Mapping conflicts".to_string());
            for conflict in &report.conflicts {
                lines.push(format!(
                    "- Column `{}` <- locales: {}",
                    conflict.column,
                    conflict.locales.join(", ")
                ));
            }
            lines.push(String::new());
        }

        lines.push("### 🔁 Override candidates".to_string());
        if report.overrides.is_empty() {
            lines.push("- none".to_string());
        }
        for item in &report.overrides {
            let marker = if item.accepted { "✅" } else { "⏭️" };
            lines.push(format!(
                "{}. {} `{}` ({})",
                item.number,
                marker,
                item.key,
                item.changed_locales.join(", ")
            ));
        }
        lines.push(String::new());

        lines.push("### ➕ New entries".to_string());
        if report.new_entries.is_empty() {
            lines.push("- none".to_string());
        }
        for key in &report.new_entries {
            lines.push(format!("- `{}`", key));
        }
        lines.push(String::new());

        lines.push("### ✨ Generated keys".to_string());
        if report.generated_keys.is_empty() {
            lines.push("- none".to_string());
        }
        for item in &report.generated_keys {
            let suffix = item
                .from_key
                .as_ref()
                .map(|from| format!(" (from \"{}\")", from))
                .unwrap_or_default();
            lines.push(format!("- `{}` from \"{}\"{}", item.key, item.en, suffix));
        }

        lines.join("\n")
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}
