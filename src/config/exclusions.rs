use std::path::Path;

/// Directory names never descended into while discovering locale files.
pub fn default_exclusions() -> Vec<&'static str> {
    vec![
        ".git",
        ".svn",
        ".hg",
        ".idea",
        ".vscode",
        "node_modules",
        "dist",
        "build",
        "coverage",
        "target",
    ]
}

/// Backup files written by a previous run (`en.json.<ts>.bak`, `en.<ts>.bak.json`).
pub fn is_backup_artifact(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".bak") || name.contains(".bak.")
}

/// True when a directory entry with this name should be pruned from the walk.
pub fn is_excluded_dir(name: &str, extra: &[String]) -> bool {
    default_exclusions().contains(&name) || extra.iter().any(|ex| ex == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let exclusions = default_exclusions();
        assert!(exclusions.contains(&"node_modules"));
        assert!(exclusions.contains(&".git"));
    }

    #[test]
    fn test_backup_artifacts_detected() {
        assert!(is_backup_artifact(Path::new(
            "locales/en.json.2024-01-01T00-00-00-000Z.bak"
        )));
        assert!(is_backup_artifact(Path::new(
            "backups/en.2024-01-01T00-00-00-000Z.bak.json"
        )));
        assert!(!is_backup_artifact(Path::new("locales/en.json")));
        assert!(!is_backup_artifact(Path::new("locales/bakery.json")));
    }

    #[test]
    fn test_extra_exclusions() {
        let extra = vec!["backups".to_string()];
        assert!(is_excluded_dir("backups", &extra));
        assert!(is_excluded_dir(".git", &[]));
        assert!(!is_excluded_dir("locales", &extra));
    }
}
