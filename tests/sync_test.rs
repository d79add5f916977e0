use i18n_sync::{
    run_sync, FallbackPolicy, OverrideMode, ScriptedResolver, SyncError, SyncRequest,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch project: `locales/` with catalogs and a `rows.json` sheet dump.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("locales")).unwrap();
        Self { dir }
    }

    fn catalog(self, name: &str, content: Value) -> Self {
        let text = format!("{}\n", serde_json::to_string_pretty(&content).unwrap());
        fs::write(self.locale_dir().join(name), text).unwrap();
        self
    }

    fn rows(self, rows: Value) -> Self {
        fs::write(self.rows_path(), rows.to_string()).unwrap();
        self
    }

    fn locale_dir(&self) -> PathBuf {
        self.dir.path().join("locales")
    }

    fn rows_path(&self) -> PathBuf {
        self.dir.path().join("rows.json")
    }

    fn request(&self) -> SyncRequest {
        SyncRequest::new(self.rows_path(), self.locale_dir()).with_cleanup_temp_excel(false)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.locale_dir().join(name)).unwrap()
    }

    fn read_json(&self, name: &str) -> Value {
        serde_json::from_str(&self.read(name)).unwrap()
    }
}

fn keys(value: &Value) -> Vec<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

fn backup_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.to_string_lossy().contains(".bak"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_rejected_override_leaves_catalog_unchanged() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"home.title": "Welcome"}))
        .rows(json!([{"key": "home.title", "en": "Welcome Back"}]));
    let before = fixture.read("en.json");

    let request = fixture
        .request()
        .with_write(true)
        .with_override_mode(OverrideMode::RejectAll);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert_eq!(summary.report.summary.override_candidates, 1);
    assert_eq!(summary.report.overrides[0].changed_locales, vec!["en"]);
    assert!(!summary.report.overrides[0].accepted);
    assert!(summary.written.is_empty());
    assert_eq!(fixture.read("en.json"), before);
}

#[test]
fn test_accepted_override_is_written_and_backup_removed() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"home.title": "Welcome", "home.body": "Body"}))
        .catalog("de.json", json!({"home.title": "Willkommen", "home.body": "Text"}))
        .rows(json!([{"key": "home.title", "en": "Welcome Back", "de": "Willkommen zurück"}]));
    let backups = fixture.dir.path().join("backups");

    let request = fixture
        .request()
        .with_write(true)
        .with_override_mode(OverrideMode::AcceptAll)
        .with_backup_dir(backups.clone());
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert_eq!(summary.written.len(), 2);
    assert_eq!(
        fixture.read_json("en.json"),
        json!({"home.title": "Welcome Back", "home.body": "Body"})
    );
    assert_eq!(fixture.read_json("de.json")["home.title"], "Willkommen zurück");
    assert_eq!(keys(&fixture.read_json("de.json")), vec!["home.title", "home.body"]);
    assert!(backup_files(&backups).is_empty());
}

#[test]
fn test_keep_backups_leaves_previous_content() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"a": "A"}))
        .rows(json!([{"key": "a", "en": "A2"}]));

    let request = fixture
        .request()
        .with_write(true)
        .with_keep_backups(true)
        .with_override_mode(OverrideMode::AcceptAll);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert_eq!(summary.backups.len(), 1);
    let backup = &summary.backups[0];
    assert!(backup.starts_with(fixture.locale_dir()));
    assert!(backup.to_string_lossy().ends_with(".bak"));
    let previous: Value = serde_json::from_str(&fs::read_to_string(backup).unwrap()).unwrap();
    assert_eq!(previous, json!({"a": "A"}));
}

#[test]
fn test_generated_keys_are_added_in_section_order() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"checkout.title": "Checkout", "home.title": "Home"}))
        .catalog("de.json", json!({"checkout": {"title": "Kasse"}}))
        .rows(json!([
            {"key": "", "en": "Click *Save* to continue"},
            {"key": "*checkout*", "en": "Pay now"}
        ]));

    let request = fixture.request().with_write(true);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    let en = fixture.read_json("en.json");
    assert_eq!(
        keys(&en),
        vec!["checkout.title", "checkout_pay_now", "home.title", "click_save_to_continue"]
    );
    assert_eq!(en["checkout_pay_now"], "Pay now");

    // nested catalogs stay nested, blank translations stay empty
    assert_eq!(
        fixture.read_json("de.json"),
        json!({"checkout": {"title": "Kasse"}, "checkout_pay_now": "", "click_save_to_continue": ""})
    );

    let generated = &summary.report.generated_keys;
    assert_eq!(generated.len(), 2);
    assert_eq!(generated[0].key, "click_save_to_continue");
    assert_eq!(generated[0].from_key, None);
    assert_eq!(generated[1].key, "checkout_pay_now");
    assert_eq!(generated[1].from_key.as_deref(), Some("*checkout*"));
    assert_eq!(
        summary.report.new_entries,
        vec!["checkout_pay_now", "click_save_to_continue"]
    );
}

#[test]
fn test_generated_key_named_like_a_section_keeps_the_section() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"home": {"title": "Welcome", "body": "Text"}}))
        .catalog("de.json", json!({"home": {"title": "Willkommen"}}))
        .rows(json!([{"key": "", "en": "Home"}]));

    let request = fixture
        .request()
        .with_write(true)
        .with_override_mode(OverrideMode::RejectAll);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert_eq!(
        fixture.read("en.json"),
        "{\n  \"home\": {\n    \"title\": \"Welcome\",\n    \"body\": \"Text\"\n  },\n  \"home_2\": \"Home\"\n}\n"
    );
    assert_eq!(
        fixture.read_json("de.json"),
        json!({"home": {"title": "Willkommen"}, "home_2": ""})
    );
    assert_eq!(summary.report.generated_keys[0].key, "home_2");
    assert_eq!(summary.report.generated_keys[0].from_key, None);
}

#[test]
fn test_write_keeps_non_string_values() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"count": 3, "enabled": true, "legacy": null, "a": "A"}))
        .rows(json!([{"key": "b", "en": "B"}]));

    run_sync(fixture.request().with_write(true), &mut ScriptedResolver::default()).unwrap();

    assert_eq!(
        fixture.read("en.json"),
        "{\n  \"count\": 3,\n  \"enabled\": true,\n  \"legacy\": null,\n  \"a\": \"A\",\n  \"b\": \"B\"\n}\n"
    );
}

#[test]
fn test_write_keeps_arrays_and_empty_sections() {
    let fixture = Fixture::new()
        .catalog(
            "en.json",
            json!({"limits": {"max": 10}, "steps": ["one", "two"], "empty": {}, "title": "T"}),
        )
        .rows(json!([{"key": "limits.label", "en": "Limit"}]));

    run_sync(fixture.request().with_write(true), &mut ScriptedResolver::default()).unwrap();

    assert_eq!(
        fixture.read("en.json"),
        concat!(
            "{\n",
            "  \"limits\": {\n",
            "    \"max\": 10,\n",
            "    \"label\": \"Limit\"\n",
            "  },\n",
            "  \"steps\": [\n",
            "    \"one\",\n",
            "    \"two\"\n",
            "  ],\n",
            "  \"empty\": {},\n",
            "  \"title\": \"T\"\n",
            "}\n"
        )
    );
}

#[test]
fn test_mapping_conflict_blocks_write() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"home.title": "Welcome"}))
        .catalog("pt.json", json!({"home.title": "Bem-vindo"}))
        .catalog("pt-br.json", json!({"home.title": "Bem-vindo"}))
        .rows(json!([
            {"key": "home.title", "en": "Welcome Back", "ptbr": "Bem-vindo de volta"},
            {"key": "home.new", "en": "New"}
        ]));
    let before = fixture.read("en.json");

    let request = fixture
        .request()
        .with_write(true)
        .with_override_mode(OverrideMode::AcceptAll);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert!(summary.report.write_blocked);
    assert_eq!(summary.report.conflicts.len(), 1);
    assert_eq!(summary.report.conflicts[0].column, "ptbr");
    assert_eq!(summary.report.conflicts[0].locales, vec!["pt", "pt-br"]);
    assert!(summary.written.is_empty());
    assert_eq!(fixture.read("en.json"), before);
    assert!(backup_files(&fixture.locale_dir()).is_empty());
}

#[test]
fn test_override_map_resolves_conflict() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"home.title": "Welcome"}))
        .catalog("pt.json", json!({"home.title": "Bem-vindo"}))
        .catalog("pt-br.json", json!({"home.title": "Bem-vindo"}))
        .rows(json!([{"key": "home.title", "en": "Welcome", "ptbr": "Olá", "pt": "Boas-vindas"}]));

    let map = [("pt".to_string(), "pt".to_string())].into_iter().collect();
    let request = fixture
        .request()
        .with_write(true)
        .with_override_map(map)
        .with_override_mode(OverrideMode::AcceptAll);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert!(!summary.report.write_blocked);
    assert_eq!(fixture.read_json("pt.json")["home.title"], "Boas-vindas");
    assert_eq!(fixture.read_json("pt-br.json")["home.title"], "Olá");
}

#[test]
fn test_fallback_policy_for_new_entries() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({}))
        .catalog("ja.json", json!({}))
        .catalog("fr.json", json!({}))
        .rows(json!([{"key": "greeting", "en": "Hello", "fr": "Bonjour"}]));

    let request = fixture.request().with_write(true).with_fallback(FallbackPolicy::En);
    run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert_eq!(fixture.read_json("ja.json"), json!({"greeting": "Hello"}));
    assert_eq!(fixture.read_json("fr.json"), json!({"greeting": "Bonjour"}));
}

#[test]
fn test_preview_reports_without_writing() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"a": "A"}))
        .rows(json!([{"key": "a", "en": "A2"}, {"key": "b", "en": "B"}]));
    let before = fixture.read("en.json");

    let request = fixture.request().with_override_mode(OverrideMode::AcceptAll);
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();

    assert_eq!(fixture.read("en.json"), before);
    assert!(summary.written.is_empty());
    assert_eq!(summary.report.summary.confirmed_overrides, 1);
    assert_eq!(summary.report.changed_files, vec![fixture.locale_dir().join("en.json")]);
}

#[test]
fn test_confirm_each_uses_resolver_answers() {
    let fixture = Fixture::new()
        .catalog("en.json", json!({"a": "A", "b": "B", "c": "C"}))
        .rows(json!([
            {"key": "a", "en": "A2"},
            {"key": "b", "en": "B2"},
            {"key": "c", "en": "C2"}
        ]));

    let mut resolver = ScriptedResolver::new(OverrideMode::ConfirmEach).with_answers([false, true, false]);
    let request = fixture.request().with_write(true);
    let summary = run_sync(request, &mut resolver).unwrap();

    let accepted: Vec<bool> = summary.report.overrides.iter().map(|o| o.accepted).collect();
    assert_eq!(accepted, vec![false, true, false]);
    assert_eq!(fixture.read_json("en.json"), json!({"a": "A", "b": "B2", "c": "C"}));
}

#[test]
fn test_base_fallback_when_no_english_catalog() {
    let fixture = Fixture::new()
        .catalog("de.json", json!({"a": "A"}))
        .rows(json!([{"key": "a", "en": "A"}]));

    let err = run_sync(fixture.request(), &mut ScriptedResolver::default()).unwrap_err();
    assert!(matches!(err, SyncError::NoCandidateFound { .. }));

    let request = fixture.request().with_base_fallback("de");
    let summary = run_sync(request, &mut ScriptedResolver::default()).unwrap();
    assert!(summary.resolution.used_fallback);
    assert_eq!(summary.report.base_locale, "de");
}

#[test]
fn test_empty_locale_dir_is_fatal() {
    let fixture = Fixture::new().rows(json!([]));
    let err = run_sync(fixture.request(), &mut ScriptedResolver::default()).unwrap_err();
    assert!(matches!(err, SyncError::NoLocaleFilesFound { .. }));
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_catalogs_are_written_back_as_yaml() {
    use i18n_sync::parse::parse_document;

    let fixture = Fixture::new().rows(json!([{"key": "home.subtitle", "en": "Hi", "de": "Hallo"}]));
    fs::write(fixture.locale_dir().join("en.yml"), "home:\n  title: Welcome\n").unwrap();
    fs::write(fixture.locale_dir().join("de.yml"), "home:\n  title: Willkommen\n").unwrap();

    run_sync(fixture.request().with_write(true), &mut ScriptedResolver::default()).unwrap();

    let path = fixture.locale_dir().join("de.yml");
    let document = parse_document(&path, &fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document, json!({"home": {"title": "Willkommen", "subtitle": "Hallo"}}));
}
