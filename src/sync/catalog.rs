use crate::config::normalize_locale_code;
use crate::error::{Result, SyncError};
use crate::parse::{
    flatten, is_flat_document, key_covers, leaves, rebuild, render_document, DocumentFormat, FlatCatalog, Leaf,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// How a catalog is laid out on disk, so write-back keeps its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogShape {
    /// Top-level `"dotted.key": "value"` pairs
    Flat,
    /// Nested objects and arrays
    Nested,
}

/// One locale's catalog, flattened, plus what is needed to write it back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub locale: String,
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub shape: CatalogShape,
    pub entries: FlatCatalog,
    /// Every leaf as read, nulls and empty sections included, with its JSON type
    pub layout: Vec<Leaf>,
}

impl Catalog {
    /// Build from a parsed document.
    pub fn from_document(locale: &str, path: PathBuf, format: DocumentFormat, document: &Value) -> Self {
        let shape = if is_flat_document(document) || document.as_object().is_some_and(Map::is_empty) {
            CatalogShape::Flat
        } else {
            CatalogShape::Nested
        };
        Self {
            locale: normalize_locale_code(locale),
            path,
            format,
            shape,
            entries: flatten(document),
            layout: leaves(document),
        }
    }

    /// A flat JSON catalog at `<locale>.json`, for callers that hold entries in memory.
    pub fn in_memory(locale: &str, entries: FlatCatalog) -> Self {
        let locale = normalize_locale_code(locale);
        Self {
            path: PathBuf::from(format!("{}.json", locale)),
            locale,
            format: DocumentFormat::Json,
            shape: CatalogShape::Flat,
            layout: entries.iter().map(|(k, v)| Leaf::literal(k, v.as_str())).collect(),
            entries,
        }
    }

    /// True when `key` names a section here, so a string stored under it would
    /// replace nested entries.
    pub fn has_section(&self, key: &str) -> bool {
        self.layout.iter().any(|leaf| {
            let existing = leaf.key();
            key_covers(key, &existing)
                && (existing != key || matches!(leaf.value, Value::Object(_) | Value::Array(_)))
        })
    }

    /// Document for `entries` in this catalog's shape.
    ///
    /// Leaves of keys whose text did not change are emitted as read, so numbers,
    /// booleans, nulls, arrays and empty sections survive. Only changed or added
    /// keys are written as strings; added keys nest along their dots unless the
    /// catalog is flat.
    pub fn to_document(&self, entries: &FlatCatalog) -> Result<Value> {
        let mut leading: Vec<&Leaf> = Vec::new();
        let mut groups: IndexMap<String, Vec<&Leaf>> = IndexMap::new();
        let mut anchor: Option<String> = None;
        for leaf in &self.layout {
            if leaf.text().is_some() {
                let key = leaf.key();
                groups.entry(key.clone()).or_default().push(leaf);
                anchor = Some(key);
            } else {
                match &anchor {
                    Some(key) => groups.entry(key.clone()).or_default().push(leaf),
                    None => leading.push(leaf),
                }
            }
        }

        let mut out: Vec<Leaf> = leading.into_iter().cloned().collect();
        for (key, text) in entries {
            match groups.shift_remove(key) {
                Some(group) if self.entries.get(key) == Some(text) => {
                    out.extend(group.into_iter().cloned());
                }
                Some(group) => out.extend(group.into_iter().map(|leaf| match leaf.text() {
                    Some(_) => Leaf {
                        path: leaf.path.clone(),
                        value: Value::String(text.clone()),
                    },
                    None => leaf.clone(),
                })),
                None => out.push(match self.shape {
                    CatalogShape::Flat => Leaf::literal(key, text.as_str()),
                    CatalogShape::Nested => Leaf::dotted(key, text.as_str()),
                }),
            }
        }
        // Entries never shrink; anything still grouped is kept as read.
        out.extend(groups.into_values().flatten().cloned());

        rebuild(&out)
    }

    /// Serialized file content for `entries`.
    pub fn render(&self, entries: &FlatCatalog) -> Result<String> {
        render_document(&self.path, self.format, &self.to_document(entries)?)
    }
}

/// All catalogs of a run, keyed by normalized locale code, with the base locale
/// every diff is keyed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSet {
    base_locale: String,
    catalogs: IndexMap<String, Catalog>,
}

impl CatalogSet {
    pub fn new(base_locale: &str) -> Self {
        Self {
            base_locale: normalize_locale_code(base_locale),
            catalogs: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, catalog: Catalog) {
        self.catalogs.insert(catalog.locale.clone(), catalog);
    }

    /// Builder-style [`CatalogSet::insert`] of an in-memory flat catalog
    pub fn with_entries(mut self, locale: &str, entries: FlatCatalog) -> Self {
        self.insert(Catalog::in_memory(locale, entries));
        self
    }

    pub fn base_locale(&self) -> &str {
        &self.base_locale
    }

    /// The base catalog; its absence makes synchronization impossible.
    pub fn base(&self) -> Result<&Catalog> {
        self.catalogs
            .get(&self.base_locale)
            .ok_or_else(|| SyncError::MissingBaseCatalog {
                locale: self.base_locale.clone(),
            })
    }

    pub fn get(&self, locale: &str) -> Option<&Catalog> {
        self.catalogs.get(&normalize_locale_code(locale))
    }

    pub fn locales(&self) -> Vec<String> {
        self.catalogs.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Catalog> {
        self.catalogs.values()
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Directory holding the base catalog, if any
    pub fn base_dir(&self) -> Option<&Path> {
        self.catalogs
            .get(&self.base_locale)
            .and_then(|c| c.path.parent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_detection_and_render() {
        let nested = json!({"home": {"title": "Welcome"}});
        let catalog = Catalog::from_document("EN", PathBuf::from("en.json"), DocumentFormat::Json, &nested);
        assert_eq!(catalog.locale, "en");
        assert_eq!(catalog.shape, CatalogShape::Nested);
        assert_eq!(catalog.to_document(&catalog.entries).unwrap(), nested);

        let flat = json!({"home.title": "Welcome"});
        let catalog = Catalog::from_document("en", PathBuf::from("en.json"), DocumentFormat::Json, &flat);
        assert_eq!(catalog.shape, CatalogShape::Flat);
        assert_eq!(
            catalog.render(&catalog.entries).unwrap(),
            "{\n  \"home.title\": \"Welcome\"\n}\n"
        );
    }

    fn with_added(catalog: &Catalog, pairs: &[(&str, &str)]) -> FlatCatalog {
        let mut entries = catalog.entries.clone();
        for (k, v) in pairs {
            entries.insert(k.to_string(), v.to_string());
        }
        entries
    }

    #[test]
    fn test_render_keeps_value_types_and_nulls() {
        let document = json!({"count": 3, "enabled": true, "legacy": null, "a": "A"});
        let catalog = Catalog::from_document("en", PathBuf::from("en.json"), DocumentFormat::Json, &document);
        assert_eq!(catalog.shape, CatalogShape::Flat);

        let entries = with_added(&catalog, &[("b", "B")]);
        assert_eq!(
            catalog.to_document(&entries).unwrap(),
            json!({"count": 3, "enabled": true, "legacy": null, "a": "A", "b": "B"})
        );
        assert_eq!(
            catalog.render(&entries).unwrap(),
            "{\n  \"count\": 3,\n  \"enabled\": true,\n  \"legacy\": null,\n  \"a\": \"A\",\n  \"b\": \"B\"\n}\n"
        );
    }

    #[test]
    fn test_render_replaces_only_changed_text() {
        let document = json!({"limits": {"max": 10, "label": "Max"}, "steps": ["one", "two"], "empty": {}});
        let catalog = Catalog::from_document("en", PathBuf::from("en.json"), DocumentFormat::Json, &document);

        let entries = with_added(&catalog, &[("limits.label", "Maximum"), ("limits.min", "Min")]);
        assert_eq!(
            catalog.to_document(&entries).unwrap(),
            json!({
                "limits": {"max": 10, "label": "Maximum", "min": "Min"},
                "steps": ["one", "two"],
                "empty": {}
            })
        );
    }

    #[test]
    fn test_render_refuses_to_replace_a_section() {
        let document = json!({"home": {"title": "Welcome"}});
        let catalog = Catalog::from_document("en", PathBuf::from("en.json"), DocumentFormat::Json, &document);
        let entries = with_added(&catalog, &[("home", "Home")]);
        assert!(matches!(catalog.render(&entries), Err(SyncError::KeyConflict { .. })));
    }

    #[test]
    fn test_has_section() {
        let document = json!({"home": {"title": "Welcome", "empty": {}}, "cart": "Cart", "gone": null});
        let catalog = Catalog::from_document("en", PathBuf::from("en.json"), DocumentFormat::Json, &document);
        assert!(catalog.has_section("home"));
        assert!(catalog.has_section("home.empty"));
        assert!(!catalog.has_section("home.title"));
        assert!(!catalog.has_section("cart"));
        assert!(!catalog.has_section("gone"));
        assert!(!catalog.has_section("home_2"));
        assert!(!catalog.has_section("cart.total"));
    }

    #[test]
    fn test_missing_base_catalog() {
        let set = CatalogSet::new("en").with_entries("fr", FlatCatalog::new());
        assert!(matches!(set.base(), Err(SyncError::MissingBaseCatalog { .. })));
    }
}
