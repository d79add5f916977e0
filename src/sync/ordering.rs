use crate::parse::FlatCatalog;
use indexmap::{IndexMap, IndexSet};

/// Text before the first `.` or `_`; keys sharing it belong to the same section.
pub fn leading_token(key: &str) -> &str {
    let token = key.split(['.', '_']).next().unwrap_or(key);
    if token.is_empty() {
        key
    } else {
        token
    }
}

/// Lay out `next` in the order of `previous`, slotting each added key in right
/// after the last existing key of the same section (or at the end).
///
/// Keys of `next` placed by neither rule are appended rather than dropped;
/// keys no longer in `next` are left out.
pub fn build_ordered_catalog(
    previous: &FlatCatalog,
    next: &FlatCatalog,
    added_keys: &[String],
) -> FlatCatalog {
    // Last existing key of each section; added keys of that section follow it.
    let mut section_end: IndexMap<&str, &str> = IndexMap::new();
    for key in previous.keys() {
        section_end.insert(leading_token(key), key);
    }

    let mut placed: IndexSet<&str> = previous.keys().map(String::as_str).collect();
    let mut followers: IndexMap<&str, Vec<&str>> = IndexMap::new();
    let mut new_sections: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for added in added_keys {
        if !next.contains_key(added) || !placed.insert(added) {
            continue;
        }
        let token = leading_token(added);
        match section_end.get(token) {
            Some(anchor) => followers.entry(*anchor).or_default().push(added),
            None => new_sections.entry(token).or_default().push(added),
        }
    }

    let mut ordered: IndexSet<&str> = IndexSet::with_capacity(next.len());
    for key in previous.keys() {
        ordered.insert(key);
        if let Some(keys) = followers.get(key.as_str()) {
            ordered.extend(keys.iter().copied());
        }
    }
    ordered.extend(new_sections.values().flatten().copied());
    ordered.extend(next.keys().map(String::as_str));

    ordered
        .into_iter()
        .filter_map(|key| next.get(key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

/// Same entries in the same order.
pub fn same_content(a: &FlatCatalog, b: &FlatCatalog) -> bool {
    a.len() == b.len() && a.iter().eq(b.iter())
}
