use crate::error::{Result, SyncError};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Dotted key to string value, in document order.
pub type FlatCatalog = IndexMap<String, String>;

/// One step from a container to its child
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn empty_container(&self) -> Value {
        match self {
            PathSegment::Key(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        }
    }
}

/// A leaf of a document with the exact path leading to it.
///
/// Scalars, nulls and empty containers are leaves, so a document is fully
/// described by its leaves in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub path: Vec<PathSegment>,
    pub value: Value,
}

impl Leaf {
    /// A string leaf nested along the `.`-separated parts of `key`.
    pub fn dotted(key: &str, value: impl Into<String>) -> Self {
        Self {
            path: key
                .split('.')
                .map(|part| PathSegment::Key(part.to_string()))
                .collect(),
            value: Value::String(value.into()),
        }
    }

    /// A string leaf stored under `key` verbatim, dots included.
    pub fn literal(key: &str, value: impl Into<String>) -> Self {
        Self {
            path: vec![PathSegment::Key(key.to_string())],
            value: Value::String(value.into()),
        }
    }

    /// Dotted key of this leaf in a [`FlatCatalog`].
    pub fn key(&self) -> String {
        join_path(&self.path)
    }

    /// Text this leaf contributes to a [`FlatCatalog`]; `None` for nulls and
    /// empty containers.
    pub fn text(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
        }
    }
}

fn join_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Every leaf of `value`, depth first in document order.
pub fn leaves(value: &Value) -> Vec<Leaf> {
    let mut out = Vec::new();
    collect_leaves(value, &mut Vec::new(), &mut out);
    out
}

fn collect_leaves(value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Leaf>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                path.push(PathSegment::Key(key.clone()));
                collect_leaves(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                collect_leaves(child, path, out);
                path.pop();
            }
        }
        // A bare scalar document has no key to file it under.
        _ if path.is_empty() => {}
        _ => out.push(Leaf {
            path: path.clone(),
            value: value.clone(),
        }),
    }
}

/// Flatten a nested document into dotted keys.
///
/// Object fields join with `.`, array elements with their index, primitive
/// leaves are stringified and nulls are dropped.
pub fn flatten(value: &Value) -> FlatCatalog {
    leaves(value)
        .into_iter()
        .filter_map(|leaf| leaf.text().map(|text| (leaf.key(), text)))
        .collect()
}

/// True when every top-level value is a scalar, i.e. the file is already flat.
pub fn is_flat_document(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .values()
            .all(|v| !matches!(v, Value::Object(_) | Value::Array(_))),
        _ => false,
    }
}

/// True when `key` names `existing` itself or a section holding it.
pub fn key_covers(key: &str, existing: &str) -> bool {
    existing
        .strip_prefix(key)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Build a document from leaves, in order.
///
/// A path running into a string leaf keeps its remainder as a literal dotted
/// key at that level. A leaf that would replace a container fails with
/// [`SyncError::KeyConflict`] rather than drop what the container holds.
pub fn rebuild(leaves: &[Leaf]) -> Result<Value> {
    let mut root = Value::Object(Map::new());
    for leaf in leaves {
        if leaf.path.is_empty() {
            continue;
        }
        if !place(&mut root, &leaf.path, leaf.value.clone()) {
            return Err(SyncError::KeyConflict { key: leaf.key() });
        }
    }
    Ok(root)
}

/// Rebuild a nested document from dotted keys. Every segment becomes an
/// object field, numeric ones included.
pub fn unflatten(flat: &FlatCatalog) -> Result<Value> {
    let leaves: Vec<Leaf> = flat.iter().map(|(key, value)| Leaf::dotted(key, value.as_str())).collect();
    rebuild(&leaves)
}

fn place(node: &mut Value, path: &[PathSegment], value: Value) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return false;
    };

    match (node, head) {
        (Value::Object(map), PathSegment::Key(key)) => {
            let holds_container = map
                .get(key)
                .map(|child| matches!(child, Value::Object(_) | Value::Array(_)));
            if rest.is_empty() {
                if holds_container == Some(true) {
                    return false;
                }
                map.insert(key.clone(), value);
                return true;
            }
            match holds_container {
                None => {
                    map.insert(key.clone(), rest[0].empty_container());
                }
                Some(true) => {}
                Some(false) => return place_literal(map, path, value),
            }
            match map.get_mut(key) {
                Some(child) => place(child, rest, value),
                None => false,
            }
        }
        (Value::Array(items), PathSegment::Index(index)) => {
            let index = *index;
            if index > items.len() {
                return false;
            }
            if rest.is_empty() {
                if index == items.len() {
                    items.push(value);
                    return true;
                }
                if matches!(items[index], Value::Object(_) | Value::Array(_)) {
                    return false;
                }
                items[index] = value;
                return true;
            }
            if index == items.len() {
                items.push(rest[0].empty_container());
            }
            place(&mut items[index], rest, value)
        }
        _ => false,
    }
}

fn place_literal(map: &mut Map<String, Value>, path: &[PathSegment], value: Value) -> bool {
    if !path.iter().all(|segment| matches!(segment, PathSegment::Key(_))) {
        return false;
    }
    let literal = join_path(path);
    if map.contains_key(&literal) {
        return false;
    }
    map.insert(literal, value);
    true
}
