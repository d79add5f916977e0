use crate::error::{Result, SyncError};
use serde_json::{Map, Number, Value};
use std::path::Path;
use yaml_rust::yaml::Hash;
use yaml_rust::{Yaml, YamlEmitter, YamlLoader};

/// Parser for YAML locale catalogs
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML text into the same order-preserving value JSON catalogs use.
    /// Only the first document of a multi-document stream is read.
    pub fn parse_str(path: &Path, content: &str) -> Result<Value> {
        let docs = YamlLoader::load_from_str(content)
            .map_err(|e| SyncError::parse_error(path, e.to_string()))?;

        Ok(docs.into_iter().next().map(Self::to_value).unwrap_or(Value::Null))
    }

    /// Emit a value as a YAML document.
    pub fn render(path: &Path, value: &Value) -> Result<String> {
        let yaml = Self::from_value(value);
        let mut out = String::new();
        YamlEmitter::new(&mut out)
            .dump(&yaml)
            .map_err(|e| SyncError::parse_error(path, format!("{:?}", e)))?;
        out.push('\n');
        Ok(out)
    }

    fn to_value(yaml: Yaml) -> Value {
        match yaml {
            Yaml::Hash(hash) => {
                let mut map = Map::new();
                for (key, value) in hash {
                    if let Some(key) = Self::key_string(&key) {
                        map.insert(key, Self::to_value(value));
                    }
                }
                Value::Object(map)
            }
            Yaml::Array(items) => Value::Array(items.into_iter().map(Self::to_value).collect()),
            Yaml::String(s) => Value::String(s),
            Yaml::Integer(i) => Value::Number(i.into()),
            Yaml::Real(raw) => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(raw)),
            Yaml::Boolean(b) => Value::Bool(b),
            // Aliases are resolved by the loader; anything left is unusable.
            Yaml::Null | Yaml::Alias(_) | Yaml::BadValue => Value::Null,
        }
    }

    fn key_string(key: &Yaml) -> Option<String> {
        match key {
            Yaml::String(s) => Some(s.clone()),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Boolean(b) => Some(b.to_string()),
            Yaml::Real(r) => Some(r.clone()),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Yaml {
        match value {
            Value::Object(map) => {
                let mut hash = Hash::new();
                for (key, val) in map {
                    hash.insert(Yaml::String(key.clone()), Self::from_value(val));
                }
                Yaml::Hash(hash)
            }
            Value::Array(items) => Yaml::Array(items.iter().map(Self::from_value).collect()),
            Value::String(s) => Yaml::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Yaml::Integer(i),
                None => Yaml::Real(n.to_string()),
            },
            Value::Bool(b) => Yaml::Boolean(*b),
            Value::Null => Yaml::Null,
        }
    }
}
