pub mod document;
pub mod flatten;
pub mod json_parser;
#[cfg(feature = "yaml")]
pub mod yaml_parser;

pub use document::{is_locale_file, parse_document, render_document, DocumentFormat};
pub use flatten::{
    flatten, is_flat_document, key_covers, leaves, rebuild, unflatten, FlatCatalog, Leaf, PathSegment,
};
pub use json_parser::JsonParser;
#[cfg(feature = "yaml")]
pub use yaml_parser::YamlParser;
