pub mod candidate;
pub mod mapping;
pub mod resolver;

pub use candidate::{compare_candidates, score_candidate, LocaleCandidate};
pub use mapping::{LocaleMapping, MappingConflict};
pub use resolver::{LocaleResolution, LocaleResolver};
