pub mod key_deriver;
pub mod row;
pub mod workbook;

pub use key_deriver::{base_key, disambiguate, generate_unique_key, to_key_base, KeyDeriver};
pub use row::{KeyProvenance, RawRow, TranslationRow};
pub use workbook::read_rows;
