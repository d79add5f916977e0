pub mod exclusions;
pub mod locale_table;
pub mod options;

pub use exclusions::{default_exclusions, is_backup_artifact, is_excluded_dir};
pub use locale_table::{
    default_column_for, is_english_locale, normalize_column_name, normalize_locale_code,
    BASE_COLUMN, DEFAULT_LOCALE_TO_COLUMN, KEY_COLUMN, RECOGNIZED_COLUMNS,
};
pub use options::{parse_bool_flag, parse_override_map, FallbackPolicy, OverrideMode};
