use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for catalog synchronization
#[derive(Debug, Error)]
pub enum SyncError {
    /// The locale directory contains no recognized locale file
    #[error("No locale files found in {dir}.\n\nTip: Locale files must end in .json, .yaml or .yml")]
    NoLocaleFilesFound { dir: PathBuf },

    /// Locale files exist but none is English and no fallback matched
    #[error("No en* locale file found. Candidates: {candidates}\n\nTip: Pass --base-locale=<localeCode> to pick a non-English base")]
    NoCandidateFound { candidates: String },

    /// File extension is not a known catalog format
    #[error("Unsupported locale file type: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Catalog format is recognized but its parser was compiled out
    #[error("Missing {capability} parser for {file}.\n\nTip: Rebuild with `--features {capability}` or convert the catalog to JSON")]
    MissingParser {
        file: PathBuf,
        capability: &'static str,
    },

    /// The workbook has no sheet to read
    #[error("Workbook {file} contains no usable sheet")]
    EmptyWorkbook { file: PathBuf },

    /// Failed to read rows out of a workbook
    #[error("Failed to read workbook {file}: {reason}")]
    Workbook { file: PathBuf, reason: String },

    /// The catalog set has no base catalog to diff against
    #[error("Base catalog '{locale}' is missing; cannot synchronize without it")]
    MissingBaseCatalog { locale: String },

    /// Two or more locales read the same spreadsheet column
    #[error("Spreadsheet column '{column}' is mapped by several locales: {}", locales.join(", "))]
    MappingConflict { column: String, locales: Vec<String> },

    /// A leaf key would replace a section holding other entries
    #[error("Key '{key}' would replace the entries nested under it\n\nTip: Rename the key in the spreadsheet")]
    KeyConflict { key: String },

    /// Failed to parse a catalog document
    #[error("Failed to parse {file}:\n{reason}\n\nTip: Verify the file syntax is correct")]
    ParseError { file: PathBuf, reason: String },

    /// A command-line or request option could not be interpreted
    #[error("Invalid value for {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    /// Backing up a catalog before writing failed
    #[error("Failed to back up {file}: {reason}")]
    BackupFailed { file: PathBuf, reason: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Create a NoCandidateFound error listing at most ten candidate paths
    pub fn no_candidate_found<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let preview: Vec<String> = paths
            .into_iter()
            .take(10)
            .map(|p| p.as_ref().to_string())
            .collect();
        Self::NoCandidateFound {
            candidates: preview.join(", "),
        }
    }

    /// Create a ParseError from a file path and reason
    pub fn parse_error(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidOption error
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create a Workbook error
    pub fn workbook(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Workbook {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a BackupFailed error
    pub fn backup_failed(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BackupFailed {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for SyncError
pub type Result<T> = std::result::Result<T, SyncError>;
