use crate::error::{Result, SyncError};
use serde_json::Value;
use std::path::Path;

/// Parser for JSON locale catalogs
pub struct JsonParser;

impl JsonParser {
    /// Parse catalog text into an order-preserving JSON value.
    ///
    /// `//` and `/* */` comments are stripped first so JSONC catalogs load too.
    pub fn parse_str(path: &Path, content: &str) -> Result<Value> {
        let cleaned_content = Self::strip_json_comments(content);
        serde_json::from_str(&cleaned_content)
            .map_err(|e| SyncError::parse_error(path, format!("Invalid JSON syntax: {}", e)))
    }

    /// Serialize with 2-space indentation and a trailing newline.
    pub fn render(value: &Value) -> Result<String> {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    }

    /// Strip single-line (//) and multi-line (/* */) comments from JSON
    fn strip_json_comments(content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(ch) = chars.next() {
            if escape_next {
                result.push(ch);
                escape_next = false;
                continue;
            }

            if ch == '\\' && in_string {
                result.push(ch);
                escape_next = true;
                continue;
            }

            if ch == '"' {
                in_string = !in_string;
                result.push(ch);
                continue;
            }

            if !in_string && ch == '/' {
                match chars.peek() {
                    Some('/') => {
                        chars.next();
                        for c in chars.by_ref() {
                            if c == '\n' {
                                result.push('\n');
                                break;
                            }
                        }
                        continue;
                    }
                    Some('*') => {
                        chars.next();
                        let mut prev = ' ';
                        for c in chars.by_ref() {
                            if prev == '*' && c == '/' {
                                break;
                            }
                            if c == '\n' {
                                result.push('\n');
                            }
                            prev = c;
                        }
                        continue;
                    }
                    _ => {}
                }
            }

            result.push(ch);
        }

        result
    }
}
