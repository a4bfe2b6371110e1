//! YAML error diagnostics with source spans

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("YAML error in {filename}: {message}")]
#[diagnostic(code(botes::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    filename: String,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column).min(source.len());
        let width = usize::from(offset < source.len());
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset + width),
            help,
            filename: filename.to_string(),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure reading or parsing a YAML file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert 1-based line/column to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            break;
        }
        if ch == '\n' {
            current_line += 1;
            line_start = i + 1;
        }
    }

    if current_line < line {
        return source.len().saturating_sub(1);
    }

    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |n| line_start + n);

    source[line_start..line_end]
        .char_indices()
        .nth(column.saturating_sub(1))
        .map_or(line_end, |(j, _)| line_start + j)
}

/// Suggest a fix for common mistakes in paint documents and config files
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("invalid color") {
        return Some("Colors are quoted hex values: color: '#007A33'".to_string());
    }

    if msg_lower.contains("record prefix") || msg_lower.contains("invalid ulid") {
        return Some("Ids look like BOTE-<ULID> and are assigned by botes; restore the original id.".to_string());
    }

    if msg_lower.contains("invalid type") && msg_lower.contains("percent") {
        return Some("percent is a whole number from 0 to 100".to_string());
    }

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("found unexpected ':'") {
        return Some("Colons in values need to be quoted: \"value:with:colons\"".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_line_col_past_end() {
        let source = "a: 1\n";
        assert_eq!(line_col_to_offset(source, 9, 1), 4);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("invalid color 'red': expected #RRGGBB").is_some());
        assert!(generate_help("invalid record prefix: 'REQ'").is_some());
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("duplicate key").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_from_serde_error_keeps_message() {
        let source = "name: [oops\n";
        let err = serde_yml::from_str::<serde_yml::Value>(source).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, source, "oops.yaml");
        assert!(!diag.message().is_empty());
        assert!(diag.to_string().contains("oops.yaml"));
    }
}
