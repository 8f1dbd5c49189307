//! Diagnostic infrastructure for error reporting
//!
//! Diagnostics are collected while compiling and rendered afterwards, either
//! with source context through codespan-reporting or as JSON for tooling.
//! Positions are line/column pairs; they are mapped to byte offsets only
//! when the source text is available.

use crate::types::SemanticError;
use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use jmm_ast::{DecodeError, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with a source position
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    span: Span,
    label: Option<String>,
    notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            code: None,
            message: message.into(),
            span: Span::synthetic(),
            label: None,
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the main error location
    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.span = span;
        self.label = Some(message.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    /// Create diagnostic from a type error
    pub fn from_semantic_error(error: &SemanticError) -> Self {
        use SemanticError::*;

        let diag = Diagnostic::error(error.to_string()).with_code(error_code(error));
        match error {
            TypeMismatch { found, span, .. } => {
                diag.with_primary_label(*span, format!("this has type '{}'", found))
            }
            NonArrayAccess { span, .. } => {
                diag.with_primary_label(*span, "not an array")
                    .with_help("only array values can be indexed or asked for their length")
            }
            IndexNotInt { span, .. } => diag.with_primary_label(*span, "expected 'int'"),
            InvalidUnaryOperand { span, .. } => diag.with_primary_label(*span, "invalid operand"),
        }
    }

    /// Create diagnostic from a structural decoding error
    pub fn from_decode_error(error: &DecodeError) -> Self {
        let label = match error {
            DecodeError::MissingChild { .. } => "node skipped",
            DecodeError::UnknownKind { .. } => "unknown node",
            DecodeError::BadAttribute { .. } => "invalid attribute",
        };
        Diagnostic::error(error.to_string())
            .with_code(ErrorCode(error.code()))
            .with_primary_label(error.span(), label)
    }

    /// Build the codespan diagnostic for a file registered in `files`
    pub fn to_codespan(&self, files: &SimpleFiles<String, String>, file_id: usize) -> CsDiagnostic<usize> {
        let mut inner = CsDiagnostic::new(self.severity).with_message(&self.message);
        if let Some(code) = self.code {
            inner = inner.with_code(code.0);
        }
        if let Some(range) = byte_range(files, file_id, self.span) {
            let mut label = Label::primary(file_id, range);
            if let Some(message) = &self.label {
                label = label.with_message(message);
            }
            inner = inner.with_labels(vec![label]);
        }
        inner.with_notes(self.notes.clone())
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(&self, files: &SimpleFiles<String, String>, file_id: usize) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        self.emit_to(&mut writer, files, file_id)
    }

    /// Emit the diagnostic into any color-aware writer
    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        files: &SimpleFiles<String, String>,
        file_id: usize,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.to_codespan(files, file_id))
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self))
    }
}

/// Plain one-line rendering used when no source text is available
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", severity_name(self.severity))?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code.0)?;
        }
        write!(f, ": {}", self.message)?;
        if !self.span.is_synthetic() {
            write!(f, " at {}", self.span)?;
        }
        Ok(())
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "E2001")
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    /// Line (1-indexed, 0 when unknown)
    pub line: u32,
    /// Column (1-indexed, 0 when unknown)
    pub column: u32,
    pub label: Option<String>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic) -> Self {
        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            severity: severity_name(diag.severity).to_string(),
            message: diag.message.clone(),
            line: diag.span.line,
            column: diag.span.column,
            label: diag.label.clone(),
            notes: diag.notes.clone(),
        }
    }
}

/// Diagnostics collected over one compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    /// All diagnostics as one JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let items: Vec<_> = self.items.iter().map(JsonDiagnostic::from_diagnostic).collect();
        serde_json::to_string_pretty(&items)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Get error code for a type error
pub fn error_code(error: &SemanticError) -> ErrorCode {
    use SemanticError::*;

    match error {
        TypeMismatch { .. } => ErrorCode("E2001"),
        NonArrayAccess { .. } => ErrorCode("E2002"),
        IndexNotInt { .. } => ErrorCode("E2003"),
        InvalidUnaryOperand { .. } => ErrorCode("E2004"),
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> (SimpleFiles<String, String>, usize) {
    let mut files = SimpleFiles::new();
    let id = files.add(path.into().display().to_string(), source.into());
    (files, id)
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Bug => "bug",
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Note => "note",
        Severity::Help => "help",
    }
}

/// Byte range of the character at `span`, clamped to its line
fn byte_range(
    files: &SimpleFiles<String, String>,
    file_id: usize,
    span: Span,
) -> Option<std::ops::Range<usize>> {
    if span.is_synthetic() {
        return None;
    }
    let line = files.line_range(file_id, span.line as usize - 1).ok()?;
    let start = (line.start + span.column.saturating_sub(1) as usize).min(line.end);
    let end = (start + 1).min(line.end);
    Some(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::Buffer;
    use jmm_ast::Type;

    fn mismatch() -> SemanticError {
        SemanticError::TypeMismatch {
            context: "operator '+'".to_string(),
            expected: "'int'".to_string(),
            found: Type::boolean(),
            span: Span::new(2, 9),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(&mismatch()), ErrorCode("E2001"));
        let diag = Diagnostic::from_semantic_error(&SemanticError::NonArrayAccess {
            ty: Type::int(),
            span: Span::new(1, 1),
        });
        assert_eq!(diag.code(), Some(ErrorCode("E2002")));
        assert!(diag.is_error());
    }

    #[test]
    fn test_plain_rendering() {
        let diag = Diagnostic::from_semantic_error(&mismatch());
        assert_eq!(
            diag.to_string(),
            "error[E2001]: Type mismatch in operator '+': expected 'int', found 'boolean' at 2:9"
        );
    }

    #[test]
    fn test_codespan_rendering() {
        let source = "int x;\nx = 1 + true;\n";
        let (files, id) = create_files("Foo.jmm", source);
        let diag = Diagnostic::from_semantic_error(&mismatch());

        let mut buffer = Buffer::no_color();
        diag.emit_to(&mut buffer, &files, id).unwrap();
        let rendered = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(rendered.contains("error[E2001]"));
        assert!(rendered.contains("Foo.jmm:2:9"));
        assert!(rendered.contains("this has type 'boolean'"));
    }

    #[test]
    fn test_json_output() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::from_semantic_error(&mismatch()));
        diagnostics.push(Diagnostic::warning("unused"));
        assert_eq!(diagnostics.error_count(), 1);

        let json = diagnostics.to_json().unwrap();
        let parsed: Vec<JsonDiagnostic> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].code.as_deref(), Some("E2001"));
        assert_eq!(parsed[0].line, 2);
        assert_eq!(parsed[1].severity, "warning");
    }
}
