//! Diagnostics collected while compiling one translation unit.
//!
//! Every pass reports through a shared [`DiagnosticsEngine`]. The engine
//! never aborts: it only records. The driver looks at
//! [`DiagnosticsEngine::num_errors`] to decide whether the next pass runs.
//!
//! # Codes
//!
//! - `E0001`-`E0099`: lexical errors
//! - `E0100`-`E0199`: syntax errors
//! - `E0200`-`E0299`: name resolution and type errors
//! - `W0001`-: warnings

use std::fmt;
use std::io;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::span::{SourceFile, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn report_kind(self) -> ReportKind<'static> {
        match self {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Note => ReportKind::Advice,
        }
    }

    fn color(self) -> Color {
        match self {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Note => Color::Cyan,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

/// Kind of a diagnostic. The kind fixes both the code and the severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagId {
    // lexer
    ErrUnexpectedChar,
    ErrInvalidIntegerSuffix,
    ErrInvalidFloatSuffix,
    ErrInvalidLiteral,
    ErrUnterminatedString,
    ErrUnterminatedComment,
    // parser
    ErrUnexpected,
    ErrExpectedExpr,
    ErrExpectedType,
    ErrInvalidBinaryOp,
    // sema
    ErrUndefinedSym,
    ErrIncompatibleTypes,
    ErrInvalidFunctionCall,
    ErrRedefinition,
    ErrInvalidAssignment,
    ErrInvalidOperand,
    // warnings
    WarnLiteralOutOfRange,
}

impl DiagId {
    pub fn code(self) -> &'static str {
        match self {
            DiagId::ErrUnexpectedChar => "E0001",
            DiagId::ErrInvalidIntegerSuffix => "E0002",
            DiagId::ErrInvalidFloatSuffix => "E0003",
            DiagId::ErrInvalidLiteral => "E0004",
            DiagId::ErrUnterminatedString => "E0005",
            DiagId::ErrUnterminatedComment => "E0006",
            DiagId::ErrUnexpected => "E0100",
            DiagId::ErrExpectedExpr => "E0101",
            DiagId::ErrExpectedType => "E0102",
            DiagId::ErrInvalidBinaryOp => "E0103",
            DiagId::ErrUndefinedSym => "E0200",
            DiagId::ErrIncompatibleTypes => "E0201",
            DiagId::ErrInvalidFunctionCall => "E0202",
            DiagId::ErrRedefinition => "E0203",
            DiagId::ErrInvalidAssignment => "E0204",
            DiagId::ErrInvalidOperand => "E0205",
            DiagId::WarnLiteralOutOfRange => "W0001",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagId::WarnLiteralOutOfRange => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One located, fully formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: DiagId,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(id: DiagId, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            id,
            severity: id.severity(),
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.id.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `name:line:col: error[E0201]: message`
    pub fn render_plain(&self, file: &SourceFile) -> String {
        let loc = file.line_col(self.span.start);
        let mut out = format!(
            "{}:{}: {}[{}]: {}",
            file.name,
            loc,
            self.severity,
            self.code(),
            self.message
        );
        for note in &self.notes {
            out.push_str("\n  = note: ");
            out.push_str(note);
        }
        out
    }
}

/// Append-only diagnostic log with an error counter.
#[derive(Debug, Default)]
pub struct DiagnosticsEngine {
    diagnostics: Vec<Diagnostic>,
    num_errors: u32,
}

impl DiagnosticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, id: DiagId, span: Span, message: impl Into<String>) {
        self.emit(Diagnostic::new(id, span, message));
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.num_errors += 1;
        }
        tracing::trace!(code = diagnostic.code(), "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn num_errors(&self) -> u32 {
        self.num_errors
    }

    pub fn has_errors(&self) -> bool {
        self.num_errors > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn count(&self, id: DiagId) -> usize {
        self.diagnostics.iter().filter(|d| d.id == id).count()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Renders diagnostics as `ariadne` reports against one source file.
pub struct DiagnosticEmitter<'a> {
    file: &'a SourceFile,
    color: bool,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        DiagnosticEmitter { file, color: true }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn emit_to<W: io::Write>(&self, diagnostic: &Diagnostic, out: W) -> io::Result<()> {
        let name = self.file.name.as_str();
        let range = diagnostic.span.range();
        let mut builder = Report::build(diagnostic.severity.report_kind(), name, range.start)
            .with_config(
                Config::default()
                    .with_color(self.color)
                    .with_index_type(IndexType::Byte),
            )
            .with_code(diagnostic.code())
            .with_message(&diagnostic.message)
            .with_label(
                Label::new((name, range))
                    .with_color(diagnostic.severity.color())
                    .with_message(&diagnostic.message),
            );
        if !diagnostic.notes.is_empty() {
            builder = builder.with_note(diagnostic.notes.join("\n"));
        }
        builder
            .finish()
            .write((name, Source::from(self.file.text.as_str())), out)
    }

    pub fn emit(&self, diagnostic: &Diagnostic) -> io::Result<()> {
        self.emit_to(diagnostic, io::stderr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FileId;

    #[test]
    fn counts_errors_but_not_warnings() {
        let mut diags = DiagnosticsEngine::new();
        let span = Span::new(FileId(0), 0, 1);
        diags.report(DiagId::WarnLiteralOutOfRange, span, "literal out of range for `i8`");
        diags.report(DiagId::ErrUndefinedSym, span, "cannot find `x` in this scope");
        assert_eq!(diags.num_errors(), 1);
        assert_eq!(diags.diagnostics().len(), 2);
        assert_eq!(diags.count(DiagId::ErrUndefinedSym), 1);
    }

    #[test]
    fn renders_located_plain_lines() {
        let file = SourceFile::new(FileId(0), "main.rs", "fn main() {\n  y\n}\n");
        let diag = Diagnostic::new(
            DiagId::ErrUndefinedSym,
            Span::new(FileId(0), 14, 15),
            "cannot find `y` in this scope",
        )
        .with_note("declare it with `let`");
        assert_eq!(
            diag.render_plain(&file),
            "main.rs:2:3: error[E0200]: cannot find `y` in this scope\n  = note: declare it with `let`"
        );
    }

    #[test]
    fn renders_ariadne_report() {
        let file = SourceFile::new(FileId(0), "main.rs", "fn main() { y }\n");
        let diag = Diagnostic::new(
            DiagId::ErrUndefinedSym,
            Span::new(FileId(0), 12, 13),
            "cannot find `y` in this scope",
        );
        let mut out = Vec::new();
        DiagnosticEmitter::new(&file)
            .with_color(false)
            .emit_to(&diag, &mut out)
            .expect("write report");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("E0200"));
        assert!(text.contains("cannot find `y` in this scope"));
        assert!(text.contains("main.rs"));
    }

    #[test]
    fn ariadne_labels_use_byte_offsets() {
        let file = SourceFile::new(FileId(0), "main.rs", "fn main() { let s = \"ééé\"; y }\n");
        let diag = Diagnostic::new(
            DiagId::ErrUndefinedSym,
            Span::new(FileId(0), 30, 31),
            "cannot find `y` in this scope",
        );
        let mut out = Vec::new();
        DiagnosticEmitter::new(&file)
            .with_color(false)
            .emit_to(&diag, &mut out)
            .expect("write report");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("main.rs:1:28"), "{text}");
    }
}
