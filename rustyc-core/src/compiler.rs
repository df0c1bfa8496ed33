use std::path::Path;

use crate::ast::Crate;
use crate::codegen_wasm;
use crate::diagnostic::{Diagnostic, DiagnosticsEngine};
use crate::error::CoreError;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::pretty;
use crate::scope::ScopeRecord;
use crate::sema::{Sema, TypeTable};
use crate::span::{FileId, SourceFile};

/// How far the pipeline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Emit {
    /// Lex, parse and check only.
    #[default]
    Check,
    /// Also encode a wasm module.
    Wasm,
    /// Lex and parse, then print the tree.
    Ast,
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub emit: Emit,
}

/// Everything produced for one translation unit.
#[derive(Debug)]
pub struct CompiledUnit {
    pub source: SourceFile,
    pub crate_ast: Crate,
    pub types: TypeTable,
    pub record: ScopeRecord,
    pub diagnostics: Vec<Diagnostic>,
    /// Present with [`Emit::Wasm`] when no errors were reported.
    pub wasm: Option<Vec<u8>>,
}

impl CompiledUnit {
    pub fn num_errors(&self) -> u32 {
        self.diagnostics.iter().filter(|d| d.is_error()).count() as u32
    }

    /// Fails with [`CoreError::CompilationFailed`] if any error was reported.
    pub fn ensure_success(&self) -> Result<(), CoreError> {
        match self.num_errors() {
            0 => Ok(()),
            errors => Err(CoreError::CompilationFailed { errors }),
        }
    }

    /// Source-like rendering of the parsed crate.
    pub fn ast_string(&self) -> String {
        pretty::crate_to_string(&self.crate_ast)
    }
}

/// Runs the pipeline over one source buffer.
///
/// Each pass runs only if the previous ones reported no errors. Diagnostics
/// are returned in the unit; only conditions that stop the file outright
/// (unsupported constructs, codegen failures) are returned as errors.
pub fn compile_source(
    file: FileId,
    name: &str,
    text: &str,
    options: &CompileOptions,
) -> Result<CompiledUnit, CoreError> {
    let source = SourceFile::new(file, name, text);
    let mut diags = DiagnosticsEngine::new();

    let tokens = tokenize(file, &source.text, &mut diags);
    let crate_ast = Parser::new(&tokens, &mut diags).parse_crate()?;

    let mut unit = CompiledUnit {
        source,
        crate_ast,
        types: TypeTable::default(),
        record: ScopeRecord::default(),
        diagnostics: Vec::new(),
        wasm: None,
    };

    if options.emit != Emit::Ast && !diags.has_errors() {
        let sema = Sema::new(&mut diags).act_on_crate(&unit.crate_ast);
        if options.emit == Emit::Wasm && !diags.has_errors() {
            unit.wasm = Some(codegen_wasm::generate(&unit.crate_ast, &sema)?);
        }
        unit.types = sema.types;
        unit.record = sema.record;
    }

    tracing::debug!(
        file = name,
        errors = diags.num_errors(),
        diagnostics = diags.diagnostics().len(),
        "compiled translation unit"
    );
    unit.diagnostics = diags.into_diagnostics();
    Ok(unit)
}

/// Reads `path` and compiles it; the path is the unit's display name.
pub fn compile_file(
    file: FileId,
    path: &Path,
    options: &CompileOptions,
) -> Result<CompiledUnit, CoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::SourceIo {
        path: path.to_path_buf(),
        source,
    })?;
    compile_source(file, &path.display().to_string(), &text, options)
}
