//! Core of the RustyC toolchain.
//!
//! The pipeline for one translation unit is:
//!
//!   source text
//!     -> lexer        (tokens)
//!     -> parser       (AST with node ids)
//!     -> sema         (name resolution + types, scope record)
//!     -> codegen_wasm (wasm-encoder)
//!
//! Each pass reports into a shared [`diagnostic::DiagnosticsEngine`] and the
//! next one runs only if no errors were reported. [`compiler`] wires the
//! passes together; the CLI and tests should go through it rather than
//! calling the passes by hand.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod diagnostic;
pub mod error;
pub mod span;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod ast;
pub mod cursor;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod token;
pub mod visit;

// ---------------------------------------------------------------------
// Semantic layers: types, scopes, checking
// ---------------------------------------------------------------------

pub mod scope;
pub mod sema;
pub mod types;

// ---------------------------------------------------------------------
// Back-end: code generation and compiler orchestration
// ---------------------------------------------------------------------

pub mod codegen_wasm;
pub mod compiler;
pub mod source;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use compiler::{CompileOptions, CompiledUnit, Emit, compile_file, compile_source};
pub use diagnostic::{DiagId, Diagnostic, DiagnosticEmitter, DiagnosticsEngine, Severity};
pub use error::CoreError;
pub use source::collect_source_files;
pub use span::{FileId, SourceFile, Span};
