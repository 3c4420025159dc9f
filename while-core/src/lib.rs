//! Core compiler pipeline for the While language.
//!
//! The pipeline is:
//!
//!   source .while
//!     -> lexer      (tokens, pulled one at a time)
//!     -> parser     (AST)
//!     -> typecheck  (scope-aware resolution + types, kept in a side table)
//!     -> eval / emit (run the program, or render it as While, C or Python)
//!
//! Every phase reports into one [`Diagnostics`] sink owned by the caller.
//! Higher-level tools (the CLI) should drive the pipeline through
//! [`Compilation`] rather than wiring the phases by hand.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

// ---------------------------------------------------------------------
// Semantic layers: types, scopes, checking
// ---------------------------------------------------------------------

pub mod types;
pub mod scope;
pub mod typecheck;

// ---------------------------------------------------------------------
// Back-end: evaluation, emission and orchestration
// ---------------------------------------------------------------------

pub mod eval;
pub mod emit;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use compiler::{Compilation, Mode, Output};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use emit::{EmitOptions, Syntax};
pub use error::CoreError;
pub use eval::Value;
