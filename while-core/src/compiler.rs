//! Compiler orchestration.
//!
//! A [`Compilation`] owns everything one run needs: the source map, the
//! parsed tree, the diagnostic sink and, once checked, the semantic side
//! table. The driver picks the outputs it wants through [`Mode`].

use std::path::Path;

use log::{debug, info};

use crate::ast::Program;
use crate::diagnostic::Diagnostics;
use crate::emit::{self, EmitOptions, Syntax};
use crate::error::CoreError;
use crate::eval::{self, Value};
use crate::parser::parse;
use crate::span::{FileId, SourceMap};
use crate::typecheck::{Semantics, check_program};

/// What a run of the shared AST walk should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Evaluate,
    Print,
    EmitC,
    EmitPython,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Value(Value),
    Text(String),
}

#[derive(Debug)]
pub struct Compilation {
    files: SourceMap,
    file: FileId,
    program: Program,
    diagnostics: Diagnostics,
    semantics: Option<Semantics>,
}

impl Compilation {
    /// Lex and parse `source`. Lex and parse errors end up in
    /// [`Compilation::diagnostics`].
    pub fn parse(name: impl Into<String>, source: &[u8]) -> Self {
        let mut files = SourceMap::new();
        let file = files.add(name);
        let mut diagnostics = Diagnostics::new();
        let program = parse(file, source, &mut diagnostics);
        debug!(
            "parsed {} with {} error(s)",
            files.name(file),
            diagnostics.error_count()
        );
        Compilation {
            files,
            file,
            program,
            diagnostics,
            semantics: None,
        }
    }

    /// Read the whole file at `path` and parse it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let source = std::fs::read(path).map_err(|source| CoreError::SourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        info!("compiling {}", path.display());
        Ok(Compilation::parse(path.display().to_string(), &source))
    }

    pub fn files(&self) -> &SourceMap {
        &self.files
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    /// Run the checker. Checking happens once; later calls return the
    /// existing annotations.
    pub fn check(&mut self) -> &Semantics {
        let Compilation {
            program,
            diagnostics,
            semantics,
            ..
        } = self;
        semantics.get_or_insert_with(|| check_program(program, diagnostics))
    }

    pub fn is_checked(&self) -> bool {
        self.semantics.is_some()
    }

    /// Check if needed and refuse to go on while errors remain.
    fn ensure_valid(&mut self) -> Result<(), CoreError> {
        self.check();
        match self.diagnostics.error_count() {
            0 => Ok(()),
            errors => Err(CoreError::UnresolvedErrors(errors)),
        }
    }

    /// Canonical source text. Allowed before checking and with errors.
    pub fn print(&self, options: &EmitOptions) -> String {
        emit::print_program(&self.program, options)
    }

    pub fn evaluate(&mut self) -> Result<Value, CoreError> {
        self.ensure_valid()?;
        let (program, sema) = self.checked_parts()?;
        eval::evaluate(program, sema)
    }

    pub fn translate(&mut self, syntax: Syntax, options: &EmitOptions) -> Result<String, CoreError> {
        self.ensure_valid()?;
        let (program, sema) = self.checked_parts()?;
        emit::translate(program, sema, syntax, options)
    }

    fn checked_parts(&self) -> Result<(&Program, &Semantics), CoreError> {
        let sema = self
            .semantics
            .as_ref()
            .ok_or_else(|| CoreError::Internal("program was not checked".into()))?;
        Ok((&self.program, sema))
    }

    /// Produce the output selected by `mode`.
    pub fn run(&mut self, mode: Mode, options: &EmitOptions) -> Result<Output, CoreError> {
        match mode {
            Mode::Evaluate => self.evaluate().map(Output::Value),
            Mode::Print => Ok(Output::Text(self.print(options))),
            Mode::EmitC => self.translate(Syntax::C, options).map(Output::Text),
            Mode::EmitPython => self.translate(Syntax::Python, options).map(Output::Text),
        }
    }

    /// All diagnostics, one line per error or note.
    pub fn render_diagnostics(&self) -> String {
        self.diagnostics.render(&self.files)
    }
}
