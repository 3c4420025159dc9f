//! Nested binding environment used by the checker.
//!
//! Frames form a stack mirroring block nesting. Lookup walks from the
//! innermost frame outwards and stops at the first hit. A name may be bound
//! at most once per frame; shadowing an outer frame is fine.

use std::collections::HashMap;

use log::trace;

use crate::ast::{DeclId, Symbol};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::span::Span;
use crate::types::Type;

/// What the checker knows about one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclInfo {
    pub decl: DeclId,
    pub name: String,
    pub ty: Type,
    /// Span of the declared identifier.
    pub span: Span,
}

#[derive(Debug)]
pub struct ScopeTable {
    frames: Vec<HashMap<String, DeclInfo>>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        ScopeTable::new()
    }
}

impl ScopeTable {
    /// A table with one open (global) frame.
    pub fn new() -> Self {
        ScopeTable {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
        trace!("entered scope frame {}", self.frames.len());
    }

    pub fn pop(&mut self) {
        // The outermost frame stays open for the whole run.
        if self.frames.len() > 1 {
            trace!("left scope frame {}", self.frames.len());
            self.frames.pop();
        }
    }

    /// Bind `sym` in the current frame. Reports a redeclaration and returns
    /// `false` when the current frame already binds the name.
    pub fn bind(&mut self, sym: &Symbol, info: DeclInfo, diags: &mut Diagnostics) -> bool {
        if sym.is_error() {
            return true;
        }
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        if let Some(prior) = frame.get(&sym.name) {
            diags.push(
                Diagnostic::error(
                    DiagnosticKind::Redeclaration,
                    format!("identifier '{sym}' already declared in this scope"),
                    sym.span,
                )
                .with_note(prior.span, format!("previous declaration of '{sym}' here")),
            );
            return false;
        }
        trace!("bound '{}' to declaration #{}", sym.name, info.decl);
        frame.insert(sym.name.clone(), info);
        true
    }

    /// Look `sym` up from the innermost frame outwards. Reports an
    /// undeclared identifier when no frame binds it.
    pub fn find(&self, sym: &Symbol, diags: &mut Diagnostics) -> Option<&DeclInfo> {
        if sym.is_error() {
            return None;
        }
        let found = self.lookup(&sym.name);
        if found.is_none() {
            diags.push(Diagnostic::error(
                DiagnosticKind::Undeclared,
                format!("identifier '{sym}' not found"),
                sym.span,
            ));
        }
        found
    }

    /// Lookup without reporting.
    pub fn lookup(&self, name: &str) -> Option<&DeclInfo> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{FileId, Pos};

    fn sym(name: &str, col: u32) -> Symbol {
        Symbol::new(name, Span::point(FileId(0), Pos::new(1, col)))
    }

    fn info(s: &Symbol, decl: u32, ty: Type) -> DeclInfo {
        DeclInfo {
            decl: DeclId(decl),
            name: s.name.clone(),
            ty,
            span: s.span,
        }
    }

    #[test]
    fn inner_frames_shadow_outer() {
        let mut diags = Diagnostics::new();
        let mut scopes = ScopeTable::new();
        let outer = sym("x", 1);
        assert!(scopes.bind(&outer, info(&outer, 0, Type::Int), &mut diags));
        scopes.push();
        let inner = sym("x", 5);
        assert!(scopes.bind(&inner, info(&inner, 1, Type::Bool), &mut diags));
        assert_eq!(scopes.find(&sym("x", 9), &mut diags).map(|d| d.decl), Some(DeclId(1)));
        scopes.pop();
        assert_eq!(scopes.find(&sym("x", 9), &mut diags).map(|d| d.decl), Some(DeclId(0)));
        assert!(diags.is_empty());
    }

    #[test]
    fn redeclaration_in_one_frame_is_reported_with_note() {
        let mut diags = Diagnostics::new();
        let mut scopes = ScopeTable::new();
        let first = sym("x", 1);
        let second = sym("x", 7);
        scopes.bind(&first, info(&first, 0, Type::Int), &mut diags);
        assert!(!scopes.bind(&second, info(&second, 1, Type::Int), &mut diags));
        assert_eq!(diags.count_of(DiagnosticKind::Redeclaration), 1);
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.span, second.span);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].span, first.span);
        assert_eq!(scopes.lookup("x").map(|d| d.decl), Some(DeclId(0)));
    }

    #[test]
    fn popped_frames_are_invisible() {
        let mut diags = Diagnostics::new();
        let mut scopes = ScopeTable::new();
        scopes.push();
        let inner = sym("y", 1);
        scopes.bind(&inner, info(&inner, 0, Type::Int), &mut diags);
        scopes.pop();
        assert!(scopes.find(&sym("y", 3), &mut diags).is_none());
        assert_eq!(diags.count_of(DiagnosticKind::Undeclared), 1);
    }

    #[test]
    fn error_symbols_are_silent() {
        let mut diags = Diagnostics::new();
        let mut scopes = ScopeTable::new();
        let err = Symbol::error(Span::point(FileId(0), Pos::new(1, 1)));
        assert!(scopes.find(&err, &mut diags).is_none());
        assert!(scopes.bind(&err, info(&err, 0, Type::Int), &mut diags));
        assert!(diags.is_empty());
    }

    #[test]
    fn global_frame_is_never_popped() {
        let mut diags = Diagnostics::new();
        let mut scopes = ScopeTable::new();
        let x = sym("x", 1);
        scopes.pop();
        assert!(scopes.bind(&x, info(&x, 0, Type::Int), &mut diags));
        scopes.pop();
        assert_eq!(scopes.lookup("x").map(|d| d.decl), Some(DeclId(0)));
        assert!(diags.is_empty());
    }
}
