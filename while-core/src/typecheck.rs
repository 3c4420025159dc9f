//! Name resolution and type checking.
//!
//! The checker walks the program once, threading a [`ScopeTable`]. Its
//! findings are stored in a [`Semantics`] side table instead of in the tree:
//!
//! - the type of every expression (`Unknown` when an error was reported);
//! - for every identifier use and every assignment, the declaration it
//!   resolved to;
//! - for every declaration, its name, type and span.
//!
//! Every diagnostic is reported where it is detected and the walk goes on.

use std::collections::HashMap;

use log::debug;

use crate::ast::{
    Assignment, DeclId, Declaration, Expr, ExprKind, NodeId, Program, Stmt, StmtKind, StmtList,
    While,
};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::scope::{DeclInfo, ScopeTable};
use crate::span::Span;
use crate::types::Type;

/// Annotations produced by [`check_program`].
#[derive(Debug, Default, Clone)]
pub struct Semantics {
    types: HashMap<NodeId, Type>,
    bindings: HashMap<NodeId, DeclId>,
    decls: HashMap<DeclId, DeclInfo>,
}

impl Semantics {
    /// Checked type of an expression; `Unknown` if it was never checked.
    pub fn type_of(&self, expr: &Expr) -> Type {
        self.types.get(&expr.id).copied().unwrap_or(Type::Unknown)
    }

    /// Declaration an identifier expression or assignment statement
    /// resolved to.
    pub fn binding(&self, node: NodeId) -> Option<DeclId> {
        self.bindings.get(&node).copied()
    }

    pub fn decl(&self, decl: DeclId) -> Option<&DeclInfo> {
        self.decls.get(&decl)
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }
}

/// Check `program`, reporting into `diags`.
pub fn check_program(program: &Program, diags: &mut Diagnostics) -> Semantics {
    let mut checker = TypeChecker {
        scopes: ScopeTable::new(),
        sema: Semantics::default(),
        diags,
    };
    checker.check_stmts(&program.body);
    checker.check_expr(&program.ret);
    debug!(
        "checked program: {} declarations, {} errors so far",
        checker.sema.decl_count(),
        checker.diags.error_count()
    );
    checker.sema
}

struct TypeChecker<'d> {
    scopes: ScopeTable,
    sema: Semantics,
    diags: &'d mut Diagnostics,
}

impl TypeChecker<'_> {
    fn mismatch(&mut self, span: Span, message: String) {
        self.diags
            .push(Diagnostic::error(DiagnosticKind::TypeMismatch, message, span));
    }

    fn check_stmts(&mut self, list: &StmtList) {
        for stmt in &list.stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl(decl) => self.check_decl(decl),
            StmtKind::Assign(assign) => self.check_assign(stmt.id, assign),
            StmtKind::While(w) => self.check_while(w),
        }
    }

    fn check_decl(&mut self, decl: &Declaration) {
        // The initializer is checked before the name is bound, so it sees
        // only earlier declarations.
        let init = self.check_expr(&decl.init);
        if !init.matches(decl.ty) {
            self.mismatch(
                decl.init.span,
                format!(
                    "initializer of declaration '{}' must be of type '{}' but is of type '{init}'",
                    decl.name, decl.ty
                ),
            );
        }

        let info = DeclInfo {
            decl: decl.decl,
            name: decl.name.name.clone(),
            ty: decl.ty,
            span: decl.name.span,
        };
        self.sema.decls.insert(decl.decl, info.clone());
        self.scopes.bind(&decl.name, info, self.diags);
    }

    fn check_assign(&mut self, node: NodeId, assign: &Assignment) {
        let init = self.check_expr(&assign.init);
        let Some(target) = self.scopes.find(&assign.name, self.diags).cloned() else {
            return;
        };
        self.sema.bindings.insert(node, target.decl);

        if !init.matches(target.ty) {
            let message = format!(
                "right-hand side of assignment to '{}' must be of type '{}' but is of type '{init}'",
                assign.name, target.ty
            );
            self.diags.push(
                Diagnostic::error(DiagnosticKind::TypeMismatch, message, assign.init.span)
                    .with_note(target.span, format!("'{}' declared here", target.name)),
            );
        }
    }

    fn check_while(&mut self, w: &While) {
        let cond = self.check_expr(&w.cond);
        if !cond.matches(Type::Bool) {
            self.mismatch(
                w.cond.span,
                format!(
                    "condition of a while statement must be of type 'bool' but is of type '{cond}'"
                ),
            );
        }

        self.scopes.push();
        self.check_stmts(&w.body);
        self.scopes.pop();
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        let ty = match &expr.kind {
            ExprKind::Binary { lhs, op, rhs } => {
                let t = self.check_expr(lhs);
                let u = self.check_expr(rhs);
                let (expected, result) = op.signature();

                if !t.matches(expected) {
                    self.mismatch(
                        lhs.span,
                        format!(
                            "left-hand side of operator '{op}' must be of type '{expected}' but is of type '{t}'"
                        ),
                    );
                }
                if !u.matches(expected) {
                    self.mismatch(
                        rhs.span,
                        format!(
                            "right-hand side of operator '{op}' must be of type '{expected}' but is of type '{u}'"
                        ),
                    );
                }
                result
            }
            ExprKind::Unary { op, operand } => {
                let u = self.check_expr(operand);
                let expected = op.operand_type();
                if !u.matches(expected) {
                    self.mismatch(
                        operand.span,
                        format!(
                            "operand of operator '{op}' must be of type '{expected}' but is of type '{u}'"
                        ),
                    );
                }
                expected
            }
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Int(_) => Type::Int,
            ExprKind::Ident(sym) => match self.scopes.find(sym, self.diags) {
                Some(info) => {
                    let (decl, ty) = (info.decl, info.ty);
                    self.sema.bindings.insert(expr.id, decl);
                    ty
                }
                None => Type::Unknown,
            },
            ExprKind::Error => Type::Unknown,
        };

        self.sema.types.insert(expr.id, ty);
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::span::FileId;
    use test_log::test;

    fn check(source: &str) -> (Program, Semantics, Diagnostics) {
        let mut diags = Diagnostics::new();
        let program = parse(FileId(0), source.as_bytes(), &mut diags);
        assert_eq!(diags.error_count(), 0, "parse errors: {diags:?}");
        let sema = check_program(&program, &mut diags);
        (program, sema, diags)
    }

    fn messages(diags: &Diagnostics) -> Vec<String> {
        diags.iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn accepts_counting_loop() {
        let (program, sema, diags) = check("int x = 1; while x < 5 { x = x + 1; } return x;");
        assert!(diags.is_empty(), "{:?}", messages(&diags));
        assert_eq!(sema.type_of(&program.ret), Type::Int);
        assert_eq!(sema.binding(program.ret.id), Some(DeclId(0)));
    }

    #[test]
    fn redeclaration_reports_once_with_note() {
        let (_, _, diags) = check("int x = 1; int x = 2; return x;");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.count_of(DiagnosticKind::Redeclaration), 1);
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.span.begin.col, 16);
        assert_eq!(diag.notes[0].span.begin.col, 5);
    }

    #[test]
    fn shadowing_in_loop_body_is_allowed() {
        let (_, sema, diags) = check("int x = 1; while false { bool x = true; } return x;");
        assert!(diags.is_empty());
        assert_eq!(sema.decl_count(), 2);
    }

    #[test]
    fn undeclared_identifier_reports_once() {
        let (program, sema, diags) = check("int y = x; return y;");
        assert_eq!(messages(&diags), vec!["identifier 'x' not found"]);
        assert_eq!(diags.count_of(DiagnosticKind::Undeclared), 1);
        let StmtKind::Decl(decl) = &program.body.stmts[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(sema.type_of(&decl.init), Type::Unknown);
        assert_eq!(sema.binding(decl.init.id), None);
    }

    #[test]
    fn loop_scoped_names_vanish_after_loop() {
        let (_, _, diags) = check("while true { int z = 0; } return z + 1;");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.count_of(DiagnosticKind::Undeclared), 1);
        assert_eq!(diags.count_of(DiagnosticKind::TypeMismatch), 0);
    }

    #[test]
    fn doubly_wrong_binary_reports_both_sides() {
        let (_, _, diags) = check("return true + false;");
        assert_eq!(diags.count_of(DiagnosticKind::TypeMismatch), 2);
        let msgs = messages(&diags);
        assert!(msgs[0].starts_with("left-hand side of operator '+' must be of type 'int'"));
        assert!(msgs[1].starts_with("right-hand side of operator '+' must be of type 'int'"));
    }

    #[test]
    fn declaration_initializer_type_mismatch() {
        let (_, _, diags) = check("bool b = 1; return b;");
        assert_eq!(
            messages(&diags),
            vec!["initializer of declaration 'b' must be of type 'bool' but is of type 'int'"]
        );
    }

    #[test]
    fn assignment_type_mismatch_notes_declaration() {
        let (_, _, diags) = check("int x = 0; x = true; return x;");
        assert_eq!(diags.count_of(DiagnosticKind::TypeMismatch), 1);
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].message, "'x' declared here");
        assert_eq!(diag.notes[0].span.begin.col, 5);
    }

    #[test]
    fn assignment_to_undeclared_name() {
        let (_, _, diags) = check("q = 1; return 0;");
        assert_eq!(messages(&diags), vec!["identifier 'q' not found"]);
    }

    #[test]
    fn while_condition_must_be_bool_but_body_is_checked() {
        let (_, _, diags) = check("while 1 { int a = true; } return 0;");
        assert_eq!(diags.count_of(DiagnosticKind::TypeMismatch), 2);
        assert!(messages(&diags)[0].starts_with("condition of a while statement"));
    }

    #[test]
    fn unary_operand_types() {
        let (_, _, diags) = check("return not 1 == -true;");
        let msgs = messages(&diags);
        assert_eq!(msgs, vec!["operand of operator '-' must be of type 'int' but is of type 'bool'"]);
    }

    #[test]
    fn relational_yields_bool() {
        let (program, sema, diags) = check("return 1 < 2 and 3 >= 3;");
        assert!(diags.is_empty());
        assert_eq!(sema.type_of(&program.ret), Type::Bool);
    }

    #[test]
    fn initializer_cannot_see_its_own_name() {
        let (_, _, diags) = check("int a = a; return a;");
        assert_eq!(messages(&diags), vec!["identifier 'a' not found"]);
    }

    #[test]
    fn unknown_operands_do_not_cascade() {
        let (_, _, diags) = check("return missing and missing;");
        assert_eq!(diags.count_of(DiagnosticKind::Undeclared), 2);
        assert_eq!(diags.count_of(DiagnosticKind::TypeMismatch), 0);
    }

    #[test]
    fn checking_is_repeatable_on_one_tree() {
        let mut diags = Diagnostics::new();
        let program = parse(FileId(0), b"int x = 2; return x * x;", &mut diags);
        let first = check_program(&program, &mut diags);
        let second = check_program(&program, &mut diags);
        assert!(diags.is_empty());
        assert_eq!(first.type_of(&program.ret), second.type_of(&program.ret));
    }
}
