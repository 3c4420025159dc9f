//! Recursive-descent parser for While.
//!
//! Statements are parsed by recursive descent; expressions by precedence
//! climbing over [`Prec`]. The parser keeps exactly one token of lookahead.
//!
//! On a mismatch the parser records a diagnostic and keeps going with a
//! placeholder (an [`ExprKind::Error`] expression or an error [`Symbol`]).
//! It does not skip tokens to resynchronize, so one malformed construct can
//! produce several related diagnostics.

use log::{debug, trace};

use crate::ast::{
    Assignment, BinOp, DeclId, Declaration, Expr, ExprKind, NodeId, Program, Stmt, StmtKind,
    StmtList, Symbol, UnOp, While,
};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::lexer::Lexer;
use crate::span::{FileId, Pos, Span};
use crate::token::{Tag, Token, TokenValue};
use crate::types::Type;

/// Binding levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Bot,
    Or,
    And,
    Not,
    Rel,
    Add,
    Mul,
    Unary,
}

/// Left and right binding level of a binary operator.
fn binding_levels(tag: Tag) -> Option<(Prec, Prec)> {
    Some(match tag {
        Tag::Or => (Prec::Or, Prec::And),
        Tag::And => (Prec::And, Prec::Not),
        Tag::Eq | Tag::Ne | Tag::Lt | Tag::Le | Tag::Gt | Tag::Ge => (Prec::Rel, Prec::Add),
        Tag::Add | Tag::Sub => (Prec::Add, Prec::Mul),
        Tag::Mul => (Prec::Mul, Prec::Unary),
        _ => return None,
    })
}

/// Parse a complete program from `source`.
pub fn parse(file: FileId, source: &[u8], diags: &mut Diagnostics) -> Program {
    Parser::new(Lexer::new(file, source), diags).parse_program()
}

pub struct Parser<'src, 'd> {
    lexer: Lexer<'src>,
    diags: &'d mut Diagnostics,
    ahead: Token,
    /// End of the most recently consumed token.
    prev_end: Pos,
    consumed: usize,
    next_node: u32,
    next_decl: u32,
}

/// Start of a construct, see [`Parser::track`].
#[derive(Clone, Copy)]
struct Tracker {
    begin: Pos,
    consumed: usize,
}

impl<'src, 'd> Parser<'src, 'd> {
    pub fn new(mut lexer: Lexer<'src>, diags: &'d mut Diagnostics) -> Self {
        let ahead = lexer.next_token(diags);
        let prev_end = ahead.span.begin;
        Parser {
            lexer,
            diags,
            ahead,
            prev_end,
            consumed: 0,
            next_node: 0,
            next_decl: 0,
        }
    }

    // -----------------------------------------------------------------
    // Location tracking
    // -----------------------------------------------------------------

    fn track(&self) -> Tracker {
        Tracker {
            begin: self.ahead.span.begin,
            consumed: self.consumed,
        }
    }

    /// Span from the tracked begin to the end of the last consumed token.
    /// A construct that consumed nothing gets a single point.
    fn loc(&self, t: Tracker) -> Span {
        let file = self.ahead.span.file;
        if self.consumed == t.consumed {
            Span::point(file, t.begin)
        } else {
            Span::new(file, t.begin, self.prev_end)
        }
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    fn decl_id(&mut self) -> DeclId {
        let id = DeclId(self.next_decl);
        self.next_decl += 1;
        id
    }

    fn expr(&mut self, span: Span, kind: ExprKind) -> Expr {
        Expr {
            id: self.node_id(),
            span,
            kind,
        }
    }

    fn stmt(&mut self, span: Span, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.node_id(),
            span,
            kind,
        }
    }

    // -----------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------

    fn lex(&mut self) -> Token {
        let next = self.lexer.next_token(self.diags);
        let result = core::mem::replace(&mut self.ahead, next);
        self.prev_end = result.span.end;
        self.consumed += 1;
        result
    }

    fn accept(&mut self, tag: Tag) -> Option<Token> {
        if self.ahead.isa(tag) {
            Some(self.lex())
        } else {
            None
        }
    }

    fn error(&mut self, expected: &str, ctxt: &str) {
        let message = format!("expected {expected}, got '{}' while parsing {ctxt}", self.ahead);
        self.diags
            .push(Diagnostic::error(DiagnosticKind::Parse, message, self.ahead.span));
    }

    fn expect(&mut self, tag: Tag, ctxt: &str) -> Option<Token> {
        if self.ahead.isa(tag) {
            return Some(self.lex());
        }
        self.error(&format!("'{tag}'"), ctxt);
        None
    }

    // -----------------------------------------------------------------
    // Program and statements
    // -----------------------------------------------------------------

    pub fn parse_program(mut self) -> Program {
        debug!("parsing program");
        let t = self.track();
        let body = self.parse_stmts();
        self.expect(Tag::Return, "program");
        let ret = self.parse_expr("return expression");
        self.expect(Tag::Semicolon, "end of the final return of the program");
        let span = self.loc(t);
        self.expect(Tag::Eof, "end of the program");
        debug!(
            "parsed program with {} top-level statements, {} declarations",
            body.stmts.len(),
            self.next_decl
        );
        Program { span, body, ret }
    }

    fn parse_sym(&mut self, ctxt: &str) -> Symbol {
        if let Some(tok) = self.accept(Tag::Sym) {
            return sym_of(tok);
        }
        self.error("identifier", ctxt);
        Symbol::error(self.ahead.span)
    }

    fn parse_stmts(&mut self) -> StmtList {
        let t = self.track();
        let mut stmts = Vec::new();

        loop {
            while self.accept(Tag::Semicolon).is_some() {}

            let stmt = match self.ahead.tag {
                Tag::Int | Tag::Bool => self.parse_decl_stmt(),
                Tag::Sym => self.parse_assign_stmt(),
                Tag::While => self.parse_while_stmt(),
                _ => break,
            };
            stmts.push(stmt);
        }

        StmtList {
            span: self.loc(t),
            stmts,
        }
    }

    fn parse_decl_stmt(&mut self) -> Stmt {
        let t = self.track();
        let ty = Type::from_tag(self.lex().tag).unwrap_or(Type::Unknown);
        let name = self.parse_sym("identifier of a declaration statement");
        self.expect(Tag::Assign, "declaration statement");
        let init = self.parse_expr("right-hand side of a declaration statement");
        self.expect(Tag::Semicolon, "end of a declaration statement");
        let decl = self.decl_id();
        trace!("declaration #{decl} of '{name}'");
        let span = self.loc(t);
        self.stmt(
            span,
            StmtKind::Decl(Declaration {
                decl,
                ty,
                name,
                init,
            }),
        )
    }

    fn parse_assign_stmt(&mut self) -> Stmt {
        let t = self.track();
        let name = sym_of(self.lex());
        self.expect(Tag::Assign, "assignment statement");
        let init = self.parse_expr("right-hand side of an assignment statement");
        self.expect(Tag::Semicolon, "end of an assignment statement");
        let span = self.loc(t);
        self.stmt(span, StmtKind::Assign(Assignment { name, init }))
    }

    fn parse_while_stmt(&mut self) -> Stmt {
        let t = self.track();
        self.lex();
        let cond = self.parse_expr("condition of a while statement");
        self.expect(Tag::BraceL, "while statement");
        let body = self.parse_stmts();
        self.expect(Tag::BraceR, "while statement");
        let span = self.loc(t);
        self.stmt(span, StmtKind::While(While { cond, body }))
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn parse_expr(&mut self, ctxt: &str) -> Expr {
        self.parse_expr_prec(ctxt, Prec::Bot)
    }

    fn parse_expr_prec(&mut self, ctxt: &str, min: Prec) -> Expr {
        let t = self.track();
        let mut lhs = self.parse_primary_or_unary(ctxt);

        while let Some((left, right)) = binding_levels(self.ahead.tag) {
            if left < min {
                break;
            }
            let tok = self.lex();
            let Some(op) = BinOp::from_tag(tok.tag) else {
                break;
            };
            let rhs = self.parse_expr_prec(&format!("right-hand side of operator '{op}'"), right);
            let span = self.loc(t);
            lhs = self.expr(
                span,
                ExprKind::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
            );
        }

        lhs
    }

    fn parse_primary_or_unary(&mut self, ctxt: &str) -> Expr {
        let t = self.track();

        if let Some(tok) = self.accept(Tag::False) {
            return self.expr(tok.span, ExprKind::Bool(false));
        }
        if let Some(tok) = self.accept(Tag::True) {
            return self.expr(tok.span, ExprKind::Bool(true));
        }
        if let Some(tok) = self.accept(Tag::Sym) {
            let span = tok.span;
            return self.expr(span, ExprKind::Ident(sym_of(tok)));
        }
        if let Some(tok) = self.accept(Tag::Lit) {
            let value = match tok.value {
                TokenValue::Int(value) => value,
                _ => 0,
            };
            return self.expr(tok.span, ExprKind::Int(value));
        }

        if let Some(op) = UnOp::from_tag(self.ahead.tag) {
            self.lex();
            let level = if op == UnOp::Not { Prec::Not } else { Prec::Unary };
            let operand = self.parse_expr_prec("unary expression", level);
            let span = self.loc(t);
            return self.expr(
                span,
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
            );
        }

        if self.accept(Tag::ParenL).is_some() {
            let expr = self.parse_expr("parenthesized expression");
            self.expect(Tag::ParenR, "parenthesized expression");
            return expr;
        }

        self.error("primary or unary expression", ctxt);
        let span = self.ahead.span;
        self.expr(span, ExprKind::Error)
    }
}

fn sym_of(tok: Token) -> Symbol {
    match tok.value {
        TokenValue::Sym(name) => Symbol::new(name, tok.span),
        _ => Symbol::error(tok.span),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::OpClass;
    use test_log::test;

    fn parse_src(source: &str) -> (Program, Diagnostics) {
        let mut diags = Diagnostics::new();
        let program = parse(FileId(0), source.as_bytes(), &mut diags);
        (program, diags)
    }

    fn ret_of(source: &str) -> Expr {
        let (program, diags) = parse_src(source);
        assert_eq!(diags.error_count(), 0, "{diags:?}");
        program.ret
    }

    /// Compact s-expression of an expression tree.
    fn shape(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Binary { lhs, op, rhs } => format!("({op} {} {})", shape(lhs), shape(rhs)),
            ExprKind::Unary { op, operand } => format!("({op} {})", shape(operand)),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Int(v) => v.to_string(),
            ExprKind::Ident(sym) => sym.name.clone(),
            ExprKind::Error => "<error>".into(),
        }
    }

    #[test]
    fn parses_minimal_program() {
        let (program, diags) = parse_src("return 1;");
        assert!(diags.is_empty());
        assert!(program.body.is_empty());
        assert!(matches!(program.ret.kind, ExprKind::Int(1)));
    }

    #[test]
    fn parses_statements_in_order() {
        let (program, diags) = parse_src("int x = 1; ; bool b = true; x = 2; while b { b = false; } return x;");
        assert_eq!(diags.error_count(), 0);
        let kinds: Vec<_> = program
            .body
            .stmts
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Decl(_) => "decl",
                StmtKind::Assign(_) => "assign",
                StmtKind::While(_) => "while",
            })
            .collect();
        assert_eq!(kinds, vec!["decl", "decl", "assign", "while"]);
    }

    #[test]
    fn declarations_get_increasing_ids() {
        let (program, _) = parse_src("int a = 1; while true { int a = 2; } int b = 3; return a;");
        let mut ids = Vec::new();
        for stmt in &program.body.stmts {
            match &stmt.kind {
                StmtKind::Decl(d) => ids.push(d.decl),
                StmtKind::While(w) => {
                    for inner in &w.body.stmts {
                        if let StmtKind::Decl(d) = &inner.kind {
                            ids.push(d.decl);
                        }
                    }
                }
                StmtKind::Assign(_) => {}
            }
        }
        assert_eq!(ids, vec![DeclId(0), DeclId(1), DeclId(2)]);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(shape(&ret_of("return 1 + 2 * 3;")), "(+ 1 (* 2 3))");
        assert_eq!(shape(&ret_of("return 1 * 2 + 3;")), "(+ (* 1 2) 3)");
    }

    #[test]
    fn same_level_operators_associate_left() {
        assert_eq!(shape(&ret_of("return 1 - 2 - 3;")), "(- (- 1 2) 3)");
        assert_eq!(shape(&ret_of("return a or b or c;")), "(or (or a b) c)");
    }

    #[test]
    fn logical_precedence_ladder() {
        assert_eq!(
            shape(&ret_of("return a or b and c;")),
            "(or a (and b c))"
        );
        assert_eq!(
            shape(&ret_of("return not a and b;")),
            "(and (not a) b)"
        );
        assert_eq!(shape(&ret_of("return not x < y;")), "(not (< x y))");
        assert_eq!(
            shape(&ret_of("return x + 1 < y * 2 and true;")),
            "(and (< (+ x 1) (* y 2)) true)"
        );
    }

    #[test]
    fn unary_minus_binds_tightest() {
        assert_eq!(shape(&ret_of("return -x * 2;")), "(* (- x) 2)");
        assert_eq!(shape(&ret_of("return - - 3;")), "(- (- 3))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(shape(&ret_of("return (1 + 2) * 3;")), "(* (+ 1 2) 3)");
    }

    #[test]
    fn spans_cover_whole_construct() {
        let (program, _) = parse_src("int x = 1 +\n 22;\nreturn x;");
        let stmt = &program.body.stmts[0];
        assert_eq!(stmt.span.begin, Pos::new(1, 1));
        assert_eq!(stmt.span.end, Pos::new(2, 4));
        let StmtKind::Decl(decl) = &stmt.kind else {
            panic!("expected declaration");
        };
        assert_eq!(decl.init.span.begin, Pos::new(1, 9));
        assert_eq!(decl.init.span.end, Pos::new(2, 3));
        assert_eq!(program.span.end, Pos::new(3, 9));
    }

    #[test]
    fn reports_missing_return() {
        let (_, diags) = parse_src("int x = 1;");
        assert!(diags.count_of(DiagnosticKind::Parse) >= 1);
        let first = diags.iter().next().expect("diagnostic");
        assert_eq!(
            first.message,
            "expected 'return', got '<end of file>' while parsing program"
        );
    }

    #[test]
    fn missing_expression_yields_placeholder() {
        let (program, diags) = parse_src("int x = ; return x;");
        assert_eq!(diags.error_count(), 1);
        let first = diags.iter().next().expect("diagnostic");
        assert_eq!(
            first.message,
            "expected primary or unary expression, got ';' while parsing right-hand side of a declaration statement"
        );
        let StmtKind::Decl(decl) = &program.body.stmts[0].kind else {
            panic!("expected declaration");
        };
        assert!(matches!(decl.init.kind, ExprKind::Error));
    }

    #[test]
    fn missing_identifier_yields_error_symbol() {
        let (program, diags) = parse_src("int = 3; return 0;");
        assert_eq!(diags.error_count(), 1);
        let StmtKind::Decl(decl) = &program.body.stmts[0].kind else {
            panic!("expected declaration");
        };
        assert!(decl.name.is_error());
    }

    #[test]
    fn malformed_while_still_builds_tree() {
        let (program, diags) = parse_src("while x < 3 x = x + 1; } return x;");
        assert!(diags.count_of(DiagnosticKind::Parse) >= 1);
        assert!(matches!(program.body.stmts[0].kind, StmtKind::While(_)));
    }

    #[test]
    fn binary_nodes_record_operator_class() {
        let ret = ret_of("return 1 == 2;");
        let ExprKind::Binary { op, .. } = ret.kind else {
            panic!("expected binary");
        };
        assert_eq!(op.class(), OpClass::Rel);
    }
}
