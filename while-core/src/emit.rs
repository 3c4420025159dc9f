//! Rendering a program back to text.
//!
//! One walk serves three concrete syntaxes, selected by [`Syntax`]:
//!
//! - `While`: the canonical source form. Re-parsing it yields the same
//!   program. Binary expressions are fully parenthesised.
//! - `C`: a complete C translation unit whose `main` prints the result.
//! - `Python`: a Python script that prints the result.
//!
//! The translations need the checker's [`Semantics`] to map every use of a
//! name to its declaration. Each declaration is renamed `_<name>_<k>`, `k`
//! being its creation-order counter, so shadowing in nested loops cannot
//! collide in targets without block scope.

use log::debug;

use crate::ast::{
    BinOp, ERROR_SYMBOL, Expr, ExprKind, NodeId, Program, StmtKind, StmtList, Symbol, UnOp,
};
use crate::error::CoreError;
use crate::typecheck::Semantics;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    While,
    C,
    Python,
}

/// Formatting options shared by all syntaxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Text emitted once per nesting level.
    pub indent: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            indent: "\t".to_string(),
        }
    }
}

impl EmitOptions {
    pub fn with_spaces(width: usize) -> Self {
        EmitOptions {
            indent: " ".repeat(width),
        }
    }
}

/// Render `program` in canonical While syntax. Works on unchecked trees,
/// including ones with placeholders.
pub fn print_program(program: &Program, options: &EmitOptions) -> String {
    let mut w = Writer::new(options);
    print_stmts(&mut w, &program.body);
    w.line(&format!("return {};", canonical_expr(&program.ret)));
    w.out
}

/// Render a checked `program` in `syntax`.
pub fn translate(
    program: &Program,
    sema: &Semantics,
    syntax: Syntax,
    options: &EmitOptions,
) -> Result<String, CoreError> {
    let target = match syntax {
        Syntax::While => return Ok(print_program(program, options)),
        Syntax::C => Target::C,
        Syntax::Python => Target::Python,
    };
    let mut translator = Translator {
        target,
        sema,
        w: Writer::new(options),
    };
    translator.program(program)?;
    debug!("emitted {} bytes of {syntax:?}", translator.w.out.len());
    Ok(translator.w.out)
}

/// Indented line output.
struct Writer<'a> {
    options: &'a EmitOptions,
    depth: usize,
    out: String,
}

impl<'a> Writer<'a> {
    fn new(options: &'a EmitOptions) -> Self {
        Writer {
            options,
            depth: 0,
            out: String::new(),
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(&self.options.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn print_stmts(w: &mut Writer<'_>, list: &StmtList) {
    for stmt in &list.stmts {
        match &stmt.kind {
            StmtKind::Decl(decl) => w.line(&format!(
                "{} {} = {};",
                decl.ty,
                decl.name,
                canonical_expr(&decl.init)
            )),
            StmtKind::Assign(assign) => {
                w.line(&format!("{} = {};", assign.name, canonical_expr(&assign.init)))
            }
            StmtKind::While(l) => {
                w.line(&format!("while {} {{", canonical_expr(&l.cond)));
                w.indent();
                print_stmts(w, &l.body);
                w.dedent();
                w.line("}");
            }
        }
    }
}

fn canonical_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Binary { lhs, op, rhs } => format!(
            "({} {} {})",
            canonical_expr(lhs),
            op.as_str(),
            canonical_expr(rhs)
        ),
        ExprKind::Unary { op, operand } => format!("{}({})", op.as_str(), canonical_expr(operand)),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Int(v) => v.to_string(),
        ExprKind::Ident(sym) => sym.name.clone(),
        ExprKind::Error => ERROR_SYMBOL.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    C,
    Python,
}

struct Translator<'a> {
    target: Target,
    sema: &'a Semantics,
    w: Writer<'a>,
}

impl Translator<'_> {
    /// Target-language name of the declaration `node` resolved to.
    fn resolved_name(&self, node: NodeId, sym: &Symbol) -> Result<String, CoreError> {
        let decl = self
            .sema
            .binding(node)
            .ok_or_else(|| CoreError::Internal(format!("identifier '{sym}' was never resolved")))?;
        Ok(format!("_{sym}_{decl}"))
    }

    fn program(&mut self, program: &Program) -> Result<(), CoreError> {
        let ret_ty = self.sema.type_of(&program.ret);
        match self.target {
            Target::C => {
                self.w.line("#include <stdbool.h>");
                self.w.line("#include <stdio.h>");
                self.w.line("");
                self.w.line("int main() {");
                self.w.indent();
                self.stmts(&program.body)?;
                let ret = self.expr(&program.ret)?;
                match ret_ty {
                    Type::Bool => self
                        .w
                        .line(&format!("printf({ret} ? \"true\\n\" : \"false\\n\");")),
                    _ => self
                        .w
                        .line(&format!("printf(\"%lld\\n\", (long long)({ret}));")),
                }
                self.w.line("return 0;");
                self.w.dedent();
                self.w.line("}");
            }
            Target::Python => {
                self.stmts(&program.body)?;
                let ret = self.expr(&program.ret)?;
                match ret_ty {
                    Type::Bool => self
                        .w
                        .line(&format!("print(\"true\" if {ret} else \"false\")")),
                    _ => self.w.line(&format!("print({ret})")),
                }
            }
        }
        Ok(())
    }

    fn stmts(&mut self, list: &StmtList) -> Result<(), CoreError> {
        for stmt in &list.stmts {
            match &stmt.kind {
                StmtKind::Decl(decl) => {
                    let init = self.expr(&decl.init)?;
                    let text = match self.target {
                        Target::C => format!(
                            "{} _{}_{} = {init};",
                            c_type(decl.ty)?,
                            decl.name,
                            decl.decl
                        ),
                        Target::Python => format!("_{}_{} = {init}", decl.name, decl.decl),
                    };
                    self.w.line(&text);
                }
                StmtKind::Assign(assign) => {
                    let init = self.expr(&assign.init)?;
                    let name = self.resolved_name(stmt.id, &assign.name)?;
                    let text = match self.target {
                        Target::C => format!("{name} = {init};"),
                        Target::Python => format!("{name} = {init}"),
                    };
                    self.w.line(&text);
                }
                StmtKind::While(l) => {
                    let cond = self.expr(&l.cond)?;
                    let head = match self.target {
                        Target::C => format!("while ({cond}) {{"),
                        Target::Python => format!("while {cond}:"),
                    };
                    self.w.line(&head);
                    self.w.indent();
                    if self.target == Target::Python && l.body.is_empty() {
                        self.w.line("pass");
                    }
                    self.stmts(&l.body)?;
                    self.w.dedent();
                    if self.target == Target::C {
                        self.w.line("}");
                    }
                }
            }
        }
        Ok(())
    }

    fn expr(&self, expr: &Expr) -> Result<String, CoreError> {
        Ok(match &expr.kind {
            ExprKind::Binary { lhs, op, rhs } => {
                let l = self.expr(lhs)?;
                let r = self.expr(rhs)?;
                format!("({l} {} {r})", self.bin_op(*op))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.expr(operand)?;
                let op = match (self.target, op) {
                    (Target::C, UnOp::Not) => "!",
                    (_, op) => op.as_str(),
                };
                format!("{op}({operand})")
            }
            ExprKind::Bool(b) => match (self.target, b) {
                (Target::Python, true) => "True".to_string(),
                (Target::Python, false) => "False".to_string(),
                (Target::C, b) => b.to_string(),
            },
            // C has no negative literals, and the magnitude of i64::MIN
            // does not fit a long long.
            ExprKind::Int(i64::MIN) if self.target == Target::C => {
                "(-9223372036854775807LL - 1)".to_string()
            }
            ExprKind::Int(v) => v.to_string(),
            ExprKind::Ident(sym) => self.resolved_name(expr.id, sym)?,
            ExprKind::Error => {
                return Err(CoreError::Internal(
                    "placeholder expression reached translation".into(),
                ));
            }
        })
    }

    fn bin_op(&self, op: BinOp) -> &'static str {
        match (self.target, op) {
            (Target::C, BinOp::And) => "&&",
            (Target::C, BinOp::Or) => "||",
            (_, op) => op.as_str(),
        }
    }
}

fn c_type(ty: Type) -> Result<&'static str, CoreError> {
    match ty {
        Type::Int => Ok("long long"),
        Type::Bool => Ok("bool"),
        Type::Unknown => Err(CoreError::Internal(
            "declaration of unknown type reached translation".into(),
        )),
    }
}
