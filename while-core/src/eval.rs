//! Tree-walking evaluator.
//!
//! Runs a checked program directly over the AST. Values live in one flat
//! environment keyed by the declaration each name resolved to, so shadowed
//! declarations never clash. `int` arithmetic is 64-bit and wraps on
//! overflow.

use core::fmt;
use std::collections::HashMap;

use log::{debug, trace};

use crate::ast::{BinOp, DeclId, Expr, ExprKind, NodeId, Program, StmtKind, StmtList, UnOp};
use crate::error::CoreError;
use crate::typecheck::Semantics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Evaluate `program` and return the value of its return expression.
///
/// The caller must only pass programs that checked without errors; a
/// missing binding or an ill-typed operand is reported as
/// [`CoreError::Internal`] rather than a panic.
pub fn evaluate(program: &Program, sema: &Semantics) -> Result<Value, CoreError> {
    let mut evaluator = Evaluator {
        sema,
        env: HashMap::new(),
    };
    evaluator.exec_stmts(&program.body)?;
    let result = evaluator.eval(&program.ret)?;
    debug!("program evaluated to {result}");
    Ok(result)
}

struct Evaluator<'a> {
    sema: &'a Semantics,
    env: HashMap<DeclId, Value>,
}

impl Evaluator<'_> {
    fn resolved(&self, node: NodeId, name: &str) -> Result<DeclId, CoreError> {
        self.sema
            .binding(node)
            .ok_or_else(|| CoreError::Internal(format!("identifier '{name}' was never resolved")))
    }

    fn exec_stmts(&mut self, list: &StmtList) -> Result<(), CoreError> {
        for stmt in &list.stmts {
            match &stmt.kind {
                StmtKind::Decl(decl) => {
                    let value = self.eval(&decl.init)?;
                    trace!("declare #{} {} = {value}", decl.decl, decl.name);
                    self.env.insert(decl.decl, value);
                }
                StmtKind::Assign(assign) => {
                    let value = self.eval(&assign.init)?;
                    let target = self.resolved(stmt.id, &assign.name.name)?;
                    trace!("assign #{target} {} = {value}", assign.name);
                    self.env.insert(target, value);
                }
                StmtKind::While(w) => {
                    while self.eval_bool(&w.cond)? {
                        self.exec_stmts(&w.body)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool, CoreError> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(CoreError::Internal(format!(
                "expected a bool, found {other}"
            ))),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, CoreError> {
        match &expr.kind {
            ExprKind::Binary { lhs, op, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                binary(*op, l, r)
            }
            ExprKind::Unary { op, operand } => {
                let v = self.eval(operand)?;
                match (op, v) {
                    (UnOp::Plus, Value::Int(v)) => Ok(Value::Int(v)),
                    (UnOp::Neg, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
                    (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (op, v) => Err(CoreError::Internal(format!(
                        "operator '{op}' applied to {v}"
                    ))),
                }
            }
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(v) => Ok(Value::Int(*v)),
            ExprKind::Ident(sym) => {
                let decl = self.resolved(expr.id, &sym.name)?;
                self.env.get(&decl).copied().ok_or_else(|| {
                    CoreError::Internal(format!("'{sym}' read before it was declared"))
                })
            }
            ExprKind::Error => Err(CoreError::Internal(
                "placeholder expression reached evaluation".into(),
            )),
        }
    }
}

fn binary(op: BinOp, l: Value, r: Value) -> Result<Value, CoreError> {
    use Value::{Bool, Int};

    Ok(match (op, l, r) {
        (BinOp::Add, Int(a), Int(b)) => Int(a.wrapping_add(b)),
        (BinOp::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(b)),
        (BinOp::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(b)),
        (BinOp::Eq, Int(a), Int(b)) => Bool(a == b),
        (BinOp::Ne, Int(a), Int(b)) => Bool(a != b),
        (BinOp::Lt, Int(a), Int(b)) => Bool(a < b),
        (BinOp::Le, Int(a), Int(b)) => Bool(a <= b),
        (BinOp::Gt, Int(a), Int(b)) => Bool(a > b),
        (BinOp::Ge, Int(a), Int(b)) => Bool(a >= b),
        (BinOp::And, Bool(a), Bool(b)) => Bool(a && b),
        (BinOp::Or, Bool(a), Bool(b)) => Bool(a || b),
        (op, l, r) => {
            return Err(CoreError::Internal(format!(
                "operator '{op}' applied to {l} and {r}"
            )));
        }
    })
}
